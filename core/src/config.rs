//! Where the backend lives.

use std::env;

use tracing::{info, warn};

use crate::client::BookingClient;

pub const BASE_URL_VAR: &str = "BOOKING_API_BASE_URL";
pub const ENVIRONMENT_VAR: &str = "BOOKING_ENV";

pub const DEVELOPMENT_ORIGIN: &str = "http://127.0.0.1:3000";
pub const PRODUCTION_ORIGIN: &str =
    "https://microservice-doctor-booking-backend-ghdae5hsekerbjba.southindia-01.azurewebsites.net";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Debug builds talk to a local backend unless told otherwise.
    pub fn default_for_build() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn origin(self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_ORIGIN,
            Environment::Production => PRODUCTION_ORIGIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::resolve(
            env::var(BASE_URL_VAR).ok().as_deref(),
            env::var(ENVIRONMENT_VAR).ok().as_deref(),
        )
    }

    /// An explicit base URL wins; otherwise the environment picks an origin.
    pub fn resolve(base_url: Option<&str>, environment: Option<&str>) -> Self {
        if let Some(url) = base_url.map(str::trim).filter(|u| !u.is_empty()) {
            info!("{BASE_URL_VAR} set, using {url}");
            return Self::new(url);
        }

        let environment = match environment {
            Some(name) => Environment::parse(name).unwrap_or_else(|| {
                warn!("Unknown {ENVIRONMENT_VAR} value {name:?}, using build default");
                Environment::default_for_build()
            }),
            None => Environment::default_for_build(),
        };
        let origin = environment.origin();
        info!("{BASE_URL_VAR} not set, using {environment:?} origin: {origin}");
        Self::new(origin)
    }

    pub fn client(&self) -> BookingClient {
        BookingClient::new(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins() {
        let config = ApiConfig::resolve(Some(" http://10.0.0.5:8080/ "), Some("production"));
        assert_eq!(config.base_url, "http://10.0.0.5:8080/");
        assert_eq!(config.client().base_url(), "http://10.0.0.5:8080");
    }

    #[test]
    fn environment_selects_origin() {
        assert_eq!(
            ApiConfig::resolve(None, Some("production")).base_url,
            PRODUCTION_ORIGIN
        );
        assert_eq!(
            ApiConfig::resolve(Some(""), Some("Development")).base_url,
            DEVELOPMENT_ORIGIN
        );
    }

    #[test]
    fn unknown_environment_falls_back_to_build_default() {
        let expected = Environment::default_for_build().origin();
        assert_eq!(ApiConfig::resolve(None, Some("staging")).base_url, expected);
        assert_eq!(ApiConfig::resolve(None, None).base_url, expected);
    }
}
