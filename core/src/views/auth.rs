//! Login, registration and logout.
//!
//! A successful login or registration is written to the [`SessionStore`] even
//! if the page was torn down while the request was in flight: the server has
//! already issued the token. Only the page state is left untouched.

use std::sync::Mutex;

use tracing::{info, warn};

use super::{any_blank, lock, Liveness, Outcome, Route};
use crate::api::BookingApi;
use crate::error::{ApiError, StoreError};
use crate::model::{format_date_time, Session};
use crate::session::{KeyValueStore, SessionStore};
use crate::transport::Transport;
use crate::types::ProfileImage;

const LOGIN_MISSING_FIELDS: &str = "Email and password are required.";
const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTER_MISSING_FIELDS: &str = "Please complete all required fields.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";
const IMAGE_WRONG_TYPE: &str = "Profile image must be a JPG, PNG, or GIF file.";
const IMAGE_TOO_LARGE: &str = "Profile image must be smaller than 5MB.";

pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Line shown for a failed auth request. Server text is passed through as-is.
fn failure_message(error: &ApiError, fallback: &str) -> String {
    match error {
        ApiError::Request { message, .. } => message.clone(),
        ApiError::Network(_) | ApiError::Validation(_) => error.to_string(),
        ApiError::Deserialization(_) | ApiError::Serialization(_) => fallback.to_string(),
    }
}

/// Check an optional upload against the accepted types and size limit.
pub fn validate_profile_image(image: &ProfileImage) -> Result<(), &'static str> {
    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Err(IMAGE_WRONG_TYPE);
    }
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(IMAGE_TOO_LARGE);
    }
    Ok(())
}

// -- login -------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub loading: bool,
    pub error: Option<String>,
    /// Set once signed in; the shell navigates there.
    pub redirect: Option<Route>,
}

impl LoginState {
    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            "Signing in..."
        } else {
            "Sign in"
        }
    }
}

pub struct LoginPage<T: ?Sized, S: ?Sized> {
    api: BookingApi<T>,
    sessions: SessionStore<S>,
    state: Mutex<LoginState>,
    alive: Liveness,
}

impl<T: Transport + ?Sized, S: KeyValueStore + ?Sized> LoginPage<T, S> {
    pub fn new(api: BookingApi<T>, sessions: SessionStore<S>) -> Self {
        Self {
            api,
            sessions,
            state: Mutex::new(LoginState::default()),
            alive: Liveness::default(),
        }
    }

    pub fn snapshot(&self) -> LoginState {
        lock(&self.state).clone()
    }

    pub fn teardown(&self) {
        self.alive.end();
    }

    pub fn set_email(&self, value: &str) {
        lock(&self.state).email = value.to_string();
    }

    pub fn set_password(&self, value: &str) {
        lock(&self.state).password = value.to_string();
    }

    pub async fn submit(&self) -> Outcome {
        let (email, password) = {
            let mut state = lock(&self.state);
            if state.loading {
                return Outcome::Skipped;
            }
            if any_blank(&[state.email.as_str(), state.password.as_str()]) {
                state.error = Some(LOGIN_MISSING_FIELDS.to_string());
                return Outcome::Rejected;
            }
            state.loading = true;
            state.error = None;
            (state.email.trim().to_string(), state.password.trim().to_string())
        };

        let result = self.api.login(&email, &password).await;
        let result = match result {
            Ok(session) => self.sessions.save(&session).map_err(|e| e.to_string()),
            Err(e) => {
                warn!(error = %e, "login failed");
                Err(failure_message(&e, LOGIN_FAILED))
            }
        };

        let mut state = lock(&self.state);
        state.loading = false;
        if !self.alive.is_alive() {
            return Outcome::Skipped;
        }
        match result {
            Ok(()) => {
                info!(email = %email, "signed in");
                state.redirect = Some(Route::Doctors);
                Outcome::Applied
            }
            Err(message) => {
                state.error = Some(message);
                Outcome::Failed
            }
        }
    }
}

// -- register ----------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterState {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_image: Option<ProfileImage>,
    pub loading: bool,
    pub error: Option<String>,
    /// The account created by the last successful submit.
    pub account: Option<Session>,
}

impl RegisterState {
    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            "Creating account..."
        } else {
            "Create account"
        }
    }

    pub fn welcome_message(&self) -> Option<String> {
        self.account
            .as_ref()
            .map(|account| format!("Welcome, {}!", account.username))
    }

    pub fn expiry_line(&self) -> Option<String> {
        self.account.as_ref().map(|account| {
            format!(
                "Token saved locally. Expires: {}",
                format_date_time(&account.expires_at)
            )
        })
    }
}

pub struct RegisterPage<T: ?Sized, S: ?Sized> {
    api: BookingApi<T>,
    sessions: SessionStore<S>,
    state: Mutex<RegisterState>,
    alive: Liveness,
}

impl<T: Transport + ?Sized, S: KeyValueStore + ?Sized> RegisterPage<T, S> {
    pub fn new(api: BookingApi<T>, sessions: SessionStore<S>) -> Self {
        Self {
            api,
            sessions,
            state: Mutex::new(RegisterState::default()),
            alive: Liveness::default(),
        }
    }

    pub fn snapshot(&self) -> RegisterState {
        lock(&self.state).clone()
    }

    pub fn teardown(&self) {
        self.alive.end();
    }

    pub fn set_username(&self, value: &str) {
        lock(&self.state).username = value.to_string();
    }

    pub fn set_email(&self, value: &str) {
        lock(&self.state).email = value.to_string();
    }

    pub fn set_password(&self, value: &str) {
        lock(&self.state).password = value.to_string();
    }

    pub fn set_profile_image(&self, image: Option<ProfileImage>) {
        lock(&self.state).profile_image = image;
    }

    pub async fn submit(&self) -> Outcome {
        let (username, email, password, image) = {
            let mut state = lock(&self.state);
            if state.loading {
                return Outcome::Skipped;
            }
            if any_blank(&[
                state.username.as_str(),
                state.email.as_str(),
                state.password.as_str(),
            ]) {
                state.error = Some(REGISTER_MISSING_FIELDS.to_string());
                return Outcome::Rejected;
            }
            if let Some(Err(message)) = state.profile_image.as_ref().map(validate_profile_image) {
                state.error = Some(message.to_string());
                return Outcome::Rejected;
            }
            state.loading = true;
            state.error = None;
            (
                state.username.trim().to_string(),
                state.email.trim().to_string(),
                state.password.trim().to_string(),
                state.profile_image.clone(),
            )
        };

        let result = self.api.register(&username, &email, &password, image).await;
        let result = match result {
            Ok(session) => match self.sessions.save(&session) {
                Ok(()) => Ok(session),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => {
                warn!(error = %e, "registration failed");
                Err(failure_message(&e, REGISTER_FAILED))
            }
        };

        let mut state = lock(&self.state);
        state.loading = false;
        if !self.alive.is_alive() {
            return Outcome::Skipped;
        }
        match result {
            Ok(session) => {
                info!(username = %session.username, "account created");
                *state = RegisterState {
                    account: Some(session),
                    ..RegisterState::default()
                };
                Outcome::Applied
            }
            Err(message) => {
                state.error = Some(message);
                state.account = None;
                Outcome::Failed
            }
        }
    }
}

/// Forget the stored session and send the user to the login view.
pub fn logout<S: KeyValueStore + ?Sized>(sessions: &SessionStore<S>) -> Result<Route, StoreError> {
    sessions.clear()?;
    Ok(Route::Login)
}
