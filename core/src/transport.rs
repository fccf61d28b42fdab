//! Executes `HttpRequest` values against the network.
//!
//! The page controllers only see the [`Transport`] trait, so tests swap in a
//! scripted fake. [`UreqTransport`] is the real implementation: a blocking
//! `ureq` agent driven from tokio's blocking pool. HTTP error statuses come
//! back as data and are interpreted by [`BookingClient`](crate::BookingClient);
//! only failures that produce no response at all become `ApiError::Network`.
//! Single attempt, no retries, no timeout.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?
    }
}

fn execute_blocking(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    debug!(method = req.method.as_str(), path = %req.path, "sending request");

    let result = match req.method {
        HttpMethod::Get => {
            let mut builder = agent.get(&req.path);
            for (key, value) in &req.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            builder.call()
        }
        HttpMethod::Post | HttpMethod::Put => {
            let mut builder = if req.method == HttpMethod::Post {
                agent.post(&req.path)
            } else {
                agent.put(&req.path)
            };
            for (key, value) in &req.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            match req.body.as_deref() {
                Some(body) => builder.send(body),
                None => builder.send_empty(),
            }
        }
    };

    let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Network(e.to_string()))?;
    debug!(status, path = %req.path, "received response");

    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body,
    })
}
