//! Client core for the clinic booking service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A [`Transport`] performs the
//! actual round-trip; [`BookingApi`] pairs the two into one async call per
//! endpoint, and the page controllers in [`views`] drive it.
//!
//! # Design
//! - `BookingClient` is stateless. It holds only `base_url`.
//! - Each endpoint is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - Wire DTOs (`types`) are decoded first and then normalized into the
//!   domain model (`model`): ids become strings, timestamps become
//!   `DateTime<Utc>`, unknown statuses are kept verbatim.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod multipart;
pub mod session;
pub mod transport;
pub mod types;
pub mod views;

#[cfg(test)]
mod testing;

pub use api::{AppointmentInput, BookingApi};
pub use client::BookingClient;
pub use config::{ApiConfig, Environment};
pub use error::{ApiError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use model::{Appointment, AppointmentStatus, Doctor, Session, Timestamp};
pub use session::{FileStore, KeyValueStore, MemoryStore, SessionStore, StoredSession};
pub use transport::{Transport, UreqTransport};
pub use views::{Outcome, Route};

/// Resource clients for `config`, talking HTTP through `ureq`.
pub fn connect(config: &ApiConfig) -> BookingApi<UreqTransport> {
    BookingApi::new(config.client(), Arc::new(UreqTransport::new()))
}
