//! Per-page view-state controllers.
//!
//! # Design
//! Each controller owns its page's state behind a mutex that is never held
//! across an `.await`, so a page can be driven from several tasks at once (a
//! load in flight while the user types). Derived views such as filtered lists
//! and page windows are computed from a snapshot on demand and never stored.
//!
//! Every asynchronous action follows the same shape: validate and flip the
//! in-flight flag under the lock, await the request without the lock, then
//! re-check the page's [`Liveness`] before writing anything back. Failures are
//! turned into a user-facing line on the page and never escape as errors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub mod appointments;
pub mod auth;
pub mod collection;
pub mod doctors;
pub mod edit;
pub mod home;
pub mod paging;

/// Result of a user action, for callers that want more than the page state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request succeeded and local state was updated.
    Applied,
    /// Input was invalid; no request was sent.
    Rejected,
    /// The request failed; the page carries the message.
    Failed,
    /// Nothing happened: the same action was already in flight, or the page
    /// was torn down before the response arrived.
    Skipped,
}

/// Where the shell should navigate after an auth action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Doctors,
}

/// Shared "page is still mounted" flag checked before every post-await write.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl Liveness {
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn end(&self) {
        self.0.store(false, Ordering::Release);
    }
}

pub(crate) fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Trim every field; `true` when any is left empty.
pub(crate) fn any_blank(fields: &[&str]) -> bool {
    fields.iter().any(|f| f.trim().is_empty())
}
