//! Endpoint services over the backend REST API.
//!
//! DESIGN
//! ======
//! Reads degrade: any transport, server or parse failure is logged and
//! replaced by a static fallback (empty list, zeroed struct, default
//! parameters) so views keep rendering. Writes propagate: mutations return
//! `Result` and the caller decides how to surface the failure.
//!
//! The task status read used by the polling engine is the one exception; it
//! propagates so the engine can count the failed check and retry.

pub mod algo;
pub mod dashboard;
pub mod files;
pub mod notifications;
pub mod reports;
pub mod runs;
pub mod tasks;

use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;

/// `?page=&size=` for paged endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct PageQuery {
    pub page: u32,
    pub size: u32,
}

/// Collapse a read result into its value or `fallback`, logging the failure.
pub(crate) fn or_fallback<T>(result: Result<T, ApiError>, endpoint: &str, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(endpoint, code = e.error_code(), error = %e, "read failed, using fallback");
            fallback()
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
