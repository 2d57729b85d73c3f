//! Operator console client for the NOOS merchandising backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` talks to the REST API, `services` wraps its endpoints (reads fall
//! back, writes propagate), `upload` validates datasets and follows server
//! tasks to completion, and `state` holds the theme, sidebar and notification
//! stores. The `merch-console` binary binds all of it to subcommands.

pub mod config;
pub mod error;
pub mod net;
pub mod services;
pub mod state;
pub mod upload;

pub use config::ConsoleConfig;
pub use error::ApiError;
pub use net::ApiClient;
