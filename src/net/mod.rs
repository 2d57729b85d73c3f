//! Networking modules for the backend REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `client` handles request plumbing and error classification, and `types`
//! defines the shared wire schema. Endpoint calls live in `services`.

pub mod client;
pub mod types;

pub use client::ApiClient;
