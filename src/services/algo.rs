//! NOOS parameter-set endpoints under `/algo/params`.
//!
//! Reads fall back to the built-in [`AlgoParams::default`] set so the
//! parameter form always has values to show.

use crate::error::ApiError;
use crate::net::ApiClient;
use crate::net::types::AlgoParams;
use crate::services::or_fallback;

const BASE: &str = "/algo/params";

fn params_path(id: i64) -> String {
    format!("{BASE}/{id}")
}

pub async fn list(client: &ApiClient) -> Vec<AlgoParams> {
    or_fallback(client.get_json(BASE).await, "GET /algo/params", Vec::new)
}

/// The active parameter set, or the built-in defaults.
pub async fn active(client: &ApiClient) -> AlgoParams {
    or_fallback(client.get_json(&format!("{BASE}/active")).await, "GET /algo/params/active", AlgoParams::default)
}

pub async fn get(client: &ApiClient, id: i64) -> Option<AlgoParams> {
    or_fallback(client.get_json(&params_path(id)).await.map(Some), "GET /algo/params/{id}", || None)
}

/// # Errors
///
/// Propagates the request error.
pub async fn create(client: &ApiClient, params: &AlgoParams) -> Result<AlgoParams, ApiError> {
    client.post_json(BASE, params).await
}

/// # Errors
///
/// Propagates the request error.
pub async fn update(client: &ApiClient, id: i64, params: &AlgoParams) -> Result<AlgoParams, ApiError> {
    client.put_json(&params_path(id), params).await
}

/// Make `id` the parameter set used by the next run.
///
/// # Errors
///
/// Propagates the request error.
pub async fn activate(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.put_unit(&format!("{}/activate", params_path(id))).await
}

/// # Errors
///
/// Propagates the request error.
pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&params_path(id)).await
}
