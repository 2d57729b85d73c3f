//! REST client for the merchandising backend.
//!
//! DESIGN
//! ======
//! `ApiClient` is a thin wrapper around `reqwest::Client` bound to a base URL.
//! Endpoint methods live next to the services that use them; this module
//! owns request plumbing and response classification only.
//!
//! ERROR HANDLING
//! ==============
//! Non-success responses are read as text and classified: an HTML body means
//! a proxy or gateway answered instead of the backend and becomes
//! `BackendUnreachable`; otherwise the JSON `message`/`error` field (or the
//! raw text) becomes `ApiError::Server`. Pure helpers are split out for tests.

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ConsoleConfig;
use crate::error::ApiError;

/// Longest server message kept in an `ApiError::Server`.
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: &ConsoleConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    /// Build a client against `base_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        let config = ConsoleConfig { base_url: base_url.trim_end_matches('/').to_owned(), ..ConsoleConfig::default() };
        Self::new(&config)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "api request");
        self.http.request(method, self.url(path))
    }

    /// Send a prepared request and return the response if its status is 2xx.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let text = response.text().await?;
        parse_json(&text)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.request(Method::GET, path)).await
    }

    pub(crate) async fn get_json_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::GET, path).query(query)).await
    }

    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub(crate) async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::POST, path).json(body)).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.request(Method::POST, path)).await
    }

    pub(crate) async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::PUT, path).json(body)).await
    }

    /// `PUT` without a body, ignoring whatever the server returns.
    pub(crate) async fn put_unit(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::PUT, path)).await.map(drop)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await.map(drop)
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Parse a JSON body. Empty bodies deserialize as JSON `null`.
pub(crate) fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Heuristic for proxy/gateway error pages.
pub(crate) fn looks_like_html(body: &str) -> bool {
    let lower = body.trim_start().chars().take(64).collect::<String>().to_ascii_lowercase();
    lower.starts_with("<!doctype html") || lower.starts_with("<html") || lower.starts_with("<head")
}

pub(crate) fn classify_error(status: u16, body: &str) -> ApiError {
    if looks_like_html(body) {
        return ApiError::BackendUnreachable { status };
    }
    ApiError::Server { status, message: server_message(body) }
}

fn server_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(obj)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(serde_json::Value::String(msg)) = obj.get(key) {
                return msg.clone();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no response body".to_owned();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
