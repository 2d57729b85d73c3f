//! Console configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATE_DIR: &str = ".merch-console";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub max_upload_bytes: u64,
    pub timeouts: Timeouts,
    pub state_dir: PathBuf,
    /// OS appearance seed for the theme store when running headless.
    pub system_dark: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            system_dark: false,
        }
    }
}

impl ConsoleConfig {
    /// Build typed console config from environment variables.
    ///
    /// Optional:
    /// - `NOOS_API_BASE_URL`: default `http://localhost:8080/api`
    /// - `NOOS_MAX_UPLOAD_MB`: default 50
    /// - `NOOS_REQUEST_TIMEOUT_SECS`: default 120
    /// - `NOOS_CONNECT_TIMEOUT_SECS`: default 10
    /// - `NOOS_STATE_DIR`: default `.merch-console`
    /// - `NOOS_SYSTEM_THEME`: `dark` or `light` (default)
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the base URL is not http(s) or
    /// the system theme value is unrecognised.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = parse_base_url(std::env::var("NOOS_API_BASE_URL").ok().as_deref())?;
        let max_upload_mb = env_parse_u64("NOOS_MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB);
        let timeouts = Timeouts {
            request_secs: env_parse_u64("NOOS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("NOOS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let state_dir = std::env::var("NOOS_STATE_DIR").map_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let system_dark = parse_system_theme(std::env::var("NOOS_SYSTEM_THEME").ok().as_deref())?;

        Ok(Self { base_url, max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024), timeouts, state_dir, system_dark })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_base_url(raw: Option<&str>) -> Result<String, ApiError> {
    let url = raw.unwrap_or(DEFAULT_BASE_URL).trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ApiError::Validation(format!("NOOS_API_BASE_URL must be an http(s) URL, got '{url}'")));
    }
    Ok(url.to_owned())
}

fn parse_system_theme(raw: Option<&str>) -> Result<bool, ApiError> {
    match raw.unwrap_or("light").trim().to_ascii_lowercase().as_str() {
        "light" => Ok(false),
        "dark" => Ok(true),
        other => Err(ApiError::Validation(format!("unknown NOOS_SYSTEM_THEME: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
