// SPDX-License-Identifier: MIT

//! Client configuration
//!
//! Values come from the environment (optionally seeded from a `.env` file by
//! the binary):
//!
//! - `MAILFLOW_API_BASE_URL` (required) - backend root, e.g. `http://localhost:5000/api`
//! - `MAILFLOW_API_TOKEN` (optional) - opaque credential sent in `Authorization`
//! - `MAILFLOW_HTTP_TIMEOUT_SECS` (optional, default 30)

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{FlowError, Result};

pub const BASE_URL_VAR: &str = "MAILFLOW_API_BASE_URL";
pub const TOKEN_VAR: &str = "MAILFLOW_API_TOKEN";
pub const TIMEOUT_VAR: &str = "MAILFLOW_HTTP_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the flow backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
}

impl ClientConfig {
    /// Build a config from an explicit base URL
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(BASE_URL_VAR)
            .map_err(|_| FlowError::config(format!("{} must be set", BASE_URL_VAR)))?;

        let timeout = match env::var(TIMEOUT_VAR) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                FlowError::config(format!("{} must be a whole number of seconds", TIMEOUT_VAR))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let token = env::var(TOKEN_VAR).ok();

        let config = Self::new(&base_url)?
            .with_token(token)
            .with_timeout(Duration::from_secs(timeout));

        log::info!(
            "Flow backend: base_url={}, has_token={}, timeout={}s",
            config.base_url,
            config.token.is_some(),
            timeout
        );
        Ok(config)
    }

    /// Set the credential; blank values count as none
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Join path segments onto the base URL, percent-encoding each segment
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FlowError::config("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| FlowError::config(format!("invalid base URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FlowError::config(format!(
            "unsupported URL scheme '{}' in '{}'",
            other, raw
        ))),
    }
}
