//! Authenticated session headers for the Kaveri API.
//!
//! The session is static: a bearer-style token and a session cookie that are
//! provisioned out of band into `config.json`. Nothing here renews them; an
//! expired token surfaces as failed requests.

use crate::config::Config;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, COOKIE};

/// Request headers for one scraping run.
#[derive(Debug, Clone)]
pub struct HttpSession {
    headers: HeaderMap,
    placeholder: bool,
}

impl HttpSession {
    /// Build the header set from configuration.
    ///
    /// Fails only when a configured value cannot be sent as an HTTP header
    /// (control characters, invalid header name).
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::with_capacity(config.headers.len());
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name {name:?}"))?;
            let mut value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header {name}"))?;
            if name == AUTHORIZATION || name == COOKIE {
                value.set_sensitive(true);
            }
            headers.insert(name, value);
        }

        Ok(Self {
            headers,
            placeholder: config.credentials.is_placeholder(),
        })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the credentials are still the shipped placeholders.
    pub fn uses_placeholder_credentials(&self) -> bool {
        self.placeholder
    }
}
