//! Credential injection into `config.json`.
//!
//! The token and session cookie are obtained out of band and handed to us
//! through `KAVERI_AUTH` and `KAVERI_COOKIE`. Injection rewrites only the
//! `credentials` section and keeps every other key of the document.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

pub const AUTH_ENV: &str = "KAVERI_AUTH";
pub const COOKIE_ENV: &str = "KAVERI_COOKIE";

/// Credentials read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedCredentials {
    pub authorization: String,
    pub cookie: String,
}

impl ProvidedCredentials {
    /// Read both values from the environment. `None` unless both are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let authorization = std::env::var(AUTH_ENV).ok().filter(|v| !v.is_empty())?;
        let cookie = std::env::var(COOKIE_ENV).ok().filter(|v| !v.is_empty())?;
        Some(Self {
            authorization,
            cookie,
        })
    }
}

/// Write `creds` into the config document at `path`, stamped with `now`.
///
/// A missing, unreadable, or malformed document is replaced by a fresh one
/// holding only the credentials section.
pub fn inject(path: &Path, creds: &ProvidedCredentials, now: DateTime<Utc>) -> Result<()> {
    let mut doc = read_document(path);

    let section = doc
        .entry("credentials")
        .or_insert_with(|| Value::Object(Map::new()));
    if !section.is_object() {
        *section = Value::Object(Map::new());
    }
    if let Value::Object(section) = section {
        section.insert("authorization".into(), Value::String(creds.authorization.clone()));
        section.insert("cookie".into(), Value::String(creds.cookie.clone()));
        section.insert("last_updated".into(), Value::String(now.to_rfc3339()));
    }

    let json = serde_json::to_string_pretty(&Value::Object(doc))?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write config: {}", path.display()))?;
    Ok(())
}

fn read_document(path: &Path) -> Map<String, Value> {
    if !path.exists() {
        return Map::new();
    }
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read config, starting fresh");
            return Map::new();
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!(path = %path.display(), "config is not a JSON object, starting fresh");
            Map::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse config, starting fresh");
            Map::new()
        }
    }
}
