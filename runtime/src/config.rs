//! Scraper configuration loaded from `config.json`.
//!
//! The document has two sections: `scraper_config` (endpoint, pacing, retry
//! budget) and `credentials` (token, cookie, last-updated stamp written by
//! `kaveri update-creds`). Loading never fails. A missing or unreadable file
//! degrades to built-in defaults with a warning; invalid auth only shows up
//! later as HTTP failures.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://kaveri.karnataka.gov.in/api";
pub const DEFAULT_RATE_LIMIT_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 30.0;
pub const PLACEHOLDER_AUTHORIZATION: &str = "YOUR_AUTH_TOKEN_HERE";
pub const PLACEHOLDER_COOKIE: &str = "YOUR_COOKIE_HERE";

/// Headers every request carries besides the credentials.
const STATIC_HEADERS: &[(&str, &str)] = &[
    ("_append", "3ccbc2d56099f3f6a380b8d4a8763c5d"),
    ("accept", "application/json"),
    ("accept-language", "en-IN,en-GB;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("content-type", "application/json"),
    ("origin", "https://kaveri.karnataka.gov.in"),
    ("referer", "https://kaveri.karnataka.gov.in/"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    ),
];

/// Credentials section of the config document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub authorization: String,
    pub cookie: String,
    pub last_updated: Option<String>,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            authorization: PLACEHOLDER_AUTHORIZATION.to_string(),
            cookie: PLACEHOLDER_COOKIE.to_string(),
            last_updated: None,
        }
    }
}

impl Credentials {
    /// True when either value is still the shipped placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.authorization == PLACEHOLDER_AUTHORIZATION || self.cookie == PLACEHOLDER_COOKIE
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ScraperSection {
    base_url: String,
    rate_limit_delay: f64,
    max_retries: i64,
    request_timeout_secs: f64,
}

impl Default for ScraperSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY_SECS,
            max_retries: DEFAULT_MAX_RETRIES as i64,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigDocument {
    scraper_config: ScraperSection,
    credentials: Credentials,
}

/// Immutable run configuration, built once and passed by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// API root; endpoints are appended as `{base_url}/{endpoint}`.
    pub base_url: String,
    /// Fixed pause after every request.
    pub rate_limit_delay: Duration,
    /// Attempts per logical request, at least 1.
    pub max_retries: u32,
    /// Upper bound on a single HTTP attempt.
    pub request_timeout: Duration,
    pub credentials: Credentials,
    /// Full request header set, credentials included.
    pub headers: IndexMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_document(ConfigDocument::default())
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file not found, using default values");
                return Self::default();
            }
            Err(e) => {
                warn!(
                    path = %path.display(), error = %e,
                    "config file unreadable, using default values"
                );
                return Self::default();
            }
        };

        match Self::from_json(&text) {
            Ok(config) => {
                info!(path = %path.display(), "configuration loaded");
                config
            }
            Err(e) => {
                warn!(
                    path = %path.display(), error = %e,
                    "invalid config file, using default values"
                );
                Self::default()
            }
        }
    }

    /// Parse a config document. Absent keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let doc: ConfigDocument = serde_json::from_str(text)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: ConfigDocument) -> Self {
        let section = doc.scraper_config;

        let base_url = match url::Url::parse(&section.base_url) {
            Ok(u) if u.has_host() => section.base_url.trim_end_matches('/').to_string(),
            _ => {
                warn!(
                    base_url = %section.base_url,
                    "base_url is not an absolute URL, using default"
                );
                DEFAULT_BASE_URL.to_string()
            }
        };

        let rate_limit_delay = seconds_or_default(
            "rate_limit_delay",
            section.rate_limit_delay,
            DEFAULT_RATE_LIMIT_DELAY_SECS,
        );
        let request_timeout = seconds_or_default(
            "request_timeout_secs",
            section.request_timeout_secs,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        );

        let max_retries = if section.max_retries < 1 {
            warn!(max_retries = section.max_retries, "max_retries below 1, using 1");
            1
        } else {
            u32::try_from(section.max_retries).unwrap_or(u32::MAX)
        };

        let headers = build_headers(&doc.credentials);

        Self {
            base_url,
            rate_limit_delay,
            max_retries,
            request_timeout,
            credentials: doc.credentials,
            headers,
        }
    }

    /// Full URL for an endpoint name.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }
}

fn seconds_or_default(key: &str, secs: f64, default: f64) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) => d,
        Err(_) => {
            warn!(key, value = secs, "not a valid duration, using default");
            Duration::from_secs_f64(default)
        }
    }
}

fn build_headers(credentials: &Credentials) -> IndexMap<String, String> {
    let mut headers: IndexMap<String, String> = STATIC_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    headers.insert("authorization".into(), credentials.authorization.clone());
    headers.insert("cookie".into(), credentials.cookie.clone());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.rate_limit_delay, Duration::from_secs(1));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.headers["authorization"], PLACEHOLDER_AUTHORIZATION);
        assert_eq!(config.headers["cookie"], PLACEHOLDER_COOKIE);
        assert_eq!(config.headers["content-type"], "application/json");
        assert!(config.credentials.is_placeholder());
    }

    #[test]
    fn test_load_full_document() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"{{
                "scraper_config": {{
                    "base_url": "http://127.0.0.1:9000/api/",
                    "rate_limit_delay": 0.5,
                    "max_retries": 5
                }},
                "credentials": {{
                    "authorization": "Bearer abc",
                    "cookie": "sid=1",
                    "last_updated": "2026-01-01T00:00:00+00:00"
                }}
            }}"#
        )
        .unwrap();

        let config = Config::load(tmp.path());
        assert_eq!(config.base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.rate_limit_delay, Duration::from_millis(500));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.headers["authorization"], "Bearer abc");
        assert_eq!(config.headers["cookie"], "sid=1");
        assert!(!config.credentials.is_placeholder());
        assert_eq!(
            config.endpoint_url("GetTalukaAsync"),
            "http://127.0.0.1:9000/api/GetTalukaAsync"
        );
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{{ not json").unwrap();
        assert_eq!(Config::load(tmp.path()), Config::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = Config::from_json(r#"{"credentials": {"cookie": "sid=2"}}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.credentials.authorization, PLACEHOLDER_AUTHORIZATION);
        assert_eq!(config.credentials.cookie, "sid=2");
    }

    #[test]
    fn test_out_of_range_values_normalised() {
        let config = Config::from_json(
            r#"{"scraper_config": {"base_url": "not a url", "rate_limit_delay": -2, "max_retries": 0}}"#,
        )
        .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.rate_limit_delay, Duration::from_secs(1));
        assert_eq!(config.max_retries, 1);
    }
}
