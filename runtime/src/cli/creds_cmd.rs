//! `kaveri update-creds` — copy credentials from the environment into the config file.

use crate::cli::output::{self, Styled};
use crate::trust::credentials::{self, ProvidedCredentials, AUTH_ENV, COOKIE_ENV};
use anyhow::Result;
use chrono::Utc;
use std::path::Path;

/// Inject `KAVERI_AUTH` / `KAVERI_COOKIE` into `config_path`.
///
/// Missing environment values are not an error: nothing is written.
pub fn run(config_path: &Path) -> Result<()> {
    let s = Styled::new();

    let Some(creds) = ProvidedCredentials::from_env() else {
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "updated": false,
                "reason": format!("{AUTH_ENV} and {COOKIE_ENV} must both be set"),
            }));
        } else if !output::is_quiet() {
            eprintln!(
                "  {} No credentials found ({AUTH_ENV}, {COOKIE_ENV}); config left as is.",
                s.warn_sym()
            );
        }
        return Ok(());
    };

    credentials::inject(config_path, &creds, Utc::now())?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "updated": true,
            "config": config_path.display().to_string(),
        }));
    } else if !output::is_quiet() {
        eprintln!(
            "  {} Credentials updated in {}",
            s.ok_sym(),
            config_path.display()
        );
    }

    Ok(())
}
