//! `kaveri run` — scrape the hierarchy and report whether anything changed.

use crate::cartography::districts;
use crate::cartography::rate_limiter::TokioSleeper;
use crate::cli::output::{self, Styled};
use crate::config::Config;
use crate::pipeline::{Outcome, Pipeline, RunReport};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// Run the pipeline once and return its outcome.
pub async fn run(config_path: &Path, data_dir: &Path, backup_dir: Option<&Path>) -> Outcome {
    let start = Instant::now();
    let config = Config::load(config_path);
    let backup_dir = backup_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data_dir.join("backups"));

    let report = match Pipeline::new(
        &config,
        data_dir,
        &backup_dir,
        districts::karnataka(),
        Arc::new(TokioSleeper),
    ) {
        Ok(pipeline) => pipeline.run().await,
        Err(e) => {
            error!(error = %format!("{e:#}"), "could not set up the scraper");
            RunReport::failed()
        }
    };

    print_report(&report, start.elapsed().as_millis());
    report.outcome
}

fn print_report(report: &RunReport, elapsed_ms: u128) {
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "outcome": report.outcome,
            "villages": report.villages,
            "changed_files": report.changed_files,
            "duration_ms": elapsed_ms,
        }));
        return;
    }
    if output::is_quiet() {
        return;
    }

    let s = Styled::new();
    let took = s.dim(&format!("({})", output::format_duration_ms(elapsed_ms)));
    match report.outcome {
        Outcome::Changed => {
            eprintln!(
                "  {} {} {took}",
                s.ok_sym(),
                s.bold(&format!("Data changed: {} villages mapped", report.villages))
            );
            for file in &report.changed_files {
                eprintln!("      {file}");
            }
        }
        Outcome::Unchanged => {
            eprintln!(
                "  {} No changes ({} villages mapped) {took}",
                s.info_sym(),
                report.villages
            );
        }
        Outcome::Failed => {
            eprintln!("  {} Scraping failed; outputs left untouched {took}", s.fail_sym());
        }
    }
}
