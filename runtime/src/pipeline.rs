//! One change-detected scraping run.
//!
//! Order of work: hash the current outputs, back them up, run the three
//! fetch stages, build the reverse mapping, write all five files, hash
//! again. A stage that comes back empty aborts before anything is written,
//! leaving the backups as the only trace of the run.

use crate::acquisition::http_client::HttpClient;
use crate::cartography::fetcher::HierarchyFetcher;
use crate::cartography::rate_limiter::{RateLimiter, Sleeper};
use crate::cartography::reverse_mapper;
use crate::config::Config;
use crate::map::types::District;
use crate::store::backup::{run_stamp, BackupManager};
use crate::store::digest::Snapshot;
use crate::store::persist;
use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Coarse result of a run, all the invoking process needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// At least one output file differs from before the run.
    Changed,
    /// The run succeeded and rewrote identical bytes.
    Unchanged,
    /// The run aborted; outputs were not rewritten.
    Failed,
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Changed => 0,
            Outcome::Failed => 1,
            Outcome::Unchanged => 2,
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcome: Outcome,
    /// Rows in the reverse mapping, zero on failure.
    pub villages: usize,
    pub changed_files: Vec<&'static str>,
}

impl RunReport {
    pub(crate) fn failed() -> Self {
        Self {
            outcome: Outcome::Failed,
            villages: 0,
            changed_files: Vec::new(),
        }
    }
}

/// Wires the fetcher, backups, and persistence together for one data directory.
pub struct Pipeline {
    fetcher: HierarchyFetcher,
    backups: BackupManager,
    data_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        data_dir: &Path,
        backup_dir: &Path,
        districts: Vec<District>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self> {
        let client = HttpClient::new(config, sleeper.clone())?;
        let limiter = RateLimiter::new(config.rate_limit_delay, sleeper);

        Ok(Self {
            fetcher: HierarchyFetcher::new(client, limiter, districts),
            backups: BackupManager::new(data_dir, backup_dir),
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Run once and report whether any output changed.
    pub async fn run(&self) -> RunReport {
        let before = match Snapshot::capture(&self.data_dir) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %format!("{e:#}"), "could not hash existing outputs");
                return RunReport::failed();
            }
        };

        let villages = match self.scrape().await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %format!("{e:#}"), "scraping failed");
                return RunReport::failed();
            }
        };

        let after = match Snapshot::capture(&self.data_dir) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %format!("{e:#}"), "could not hash new outputs");
                return RunReport::failed();
            }
        };

        let changed_files = before.changed_files(&after);
        for file in &changed_files {
            info!(file, "changes detected");
        }

        let outcome = if changed_files.is_empty() {
            info!("no changes detected in the data");
            Outcome::Unchanged
        } else {
            info!(files = changed_files.len(), "data changes detected and updated");
            Outcome::Changed
        };

        RunReport {
            outcome,
            villages,
            changed_files,
        }
    }

    async fn scrape(&self) -> Result<usize> {
        info!(data_dir = %self.data_dir.display(), "starting scraping run");

        let stamp = run_stamp(&Local::now());
        self.backups.snapshot(&stamp)?;

        let hierarchy = self.fetcher.fetch_all().await?;
        let mapping = reverse_mapper::build(
            &hierarchy.district_talukas,
            &hierarchy.taluk_hoblis,
            &hierarchy.hobli_villages,
        );

        persist::save_all(&self.data_dir, &hierarchy, &mapping)?;

        info!(villages = mapping.len(), "scraping completed");
        Ok(mapping.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartography::rate_limiter::RecordingSleeper;
    use crate::store::OUTPUT_FILES;
    use assert_json_diff::assert_json_eq;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_scenario(server: &MockServer, village: &str) {
        Mock::given(method("POST"))
            .and(path("/api/GetTalukaAsync"))
            .and(body_json(json!({"districtCode": "1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!([{"talukCode": "T1", "talukNamee": "TalukaX"}]),
            ))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/GetHobliAsync"))
            .and(body_json(json!({"talukaCode": "T1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!([{"hoblicode": "H1", "hoblinamee": "HobliY"}]),
            ))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/GetVillageAsync"))
            .and(body_json(json!({"hobliCode": "H1"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"villageName": village}])),
            )
            .mount(server)
            .await;
    }

    fn pipeline_for(server: &MockServer, data_dir: &Path) -> Pipeline {
        let config = Config {
            base_url: format!("{}/api", server.uri()),
            max_retries: 1,
            ..Config::default()
        };
        Pipeline::new(
            &config,
            data_dir,
            &data_dir.join("backups"),
            vec![District::new("1", "Basavanagudi")],
            Arc::new(RecordingSleeper::new()),
        )
        .unwrap()
    }

    fn read_json(dir: &Path, name: &str) -> Value {
        serde_json::from_str(&std::fs::read_to_string(dir.join(name)).unwrap()).unwrap()
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Changed.exit_code(), 0);
        assert_eq!(Outcome::Failed.exit_code(), 1);
        assert_eq!(Outcome::Unchanged.exit_code(), 2);
        assert_eq!(serde_json::to_value(Outcome::Unchanged).unwrap(), "unchanged");
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let server = MockServer::start().await;
        mount_scenario(&server, "VillageZ").await;
        let dir = tempfile::tempdir().unwrap();

        let report = pipeline_for(&server, dir.path()).run().await;
        assert_eq!(report.outcome, Outcome::Changed);
        assert_eq!(report.villages, 1);
        assert_eq!(report.changed_files, OUTPUT_FILES.to_vec());

        let expected = json!([{
            "village": "VillageZ",
            "hoblinamee": "HobliY",
            "talukNamee": "TalukaX",
            "districtNamee": "Basavanagudi"
        }]);
        assert_json_eq!(read_json(dir.path(), "remap.json"), expected.clone());
        assert_json_eq!(read_json(dir.path(), "village_mapping.json"), expected);
        assert_json_eq!(
            read_json(dir.path(), "district_talukas.json"),
            json!({"Basavanagudi": [{"talukCode": "T1", "talukNamee": "TalukaX"}]})
        );
        assert_json_eq!(
            read_json(dir.path(), "hobli_villages.json"),
            json!({"HobliY": [{"villageName": "VillageZ"}]})
        );
    }

    #[tokio::test]
    async fn test_rerun_with_same_data_is_unchanged_and_backed_up() {
        let server = MockServer::start().await;
        mount_scenario(&server, "VillageZ").await;
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_for(&server, dir.path());

        assert_eq!(pipeline.run().await.outcome, Outcome::Changed);
        let original = std::fs::read(dir.path().join("district_talukas.json")).unwrap();

        let report = pipeline.run().await;
        assert_eq!(report.outcome, Outcome::Unchanged);
        assert!(report.changed_files.is_empty());

        let backup = std::fs::read_dir(dir.path().join("backups"))
            .unwrap()
            .flatten()
            .map(|e| e.path())
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("_district_talukas.json"))
            })
            .expect("district_talukas backup");
        assert_eq!(std::fs::read(backup).unwrap(), original);
    }

    #[tokio::test]
    async fn test_new_upstream_data_is_changed() {
        let first = MockServer::start().await;
        mount_scenario(&first, "VillageZ").await;
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(pipeline_for(&first, dir.path()).run().await.outcome, Outcome::Changed);

        let second = MockServer::start().await;
        mount_scenario(&second, "VillageW").await;
        let report = pipeline_for(&second, dir.path()).run().await;

        assert_eq!(report.outcome, Outcome::Changed);
        assert_eq!(
            report.changed_files,
            vec!["hobli_villages.json", "remap.json", "village_mapping.json"]
        );
    }

    #[tokio::test]
    async fn test_stage_failure_leaves_outputs_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        for name in OUTPUT_FILES {
            std::fs::write(dir.path().join(name), format!("\"previous {name}\"")).unwrap();
        }

        let report = pipeline_for(&server, dir.path()).run().await;
        assert_eq!(report, RunReport::failed());

        for name in OUTPUT_FILES {
            assert_eq!(
                std::fs::read_to_string(dir.path().join(name)).unwrap(),
                format!("\"previous {name}\"")
            );
        }
        // Backups were still taken before the fetch.
        let backups = std::fs::read_dir(dir.path().join("backups")).unwrap().count();
        assert_eq!(backups, OUTPUT_FILES.len());
    }
}
