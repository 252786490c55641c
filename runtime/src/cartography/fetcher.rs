//! Hierarchy fetcher: three sequential fan-out stages over the Kaveri API.
//!
//! Stage 1 asks for the talukas of every district in the fixed enumeration.
//! Stage 2 indexes every taluka by code, asks for each code's hoblis once,
//! and stores them under the taluka name. Stage 3 does the same for hobli
//! codes and villages. A key whose request fails, or returns nothing, is
//! left out of its stage's map. A stage that ends up with no entries at
//! all aborts the run.

use crate::acquisition::http_client::HttpClient;
use crate::cartography::rate_limiter::RateLimiter;
use crate::map::index::CodeIndex;
use crate::map::types::{District, DistrictTalukas, HobliVillages, TalukHoblis};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// One of the three fetch passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Talukas,
    Hoblis,
    Villages,
}

impl Stage {
    /// API endpoint queried by this stage.
    pub fn endpoint(self) -> &'static str {
        match self {
            Stage::Talukas => "GetTalukaAsync",
            Stage::Hoblis => "GetHobliAsync",
            Stage::Villages => "GetVillageAsync",
        }
    }

    /// The single key of the request body.
    pub fn body_key(self) -> &'static str {
        match self {
            Stage::Talukas => "districtCode",
            Stage::Hoblis => "talukaCode",
            Stage::Villages => "hobliCode",
        }
    }

    /// The parent level whose codes drive this stage.
    fn parent(self) -> &'static str {
        match self {
            Stage::Talukas => "district",
            Stage::Hoblis => "taluka",
            Stage::Villages => "hobli",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Talukas => "talukas",
            Stage::Hoblis => "hoblis",
            Stage::Villages => "villages",
        })
    }
}

/// A stage produced no entries, so the run cannot continue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("{stage} stage produced no data ({attempted} {parent} keys attempted)")]
    Empty {
        stage: Stage,
        attempted: usize,
        parent: &'static str,
    },
}

/// The three nested maps from one run.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    pub district_talukas: DistrictTalukas,
    pub taluk_hoblis: TalukHoblis,
    pub hobli_villages: HobliVillages,
}

/// Drives the three stages against one client.
pub struct HierarchyFetcher {
    client: HttpClient,
    limiter: RateLimiter,
    districts: Vec<District>,
}

impl HierarchyFetcher {
    pub fn new(client: HttpClient, limiter: RateLimiter, districts: Vec<District>) -> Self {
        Self {
            client,
            limiter,
            districts,
        }
    }

    /// Run all three stages in order, stopping at the first empty one.
    pub async fn fetch_all(&self) -> Result<Hierarchy, StageError> {
        let district_talukas = self.fetch_talukas().await?;
        let taluk_hoblis = self.fetch_hoblis(&district_talukas).await?;
        let hobli_villages = self.fetch_villages(&taluk_hoblis).await?;

        Ok(Hierarchy {
            district_talukas,
            taluk_hoblis,
            hobli_villages,
        })
    }

    /// Stage 1: talukas per district, keyed by district name.
    pub async fn fetch_talukas(&self) -> Result<DistrictTalukas, StageError> {
        let keys: Vec<(String, String)> = self
            .districts
            .iter()
            .map(|d| (d.code.clone(), d.name.clone()))
            .collect();
        self.fan_out(Stage::Talukas, keys).await
    }

    /// Stage 2: hoblis per unique taluka code, keyed by taluka name.
    pub async fn fetch_hoblis(
        &self,
        district_talukas: &DistrictTalukas,
    ) -> Result<TalukHoblis, StageError> {
        let index = CodeIndex::build("taluka", district_talukas.values().flatten());
        self.fan_out(Stage::Hoblis, index_keys(&index)).await
    }

    /// Stage 3: villages per unique hobli code, keyed by hobli name.
    pub async fn fetch_villages(
        &self,
        taluk_hoblis: &TalukHoblis,
    ) -> Result<HobliVillages, StageError> {
        let index = CodeIndex::build("hobli", taluk_hoblis.values().flatten());
        self.fan_out(Stage::Villages, index_keys(&index)).await
    }

    async fn fan_out<T>(
        &self,
        stage: Stage,
        keys: Vec<(String, String)>,
    ) -> Result<IndexMap<String, Vec<T>>, StageError>
    where
        T: DeserializeOwned,
    {
        let total = keys.len();
        info!(%stage, total, "starting stage");

        let mut out: IndexMap<String, Vec<T>> = IndexMap::new();
        for (i, (code, name)) in keys.into_iter().enumerate() {
            info!(%stage, %name, %code, index = i + 1, total, "fetching");

            let mut body = Map::new();
            body.insert(stage.body_key().to_string(), Value::String(code.clone()));

            match self
                .client
                .request::<Vec<T>, _>(stage.endpoint(), &body)
                .await
            {
                Ok(children) if children.is_empty() => {
                    warn!(%stage, %name, %code, "no records returned, omitting");
                }
                Ok(children) => {
                    if out.contains_key(&name) {
                        warn!(
                            %stage, %name, %code,
                            "name already fetched under another code, replacing"
                        );
                    }
                    out.insert(name, children);
                }
                Err(e) => {
                    warn!(%stage, %name, %code, error = %e, "fetch failed, omitting");
                }
            }

            self.limiter.pause().await;
        }

        if out.is_empty() {
            return Err(StageError::Empty {
                stage,
                attempted: total,
                parent: stage.parent(),
            });
        }

        info!(%stage, fetched = out.len(), total, "stage complete");
        Ok(out)
    }
}

fn index_keys(index: &CodeIndex) -> Vec<(String, String)> {
    index
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}
