//! Reverse mapping: flatten the three nested maps into one row per village.

use crate::map::types::{DistrictTalukas, HobliVillages, TalukHoblis, VillageMapping, VillageRecord};
use std::collections::HashSet;
use tracing::{debug, info};

/// Walk district → taluka → hobli → village and emit each distinct
/// `(village, hobli, taluka, district)` once, in first-discovery order.
///
/// Talukas without hobli data and hoblis without village data are skipped.
/// The same tuple can be reached twice when two codes collapsed onto one
/// name during fetching; only the first occurrence is kept.
pub fn build(
    district_talukas: &DistrictTalukas,
    taluk_hoblis: &TalukHoblis,
    hobli_villages: &HobliVillages,
) -> VillageMapping {
    let mut mapping = VillageMapping::new();
    let mut seen: HashSet<VillageRecord> = HashSet::new();

    for (district, talukas) in district_talukas {
        for taluka in talukas {
            let Some(hoblis) = taluk_hoblis.get(taluka.name()) else {
                debug!(%district, taluka = %taluka.name(), "no hobli data");
                continue;
            };
            for hobli in hoblis {
                let Some(villages) = hobli_villages.get(hobli.name()) else {
                    debug!(taluka = %taluka.name(), hobli = %hobli.name(), "no village data");
                    continue;
                };
                for village in villages {
                    let record = VillageRecord {
                        village: village.name().to_string(),
                        hobli: hobli.name().to_string(),
                        taluka: taluka.name().to_string(),
                        district: district.clone(),
                    };
                    if seen.insert(record.clone()) {
                        mapping.push(record);
                    }
                }
            }
        }
    }

    info!(villages = mapping.len(), "reverse mapping built");
    mapping
}
