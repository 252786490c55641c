//! Writing the five output documents.
//!
//! Files are pretty-printed with two-space indentation and non-ASCII text
//! left unescaped. Each file is overwritten whole and independently: a
//! failure part-way leaves earlier files already rewritten.

use crate::cartography::fetcher::Hierarchy;
use crate::map::types::VillageMapping;
use crate::store::{
    DISTRICT_TALUKAS_FILE, HOBLI_VILLAGES_FILE, REMAP_FILE, TALUK_HOBLIS_FILE,
    VILLAGE_MAPPING_FILE,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Serialize `value` as pretty JSON to `path`, replacing any existing file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Write the nested maps and the reverse mapping (under both of its names).
pub fn save_all(dir: &Path, hierarchy: &Hierarchy, mapping: &VillageMapping) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    write_json(&dir.join(DISTRICT_TALUKAS_FILE), &hierarchy.district_talukas)?;
    info!(file = DISTRICT_TALUKAS_FILE, "saved");
    write_json(&dir.join(TALUK_HOBLIS_FILE), &hierarchy.taluk_hoblis)?;
    info!(file = TALUK_HOBLIS_FILE, "saved");
    write_json(&dir.join(HOBLI_VILLAGES_FILE), &hierarchy.hobli_villages)?;
    info!(file = HOBLI_VILLAGES_FILE, "saved");

    for name in [REMAP_FILE, VILLAGE_MAPPING_FILE] {
        write_json(&dir.join(name), mapping)?;
        info!(file = name, "saved");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::types::{Taluka, VillageRecord};

    #[test]
    fn test_pretty_unescaped_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remap.json");
        let mapping = vec![VillageRecord {
            village: "ಹೊಸೂರು".into(),
            hobli: "Kasaba".into(),
            taluka: "Hunsur".into(),
            district: "Mysore".into(),
        }];

        write_json(&path, &mapping).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "[\n  {\n    \"village\": \"ಹೊಸೂರು\",\n    \"hoblinamee\": \"Kasaba\",\n    \"talukNamee\": \"Hunsur\",\n    \"districtNamee\": \"Mysore\"\n  }\n]"
        );
    }

    #[test]
    fn test_save_all_writes_five_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut hierarchy = Hierarchy::default();
        hierarchy.district_talukas.insert(
            "Mysore".into(),
            vec![Taluka::new("T1", "Hunsur")],
        );

        save_all(dir.path(), &hierarchy, &Vec::new()).unwrap();

        for name in crate::store::OUTPUT_FILES {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
        assert_eq!(
            std::fs::read_to_string(dir.path().join("remap.json")).unwrap(),
            std::fs::read_to_string(dir.path().join("village_mapping.json")).unwrap()
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("taluk_hoblis.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_records_written_back_in_upstream_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let existing = "{\n  \"Mysore\": [\n    {\n      \"talukNamee\": \"Hunsur\",\n      \"talukCode\": \"T1\",\n      \"extra\": 1\n    }\n  ]\n}";
        let hierarchy = Hierarchy {
            district_talukas: serde_json::from_str(existing).unwrap(),
            ..Hierarchy::default()
        };

        save_all(dir.path(), &hierarchy, &Vec::new()).unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("district_talukas.json")).unwrap(),
            existing
        );
    }

    #[test]
    fn test_write_failure_reported() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("deeper").join("remap.json");
        assert!(write_json(&target, &Vec::<VillageRecord>::new()).is_err());
    }
}
