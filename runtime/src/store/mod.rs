//! On-disk outputs: the five JSON files, their timestamped backups, and the
//! content digests used to decide whether a run changed anything.

pub mod backup;
pub mod digest;
pub mod persist;

pub const DISTRICT_TALUKAS_FILE: &str = "district_talukas.json";
pub const TALUK_HOBLIS_FILE: &str = "taluk_hoblis.json";
pub const HOBLI_VILLAGES_FILE: &str = "hobli_villages.json";
pub const REMAP_FILE: &str = "remap.json";
pub const VILLAGE_MAPPING_FILE: &str = "village_mapping.json";

/// Every tracked output file, in write order.
pub const OUTPUT_FILES: [&str; 5] = [
    DISTRICT_TALUKAS_FILE,
    TALUK_HOBLIS_FILE,
    HOBLI_VILLAGES_FILE,
    REMAP_FILE,
    VILLAGE_MAPPING_FILE,
];
