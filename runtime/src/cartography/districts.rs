//! The fixed district enumeration that seeds the taluka stage.
//!
//! Codes are the upstream API's own; they are neither contiguous nor sorted.
//! Order here is the iteration order of the first stage and therefore the
//! key order of `district_talukas.json`.

use crate::map::types::District;

const KARNATAKA: &[(&str, &str)] = &[
    ("11", "Bagalkot"),
    ("2", "Bangalore Rural"),
    ("1", "Basavanagudi"),
    ("7", "Belgaum"),
    ("8", "Bellary"),
    ("9", "Bidar"),
    ("10", "Bijapur"),
    ("14", "Chamarajanagar"),
    ("38", "Chikkaballapura"),
    ("12", "Chikkamagalur"),
    ("13", "Chitradurga"),
    ("15", "Davangere"),
    ("16", "Dharwad"),
    ("18", "Gadag"),
    ("35", "Gandhinagar"),
    ("17", "Gulbarga"),
    ("19", "Hassan"),
    ("20", "Haveri"),
    ("36", "Jayanagar"),
    ("22", "Karwar"),
    ("23", "Kodagu"),
    ("21", "Kolar"),
    ("31", "Koppal"),
    ("25", "Mandya"),
    ("24", "Mangalore"),
    ("26", "Mysore"),
    ("27", "Raichur"),
    ("34", "Rajajinagar"),
    ("37", "Ramanagara"),
    ("28", "Shimoga"),
    ("33", "Shivajinagar"),
    ("29", "Tumkur"),
    ("30", "Udupi"),
    ("40", "Vijayanagara"),
    ("39", "Yadagiri"),
];

/// All Karnataka districts known to the Kaveri API, in fetch order.
pub fn karnataka() -> Vec<District> {
    KARNATAKA
        .iter()
        .map(|(code, name)| District::new(code, name))
        .collect()
}
