//! # Object Category Normalization
//!
//! Historical data spells the type of an object in many ways: `Vehicles`,
//! `vehicle`, `VEH`, `Equipment`. Every table stores the type in an
//! `object_type` column, so all of them run through [`normalize`] on the way
//! in (create/update) and on the way out (every read).
//!
//! ## Canonical Set
//!
//! | Canonical  | Accepted spellings (case-insensitive, trimmed)            |
//! |------------|-----------------------------------------------------------|
//! | `Vehicle`  | vehicle, vehicles, veh                                    |
//! | `Facility` | facility, facilities, fac                                 |
//! | `Other`    | other, others, equipment, equip, eq                       |
//!
//! Anything else passes through untouched so that categories added later are
//! preserved rather than rejected.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const VEHICLE: &str = "Vehicle";
pub const FACILITY: &str = "Facility";
pub const OTHER: &str = "Other";

/// The canonical categories, in display order.
pub const CANONICAL: [&str; 3] = [VEHICLE, FACILITY, OTHER];

static SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for alias in ["vehicle", "vehicles", "veh"] {
        map.insert(alias, VEHICLE);
    }
    for alias in ["facility", "facilities", "fac"] {
        map.insert(alias, FACILITY);
    }
    for alias in ["other", "others", "equipment", "equip", "eq"] {
        map.insert(alias, OTHER);
    }
    map
});

/// Map a raw category to its canonical label.
///
/// Unrecognized input is returned exactly as given.
pub fn normalize(raw: &str) -> String {
    canonical(raw)
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string())
}

/// Optional variant of [`normalize`]: `None` stays `None`.
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    raw.map(normalize)
}

/// The canonical label for `raw`, if it is a known synonym.
pub fn canonical(raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase();
    SYNONYMS.get(key.as_str()).copied()
}

pub fn is_canonical(value: &str) -> bool {
    CANONICAL.contains(&value)
}
