use crate::error::{Result, UpkeepError};
use crate::model::MeterUnit;
use crate::store::{Change, StorageBackend};
use tracing::info;

/// Registered units in insertion order. Until the registry is first written
/// this is `defaults`.
pub fn list<B: StorageBackend>(store: &B, defaults: &[String]) -> Result<Vec<String>> {
    if !store.table_exists::<MeterUnit>()? {
        return Ok(defaults.to_vec());
    }
    Ok(store
        .read_table::<MeterUnit>()?
        .into_iter()
        .map(|m| m.unit)
        .collect())
}

/// Units compare case-insensitively: `KM` and `km` are one unit.
fn same_unit(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// `Ok(false)` when the unit is already registered (case-insensitive).
pub fn add<B: StorageBackend>(store: &B, defaults: &[String], unit: &str) -> Result<bool> {
    let unit = unit.trim();
    if unit.is_empty() {
        return Err(UpkeepError::validation("unit is required"));
    }

    let seeded = !store.table_exists::<MeterUnit>()?;
    let added = store.modify_table::<MeterUnit, _, _>(|rows| {
        if seeded && rows.is_empty() {
            rows.extend(defaults.iter().map(|u| MeterUnit { unit: u.clone() }));
        }
        if rows.iter().any(|m| same_unit(&m.unit, unit)) {
            // Seeding alone still needs persisting.
            return Ok(if seeded {
                Change::Write(false)
            } else {
                Change::Keep(false)
            });
        }
        rows.push(MeterUnit {
            unit: unit.to_string(),
        });
        Ok(Change::Write(true))
    })?;

    if added {
        info!(unit, "meter unit added");
    }
    Ok(added)
}

pub fn delete<B: StorageBackend>(store: &B, defaults: &[String], unit: &str) -> Result<bool> {
    let unit = unit.trim();
    let seeded = !store.table_exists::<MeterUnit>()?;
    let deleted = store.modify_table::<MeterUnit, _, _>(|rows| {
        if seeded && rows.is_empty() {
            rows.extend(defaults.iter().map(|u| MeterUnit { unit: u.clone() }));
        }
        let before = rows.len();
        rows.retain(|m| !same_unit(&m.unit, unit));
        if rows.len() == before {
            Ok(Change::Keep(false))
        } else {
            Ok(Change::Write(true))
        }
    })?;

    if deleted {
        info!(unit, "meter unit deleted");
    }
    Ok(deleted)
}
