//! # Record Identifiers
//!
//! Every row carries a short, human-readable id: `{PREFIX}-{sequence}` with a
//! zero-padded sequence (`VEH-0001`, `SVC-00012`). Ids are generated inside
//! the table's read-modify-write cycle, so the snapshot they are computed from
//! is the one that gets written.
//!
//! ## Policies
//!
//! - [`IdPolicy::NextAfterMax`] (default): one past the largest numeric suffix
//!   already in the table, skipping any exact collision. Ids stay unique after
//!   deletions.
//! - [`IdPolicy::RowCount`]: `row_count + 1`, the scheme used by the earliest
//!   data files. After a delete this can hand out an id that still exists;
//!   it is kept only for installations that depend on the old numbering.

use crate::error::{Result, UpkeepError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const OBJECT_WIDTH: usize = 4;
pub const RECORD_WIDTH: usize = 5;

pub const SERVICE_PREFIX: &str = "SVC";
pub const REMINDER_PREFIX: &str = "REM";
pub const REPORT_PREFIX: &str = "REP";
pub const FAULT_PREFIX: &str = "FLT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdPolicy {
    #[default]
    NextAfterMax,
    RowCount,
}

impl std::str::FromStr for IdPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "next-after-max" => Ok(Self::NextAfterMax),
            "row-count" => Ok(Self::RowCount),
            other => Err(format!(
                "Unknown id policy '{}' (expected next-after-max or row-count)",
                other
            )),
        }
    }
}

impl std::fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NextAfterMax => write!(f, "next-after-max"),
            Self::RowCount => write!(f, "row-count"),
        }
    }
}

/// Prefix for object ids: the first three letters of the (normalized) type.
pub fn object_prefix(object_type: &str) -> String {
    let prefix: String = object_type
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    if prefix.is_empty() {
        "OBJ".to_string()
    } else {
        prefix
    }
}

/// Numeric part of an id: whatever follows the last `-`.
pub fn sequence_of(id: &str) -> Option<u64> {
    id.rsplit_once('-')
        .and_then(|(_, seq)| seq.trim().parse::<u64>().ok())
}

pub fn format_id(prefix: &str, sequence: u64, width: usize) -> String {
    format!("{}-{:0width$}", prefix, sequence, width = width)
}

/// Generate the next id for a table whose current ids are `existing`.
///
/// Fails only when the numeric sequence cannot be advanced (a stored suffix
/// at `u64::MAX`).
pub fn next_id<'a, I>(existing: I, prefix: &str, width: usize, policy: IdPolicy) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let existing: Vec<&str> = existing.into_iter().collect();
    match policy {
        IdPolicy::RowCount => Ok(format_id(prefix, existing.len() as u64 + 1, width)),
        IdPolicy::NextAfterMax => {
            let taken: HashSet<&str> = existing.iter().copied().collect();
            let max = existing
                .iter()
                .filter_map(|id| sequence_of(id))
                .max()
                .unwrap_or(0);
            let mut seq = advance(prefix, max)?;
            loop {
                let candidate = format_id(prefix, seq, width);
                if !taken.contains(candidate.as_str()) {
                    return Ok(candidate);
                }
                seq = advance(prefix, seq)?;
            }
        }
    }
}

fn advance(prefix: &str, seq: u64) -> Result<u64> {
    seq.checked_add(1).ok_or_else(|| {
        UpkeepError::Store(format!("id sequence for prefix '{}' is exhausted", prefix))
    })
}
