//! # Commands
//!
//! Repository logic over a [`StorageBackend`]. Each table module exposes the
//! same four operations:
//!
//! - `list(filter)`: rows matching every supplied filter field, in file order.
//! - `create(new)`: validate, generate an id, stamp, append. Returns the id.
//! - `update(id, patch)`: `Ok(false)` when the id is absent.
//! - `delete(id)`: `Ok(false)` when the id is absent. Never cascades.
//!
//! Validation runs before the table lock is taken, so a rejected request never
//! touches a file. The shared plumbing below does the locked read-modify-write
//! so table modules only describe what changes.

use crate::error::{Result, UpkeepError};
use crate::store::{Change, Record, StorageBackend};
use tracing::info;

pub mod attachments;
pub mod dashboard;
pub mod export;
pub mod faults;
pub mod meter_units;
pub mod migrate;
pub mod objects;
pub mod reminders;
pub mod reports;
pub mod services;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing line produced by a command, rendered by the CLI.
#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(UpkeepError::validation(format!("{} is required", field)));
    }
    Ok(())
}

pub(crate) fn require_some<T>(field: &str, value: &Option<T>) -> Result<()> {
    if value.is_none() {
        return Err(UpkeepError::validation(format!("{} is required", field)));
    }
    Ok(())
}

pub(crate) fn list_where<B, R, P>(store: &B, keep: P) -> Result<Vec<R>>
where
    B: StorageBackend,
    R: Record,
    P: Fn(&R) -> bool,
{
    Ok(store
        .read_table::<R>()?
        .into_iter()
        .filter(|row| keep(row))
        .collect())
}

pub(crate) fn find<B: StorageBackend, R: Record>(store: &B, id: &str) -> Result<Option<R>> {
    Ok(store.read_table::<R>()?.into_iter().find(|row| row.id() == id))
}

/// Append one row under the table lock. `build` receives the generated id;
/// `next_id` sees the snapshot read under that same lock.
pub(crate) fn insert<B, R, N, F>(store: &B, next_id: N, build: F) -> Result<String>
where
    B: StorageBackend,
    R: Record,
    N: FnOnce(&[R]) -> Result<String>,
    F: FnOnce(String) -> R,
{
    let id = store.modify_table::<R, _, _>(|rows| {
        let id = next_id(rows.as_slice())?;
        rows.push(build(id.clone()));
        Ok(Change::Write(id))
    })?;
    info!(table = R::TABLE, id = %id, "created");
    Ok(id)
}

pub(crate) fn update_by_id<B, R, F>(store: &B, id: &str, edit: F) -> Result<bool>
where
    B: StorageBackend,
    R: Record,
    F: FnOnce(&mut R),
{
    let updated = store.modify_table::<R, _, _>(|rows| {
        match rows.iter_mut().find(|row| row.id() == id) {
            Some(row) => {
                edit(row);
                Ok(Change::Write(true))
            }
            None => Ok(Change::Keep(false)),
        }
    })?;
    if updated {
        info!(table = R::TABLE, id, "updated");
    }
    Ok(updated)
}

pub(crate) fn delete_by_id<B: StorageBackend, R: Record>(store: &B, id: &str) -> Result<bool> {
    let deleted = store.modify_table::<R, _, _>(|rows| {
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            Ok(Change::Keep(false))
        } else {
            Ok(Change::Write(true))
        }
    })?;
    if deleted {
        info!(table = R::TABLE, id, "deleted");
    }
    Ok(deleted)
}

/// Ids of a snapshot, for the id generator.
pub(crate) fn ids_of<R: Record>(rows: &[R]) -> impl Iterator<Item = &str> {
    rows.iter().map(|row| row.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_rejected() {
        assert!(require_non_empty("name", "  ").is_err());
        assert!(require_non_empty("name", "Truck").is_ok());
        assert!(require_some::<u32>("date", &None).is_err());
    }
}
