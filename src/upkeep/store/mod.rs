//! # Storage Layer
//!
//! Every table is a flat CSV file under one data directory, rewritten as a
//! whole snapshot on each mutation. The [`StorageBackend`] trait hides how
//! that happens so command logic can run against the filesystem in
//! production and against memory in tests.
//!
//! ## Read-Modify-Write Cycle
//!
//! Mutations go through [`StorageBackend::modify_table`]:
//!
//! 1. Take the table's exclusive lock ([`lock::TableLock`]).
//! 2. Read the current snapshot, normalizing categories on the way in.
//! 3. Hand the rows to the caller's closure, which edits them in place and
//!    says whether anything changed ([`Change`]).
//! 4. On [`Change::Write`], persist with the atomic writer ([`atomic`]).
//! 5. Release the lock (on every path, including errors).
//!
//! Because the lock covers the whole cycle, operations on one table are
//! serializable. Different tables have independent locks and no ordering
//! relationship: there are no cross-table transactions.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── config.json
//! ├── objects.csv            + objects.csv.lock
//! ├── services.csv           + services.csv.lock
//! ├── reminders.csv          + reminders.csv.lock
//! ├── reports.csv            + reports.csv.lock
//! ├── fault_reports.csv      + fault_reports.csv.lock
//! ├── meter_units.csv        + meter_units.csv.lock
//! └── fault_photos/
//!     └── 20240102030405123456_engine.jpg
//! ```
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: CSV files, sidecar locks, atomic writes.
//! - [`mem_backend::MemBackend`]: CSV bytes in memory, for tests.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

pub mod atomic;
pub mod codec;
pub mod fs_backend;
pub mod lock;
pub mod mem_backend;

/// A row type stored in its own table file.
///
/// Field order of the `Serialize` impl must match [`Record::COLUMNS`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + 'static {
    /// Table name; the file is `<TABLE>.csv`.
    const TABLE: &'static str;
    /// Header row, in on-disk column order.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    fn object_type(&self) -> Option<&str> {
        None
    }

    /// Canonicalize categorical fields. Applied to every row read.
    fn normalize(&mut self) {}

    fn file_name() -> String {
        format!("{}.csv", Self::TABLE)
    }
}

/// Outcome of a modification closure.
#[derive(Debug)]
pub enum Change<T> {
    /// Rows were modified; persist the snapshot.
    Write(T),
    /// Nothing changed; leave the file alone.
    Keep(T),
}

/// Raw table I/O.
///
/// Handles the "how" of persistence (files vs memory, locks, atomic
/// replacement) while the command layer handles the "what".
pub trait StorageBackend {
    /// Snapshot of a table with categories normalized. A table that was
    /// never written reads as empty.
    fn read_table<R: Record>(&self) -> Result<Vec<R>>;

    /// Snapshot exactly as stored, without normalization.
    fn read_table_as_stored<R: Record>(&self) -> Result<Vec<R>>;

    /// Whether the table has ever been written.
    fn table_exists<R: Record>(&self) -> Result<bool>;

    /// Run one locked read-modify-write cycle on a table.
    ///
    /// `f` sees the normalized snapshot. If it returns an error, or
    /// [`Change::Keep`], nothing is written.
    fn modify_table<R, T, F>(&self, f: F) -> Result<T>
    where
        R: Record,
        F: FnOnce(&mut Vec<R>) -> Result<Change<T>>;

    /// One locked cycle that first copies the table file aside as
    /// `<file>.bak-<stamp>`, then hands `f` the rows exactly as stored along
    /// with the normalized rows to edit. The backup, the stored rows and the
    /// rewrite all come from the same snapshot.
    ///
    /// Returns `None` without calling `f` when the table has no file yet.
    fn modify_with_backup<R, T, F>(&self, stamp: &str, f: F) -> Result<Option<(PathBuf, T)>>
    where
        R: Record,
        F: FnOnce(&[R], &mut Vec<R>) -> Result<Change<T>>;

    /// Persist attachment bytes under the given file name and return the
    /// stable path to reference from records.
    fn store_attachment(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;

    /// Where tables live (a real directory, or a virtual one).
    fn location(&self) -> PathBuf;
}
