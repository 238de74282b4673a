use super::lock::TableLock;
use super::{atomic, codec, Change, Record, StorageBackend};
use crate::config::UpkeepConfig;
use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

pub const PHOTO_DIR: &str = "fault_photos";

/// Filesystem backend: one CSV per table under `root`.
///
/// Holds no table state between calls; every operation reads the file fresh
/// under the table's lock, so several `FsBackend`s (or processes) can share
/// one directory.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
    lock_timeout: Option<Duration>,
    sync_directory: bool,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_timeout: Some(Duration::from_millis(crate::config::DEFAULT_LOCK_TIMEOUT_MS)),
            sync_directory: true,
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &UpkeepConfig) -> Self {
        Self::new(root)
            .with_lock_timeout(config.lock_timeout())
            .with_sync_directory(config.sync_directory)
    }

    /// `None` waits for a lock indefinitely.
    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_sync_directory(mut self, sync: bool) -> Self {
        self.sync_directory = sync;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path<R: Record>(&self) -> PathBuf {
        self.root.join(R::file_name())
    }

    pub fn photo_dir(&self) -> PathBuf {
        self.root.join(PHOTO_DIR)
    }

    fn lock<R: Record>(&self) -> Result<TableLock> {
        TableLock::acquire(&self.table_path::<R>(), self.lock_timeout)
    }
}

impl StorageBackend for FsBackend {
    fn read_table<R: Record>(&self) -> Result<Vec<R>> {
        let _lock = self.lock::<R>()?;
        let rows = codec::read_file::<R>(&self.table_path::<R>(), true)?;
        debug!(table = R::TABLE, rows = rows.len(), "table read");
        Ok(rows)
    }

    fn read_table_as_stored<R: Record>(&self) -> Result<Vec<R>> {
        let _lock = self.lock::<R>()?;
        codec::read_file::<R>(&self.table_path::<R>(), false)
    }

    fn table_exists<R: Record>(&self) -> Result<bool> {
        Ok(self.table_path::<R>().try_exists()?)
    }

    fn modify_table<R, T, F>(&self, f: F) -> Result<T>
    where
        R: Record,
        F: FnOnce(&mut Vec<R>) -> Result<Change<T>>,
    {
        let path = self.table_path::<R>();
        let _lock = self.lock::<R>()?;
        let mut rows = codec::read_file::<R>(&path, true)?;
        match f(&mut rows)? {
            Change::Write(out) => {
                atomic::write_snapshot(&path, &rows, self.sync_directory)?;
                Ok(out)
            }
            Change::Keep(out) => Ok(out),
        }
    }

    fn modify_with_backup<R, T, F>(&self, stamp: &str, f: F) -> Result<Option<(PathBuf, T)>>
    where
        R: Record,
        F: FnOnce(&[R], &mut Vec<R>) -> Result<Change<T>>,
    {
        let path = self.table_path::<R>();
        let _lock = self.lock::<R>()?;
        if !path.try_exists()? {
            return Ok(None);
        }
        let backup = self.root.join(format!("{}.bak-{}", R::file_name(), stamp));
        fs::copy(&path, &backup)?;

        let stored = codec::read_file::<R>(&path, false)?;
        let mut rows = stored.clone();
        for row in &mut rows {
            row.normalize();
        }
        let out = match f(&stored, &mut rows)? {
            Change::Write(out) => {
                atomic::write_snapshot(&path, &rows, self.sync_directory)?;
                out
            }
            Change::Keep(out) => out,
        };
        Ok(Some((backup, out)))
    }

    fn store_attachment(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.photo_dir();
        fs::create_dir_all(&dir)?;

        // Claim the name first so two writers never pick the same path.
        let mut target = dir.join(file_name);
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&target) {
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    let suffix = Uuid::new_v4().simple().to_string();
                    target = dir.join(format!("{}_{}", &suffix[..8], file_name));
                }
                Err(e) => return Err(e.into()),
            }
        }

        if let Err(e) = atomic::write_bytes(&target, bytes, self.sync_directory) {
            let _ = fs::remove_file(&target);
            return Err(e);
        }
        Ok(target)
    }

    fn location(&self) -> PathBuf {
        self.root.clone()
    }
}
