//! Per-table advisory locks.
//!
//! Each table file `<table>.csv` has a sidecar `<table>.csv.lock`. A
//! [`TableLock`] holds an exclusive `flock`-style lock on the sidecar for as
//! long as it lives; dropping it releases the lock on every exit path. Locks
//! only coordinate processes (and threads) that take them, and each table has
//! its own, so a long operation on services never blocks objects.
//!
//! Every acquisition opens a fresh handle, which makes the lock exclusive
//! between threads of one process as well as between processes.
//!
//! If the filesystem does not support locking at all, acquisition degrades to
//! a no-op guard and logs a warning: a single process stays correct, several
//! cooperating processes do not.

use crate::error::{Result, UpkeepError};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub fn lock_path_for(table_path: &Path) -> PathBuf {
    let mut name = table_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    table_path.with_file_name(name)
}

#[derive(Debug)]
pub struct TableLock {
    file: Option<File>,
    path: PathBuf,
}

impl TableLock {
    /// Acquire the lock guarding `table_path`.
    ///
    /// With `timeout = None` this waits indefinitely. Otherwise it polls until
    /// the deadline and fails with [`UpkeepError::LockTimeout`].
    pub fn acquire(table_path: &Path, timeout: Option<Duration>) -> Result<Self> {
        let path = lock_path_for(table_path);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let started = Instant::now();
        let locked = match timeout {
            None => file.lock_exclusive(),
            Some(limit) => loop {
                match file.try_lock_exclusive() {
                    Ok(()) => break Ok(()),
                    Err(e) if is_contended(&e) => {
                        if started.elapsed() >= limit {
                            return Err(UpkeepError::LockTimeout {
                                path,
                                waited_ms: limit.as_millis() as u64,
                            });
                        }
                        thread::sleep(POLL_INTERVAL);
                    }
                    Err(e) => break Err(e),
                }
            },
        };

        match locked {
            Ok(()) => {
                debug!(lock = %path.display(), waited_ms = started.elapsed().as_millis() as u64, "lock acquired");
                Ok(Self {
                    file: Some(file),
                    path,
                })
            }
            Err(e) if is_unsupported(&e) => {
                warn!(lock = %path.display(), error = %e, "file locking unsupported; continuing without a lock");
                Ok(Self { file: None, path })
            }
            Err(e) => Err(UpkeepError::Io(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// False when locking degraded to a no-op.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for TableLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == fs2::lock_contended_error().kind() || e.kind() == io::ErrorKind::WouldBlock
}

fn is_unsupported(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::Unsupported
}
