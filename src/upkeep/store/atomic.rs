//! Atomic snapshot writes.
//!
//! Content goes to a temp file in the target's own directory (same filesystem,
//! so the rename is atomic), is flushed and `fsync`ed, then renamed over the
//! target. Readers see either the old file or the new one, never a mix. A
//! crash before the rename leaves the old file untouched; the stray temp file
//! is harmless and ignored by every reader.

use super::{codec, Record};
use crate::error::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Persist a full table snapshot to `path`.
pub fn write_snapshot<R: Record>(path: &Path, rows: &[R], sync_dir: bool) -> Result<()> {
    write_with(path, sync_dir, |w| codec::write_to(w, rows))?;
    debug!(table = R::TABLE, rows = rows.len(), "snapshot written");
    Ok(())
}

/// Persist raw bytes to `path` with the same guarantees.
pub fn write_bytes(path: &Path, bytes: &[u8], sync_dir: bool) -> Result<()> {
    write_with(path, sync_dir, |w| {
        w.write_all(bytes)?;
        Ok(())
    })
}

fn write_with<F>(path: &Path, sync_dir: bool, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<()>,
{
    let dir = parent_dir(path);
    fs::create_dir_all(&dir)?;

    let tmp_path = temp_path_for(&dir, path);
    let outcome = fill_temp(&tmp_path, fill).and_then(|()| {
        fs::rename(&tmp_path, path)?;
        Ok(())
    });

    if let Err(e) = outcome {
        // Nothing reached the target; drop the partial temp file.
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    if sync_dir {
        if let Err(e) = sync_directory(&dir) {
            warn!(dir = %dir.display(), error = %e, "directory fsync failed after rename");
        }
    }
    Ok(())
}

fn fill_temp<F>(tmp_path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<()>,
{
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp_path)?;
    {
        let mut writer = BufWriter::new(&file);
        fill(&mut writer)?;
        writer.flush()?;
    }
    file.sync_all()?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn temp_path_for(dir: &Path, target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("snapshot");
    dir.join(format!(".{}-{}.tmp", name, Uuid::new_v4()))
}

#[cfg(unix)]
fn sync_directory(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

// Directory handles cannot be fsynced on this platform.
#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// True for the temp files this module leaves behind on a crash.
pub fn is_temp_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}
