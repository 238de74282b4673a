use super::{codec, Change, Record, StorageBackend};
use crate::error::{Result, UpkeepError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

const VIRTUAL_ROOT: &str = "/mem";

/// In-memory storage backend for testing.
///
/// Tables are kept as encoded CSV bytes so reads and writes go through the
/// same codec as the filesystem backend. A single mutex stands in for the
/// per-table file locks.
#[derive(Default)]
pub struct MemBackend {
    tables: Mutex<HashMap<String, Vec<u8>>>,
    attachments: Mutex<HashMap<PathBuf, Vec<u8>>>,
    simulate_write_error: AtomicBool,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Install raw table content, bypassing normalization (legacy data).
    pub fn put_raw(&self, file_name: &str, content: &str) {
        self.tables()
            .insert(file_name.to_string(), content.as_bytes().to_vec());
    }

    pub fn raw(&self, file_name: &str) -> Option<String> {
        self.tables()
            .get(file_name)
            .map(|b| String::from_utf8_lossy(b).to_string())
    }

    pub fn attachment(&self, path: &Path) -> Option<Vec<u8>> {
        self.attachments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }

    fn tables(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn decode<R: Record>(bytes: Option<&Vec<u8>>, normalize: bool) -> Result<Vec<R>> {
        match bytes {
            Some(b) if !b.is_empty() => {
                if normalize {
                    codec::read_from(b.as_slice())
                } else {
                    codec::decode(b.as_slice())
                }
            }
            _ => Ok(Vec::new()),
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(UpkeepError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn read_table<R: Record>(&self) -> Result<Vec<R>> {
        let tables = self.tables();
        Self::decode(tables.get(&R::file_name()), true)
    }

    fn read_table_as_stored<R: Record>(&self) -> Result<Vec<R>> {
        let tables = self.tables();
        Self::decode(tables.get(&R::file_name()), false)
    }

    fn table_exists<R: Record>(&self) -> Result<bool> {
        Ok(self.tables().contains_key(&R::file_name()))
    }

    fn modify_table<R, T, F>(&self, f: F) -> Result<T>
    where
        R: Record,
        F: FnOnce(&mut Vec<R>) -> Result<Change<T>>,
    {
        let mut tables = self.tables();
        let mut rows = Self::decode::<R>(tables.get(&R::file_name()), true)?;
        match f(&mut rows)? {
            Change::Write(out) => {
                self.check_writable()?;
                tables.insert(R::file_name(), codec::to_bytes(&rows)?);
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
        let mut tables = self.tables();
        let Some(bytes) = tables.get(&R::file_name()).cloned() else {
            return Ok(None);
        };
        let name = format!("{}.bak-{}", R::file_name(), stamp);
        let stored = Self::decode::<R>(Some(&bytes), false)?;
        tables.insert(name.clone(), bytes);

        let mut rows = stored.clone();
        for row in &mut rows {
            row.normalize();
        }
        let out = match f(&stored, &mut rows)? {
            Change::Write(out) => {
                self.check_writable()?;
                tables.insert(R::file_name(), codec::to_bytes(&rows)?);
                out
            }
            Change::Keep(out) => out,
        };
        Ok(Some((self.location().join(name), out)))
    }

    fn store_attachment(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.check_writable()?;
        let mut attachments = self.attachments.lock().unwrap_or_else(|e| e.into_inner());
        let mut path = self.location().join(super::fs_backend::PHOTO_DIR).join(file_name);
        let mut n = 1;
        while attachments.contains_key(&path) {
            path = self
                .location()
                .join(super::fs_backend::PHOTO_DIR)
                .join(format!("{}_{}", n, file_name));
            n += 1;
        }
        attachments.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    fn location(&self) -> PathBuf {
        PathBuf::from(VIRTUAL_ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MeterUnit;

    #[test]
    fn simulated_write_error_keeps_previous_rows() {
        let backend = MemBackend::new();
        backend
            .modify_table::<MeterUnit, _, _>(|rows| {
                rows.push(MeterUnit { unit: "km".into() });
                Ok(Change::Write(()))
            })
            .unwrap();

        backend.set_simulate_write_error(true);
        let result = backend.modify_table::<MeterUnit, _, _>(|rows| {
            rows.clear();
            Ok(Change::Write(()))
        });
        assert!(matches!(result, Err(UpkeepError::Store(_))));

        backend.set_simulate_write_error(false);
        let rows: Vec<MeterUnit> = backend.read_table().unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn raw_content_round_trips_through_codec() {
        let backend = MemBackend::new();
        backend.put_raw("meter_units.csv", "unit\nkm\nhours\n");
        let rows: Vec<MeterUnit> = backend.read_table().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(backend.table_exists::<MeterUnit>().unwrap());
    }
}
