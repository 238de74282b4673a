use crate::error::Result;
use crate::model::{
    FaultReport, MeterUnit, ObjectRecord, ReminderRecord, ReportRecord, ServiceRecord,
};
use crate::store::{atomic, codec, Record, StorageBackend};
use chrono::NaiveDateTime;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const ARCHIVE_DIR: &str = "upkeep";

/// An archive entry: file name inside the archive and its CSV bytes.
type Entry = (String, Vec<u8>);

/// Write every table (normalized, with header) to
/// `dest_dir/upkeep-<stamp>.tar.gz` and return the archive path.
pub fn run<B: StorageBackend>(store: &B, dest_dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    let entries = vec![
        table_entry::<B, ObjectRecord>(store)?,
        table_entry::<B, ServiceRecord>(store)?,
        table_entry::<B, ReminderRecord>(store)?,
        table_entry::<B, ReportRecord>(store)?,
        table_entry::<B, FaultReport>(store)?,
        table_entry::<B, MeterUnit>(store)?,
    ];

    let mut archive = Vec::new();
    write_archive(&mut archive, &entries)?;

    let filename = format!("upkeep-{}.tar.gz", now.format("%Y-%m-%d_%H%M%S"));
    let target = dest_dir.join(sanitize_filename(&filename));
    atomic::write_bytes(&target, &archive, true)?;

    info!(path = %target.display(), tables = entries.len(), "exported");
    Ok(target)
}

fn table_entry<B: StorageBackend, R: Record>(store: &B) -> Result<Entry> {
    let rows = store.read_table::<R>()?;
    Ok((R::file_name(), codec::to_bytes(&rows)?))
}

fn write_archive<W: Write>(writer: W, entries: &[Entry]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for (name, content) in entries {
        let entry_name = format!("{}/{}", ARCHIVE_DIR, name);

        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        tar.append_data(&mut header, entry_name, content.as_slice())?;
    }

    tar.into_inner()?.finish()?;
    Ok(())
}

/// Replace anything but alphanumerics, space, `-`, `_` and `.` with `_`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}
