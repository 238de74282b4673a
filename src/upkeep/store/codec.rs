//! CSV encoding of table snapshots.
//!
//! The header row is always written explicitly from [`Record::COLUMNS`], so an
//! empty table still carries its header. Reading maps columns by name: extra
//! columns are ignored and missing ones fall back to the field's default,
//! which lets files written by older versions load cleanly.

use super::Record;
use crate::error::Result;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// Decode rows from a reader, normalizing each one.
pub fn read_from<R: Record, Rd: Read>(reader: Rd) -> Result<Vec<R>> {
    let mut rows = decode::<R, Rd>(reader)?;
    for row in &mut rows {
        row.normalize();
    }
    Ok(rows)
}

/// Decode rows exactly as stored, without normalization.
pub fn decode<R: Record, Rd: Read>(reader: Rd) -> Result<Vec<R>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for row in rdr.deserialize::<R>() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Encode header + rows.
pub fn write_to<R: Record, W: Write>(writer: W, rows: &[R]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(R::COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_bytes<R: Record>(rows: &[R]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_to(&mut buf, rows)?;
    Ok(buf)
}

/// Read a table file. A missing or zero-length file is an empty table.
pub fn read_file<R: Record>(path: &Path, normalize: bool) -> Result<Vec<R>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    if normalize {
        read_from(file)
    } else {
        decode(file)
    }
}
