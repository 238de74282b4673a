//! Serde adapters for the on-disk text formats.
//!
//! Timestamps are `YYYY-mm-dd HH:MM:SS`, dates `YYYY-mm-dd`. Parsing is lenient
//! about what older files contain: integers written as floats (`30.0`), dates
//! carrying a time part, ISO `T` separators.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Separator for multi-valued path columns.
pub const PATH_SEPARATOR: char = ';';

pub fn parse_stamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in [STAMP_FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| parse_stamp(raw).map(|ts| ts.date()))
}

pub fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    // 2^63 is the first float past i64::MAX; anything outside would saturate.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) => {
            Some(f as i64)
        }
        _ => None,
    }
}

pub mod stamp {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(STAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_stamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}

pub mod date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{}'", raw)))
    }
}

pub mod opt_date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.format(DATE_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() || is_null_marker(&raw) => Ok(None),
            Some(raw) => parse_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{}'", raw))),
        }
    }
}

pub mod opt_int {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() || is_null_marker(&raw) => Ok(None),
            Some(raw) => parse_int(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid integer '{}'", raw))),
        }
    }
}

pub mod lenient_u32 {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(d)?;
        parse_int(&raw)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| D::Error::custom(format!("invalid day count '{}'", raw)))
    }
}

/// `Vec<String>` stored as one `;`-joined column.
pub mod path_list {
    use super::*;

    pub fn serialize<S: Serializer>(value: &[String], s: S) -> Result<S::Ok, S::Error> {
        let sep = PATH_SEPARATOR.to_string();
        s.serialize_str(&value.join(&sep))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        if is_null_marker(&raw) {
            return Ok(Vec::new());
        }
        Ok(raw
            .split(PATH_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// An empty cell, or one holding a null marker.
pub(crate) fn is_blank_cell(raw: &str) -> bool {
    raw.trim().is_empty() || is_null_marker(raw)
}

/// Empty-cell markers written by older spreadsheet exports.
fn is_null_marker(raw: &str) -> bool {
    matches!(raw.trim(), "nan" | "NaN" | "None" | "null")
}
