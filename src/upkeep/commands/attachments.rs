use super::export::sanitize_filename;
use crate::error::{Result, UpkeepError};
use crate::store::StorageBackend;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use tracing::info;

const FALLBACK_NAME: &str = "photo";

/// Attachment file name: microsecond timestamp, then the sanitized base name
/// of the upload. Never contains `;` or a path separator.
pub fn photo_file_name(original_name: &str, now: NaiveDateTime) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let mut clean = sanitize_filename(base);
    if clean.trim_matches('.').is_empty() {
        clean = FALLBACK_NAME.to_string();
    }
    format!("{}_{}", now.format("%Y%m%d%H%M%S%6f"), clean)
}

/// Persist uploaded photo bytes and return the path to record in
/// `photo_paths`.
pub fn save_photo<B: StorageBackend>(
    store: &B,
    original_name: &str,
    bytes: &[u8],
    now: NaiveDateTime,
) -> Result<PathBuf> {
    if bytes.is_empty() {
        return Err(UpkeepError::validation("photo is empty"));
    }
    let name = photo_file_name(original_name, now);
    let path = store.store_attachment(&name, bytes)?;
    info!(path = %path.display(), size = bytes.len(), "photo saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 123456)
            .unwrap()
    }

    #[test]
    fn name_is_timestamp_prefixed() {
        assert_eq!(
            photo_file_name("engine.jpg", at()),
            "20240102030405123456_engine.jpg"
        );
    }

    #[test]
    fn name_drops_directories_and_separator() {
        assert_eq!(
            photo_file_name("../../etc/pass;wd", at()),
            "20240102030405123456_pass_wd"
        );
        assert_eq!(
            photo_file_name("C:\\Users\\me\\leak.png", at()),
            "20240102030405123456_leak.png"
        );
        assert_eq!(photo_file_name("..", at()), "20240102030405123456_photo");
    }

    #[test]
    fn saved_photo_is_retrievable() {
        let store = MemBackend::new();
        let path = save_photo(&store, "leak.png", b"\x89PNG", at()).unwrap();
        assert!(path.ends_with("fault_photos/20240102030405123456_leak.png"));
        assert_eq!(store.attachment(&path).unwrap(), b"\x89PNG");

        let again = save_photo(&store, "leak.png", b"other", at()).unwrap();
        assert_ne!(path, again);
    }

    #[test]
    fn empty_upload_is_rejected() {
        let store = MemBackend::new();
        assert!(save_photo(&store, "x.jpg", b"", at()).is_err());
    }
}
