use super::{
    delete_by_id, find, ids_of, insert, list_where, require_non_empty, update_by_id,
};
use crate::category;
use crate::error::{Result, UpkeepError};
use crate::ids::{self, IdPolicy, FAULT_PREFIX, RECORD_WIDTH};
use crate::model::fields::PATH_SEPARATOR;
use crate::model::{now_stamp, today, FaultFilter, FaultPatch, FaultReport, NewFaultReport};
use crate::store::StorageBackend;

/// Photo paths are stored `;`-joined in a single column, so a path that
/// contains the separator could not be read back intact.
fn check_photo_paths(paths: &[String]) -> Result<()> {
    for path in paths {
        if path.contains(PATH_SEPARATOR) {
            return Err(UpkeepError::validation(format!(
                "photo path '{}' contains '{}'",
                path, PATH_SEPARATOR
            )));
        }
        if path.trim().is_empty() {
            return Err(UpkeepError::validation("photo path is empty"));
        }
        if path.trim() != path {
            return Err(UpkeepError::validation(format!(
                "photo path '{}' has leading or trailing whitespace",
                path
            )));
        }
    }
    Ok(())
}

pub fn list<B: StorageBackend>(store: &B, filter: &FaultFilter) -> Result<Vec<FaultReport>> {
    list_where(store, |row| filter.matches(row))
}

pub fn get<B: StorageBackend>(store: &B, fault_id: &str) -> Result<Option<FaultReport>> {
    find(store, fault_id)
}

pub fn create<B: StorageBackend>(store: &B, policy: IdPolicy, new: NewFaultReport) -> Result<String> {
    require_non_empty("object_id", &new.object_id)?;
    check_photo_paths(&new.photo_paths)?;

    let object_type = category::normalize(&new.object_type);
    let observation_date = new.observation_date.unwrap_or_else(today);
    let now = now_stamp();

    insert(
        store,
        |rows: &[FaultReport]| ids::next_id(ids_of(rows), FAULT_PREFIX, RECORD_WIDTH, policy),
        |fault_id| FaultReport {
            fault_id,
            object_id: new.object_id,
            object_type,
            observation_date,
            actual_meter_reading: new.actual_meter_reading,
            meter_unit: new.meter_unit,
            description: new.description,
            photo_paths: new.photo_paths,
            created_date: now,
        },
    )
}

pub fn update<B: StorageBackend>(store: &B, fault_id: &str, patch: FaultPatch) -> Result<bool> {
    if let Some(paths) = &patch.photo_paths {
        check_photo_paths(paths)?;
    }
    update_by_id(store, fault_id, |row: &mut FaultReport| patch.apply(row))
}

/// Removes the row only; photo files stay on disk.
pub fn delete<B: StorageBackend>(store: &B, fault_id: &str) -> Result<bool> {
    delete_by_id::<B, FaultReport>(store, fault_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn photo_paths_keep_order() {
        let store = MemBackend::new();
        let paths = vec![
            "data/fault_photos/b.jpg".to_string(),
            "data/fault_photos/a.jpg".to_string(),
        ];
        let id = create(
            &store,
            IdPolicy::default(),
            NewFaultReport::new("VEH-0001", "veh")
                .with_description("Oil leak")
                .with_photos(paths.clone()),
        )
        .unwrap();
        assert_eq!(id, "FLT-00001");

        let fault = get(&store, &id).unwrap().unwrap();
        assert_eq!(fault.photo_paths, paths);
        assert_eq!(fault.object_type, "Vehicle");
        assert!(store
            .raw("fault_reports.csv")
            .unwrap()
            .contains("data/fault_photos/b.jpg;data/fault_photos/a.jpg"));
    }

    #[test]
    fn separator_in_path_is_rejected() {
        let store = MemBackend::new();
        let new = NewFaultReport::new("VEH-0001", "Vehicle").with_photos(vec!["a;b.jpg".into()]);
        assert!(matches!(
            create(&store, IdPolicy::default(), new),
            Err(UpkeepError::Validation(_))
        ));
        assert!(store.raw("fault_reports.csv").is_none());
    }

    #[test]
    fn padded_paths_are_rejected() {
        let store = MemBackend::new();
        let new = NewFaultReport::new("VEH-0001", "Vehicle")
            .with_photos(vec![" lead.jpg".into(), "trail.jpg ".into()]);
        assert!(matches!(
            create(&store, IdPolicy::default(), new),
            Err(UpkeepError::Validation(_))
        ));

        let id = create(
            &store,
            IdPolicy::default(),
            NewFaultReport::new("VEH-0001", "Vehicle").with_photos(vec!["my photo.jpg".into()]),
        )
        .unwrap();
        assert_eq!(
            get(&store, &id).unwrap().unwrap().photo_paths,
            vec!["my photo.jpg"]
        );

        let patch = FaultPatch {
            photo_paths: Some(vec!["x.jpg ".into()]),
            ..Default::default()
        };
        assert!(update(&store, &id, patch).is_err());
    }

    #[test]
    fn blank_object_id_is_rejected() {
        let store = MemBackend::new();
        assert!(matches!(
            create(&store, IdPolicy::default(), NewFaultReport::new("  ", "Vehicle")),
            Err(UpkeepError::Validation(_))
        ));
    }

    #[test]
    fn no_photos_reads_back_empty() {
        let store = MemBackend::new();
        let id = create(&store, IdPolicy::default(), NewFaultReport::new("FAC-0001", "Facility"))
            .unwrap();
        assert!(get(&store, &id).unwrap().unwrap().photo_paths.is_empty());
    }

    #[test]
    fn update_replaces_photo_list() {
        let store = MemBackend::new();
        let id = create(&store, IdPolicy::default(), NewFaultReport::new("FAC-0001", "Facility"))
            .unwrap();
        let patch = FaultPatch {
            photo_paths: Some(vec!["x.png".into()]),
            ..Default::default()
        };
        assert!(update(&store, &id, patch).unwrap());
        assert_eq!(get(&store, &id).unwrap().unwrap().photo_paths, vec!["x.png"]);

        let filter = FaultFilter {
            object_id: Some("FAC-0001".into()),
            ..Default::default()
        };
        assert_eq!(list(&store, &filter).unwrap().len(), 1);
        assert!(delete(&store, &id).unwrap());
        assert!(!delete(&store, &id).unwrap());
    }
}
