use super::{delete_by_id, find, ids_of, insert, list_where, require_non_empty, update_by_id};
use crate::category;
use crate::error::Result;
use crate::ids::{self, IdPolicy, RECORD_WIDTH, REMINDER_PREFIX};
use crate::model::{
    now_stamp, NewReminder, ReminderFilter, ReminderPatch, ReminderRecord, ReminderStatus,
};
use crate::store::StorageBackend;

pub fn list<B: StorageBackend>(store: &B, filter: &ReminderFilter) -> Result<Vec<ReminderRecord>> {
    list_where(store, |row| filter.matches(row))
}

pub fn get<B: StorageBackend>(store: &B, reminder_id: &str) -> Result<Option<ReminderRecord>> {
    find(store, reminder_id)
}

/// New reminders always start out `Pending`.
pub fn create<B: StorageBackend>(store: &B, policy: IdPolicy, new: NewReminder) -> Result<String> {
    require_non_empty("service_id", &new.service_id)?;

    let object_type = category::normalize(&new.object_type);
    let now = now_stamp();

    insert(
        store,
        |rows: &[ReminderRecord]| ids::next_id(ids_of(rows), REMINDER_PREFIX, RECORD_WIDTH, policy),
        |reminder_id| ReminderRecord {
            reminder_id,
            service_id: new.service_id,
            object_id: new.object_id,
            object_type,
            reminder_date: new.reminder_date,
            status: ReminderStatus::Pending,
            notes: new.notes,
            created_date: now,
        },
    )
}

pub fn update<B: StorageBackend>(
    store: &B,
    reminder_id: &str,
    patch: ReminderPatch,
) -> Result<bool> {
    update_by_id(store, reminder_id, |row: &mut ReminderRecord| patch.apply(row))
}

pub fn delete<B: StorageBackend>(store: &B, reminder_id: &str) -> Result<bool> {
    delete_by_id::<B, ReminderRecord>(store, reminder_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use chrono::NaiveDate;

    fn reminder(service_id: &str) -> NewReminder {
        NewReminder::new(
            service_id,
            "VEH-0001",
            "Vehicles",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    #[test]
    fn create_starts_pending() {
        let store = MemBackend::new();
        let id = create(&store, IdPolicy::default(), reminder("SVC-00001")).unwrap();
        assert_eq!(id, "REM-00001");

        let rem = get(&store, &id).unwrap().unwrap();
        assert_eq!(rem.status, ReminderStatus::Pending);
        assert_eq!(rem.object_type, "Vehicle");
    }

    #[test]
    fn filter_by_service_and_status() {
        let store = MemBackend::new();
        let first = create(&store, IdPolicy::default(), reminder("SVC-00001")).unwrap();
        create(&store, IdPolicy::default(), reminder("SVC-00002")).unwrap();

        let patch = ReminderPatch {
            status: Some(ReminderStatus::Completed),
            ..Default::default()
        };
        assert!(update(&store, &first, patch).unwrap());

        let pending = ReminderFilter {
            status: Some(ReminderStatus::Pending),
            ..Default::default()
        };
        let rows = list(&store, &pending).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].service_id, "SVC-00002");

        let by_service = ReminderFilter {
            service_id: Some("SVC-00001".into()),
            ..Default::default()
        };
        assert_eq!(list(&store, &by_service).unwrap()[0].reminder_id, first);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemBackend::new();
        let id = create(&store, IdPolicy::default(), reminder("SVC-00001")).unwrap();
        assert!(delete(&store, &id).unwrap());
        assert!(!delete(&store, &id).unwrap());
        assert!(get(&store, &id).unwrap().is_none());
    }
}
