use super::{delete_by_id, find, ids_of, insert, list_where, require_non_empty, update_by_id};
use crate::category;
use crate::error::{Result, UpkeepError};
use crate::ids::{self, IdPolicy, RECORD_WIDTH, SERVICE_PREFIX};
use crate::model::{now_stamp, today, NewService, ServiceFilter, ServicePatch, ServiceRecord};
use crate::store::StorageBackend;

fn check_interval(interval_days: u32) -> Result<()> {
    if interval_days < 1 {
        return Err(UpkeepError::validation(
            "interval_days must be at least 1",
        ));
    }
    Ok(())
}

pub fn list<B: StorageBackend>(store: &B, filter: &ServiceFilter) -> Result<Vec<ServiceRecord>> {
    list_where(store, |row| filter.matches(row))
}

pub fn get<B: StorageBackend>(store: &B, service_id: &str) -> Result<Option<ServiceRecord>> {
    find(store, service_id)
}

/// `next_service_date` defaults to today when not given.
pub fn create<B: StorageBackend>(store: &B, policy: IdPolicy, new: NewService) -> Result<String> {
    require_non_empty("service_name", &new.service_name)?;
    require_non_empty("object_id", &new.object_id)?;
    check_interval(new.interval_days)?;

    let object_type = category::normalize(&new.object_type);
    let next_service_date = new.next_service_date.unwrap_or_else(today);
    let now = now_stamp();

    insert(
        store,
        |rows: &[ServiceRecord]| ids::next_id(ids_of(rows), SERVICE_PREFIX, RECORD_WIDTH, policy),
        |service_id| ServiceRecord {
            service_id,
            object_id: new.object_id,
            object_type,
            service_name: new.service_name,
            description: new.description,
            interval_days: new.interval_days,
            last_service_date: None,
            next_service_date,
            status: new.status,
            notes: new.notes,
            expected_meter_reading: new.expected_meter_reading,
            meter_unit: new.meter_unit,
            created_date: now,
        },
    )
}

pub fn update<B: StorageBackend>(store: &B, service_id: &str, patch: ServicePatch) -> Result<bool> {
    if let Some(days) = patch.interval_days {
        check_interval(days)?;
    }
    if let Some(name) = &patch.service_name {
        require_non_empty("service_name", name)?;
    }
    update_by_id(store, service_id, |row: &mut ServiceRecord| patch.apply(row))
}

pub fn delete<B: StorageBackend>(store: &B, service_id: &str) -> Result<bool> {
    delete_by_id::<B, ServiceRecord>(store, service_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceStatus;
    use crate::store::mem_backend::MemBackend;
    use chrono::NaiveDate;

    fn oil_change() -> NewService {
        NewService::new("VEH-0001", "veh", "Oil change", 30)
    }

    #[test]
    fn create_assigns_prefixed_id_and_defaults() {
        let store = MemBackend::new();
        let id = create(&store, IdPolicy::default(), oil_change()).unwrap();
        assert_eq!(id, "SVC-00001");

        let svc = get(&store, &id).unwrap().unwrap();
        assert_eq!(svc.object_type, "Vehicle");
        assert_eq!(svc.status, ServiceStatus::Scheduled);
        assert_eq!(svc.next_service_date, today());
        assert_eq!(svc.last_service_date, None);
    }

    #[test]
    fn exhausted_id_sequence_fails_without_writing() {
        let store = MemBackend::new();
        let legacy = "service_id,object_id,object_type,service_name,description,interval_days,\
last_service_date,next_service_date,status,notes,expected_meter_reading,meter_unit,created_date
SVC-18446744073709551615,VEH-0001,Vehicle,Oil,,30,,2024-01-01,Scheduled,,,,2024-01-01 00:00:00
";
        store.put_raw("services.csv", legacy);

        let err = create(&store, IdPolicy::default(), oil_change()).unwrap_err();
        assert!(matches!(err, UpkeepError::Store(_)));
        assert_eq!(store.raw("services.csv").unwrap(), legacy);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let store = MemBackend::new();
        let new = NewService::new("VEH-0001", "Vehicle", "Wash", 0);
        assert!(matches!(
            create(&store, IdPolicy::default(), new),
            Err(UpkeepError::Validation(_))
        ));

        let id = create(&store, IdPolicy::default(), oil_change()).unwrap();
        let patch = ServicePatch {
            interval_days: Some(0),
            ..Default::default()
        };
        assert!(update(&store, &id, patch).is_err());
        assert_eq!(get(&store, &id).unwrap().unwrap().interval_days, 30);
    }

    #[test]
    fn completing_keeps_interval() {
        let store = MemBackend::new();
        let id = create(&store, IdPolicy::default(), oil_change()).unwrap();
        assert!(update(&store, &id, ServicePatch::status(ServiceStatus::Completed)).unwrap());

        let rows = list(&store, &ServiceFilter::default()).unwrap();
        assert_eq!(rows[0].status, ServiceStatus::Completed);
        assert_eq!(rows[0].interval_days, 30);
    }

    #[test]
    fn meter_fields_round_trip() {
        let store = MemBackend::new();
        let due = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let id = create(
            &store,
            IdPolicy::default(),
            oil_change().with_meter(15000, "km").due_on(due),
        )
        .unwrap();

        let svc = get(&store, &id).unwrap().unwrap();
        assert_eq!(svc.expected_meter_reading, Some(15000));
        assert_eq!(svc.meter_unit, "km");
        assert_eq!(svc.next_service_date, due);

        let patch = ServicePatch {
            expected_meter_reading: Some(None),
            last_service_date: Some(Some(due)),
            ..Default::default()
        };
        update(&store, &id, patch).unwrap();
        let svc = get(&store, &id).unwrap().unwrap();
        assert_eq!(svc.expected_meter_reading, None);
        assert_eq!(svc.last_service_date, Some(due));
    }

    #[test]
    fn filter_by_object_and_status() {
        let store = MemBackend::new();
        create(&store, IdPolicy::default(), oil_change()).unwrap();
        create(
            &store,
            IdPolicy::default(),
            NewService::new("FAC-0002", "Facility", "HVAC filter", 90),
        )
        .unwrap();

        assert_eq!(list(&store, &ServiceFilter::for_object("FAC-0002")).unwrap().len(), 1);
        let filter = ServiceFilter {
            object_type: Some("vehicles".into()),
            status: Some(ServiceStatus::Scheduled),
            ..Default::default()
        };
        let rows = list(&store, &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].service_name, "Oil change");
    }

    #[test]
    fn delete_missing_is_false() {
        let store = MemBackend::new();
        assert!(!delete(&store, "SVC-00001").unwrap());
    }
}
