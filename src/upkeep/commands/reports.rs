use super::{delete_by_id, find, ids_of, insert, list_where, require_non_empty, update_by_id};
use crate::category;
use crate::error::Result;
use crate::ids::{self, IdPolicy, RECORD_WIDTH, REPORT_PREFIX};
use crate::model::{now_stamp, today, NewReport, ReportFilter, ReportPatch, ReportRecord};
use crate::store::StorageBackend;

pub fn list<B: StorageBackend>(store: &B, filter: &ReportFilter) -> Result<Vec<ReportRecord>> {
    list_where(store, |row| filter.matches(row))
}

pub fn get<B: StorageBackend>(store: &B, report_id: &str) -> Result<Option<ReportRecord>> {
    find(store, report_id)
}

/// `completion_date` defaults to today when not given.
pub fn create<B: StorageBackend>(store: &B, policy: IdPolicy, new: NewReport) -> Result<String> {
    require_non_empty("title", &new.title)?;

    let object_type = category::normalize(&new.object_type);
    let completion_date = new.completion_date.unwrap_or_else(today);
    let now = now_stamp();

    insert(
        store,
        |rows: &[ReportRecord]| ids::next_id(ids_of(rows), REPORT_PREFIX, RECORD_WIDTH, policy),
        |report_id| ReportRecord {
            report_id,
            object_id: new.object_id,
            object_type,
            report_type: new.report_type,
            title: new.title,
            description: new.description,
            completion_date,
            notes: new.notes,
            actual_meter_reading: new.actual_meter_reading,
            meter_unit: new.meter_unit,
            created_date: now,
        },
    )
}

pub fn update<B: StorageBackend>(store: &B, report_id: &str, patch: ReportPatch) -> Result<bool> {
    if let Some(title) = &patch.title {
        require_non_empty("title", title)?;
    }
    update_by_id(store, report_id, |row: &mut ReportRecord| patch.apply(row))
}

pub fn delete<B: StorageBackend>(store: &B, report_id: &str) -> Result<bool> {
    delete_by_id::<B, ReportRecord>(store, report_id)
}
