//! Cross-table summary for the dashboard view.
//!
//! Each table is read under its own lock, one after the other, so the
//! counts are not a single consistent snapshot across tables.

use crate::category;
use crate::error::Result;
use crate::model::{
    FaultReport, ObjectRecord, ReminderRecord, ReminderStatus, ReportRecord, ServiceRecord,
    ServiceStatus,
};
use crate::store::StorageBackend;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Services due within this many days (inclusive) count as due soon.
pub const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingService {
    pub service_id: String,
    pub object_id: String,
    pub service_name: String,
    pub next_service_date: NaiveDate,
    /// Negative when overdue.
    pub days_until: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub total_objects: usize,
    pub total_services: usize,
    pub total_reports: usize,
    pub total_faults: usize,
    pub pending_reminders: usize,
    /// Object counts keyed by type; the canonical categories are always present.
    pub objects_by_type: BTreeMap<String, usize>,
    pub overdue_services: Vec<UpcomingService>,
    pub due_soon_services: Vec<UpcomingService>,
    pub overdue_reminders: Vec<ReminderRecord>,
}

pub fn run<B: StorageBackend>(store: &B, today: NaiveDate) -> Result<Dashboard> {
    let objects = store.read_table::<ObjectRecord>()?;
    let services = store.read_table::<ServiceRecord>()?;
    let reminders = store.read_table::<ReminderRecord>()?;
    let reports = store.read_table::<ReportRecord>()?;
    let faults = store.read_table::<FaultReport>()?;

    let mut objects_by_type: BTreeMap<String, usize> = category::CANONICAL
        .iter()
        .map(|c| (c.to_string(), 0))
        .collect();
    for object in &objects {
        *objects_by_type.entry(object.object_type.clone()).or_default() += 1;
    }

    let mut open: Vec<UpcomingService> = services
        .iter()
        .filter(|s| s.status != ServiceStatus::Completed)
        .map(|s| UpcomingService {
            service_id: s.service_id.clone(),
            object_id: s.object_id.clone(),
            service_name: s.service_name.clone(),
            next_service_date: s.next_service_date,
            days_until: (s.next_service_date - today).num_days(),
        })
        .collect();
    open.sort_by_key(|s| s.days_until);

    let (overdue_services, rest): (Vec<_>, Vec<_>) =
        open.into_iter().partition(|s| s.days_until < 0);
    let due_soon_services = rest
        .into_iter()
        .filter(|s| s.days_until <= DUE_SOON_DAYS)
        .collect();

    let pending: Vec<&ReminderRecord> = reminders
        .iter()
        .filter(|r| r.status == ReminderStatus::Pending)
        .collect();
    let overdue_reminders = pending
        .iter()
        .filter(|r| r.reminder_date < today)
        .map(|r| (*r).clone())
        .collect();

    Ok(Dashboard {
        total_objects: objects.len(),
        total_services: services.len(),
        total_reports: reports.len(),
        total_faults: faults.len(),
        pending_reminders: pending.len(),
        objects_by_type,
        overdue_services,
        due_soon_services,
        overdue_reminders,
    })
}
