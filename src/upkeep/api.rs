//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every
//! data operation, whatever the UI.
//!
//! The facade:
//! - **Dispatches** to the matching command function
//! - **Supplies configuration** (id policy, default meter units) so callers
//!   never pass it per call
//! - **Returns structured types**: records, ids, booleans, reports
//!
//! It does no printing and holds no session state. Filters, selected
//! objects and the like are passed in with each call.
//!
//! ## Generic Over StorageBackend
//!
//! - Production: `UpkeepApi<FsBackend>` (see [`UpkeepApi::open`])
//! - Testing: `UpkeepApi<MemBackend>`

use crate::commands::{
    self, attachments, dashboard, export, faults, meter_units, migrate, objects, reminders,
    reports, services,
};
use crate::config::UpkeepConfig;
use crate::error::Result;
use crate::model::*;
use crate::store::fs_backend::FsBackend;
use crate::store::StorageBackend;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub use commands::dashboard::Dashboard;
pub use commands::migrate::MigrationReport;

pub struct UpkeepApi<B: StorageBackend> {
    store: B,
    config: UpkeepConfig,
}

impl UpkeepApi<FsBackend> {
    /// Open the data directory, loading `config.json` from it if present.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let config = UpkeepConfig::load(data_dir)?;
        let store = FsBackend::from_config(data_dir, &config);
        Ok(Self::new(store, config))
    }
}

impl<B: StorageBackend> UpkeepApi<B> {
    pub fn new(store: B, config: UpkeepConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub fn config(&self) -> &UpkeepConfig {
        &self.config
    }

    pub fn data_dir(&self) -> PathBuf {
        self.store.location()
    }

    // --- objects ---

    pub fn get_objects(&self, filter: &ObjectFilter) -> Result<Vec<ObjectRecord>> {
        objects::list(&self.store, filter)
    }

    pub fn get_object(&self, object_id: &str) -> Result<Option<ObjectRecord>> {
        objects::get(&self.store, object_id)
    }

    pub fn add_object(&self, new: NewObject) -> Result<String> {
        objects::create(&self.store, self.config.id_policy, new)
    }

    pub fn update_object(&self, object_id: &str, patch: ObjectPatch) -> Result<bool> {
        objects::update(&self.store, object_id, patch)
    }

    pub fn delete_object(&self, object_id: &str) -> Result<bool> {
        objects::delete(&self.store, object_id)
    }

    // --- services ---

    pub fn get_services(&self, filter: &ServiceFilter) -> Result<Vec<ServiceRecord>> {
        services::list(&self.store, filter)
    }

    pub fn get_service(&self, service_id: &str) -> Result<Option<ServiceRecord>> {
        services::get(&self.store, service_id)
    }

    pub fn add_service(&self, new: NewService) -> Result<String> {
        services::create(&self.store, self.config.id_policy, new)
    }

    pub fn update_service(&self, service_id: &str, patch: ServicePatch) -> Result<bool> {
        services::update(&self.store, service_id, patch)
    }

    pub fn delete_service(&self, service_id: &str) -> Result<bool> {
        services::delete(&self.store, service_id)
    }

    // --- reminders ---

    pub fn get_reminders(&self, filter: &ReminderFilter) -> Result<Vec<ReminderRecord>> {
        reminders::list(&self.store, filter)
    }

    pub fn get_reminder(&self, reminder_id: &str) -> Result<Option<ReminderRecord>> {
        reminders::get(&self.store, reminder_id)
    }

    pub fn add_reminder(&self, new: NewReminder) -> Result<String> {
        reminders::create(&self.store, self.config.id_policy, new)
    }

    pub fn update_reminder(&self, reminder_id: &str, patch: ReminderPatch) -> Result<bool> {
        reminders::update(&self.store, reminder_id, patch)
    }

    pub fn delete_reminder(&self, reminder_id: &str) -> Result<bool> {
        reminders::delete(&self.store, reminder_id)
    }

    // --- reports ---

    pub fn get_reports(&self, filter: &ReportFilter) -> Result<Vec<ReportRecord>> {
        reports::list(&self.store, filter)
    }

    pub fn get_report(&self, report_id: &str) -> Result<Option<ReportRecord>> {
        reports::get(&self.store, report_id)
    }

    pub fn add_report(&self, new: NewReport) -> Result<String> {
        reports::create(&self.store, self.config.id_policy, new)
    }

    pub fn update_report(&self, report_id: &str, patch: ReportPatch) -> Result<bool> {
        reports::update(&self.store, report_id, patch)
    }

    pub fn delete_report(&self, report_id: &str) -> Result<bool> {
        reports::delete(&self.store, report_id)
    }

    // --- fault reports ---

    pub fn get_fault_reports(&self, filter: &FaultFilter) -> Result<Vec<FaultReport>> {
        faults::list(&self.store, filter)
    }

    pub fn get_fault_report(&self, fault_id: &str) -> Result<Option<FaultReport>> {
        faults::get(&self.store, fault_id)
    }

    pub fn add_fault_report(&self, new: NewFaultReport) -> Result<String> {
        faults::create(&self.store, self.config.id_policy, new)
    }

    pub fn update_fault_report(&self, fault_id: &str, patch: FaultPatch) -> Result<bool> {
        faults::update(&self.store, fault_id, patch)
    }

    pub fn delete_fault_report(&self, fault_id: &str) -> Result<bool> {
        faults::delete(&self.store, fault_id)
    }

    /// Store uploaded photo bytes; the returned path goes into `photo_paths`.
    pub fn save_photo(&self, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        attachments::save_photo(&self.store, original_name, bytes, now_precise())
    }

    // --- meter units ---

    pub fn get_meter_units(&self) -> Result<Vec<String>> {
        meter_units::list(&self.store, &self.config.default_meter_units)
    }

    pub fn add_meter_unit(&self, unit: &str) -> Result<bool> {
        meter_units::add(&self.store, &self.config.default_meter_units, unit)
    }

    pub fn delete_meter_unit(&self, unit: &str) -> Result<bool> {
        meter_units::delete(&self.store, &self.config.default_meter_units, unit)
    }

    // --- maintenance ---

    pub fn dashboard(&self, today: NaiveDate) -> Result<Dashboard> {
        dashboard::run(&self.store, today)
    }

    pub fn migrate_object_types(&self) -> Result<MigrationReport> {
        migrate::run(&self.store, now_stamp())
    }

    pub fn export(&self, dest_dir: &Path) -> Result<PathBuf> {
        export::run(&self.store, dest_dir, now_stamp())
    }
}

fn now_precise() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
