//! One-shot rewrite of legacy category spellings.
//!
//! Reads already normalize `object_type`, but files keep the old spelling
//! until the next write. This backs each table up and writes the normalized
//! snapshot back so the files themselves are canonical.

use crate::error::Result;
use crate::model::{FaultReport, ObjectRecord, ReminderRecord, ReportRecord, ServiceRecord};
use crate::store::{Change, Record, StorageBackend};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

pub const BACKUP_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Clone, Serialize)]
pub struct TableMigration {
    pub table: &'static str,
    pub backup: PathBuf,
    pub rows: usize,
    pub before: BTreeSet<String>,
    pub after: BTreeSet<String>,
}

impl TableMigration {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub tables: Vec<TableMigration>,
    /// Tables with no file yet.
    pub skipped: Vec<&'static str>,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.tables.iter().any(TableMigration::changed)
    }
}

pub fn run<B: StorageBackend>(store: &B, now: NaiveDateTime) -> Result<MigrationReport> {
    let stamp = now.format(BACKUP_STAMP_FORMAT).to_string();
    let mut report = MigrationReport::default();

    migrate_table::<B, ObjectRecord>(store, &stamp, &mut report)?;
    migrate_table::<B, ServiceRecord>(store, &stamp, &mut report)?;
    migrate_table::<B, ReminderRecord>(store, &stamp, &mut report)?;
    migrate_table::<B, ReportRecord>(store, &stamp, &mut report)?;
    migrate_table::<B, FaultReport>(store, &stamp, &mut report)?;

    Ok(report)
}

fn distinct_types<R: Record>(rows: &[R]) -> BTreeSet<String> {
    rows.iter()
        .filter_map(|r| r.object_type())
        .map(str::to_string)
        .collect()
}

fn migrate_table<B: StorageBackend, R: Record>(
    store: &B,
    stamp: &str,
    report: &mut MigrationReport,
) -> Result<()> {
    let migrated = store.modify_with_backup::<R, _, _>(stamp, |stored, rows| {
        Ok(Change::Write((
            rows.len(),
            distinct_types(stored),
            distinct_types(rows),
        )))
    })?;
    let Some((backup, (rows, before, after))) = migrated else {
        report.skipped.push(R::TABLE);
        return Ok(());
    };

    info!(table = R::TABLE, backup = %backup.display(), rows, "table migrated");
    report.tables.push(TableMigration {
        table: R::TABLE,
        backup,
        rows,
        before,
        after,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 3)
            .unwrap()
            .and_hms_opt(4, 5, 6)
            .unwrap()
    }

    #[test]
    fn rewrites_legacy_types_and_keeps_backup() {
        let store = MemBackend::new();
        let legacy = "object_id,object_type,name,description,status,created_date,last_updated\n\
                      VEH-0001,Vehicles,Truck,,Active,2024-01-01 00:00:00,2024-01-01 00:00:00\n\
                      EQU-0002,Equipment,Drill,,Active,2024-01-01 00:00:00,2024-01-01 00:00:00\n";
        store.put_raw("objects.csv", legacy);

        let report = run(&store, at()).unwrap();

        assert_eq!(report.tables.len(), 1);
        let objects = &report.tables[0];
        assert_eq!(objects.table, "objects");
        assert_eq!(objects.rows, 2);
        assert!(objects.changed());
        assert!(objects.before.contains("Vehicles"));
        assert_eq!(
            objects.after.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Other", "Vehicle"]
        );
        assert!(objects.backup.ends_with("objects.csv.bak-20240203-040506"));
        assert_eq!(store.raw("objects.csv.bak-20240203-040506").unwrap(), legacy);

        let raw = store.raw("objects.csv").unwrap();
        assert!(raw.contains("VEH-0001,Vehicle,Truck"));
        assert!(!raw.contains("Vehicles"));

        assert!(report.skipped.contains(&"services"));
        assert!(report.changed());
    }

    #[test]
    fn already_canonical_reports_unchanged() {
        let store = MemBackend::new();
        store.put_raw(
            "reminders.csv",
            "reminder_id,service_id,object_id,object_type,reminder_date,status,notes,created_date\n\
             REM-00001,SVC-00001,VEH-0001,Vehicle,2024-01-05,Pending,,2024-01-01 00:00:00\n",
        );
        let report = run(&store, at()).unwrap();
        assert_eq!(report.tables.len(), 1);
        assert!(!report.changed());
        assert_eq!(report.skipped.len(), 4);
    }
}
