//! # CLI Layer
//!
//! This module is **one possible UI client** for upkeep; it is not the
//! application itself. It is the only place that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Resolves the data directory and installs logging
//! - Formats output for human consumption
//!
//! Handlers call the API facade and hand structured results to `render`.

use super::render;
use super::setup::{
    Cli, Commands, FaultCmd, MeterArgs, ObjectCmd, ReminderCmd, ReportCmd, ServiceCmd, UnitCmd,
};
use chrono::NaiveDate;
use clap::Parser;
use directories::ProjectDirs;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use upkeep::api::UpkeepApi;
use upkeep::commands::CmdMessage;
use upkeep::config::UpkeepConfig;
use upkeep::error::{Result, UpkeepError};
use upkeep::model::*;
use upkeep::store::fs_backend::FsBackend;

pub const DATA_DIR_ENV: &str = "UPKEEP_DATA_DIR";
pub const LOG_ENV: &str = "UPKEEP_LOG";

struct AppContext {
    api: UpkeepApi<FsBackend>,
    data_dir: PathBuf,
    json: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let data_dir = resolve_data_dir(cli.data_dir.clone())?;
    debug!(data_dir = %data_dir.display(), "using data directory");
    let ctx = AppContext {
        api: UpkeepApi::open(&data_dir)?,
        data_dir,
        json: cli.json,
    };

    match cli.command {
        Commands::Objects(cmd) => handle_objects(&ctx, cmd),
        Commands::Services(cmd) => handle_services(&ctx, cmd),
        Commands::Reminders(cmd) => handle_reminders(&ctx, cmd),
        Commands::Reports(cmd) => handle_reports(&ctx, cmd),
        Commands::Faults(cmd) => handle_faults(&ctx, cmd),
        Commands::Units(cmd) => handle_units(&ctx, cmd),
        Commands::Dashboard { today } => handle_dashboard(&ctx, today),
        Commands::Migrate => handle_migrate(&ctx),
        Commands::Export { dest } => handle_export(&ctx, dest),
        Commands::Config { key, value } => handle_config(&ctx, key, value),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("org", "upkeep", "upkeep")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| UpkeepError::Store("Could not determine data directory".to_string()))
}

fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render::render_messages(messages));
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as JSON or as a rendered table.
fn print_rows<T: Serialize>(ctx: &AppContext, rows: &[T], render: fn(&[T]) -> String) -> Result<()> {
    if ctx.json {
        print_json(rows)
    } else {
        print!("{}", render(rows));
        Ok(())
    }
}

fn report_created(kind: &str, id: &str) {
    print_messages(&[CmdMessage::success(format!("{} created: {}", kind, id))]);
}

fn report_outcome(kind: &str, id: &str, action: &str, found: bool) {
    let message = if found {
        CmdMessage::success(format!("{} {}: {}", kind, action, id))
    } else {
        CmdMessage::warning(format!("{} not found: {}", kind, id))
    };
    print_messages(&[message]);
}

/// Object type for a new dependent record: the explicit flag, else the
/// referenced object's type.
fn object_type_for(ctx: &AppContext, object_id: &str, explicit: Option<String>) -> Result<String> {
    if let Some(t) = explicit {
        return Ok(t);
    }
    ctx.api
        .get_object(object_id)?
        .map(|o| o.object_type)
        .ok_or_else(|| {
            UpkeepError::validation(format!(
                "object '{}' not found; pass --type to record it anyway",
                object_id
            ))
        })
}

fn meter_patch(meter: MeterArgs) -> (Option<Option<i64>>, Option<String>) {
    (meter.meter.map(Some), meter.unit)
}

fn handle_objects(ctx: &AppContext, cmd: ObjectCmd) -> Result<()> {
    match cmd {
        ObjectCmd::List {
            object_type,
            status,
        } => {
            let rows = ctx.api.get_objects(&ObjectFilter {
                object_type,
                status,
            })?;
            print_rows(ctx, &rows, render::render_objects)
        }
        ObjectCmd::Add {
            object_type,
            name,
            description,
            status,
        } => {
            let id = ctx.api.add_object(
                NewObject::new(object_type, name)
                    .with_description(description)
                    .with_status(status),
            )?;
            report_created("Object", &id);
            Ok(())
        }
        ObjectCmd::Update {
            id,
            object_type,
            name,
            description,
            status,
        } => {
            let found = ctx.api.update_object(
                &id,
                ObjectPatch {
                    object_type,
                    name,
                    description,
                    status,
                },
            )?;
            report_outcome("Object", &id, "updated", found);
            Ok(())
        }
        ObjectCmd::Delete { id } => {
            let found = ctx.api.delete_object(&id)?;
            if found {
                let orphans = ctx.api.get_services(&ServiceFilter::for_object(&id))?;
                if !orphans.is_empty() {
                    print_messages(&[CmdMessage::warning(format!(
                        "{} services still reference {}",
                        orphans.len(),
                        id
                    ))]);
                }
            }
            report_outcome("Object", &id, "deleted", found);
            Ok(())
        }
    }
}

fn handle_services(ctx: &AppContext, cmd: ServiceCmd) -> Result<()> {
    match cmd {
        ServiceCmd::List {
            object_type,
            object,
            status,
        } => {
            let rows = ctx.api.get_services(&ServiceFilter {
                object_type,
                object_id: object,
                status,
            })?;
            print_rows(ctx, &rows, render::render_services)
        }
        ServiceCmd::Add {
            object_id,
            name,
            interval,
            object_type,
            description,
            due,
            notes,
            meter,
        } => {
            let object_type = object_type_for(ctx, &object_id, object_type)?;
            let mut new = NewService::new(object_id, object_type, name, interval);
            new.description = description;
            new.notes = notes;
            new.next_service_date = due;
            new.expected_meter_reading = meter.meter;
            new.meter_unit = meter.unit.unwrap_or_default();
            let id = ctx.api.add_service(new)?;
            report_created("Service", &id);
            Ok(())
        }
        ServiceCmd::Update {
            id,
            name,
            interval,
            status,
            last,
            due,
            notes,
            meter,
        } => {
            let (expected_meter_reading, meter_unit) = meter_patch(meter);
            let patch = ServicePatch {
                service_name: name,
                interval_days: interval,
                status,
                last_service_date: last.map(Some),
                next_service_date: due,
                notes,
                expected_meter_reading,
                meter_unit,
                ..Default::default()
            };
            let found = ctx.api.update_service(&id, patch)?;
            report_outcome("Service", &id, "updated", found);
            Ok(())
        }
        ServiceCmd::Delete { id } => {
            let found = ctx.api.delete_service(&id)?;
            report_outcome("Service", &id, "deleted", found);
            Ok(())
        }
    }
}

fn handle_reminders(ctx: &AppContext, cmd: ReminderCmd) -> Result<()> {
    match cmd {
        ReminderCmd::List {
            object_type,
            object,
            service,
            status,
        } => {
            let rows = ctx.api.get_reminders(&ReminderFilter {
                object_type,
                object_id: object,
                service_id: service,
                status,
            })?;
            print_rows(ctx, &rows, render::render_reminders)
        }
        ReminderCmd::Add {
            service_id,
            date,
            notes,
        } => {
            let service = ctx.api.get_service(&service_id)?.ok_or_else(|| {
                UpkeepError::validation(format!("service '{}' not found", service_id))
            })?;
            let mut new =
                NewReminder::new(service_id, service.object_id, service.object_type, date);
            new.notes = notes;
            let id = ctx.api.add_reminder(new)?;
            report_created("Reminder", &id);
            Ok(())
        }
        ReminderCmd::Update {
            id,
            date,
            status,
            notes,
        } => {
            let patch = ReminderPatch {
                reminder_date: date,
                status,
                notes,
                ..Default::default()
            };
            let found = ctx.api.update_reminder(&id, patch)?;
            report_outcome("Reminder", &id, "updated", found);
            Ok(())
        }
        ReminderCmd::Delete { id } => {
            let found = ctx.api.delete_reminder(&id)?;
            report_outcome("Reminder", &id, "deleted", found);
            Ok(())
        }
    }
}

fn handle_reports(ctx: &AppContext, cmd: ReportCmd) -> Result<()> {
    match cmd {
        ReportCmd::List {
            object_type,
            object,
            kind,
        } => {
            let rows = ctx.api.get_reports(&ReportFilter {
                object_type,
                object_id: object,
                report_type: kind,
            })?;
            print_rows(ctx, &rows, render::render_reports)
        }
        ReportCmd::Add {
            object_id,
            title,
            kind,
            object_type,
            description,
            date,
            notes,
            meter,
        } => {
            let object_type = object_type_for(ctx, &object_id, object_type)?;
            let mut new = NewReport::new(object_id, object_type, kind, title);
            new.description = description;
            new.completion_date = date;
            new.notes = notes;
            new.actual_meter_reading = meter.meter;
            new.meter_unit = meter.unit.unwrap_or_default();
            let id = ctx.api.add_report(new)?;
            report_created("Report", &id);
            Ok(())
        }
        ReportCmd::Update {
            id,
            title,
            kind,
            description,
            date,
            notes,
            meter,
        } => {
            let (actual_meter_reading, meter_unit) = meter_patch(meter);
            let patch = ReportPatch {
                title,
                report_type: kind,
                description,
                completion_date: date,
                notes,
                actual_meter_reading,
                meter_unit,
                ..Default::default()
            };
            let found = ctx.api.update_report(&id, patch)?;
            report_outcome("Report", &id, "updated", found);
            Ok(())
        }
        ReportCmd::Delete { id } => {
            let found = ctx.api.delete_report(&id)?;
            report_outcome("Report", &id, "deleted", found);
            Ok(())
        }
    }
}

fn handle_faults(ctx: &AppContext, cmd: FaultCmd) -> Result<()> {
    match cmd {
        FaultCmd::List {
            object_type,
            object,
        } => {
            let rows = ctx.api.get_fault_reports(&FaultFilter {
                object_type,
                object_id: object,
            })?;
            print_rows(ctx, &rows, render::render_faults)
        }
        FaultCmd::Add {
            object_id,
            object_type,
            description,
            date,
            photos,
            meter,
        } => {
            let object_type = object_type_for(ctx, &object_id, object_type)?;
            let photo_paths = photos
                .iter()
                .map(|p| attach_photo(ctx, p))
                .collect::<Result<Vec<_>>>()?;
            let mut new = NewFaultReport::new(object_id, object_type)
                .with_description(description)
                .with_photos(photo_paths);
            new.observation_date = date;
            new.actual_meter_reading = meter.meter;
            new.meter_unit = meter.unit.unwrap_or_default();
            let id = ctx.api.add_fault_report(new)?;
            report_created("Fault report", &id);
            Ok(())
        }
        FaultCmd::Update {
            id,
            description,
            date,
            meter,
        } => {
            let (actual_meter_reading, meter_unit) = meter_patch(meter);
            let patch = FaultPatch {
                description,
                observation_date: date,
                actual_meter_reading,
                meter_unit,
                ..Default::default()
            };
            let found = ctx.api.update_fault_report(&id, patch)?;
            report_outcome("Fault report", &id, "updated", found);
            Ok(())
        }
        FaultCmd::Delete { id } => {
            let found = ctx.api.delete_fault_report(&id)?;
            report_outcome("Fault report", &id, "deleted", found);
            Ok(())
        }
    }
}

fn attach_photo(ctx: &AppContext, file: &Path) -> Result<String> {
    let bytes = std::fs::read(file)?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stored = ctx.api.save_photo(&name, &bytes)?;
    Ok(stored.to_string_lossy().to_string())
}

fn handle_units(ctx: &AppContext, cmd: UnitCmd) -> Result<()> {
    match cmd {
        UnitCmd::List => {
            let units = ctx.api.get_meter_units()?;
            if ctx.json {
                print_json(&units)
            } else {
                print!("{}", render::render_lines(&units, "No meter units."));
                Ok(())
            }
        }
        UnitCmd::Add { unit } => {
            let message = if ctx.api.add_meter_unit(&unit)? {
                CmdMessage::success(format!("Meter unit added: {}", unit.trim()))
            } else {
                CmdMessage::info(format!("Meter unit already registered: {}", unit.trim()))
            };
            print_messages(&[message]);
            Ok(())
        }
        UnitCmd::Delete { unit } => {
            let message = if ctx.api.delete_meter_unit(&unit)? {
                CmdMessage::success(format!("Meter unit deleted: {}", unit))
            } else {
                CmdMessage::warning(format!("Meter unit not found: {}", unit))
            };
            print_messages(&[message]);
            Ok(())
        }
    }
}

fn handle_dashboard(ctx: &AppContext, today: Option<NaiveDate>) -> Result<()> {
    let dash = ctx.api.dashboard(today.unwrap_or_else(upkeep::model::today))?;
    if ctx.json {
        return print_json(&dash);
    }
    print!("{}", render::render_dashboard(&dash));
    Ok(())
}

fn handle_migrate(ctx: &AppContext) -> Result<()> {
    let report = ctx.api.migrate_object_types()?;
    if ctx.json {
        return print_json(&report);
    }
    print!("{}", render::render_migration(&report));
    if !report.changed() {
        print_messages(&[CmdMessage::info("All object types were already canonical.")]);
    }
    Ok(())
}

fn handle_export(ctx: &AppContext, dest: Option<PathBuf>) -> Result<()> {
    let dest = match dest {
        Some(d) => d,
        None => std::env::current_dir()?,
    };
    let path = ctx.api.export(&dest)?;
    print_messages(&[CmdMessage::success(format!(
        "Exported to {}",
        path.display()
    ))]);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let mut config = ctx.api.config().clone();
    match (key, value) {
        (None, _) => {
            if ctx.json {
                return print_json(&config);
            }
            for key in UpkeepConfig::KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
        }
        (Some(key), None) => println!("{}", config.get(&key)?),
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save(&ctx.data_dir)?;
            print_messages(&[CmdMessage::success(format!(
                "{} set to {}",
                key,
                config.get(&key)?
            ))]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_environment() {
        let dir = resolve_data_dir(Some(PathBuf::from("/tmp/upkeep-flag"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/upkeep-flag"));
    }

    #[test]
    fn meter_flags_become_patch_fields() {
        let (reading, unit) = meter_patch(MeterArgs {
            meter: Some(5),
            unit: None,
        });
        assert_eq!(reading, Some(Some(5)));
        assert_eq!(unit, None);
    }
}
