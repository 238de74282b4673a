//! # Rendering
//!
//! Everything here returns a `String`; the command handlers decide where it
//! goes. Layout (column widths, truncation) is Unicode-aware so names with
//! wide characters still line up.

use chrono::{Local, NaiveDateTime};
use colored::{ColoredString, Colorize};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use upkeep::api::{Dashboard, MigrationReport};
use upkeep::commands::{CmdMessage, MessageLevel};
use upkeep::model::{
    FaultReport, ObjectRecord, ObjectStatus, ReminderRecord, ReminderStatus, ReportRecord,
    ServiceRecord, ServiceStatus,
};

/// Widest any single cell may get before it is truncated.
pub const MAX_CELL_WIDTH: usize = 40;
pub const TIME_WIDTH: usize = 14;
const GAP: &str = "  ";

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|message| {
            let line = match message.level {
                MessageLevel::Info => message.content.dimmed(),
                MessageLevel::Success => message.content.green(),
                MessageLevel::Warning => message.content.yellow(),
                MessageLevel::Error => message.content.red(),
            };
            format!("{}\n", line)
        })
        .collect()
}

/// A cell: plain text for layout plus an optional style applied after padding.
struct Cell {
    text: String,
    style: fn(&str) -> ColoredString,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: |s| s.normal(),
        }
    }

    fn styled(text: impl Into<String>, style: fn(&str) -> ColoredString) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

fn render_table(headers: &[&str], rows: Vec<Vec<Cell>>, empty_message: &str) -> String {
    if rows.is_empty() {
        return format!("{}\n", empty_message.dimmed());
    }

    let mut rows = rows;
    for row in &mut rows {
        for cell in row.iter_mut() {
            cell.text = truncate_to_width(&cell.text, MAX_CELL_WIDTH);
        }
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.text.width());
            }
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad_to_width(h, *w))
        .collect();
    out.push_str(&format!("{}\n", header_line.join(GAP).trim_end().bold()));

    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| (cell.style)(&pad_to_width(&cell.text, *w)).to_string())
            .collect();
        out.push_str(line.join(GAP).trim_end());
        out.push('\n');
    }
    out
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: NaiveDateTime) -> String {
    let now = Local::now().naive_local();
    let duration = now.signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

fn opt_meter(reading: Option<i64>, unit: &str) -> String {
    match reading {
        Some(r) if unit.is_empty() => r.to_string(),
        Some(r) => format!("{} {}", r, unit),
        None => String::new(),
    }
}

fn object_status_style(status: ObjectStatus) -> fn(&str) -> ColoredString {
    match status {
        ObjectStatus::Active => |s| s.green(),
        ObjectStatus::Inactive => |s| s.dimmed(),
        ObjectStatus::Maintenance => |s| s.yellow(),
    }
}

fn service_status_style(status: ServiceStatus) -> fn(&str) -> ColoredString {
    match status {
        ServiceStatus::Completed => |s| s.green(),
        ServiceStatus::InProgress => |s| s.cyan(),
        ServiceStatus::Pending => |s| s.yellow(),
        ServiceStatus::Scheduled => |s| s.normal(),
    }
}

pub fn render_objects(objects: &[ObjectRecord]) -> String {
    let rows = objects
        .iter()
        .map(|o| {
            vec![
                Cell::styled(&o.object_id, |s| s.yellow()),
                Cell::plain(&o.object_type),
                Cell::plain(&o.name),
                Cell::styled(o.status.as_str(), object_status_style(o.status)),
                Cell::styled(format_time_ago(o.last_updated), |s| s.dimmed()),
            ]
        })
        .collect();
    render_table(
        &["ID", "TYPE", "NAME", "STATUS", "UPDATED"],
        rows,
        "No objects found.",
    )
}

pub fn render_services(services: &[ServiceRecord]) -> String {
    let rows = services
        .iter()
        .map(|s| {
            vec![
                Cell::styled(&s.service_id, |s| s.yellow()),
                Cell::plain(&s.object_id),
                Cell::plain(&s.service_name),
                Cell::plain(format!("{}d", s.interval_days)),
                Cell::plain(s.next_service_date.to_string()),
                Cell::styled(s.status.as_str(), service_status_style(s.status)),
                Cell::plain(opt_meter(s.expected_meter_reading, &s.meter_unit)),
            ]
        })
        .collect();
    render_table(
        &["ID", "OBJECT", "SERVICE", "EVERY", "NEXT DUE", "STATUS", "METER"],
        rows,
        "No services found.",
    )
}

pub fn render_reminders(reminders: &[ReminderRecord]) -> String {
    let rows = reminders
        .iter()
        .map(|r| {
            let style: fn(&str) -> ColoredString = match r.status {
                ReminderStatus::Pending => |s| s.yellow(),
                ReminderStatus::Completed => |s| s.green(),
            };
            vec![
                Cell::styled(&r.reminder_id, |s| s.yellow()),
                Cell::plain(&r.service_id),
                Cell::plain(&r.object_id),
                Cell::plain(r.reminder_date.to_string()),
                Cell::styled(r.status.as_str(), style),
                Cell::plain(&r.notes),
            ]
        })
        .collect();
    render_table(
        &["ID", "SERVICE", "OBJECT", "DATE", "STATUS", "NOTES"],
        rows,
        "No reminders found.",
    )
}

pub fn render_reports(reports: &[ReportRecord]) -> String {
    let rows = reports
        .iter()
        .map(|r| {
            vec![
                Cell::styled(&r.report_id, |s| s.yellow()),
                Cell::plain(&r.object_id),
                Cell::plain(r.report_type.as_str()),
                Cell::plain(&r.title),
                Cell::plain(r.completion_date.to_string()),
                Cell::plain(opt_meter(r.actual_meter_reading, &r.meter_unit)),
            ]
        })
        .collect();
    render_table(
        &["ID", "OBJECT", "KIND", "TITLE", "COMPLETED", "METER"],
        rows,
        "No reports found.",
    )
}

pub fn render_faults(faults: &[FaultReport]) -> String {
    let rows = faults
        .iter()
        .map(|f| {
            vec![
                Cell::styled(&f.fault_id, |s| s.yellow()),
                Cell::plain(&f.object_id),
                Cell::plain(f.observation_date.to_string()),
                Cell::plain(&f.description),
                Cell::plain(opt_meter(f.actual_meter_reading, &f.meter_unit)),
                Cell::plain(f.photo_paths.len().to_string()),
            ]
        })
        .collect();
    render_table(
        &["ID", "OBJECT", "OBSERVED", "DESCRIPTION", "METER", "PHOTOS"],
        rows,
        "No fault reports found.",
    )
}

pub fn render_lines(lines: &[String], empty_message: &str) -> String {
    if lines.is_empty() {
        return format!("{}\n", empty_message.dimmed());
    }
    lines.iter().map(|l| format!("{}\n", l)).collect()
}

pub fn render_dashboard(dash: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} objects, {} services, {} reports, {} fault reports, {} pending reminders\n",
        dash.total_objects,
        dash.total_services,
        dash.total_reports,
        dash.total_faults,
        dash.pending_reminders
    ));
    let by_type: Vec<String> = dash
        .objects_by_type
        .iter()
        .map(|(t, n)| format!("{}: {}", t, n))
        .collect();
    out.push_str(&format!("{}\n\n", by_type.join(", ").dimmed()));

    if dash.overdue_services.is_empty() {
        out.push_str(&format!("{}\n", "No overdue services".green()));
    } else {
        out.push_str(&format!(
            "{}\n",
            format!("{} overdue services", dash.overdue_services.len())
                .red()
                .bold()
        ));
        for s in &dash.overdue_services {
            out.push_str(&format!(
                "  {} {} ({}) {} days late\n",
                s.service_id.yellow(),
                s.service_name,
                s.object_id,
                -s.days_until
            ));
        }
    }

    if !dash.due_soon_services.is_empty() {
        out.push_str(&format!(
            "{}\n",
            format!("{} services due soon", dash.due_soon_services.len()).yellow()
        ));
        for s in &dash.due_soon_services {
            let when = match s.days_until {
                0 => "today".to_string(),
                1 => "in 1 day".to_string(),
                n => format!("in {} days", n),
            };
            out.push_str(&format!(
                "  {} {} ({}) {}\n",
                s.service_id.yellow(),
                s.service_name,
                s.object_id,
                when
            ));
        }
    }

    if dash.overdue_reminders.is_empty() {
        out.push_str(&format!("{}\n", "No overdue reminders".green()));
    } else {
        out.push_str(&format!(
            "{}\n",
            format!("{} overdue reminders", dash.overdue_reminders.len())
                .red()
                .bold()
        ));
        for r in &dash.overdue_reminders {
            out.push_str(&format!(
                "  {} {} for {} on {}\n",
                r.reminder_id.yellow(),
                r.service_id,
                r.object_id,
                r.reminder_date
            ));
        }
    }
    out
}

pub fn render_migration(report: &MigrationReport) -> String {
    let mut out = String::new();
    for table in &report.tables {
        let before: Vec<&str> = table.before.iter().map(String::as_str).collect();
        let after: Vec<&str> = table.after.iter().map(String::as_str).collect();
        let line = format!(
            "{}: {} rows, [{}] -> [{}] (backup {})",
            table.table,
            table.rows,
            before.join(", "),
            after.join(", "),
            table.backup.display()
        );
        if table.changed() {
            out.push_str(&format!("{}\n", line.green()));
        } else {
            out.push_str(&format!("{}\n", line.dimmed()));
        }
    }
    for table in &report.skipped {
        out.push_str(&format!("{}\n", format!("{}: no file, skipped", table).dimmed()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn object(id: &str, name: &str) -> ObjectRecord {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ObjectRecord {
            object_id: id.to_string(),
            object_type: "Vehicle".to_string(),
            name: name.to_string(),
            description: String::new(),
            status: ObjectStatus::Active,
            created_date: at,
            last_updated: at,
        }
    }

    #[test]
    fn empty_list_shows_message() {
        assert!(render_objects(&[]).contains("No objects found."));
    }

    #[test]
    fn rows_include_ids_and_names() {
        let out = render_objects(&[object("VEH-0001", "Truck"), object("VEH-0002", "Van")]);
        assert!(out.contains("VEH-0001"));
        assert!(out.contains("Van"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn long_cells_are_truncated() {
        let long = "x".repeat(100);
        let out = render_objects(&[object("VEH-0001", &long)]);
        assert!(out.contains('…'));
        assert!(!out.contains(&long));
    }

    #[test]
    fn truncate_respects_wide_chars() {
        assert_eq!(truncate_to_width("short", 10), "short");
        let t = truncate_to_width("日本語のテキスト", 7);
        assert!(t.width() <= 7);
        assert!(t.ends_with('…'));
    }

    #[test]
    fn time_ago_is_right_aligned() {
        let out = format_time_ago(Local::now().naive_local());
        assert_eq!(out.len(), TIME_WIDTH.max(out.trim().len()));
    }

    #[test]
    fn meter_formatting() {
        assert_eq!(opt_meter(Some(10), "km"), "10 km");
        assert_eq!(opt_meter(Some(10), ""), "10");
        assert_eq!(opt_meter(None, "km"), "");
    }

    #[test]
    fn messages_keep_content() {
        let out = render_messages(&[CmdMessage::success("Created VEH-0001")]);
        assert!(out.contains("Created VEH-0001"));
    }
}
