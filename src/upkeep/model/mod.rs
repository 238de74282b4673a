//! # Domain Model
//!
//! Five record tables plus the meter-unit registry. Every table lives in its
//! own CSV file; rows are identified by a generated string id unique within
//! the table.
//!
//! ```text
//! objects.csv      object_id, object_type, name, description, status, created_date, last_updated
//! services.csv     service_id, object_id, object_type, service_name, description, interval_days,
//!                  last_service_date, next_service_date, status, notes,
//!                  expected_meter_reading, meter_unit, created_date
//! reminders.csv    reminder_id, service_id, object_id, object_type, reminder_date, status,
//!                  notes, created_date
//! reports.csv      report_id, object_id, object_type, report_type, title, description,
//!                  completion_date, notes, actual_meter_reading, meter_unit, created_date
//! fault_reports.csv fault_id, object_id, object_type, observation_date, actual_meter_reading,
//!                  meter_unit, description, photo_paths, created_date
//! meter_units.csv  unit
//! ```
//!
//! ## Soft References
//!
//! `object_id` and `service_id` columns point at rows in other tables, but
//! nothing enforces that the target exists and deletes never cascade.
//! Callers decide how to treat orphans.
//!
//! ## Per-table Types
//!
//! Each table module defines the stored record, a `New*` input for create, a
//! `*Patch` for partial updates (a `None` field is left untouched; nullable
//! columns use `Option<Option<_>>` so they can be cleared) and a `*Filter`
//! whose supplied fields must all match.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod fault;
pub mod fields;
pub mod meter_unit;
pub mod object;
pub mod reminder;
pub mod report;
pub mod service;

pub use fault::{FaultFilter, FaultPatch, FaultReport, NewFaultReport};
pub use meter_unit::MeterUnit;
pub use object::{NewObject, ObjectFilter, ObjectPatch, ObjectRecord};
pub use reminder::{NewReminder, ReminderFilter, ReminderPatch, ReminderRecord};
pub use report::{NewReport, ReportFilter, ReportPatch, ReportRecord};
pub use service::{NewService, ServiceFilter, ServicePatch, ServiceRecord};

/// Current local time at second precision, the resolution stored on disk.
pub fn now_stamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Does a filter's requested category match a stored one?
pub(crate) fn object_type_matches(wanted: &Option<String>, stored: &str) -> bool {
    match wanted {
        Some(w) => crate::category::normalize(w) == stored,
        None => true,
    }
}

pub(crate) fn field_matches<T: PartialEq>(wanted: &Option<T>, stored: &T) -> bool {
    wanted.as_ref().map_or(true, |w| w == stored)
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        /// Blank and null-marker cells from older files read as the default.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(d)?;
                if fields::is_blank_cell(&raw) {
                    return Ok($name::default());
                }
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let options: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!("'{}' is not one of: {}", wanted, options.join(", "))
                    })
            }
        }
    };
}

text_enum! {
    /// Lifecycle state of a tracked object.
    ObjectStatus {
        Active => "Active",
        Inactive => "Inactive",
        Maintenance => "Maintenance",
    } default Active
}

text_enum! {
    ServiceStatus {
        Scheduled => "Scheduled",
        Pending => "Pending",
        InProgress => "In Progress",
        Completed => "Completed",
    } default Scheduled
}

text_enum! {
    ReminderStatus {
        Pending => "Pending",
        Completed => "Completed",
    } default Pending
}

text_enum! {
    ReportType {
        Maintenance => "Maintenance",
        Inspection => "Inspection",
        Repair => "Repair",
        Preventive => "Preventive",
        Other => "Other",
    } default Maintenance
}
