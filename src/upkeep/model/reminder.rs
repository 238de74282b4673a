use super::fields;
use super::{field_matches, object_type_matches, ReminderStatus};
use crate::category;
use crate::store::Record;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub reminder_id: String,
    pub service_id: String,
    pub object_id: String,
    pub object_type: String,
    #[serde(with = "fields::date")]
    pub reminder_date: NaiveDate,
    #[serde(default)]
    pub status: ReminderStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "fields::stamp")]
    pub created_date: NaiveDateTime,
}

impl Record for ReminderRecord {
    const TABLE: &'static str = "reminders";
    const COLUMNS: &'static [&'static str] = &[
        "reminder_id",
        "service_id",
        "object_id",
        "object_type",
        "reminder_date",
        "status",
        "notes",
        "created_date",
    ];

    fn id(&self) -> &str {
        &self.reminder_id
    }

    fn object_type(&self) -> Option<&str> {
        Some(&self.object_type)
    }

    fn normalize(&mut self) {
        self.object_type = category::normalize(&self.object_type);
    }
}

/// New reminders always start out `Pending`.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub service_id: String,
    pub object_id: String,
    pub object_type: String,
    pub reminder_date: NaiveDate,
    pub notes: String,
}

impl NewReminder {
    pub fn new(
        service_id: impl Into<String>,
        object_id: impl Into<String>,
        object_type: impl Into<String>,
        reminder_date: NaiveDate,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            object_id: object_id.into(),
            object_type: object_type.into(),
            reminder_date,
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReminderPatch {
    pub service_id: Option<String>,
    pub object_id: Option<String>,
    pub object_type: Option<String>,
    pub reminder_date: Option<NaiveDate>,
    pub status: Option<ReminderStatus>,
    pub notes: Option<String>,
}

impl ReminderPatch {
    pub fn apply(self, row: &mut ReminderRecord) {
        if let Some(v) = self.service_id {
            row.service_id = v;
        }
        if let Some(v) = self.object_id {
            row.object_id = v;
        }
        if let Some(v) = self.object_type {
            row.object_type = category::normalize(&v);
        }
        if let Some(v) = self.reminder_date {
            row.reminder_date = v;
        }
        if let Some(v) = self.status {
            row.status = v;
        }
        if let Some(v) = self.notes {
            row.notes = v;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReminderFilter {
    pub object_type: Option<String>,
    pub object_id: Option<String>,
    pub service_id: Option<String>,
    pub status: Option<ReminderStatus>,
}

impl ReminderFilter {
    pub fn matches(&self, row: &ReminderRecord) -> bool {
        object_type_matches(&self.object_type, &row.object_type)
            && field_matches(&self.object_id, &row.object_id)
            && field_matches(&self.service_id, &row.service_id)
            && field_matches(&self.status, &row.status)
    }
}
