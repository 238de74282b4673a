use super::fields;
use super::{field_matches, object_type_matches, ReportType};
use crate::category;
use crate::store::Record;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A record of completed work (maintenance, inspection, repair, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report_id: String,
    pub object_id: String,
    pub object_type: String,
    #[serde(default)]
    pub report_type: ReportType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "fields::date")]
    pub completion_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "fields::opt_int::deserialize")]
    pub actual_meter_reading: Option<i64>,
    #[serde(default)]
    pub meter_unit: String,
    #[serde(with = "fields::stamp")]
    pub created_date: NaiveDateTime,
}

impl Record for ReportRecord {
    const TABLE: &'static str = "reports";
    const COLUMNS: &'static [&'static str] = &[
        "report_id",
        "object_id",
        "object_type",
        "report_type",
        "title",
        "description",
        "completion_date",
        "notes",
        "actual_meter_reading",
        "meter_unit",
        "created_date",
    ];

    fn id(&self) -> &str {
        &self.report_id
    }

    fn object_type(&self) -> Option<&str> {
        Some(&self.object_type)
    }

    fn normalize(&mut self) {
        self.object_type = category::normalize(&self.object_type);
    }
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub object_id: String,
    pub object_type: String,
    pub report_type: ReportType,
    pub title: String,
    pub description: String,
    /// Defaults to today.
    pub completion_date: Option<NaiveDate>,
    pub notes: String,
    pub actual_meter_reading: Option<i64>,
    pub meter_unit: String,
}

impl NewReport {
    pub fn new(
        object_id: impl Into<String>,
        object_type: impl Into<String>,
        report_type: ReportType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            object_type: object_type.into(),
            report_type,
            title: title.into(),
            description: String::new(),
            completion_date: None,
            notes: String::new(),
            actual_meter_reading: None,
            meter_unit: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportPatch {
    pub object_id: Option<String>,
    pub object_type: Option<String>,
    pub report_type: Option<ReportType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completion_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub actual_meter_reading: Option<Option<i64>>,
    pub meter_unit: Option<String>,
}

impl ReportPatch {
    pub fn apply(self, row: &mut ReportRecord) {
        if let Some(v) = self.object_id {
            row.object_id = v;
        }
        if let Some(v) = self.object_type {
            row.object_type = category::normalize(&v);
        }
        if let Some(v) = self.report_type {
            row.report_type = v;
        }
        if let Some(v) = self.title {
            row.title = v;
        }
        if let Some(v) = self.description {
            row.description = v;
        }
        if let Some(v) = self.completion_date {
            row.completion_date = v;
        }
        if let Some(v) = self.notes {
            row.notes = v;
        }
        if let Some(v) = self.actual_meter_reading {
            row.actual_meter_reading = v;
        }
        if let Some(v) = self.meter_unit {
            row.meter_unit = v;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub object_type: Option<String>,
    pub object_id: Option<String>,
    pub report_type: Option<ReportType>,
}

impl ReportFilter {
    pub fn matches(&self, row: &ReportRecord) -> bool {
        object_type_matches(&self.object_type, &row.object_type)
            && field_matches(&self.object_id, &row.object_id)
            && field_matches(&self.report_type, &row.report_type)
    }
}
