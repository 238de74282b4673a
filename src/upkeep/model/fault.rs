use super::fields;
use super::{field_matches, object_type_matches};
use crate::category;
use crate::store::Record;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// An observed fault, optionally with photos.
///
/// `photo_paths` keeps its order and is stored as a single `;`-joined column,
/// so no individual path may contain `;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultReport {
    pub fault_id: String,
    pub object_id: String,
    pub object_type: String,
    #[serde(with = "fields::date")]
    pub observation_date: NaiveDate,
    #[serde(default, deserialize_with = "fields::opt_int::deserialize")]
    pub actual_meter_reading: Option<i64>,
    #[serde(default)]
    pub meter_unit: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "fields::path_list")]
    pub photo_paths: Vec<String>,
    #[serde(with = "fields::stamp")]
    pub created_date: NaiveDateTime,
}

impl Record for FaultReport {
    const TABLE: &'static str = "fault_reports";
    const COLUMNS: &'static [&'static str] = &[
        "fault_id",
        "object_id",
        "object_type",
        "observation_date",
        "actual_meter_reading",
        "meter_unit",
        "description",
        "photo_paths",
        "created_date",
    ];

    fn id(&self) -> &str {
        &self.fault_id
    }

    fn object_type(&self) -> Option<&str> {
        Some(&self.object_type)
    }

    fn normalize(&mut self) {
        self.object_type = category::normalize(&self.object_type);
    }
}

#[derive(Debug, Clone)]
pub struct NewFaultReport {
    pub object_id: String,
    pub object_type: String,
    /// Defaults to today.
    pub observation_date: Option<NaiveDate>,
    pub actual_meter_reading: Option<i64>,
    pub meter_unit: String,
    pub description: String,
    pub photo_paths: Vec<String>,
}

impl NewFaultReport {
    pub fn new(object_id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            object_type: object_type.into(),
            observation_date: None,
            actual_meter_reading: None,
            meter_unit: String::new(),
            description: String::new(),
            photo_paths: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_photos(mut self, paths: Vec<String>) -> Self {
        self.photo_paths = paths;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FaultPatch {
    pub object_id: Option<String>,
    pub object_type: Option<String>,
    pub observation_date: Option<NaiveDate>,
    pub actual_meter_reading: Option<Option<i64>>,
    pub meter_unit: Option<String>,
    pub description: Option<String>,
    pub photo_paths: Option<Vec<String>>,
}

impl FaultPatch {
    pub fn apply(self, row: &mut FaultReport) {
        if let Some(v) = self.object_id {
            row.object_id = v;
        }
        if let Some(v) = self.object_type {
            row.object_type = category::normalize(&v);
        }
        if let Some(v) = self.observation_date {
            row.observation_date = v;
        }
        if let Some(v) = self.actual_meter_reading {
            row.actual_meter_reading = v;
        }
        if let Some(v) = self.meter_unit {
            row.meter_unit = v;
        }
        if let Some(v) = self.description {
            row.description = v;
        }
        if let Some(v) = self.photo_paths {
            row.photo_paths = v;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FaultFilter {
    pub object_type: Option<String>,
    pub object_id: Option<String>,
}

impl FaultFilter {
    pub fn matches(&self, row: &FaultReport) -> bool {
        object_type_matches(&self.object_type, &row.object_type)
            && field_matches(&self.object_id, &row.object_id)
    }
}
