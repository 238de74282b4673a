use super::fields;
use super::{field_matches, object_type_matches, ServiceStatus};
use crate::category;
use crate::store::Record;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A recurring maintenance service planned against an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub service_id: String,
    pub object_id: String,
    pub object_type: String,
    pub service_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "fields::lenient_u32::deserialize")]
    pub interval_days: u32,
    #[serde(default, with = "fields::opt_date")]
    pub last_service_date: Option<NaiveDate>,
    #[serde(with = "fields::date")]
    pub next_service_date: NaiveDate,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "fields::opt_int::deserialize")]
    pub expected_meter_reading: Option<i64>,
    #[serde(default)]
    pub meter_unit: String,
    #[serde(with = "fields::stamp")]
    pub created_date: NaiveDateTime,
}

impl Record for ServiceRecord {
    const TABLE: &'static str = "services";
    const COLUMNS: &'static [&'static str] = &[
        "service_id",
        "object_id",
        "object_type",
        "service_name",
        "description",
        "interval_days",
        "last_service_date",
        "next_service_date",
        "status",
        "notes",
        "expected_meter_reading",
        "meter_unit",
        "created_date",
    ];

    fn id(&self) -> &str {
        &self.service_id
    }

    fn object_type(&self) -> Option<&str> {
        Some(&self.object_type)
    }

    fn normalize(&mut self) {
        self.object_type = category::normalize(&self.object_type);
    }
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub object_id: String,
    pub object_type: String,
    pub service_name: String,
    pub interval_days: u32,
    pub description: String,
    pub status: ServiceStatus,
    pub notes: String,
    /// Defaults to today.
    pub next_service_date: Option<NaiveDate>,
    pub expected_meter_reading: Option<i64>,
    pub meter_unit: String,
}

impl NewService {
    pub fn new(
        object_id: impl Into<String>,
        object_type: impl Into<String>,
        service_name: impl Into<String>,
        interval_days: u32,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            object_type: object_type.into(),
            service_name: service_name.into(),
            interval_days,
            description: String::new(),
            status: ServiceStatus::Scheduled,
            notes: String::new(),
            next_service_date: None,
            expected_meter_reading: None,
            meter_unit: String::new(),
        }
    }

    pub fn with_meter(mut self, reading: i64, unit: impl Into<String>) -> Self {
        self.expected_meter_reading = Some(reading);
        self.meter_unit = unit.into();
        self
    }

    pub fn due_on(mut self, date: NaiveDate) -> Self {
        self.next_service_date = Some(date);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub object_id: Option<String>,
    pub object_type: Option<String>,
    pub service_name: Option<String>,
    pub description: Option<String>,
    pub interval_days: Option<u32>,
    pub last_service_date: Option<Option<NaiveDate>>,
    pub next_service_date: Option<NaiveDate>,
    pub status: Option<ServiceStatus>,
    pub notes: Option<String>,
    pub expected_meter_reading: Option<Option<i64>>,
    pub meter_unit: Option<String>,
}

impl ServicePatch {
    pub fn status(status: ServiceStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply(self, row: &mut ServiceRecord) {
        if let Some(v) = self.object_id {
            row.object_id = v;
        }
        if let Some(v) = self.object_type {
            row.object_type = category::normalize(&v);
        }
        if let Some(v) = self.service_name {
            row.service_name = v;
        }
        if let Some(v) = self.description {
            row.description = v;
        }
        if let Some(v) = self.interval_days {
            row.interval_days = v;
        }
        if let Some(v) = self.last_service_date {
            row.last_service_date = v;
        }
        if let Some(v) = self.next_service_date {
            row.next_service_date = v;
        }
        if let Some(v) = self.status {
            row.status = v;
        }
        if let Some(v) = self.notes {
            row.notes = v;
        }
        if let Some(v) = self.expected_meter_reading {
            row.expected_meter_reading = v;
        }
        if let Some(v) = self.meter_unit {
            row.meter_unit = v;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub object_type: Option<String>,
    pub object_id: Option<String>,
    pub status: Option<ServiceStatus>,
}

impl ServiceFilter {
    pub fn for_object(object_id: impl Into<String>) -> Self {
        Self {
            object_id: Some(object_id.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, row: &ServiceRecord) -> bool {
        object_type_matches(&self.object_type, &row.object_type)
            && field_matches(&self.object_id, &row.object_id)
            && field_matches(&self.status, &row.status)
    }
}
