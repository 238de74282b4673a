use super::fields;
use super::{field_matches, object_type_matches, ObjectStatus};
use crate::category;
use crate::store::Record;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A tracked asset: a vehicle, a facility, a piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub object_id: String,
    pub object_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(with = "fields::stamp")]
    pub created_date: NaiveDateTime,
    #[serde(with = "fields::stamp")]
    pub last_updated: NaiveDateTime,
}

impl Record for ObjectRecord {
    const TABLE: &'static str = "objects";
    const COLUMNS: &'static [&'static str] = &[
        "object_id",
        "object_type",
        "name",
        "description",
        "status",
        "created_date",
        "last_updated",
    ];

    fn id(&self) -> &str {
        &self.object_id
    }

    fn object_type(&self) -> Option<&str> {
        Some(&self.object_type)
    }

    fn normalize(&mut self) {
        self.object_type = category::normalize(&self.object_type);
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewObject {
    pub object_type: String,
    pub name: String,
    pub description: String,
    pub status: ObjectStatus,
}

impl NewObject {
    pub fn new(object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: ObjectStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectPatch {
    pub object_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ObjectStatus>,
}

impl ObjectPatch {
    pub fn status(status: ObjectStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply(self, row: &mut ObjectRecord) {
        if let Some(v) = self.object_type {
            row.object_type = category::normalize(&v);
        }
        if let Some(v) = self.name {
            row.name = v;
        }
        if let Some(v) = self.description {
            row.description = v;
        }
        if let Some(v) = self.status {
            row.status = v;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectFilter {
    pub object_type: Option<String>,
    pub status: Option<ObjectStatus>,
}

impl ObjectFilter {
    pub fn by_type(object_type: impl Into<String>) -> Self {
        Self {
            object_type: Some(object_type.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, row: &ObjectRecord) -> bool {
        object_type_matches(&self.object_type, &row.object_type)
            && field_matches(&self.status, &row.status)
    }
}
