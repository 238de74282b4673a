use crate::store::Record;
use serde::{Deserialize, Serialize};

/// One entry of the user-extensible meter-unit registry (`km`, `hours`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterUnit {
    pub unit: String,
}

impl Record for MeterUnit {
    const TABLE: &'static str = "meter_units";
    const COLUMNS: &'static [&'static str] = &["unit"];

    fn id(&self) -> &str {
        &self.unit
    }
}
