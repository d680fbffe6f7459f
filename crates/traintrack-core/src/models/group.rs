use serde::{Deserialize, Serialize};

use super::validation::{require, ValidationError};

/// A training group. `name` is the key athletes and schedule entries use
/// to refer to the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Group {
    pub id: i64,
    pub name: String,
    /// Member count as reported by the server. Not recomputed locally.
    #[serde(default)]
    pub count: u32,
    /// Display color tag (e.g. `bg-primary`).
    #[serde(default)]
    pub color: String,
}

impl Group {
    pub fn display_member_count(&self) -> String {
        match self.count {
            1 => "1 athlete".to_string(),
            n => format!("{} athletes", n),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("color", &self.color)
    }
}
