use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validation::{require, ValidationError};

/// Training status of an athlete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum AthleteStatus {
    #[default]
    Active,
    Injured,
    Rest,
}

impl AthleteStatus {
    pub const ALL: [AthleteStatus; 3] = [
        AthleteStatus::Active,
        AthleteStatus::Injured,
        AthleteStatus::Rest,
    ];

    /// Wire name, as sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            AthleteStatus::Active => "active",
            AthleteStatus::Injured => "injured",
            AthleteStatus::Rest => "rest",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            AthleteStatus::Active => "Active",
            AthleteStatus::Injured => "Injured",
            AthleteStatus::Rest => "Rest",
        }
    }

    /// Next status in display order (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            AthleteStatus::Active => AthleteStatus::Injured,
            AthleteStatus::Injured => AthleteStatus::Rest,
            AthleteStatus::Rest => AthleteStatus::Active,
        }
    }

    /// Previous status in display order (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            AthleteStatus::Active => AthleteStatus::Rest,
            AthleteStatus::Injured => AthleteStatus::Active,
            AthleteStatus::Rest => AthleteStatus::Injured,
        }
    }
}

impl fmt::Display for AthleteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("attendance {0} is outside 0..=100")]
pub struct AttendanceOutOfRange(pub i64);

/// Attendance percentage, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Attendance(u8);

impl Attendance {
    pub const MAX: u8 = 100;

    pub fn new(percent: u8) -> Result<Self, AttendanceOutOfRange> {
        Self::try_from(i64::from(percent))
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Attendance {
    type Error = AttendanceOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(AttendanceOutOfRange(value))
        }
    }
}

impl From<Attendance> for i64 {
    fn from(value: Attendance) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Athlete {
    pub id: i64,
    pub name: String,
    /// Name of the athlete's group. A lookup key into the group list.
    pub group: String,
    #[cfg_attr(feature = "ts", ts(type = "number"))]
    pub attendance: Attendance,
    #[serde(default)]
    pub status: AthleteStatus,
    #[serde(rename = "lastVisit", default, deserialize_with = "deserialize_null_string")]
    pub last_visit: String,
    /// Checked in during this session. Never sent to or read from the API.
    #[serde(skip)]
    pub checked: bool,
}

// Helper to treat `null` like a missing string
fn deserialize_null_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Athlete {
    /// Initials for compact display ("Anna Volkova" -> "AV").
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect()
    }

    pub fn visited_today(&self, today_label: &str) -> bool {
        self.last_visit == today_label
    }
}

/// Body of `POST ?path=athletes`. The server assigns id, attendance and
/// the initial last-visit label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AthleteDraft {
    pub name: String,
    pub group: String,
    #[serde(default)]
    pub status: AthleteStatus,
}

impl AthleteDraft {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            status: AthleteStatus::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("group", &self.group)
    }
}

/// Field checks for a full athlete submitted through `PUT`.
pub(crate) fn validate_athlete(athlete: &Athlete) -> Result<(), ValidationError> {
    require("name", &athlete.name)?;
    require("group", &athlete.group)
}
