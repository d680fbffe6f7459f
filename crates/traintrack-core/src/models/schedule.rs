use std::cmp::Ordering;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::validation::{require, ValidationError};

/// A weekly training slot for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Schedule {
    pub id: i64,
    /// Name of the group training in this slot.
    pub group: String,
    /// Day-of-week label as entered ("Monday", "Tue", ...).
    pub day: String,
    /// Start time label, usually `HH:MM`.
    pub time: String,
    /// Duration label ("90 min").
    pub duration: String,
}

impl Schedule {
    /// Weekday parsed from the day label, if it is a recognizable name.
    pub fn weekday(&self) -> Option<Weekday> {
        self.day.trim().parse::<Weekday>().ok()
    }

    pub fn start_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.time.trim(), "%H:%M").ok()
    }

    /// Calendar order: by weekday (Monday first, unrecognized days last),
    /// then start time, then id.
    pub fn calendar_cmp(&self, other: &Self) -> Ordering {
        let day = |s: &Self| s.weekday().map(|d| d.num_days_from_monday()).unwrap_or(u32::MAX);
        day(self)
            .cmp(&day(other))
            .then_with(|| match (self.start_time(), other.start_time()) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => self.time.cmp(&other.time),
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A schedule row as returned by `GET ?path=schedules`.
///
/// Deleting a schedule entry on the server clears its group instead of
/// removing the row, so `group` may be null here. Such rows are dropped
/// by `into_schedule`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRecord {
    pub id: i64,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub duration: String,
}

impl ScheduleRecord {
    pub fn into_schedule(self) -> Option<Schedule> {
        let group = self.group.filter(|g| !g.is_empty())?;
        Some(Schedule {
            id: self.id,
            group,
            day: self.day,
            time: self.time,
            duration: self.duration,
        })
    }
}

/// Body of `POST ?path=schedules`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ScheduleDraft {
    pub group: String,
    pub day: String,
    pub time: String,
    pub duration: String,
}

impl ScheduleDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("group", &self.group)?;
        require("day", &self.day)?;
        require("time", &self.time)?;
        require("duration", &self.duration)
    }
}
