//! Data models for the attendance tracker.
//!
//! - `Athlete`, `AthleteDraft`, `AthleteStatus`, `Attendance`
//! - `Group`
//! - `Schedule`, `ScheduleDraft`
//! - `AttendanceStats`: header figures derived from the athlete list
//! - `ValidationError`: local checks that run before any network call
//!
//! Group membership is expressed by name only. `Athlete::group` and
//! `Schedule::group` are lookup keys into the group list, never owning
//! references.

pub mod athlete;
pub mod group;
pub mod schedule;
pub mod stats;
pub mod validation;

pub use athlete::{Athlete, AthleteDraft, AthleteStatus, Attendance, AttendanceOutOfRange};
pub use group::Group;
pub use schedule::{Schedule, ScheduleDraft, ScheduleRecord};
pub use stats::AttendanceStats;
pub use validation::ValidationError;
