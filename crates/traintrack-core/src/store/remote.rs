use std::future::Future;

use crate::api::ApiError;
use crate::models::{Athlete, AthleteDraft, Group, Schedule, ScheduleDraft};

/// Operations the attendance store needs from the remote API.
///
/// Implemented by `ApiClient`. Implementations must be cheap to clone so
/// that loads can run on a background task.
pub trait RemoteStore: Clone + Send + Sync + 'static {
    fn fetch_athletes(&self) -> impl Future<Output = Result<Vec<Athlete>, ApiError>> + Send;

    fn fetch_groups(&self) -> impl Future<Output = Result<Vec<Group>, ApiError>> + Send;

    /// Live schedule entries only; rows deleted server-side are excluded.
    fn fetch_schedules(&self) -> impl Future<Output = Result<Vec<Schedule>, ApiError>> + Send;

    /// Returns the created athlete with its server-assigned id.
    fn create_athlete(
        &self,
        draft: &AthleteDraft,
    ) -> impl Future<Output = Result<Athlete, ApiError>> + Send;

    fn update_athlete(&self, athlete: &Athlete) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn update_group(&self, group: &Group) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn check_in(&self, athlete_id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Returns the created schedule entry with its server-assigned id.
    fn create_schedule(
        &self,
        draft: &ScheduleDraft,
    ) -> impl Future<Output = Result<Schedule, ApiError>> + Send;

    fn delete_schedule(&self, id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;
}
