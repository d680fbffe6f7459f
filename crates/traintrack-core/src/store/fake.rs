//! In-memory `RemoteStore` for store tests.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::ApiError;
use crate::models::{
    Athlete, AthleteDraft, AthleteStatus, Attendance, Group, Schedule, ScheduleDraft,
};

use super::attendance::Snapshot;
use super::remote::RemoteStore;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    FetchAthletes,
    FetchGroups,
    FetchSchedules,
    CreateAthlete(AthleteDraft),
    UpdateAthlete(Athlete),
    UpdateGroup(Group),
    CheckIn(i64),
    CreateSchedule(ScheduleDraft),
    DeleteSchedule(i64),
}

#[derive(Debug, Default)]
struct State {
    server: Snapshot,
    calls: Vec<Call>,
    failing: bool,
    failing_fetches: bool,
}

/// Shared state; clones see the same server.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeRemote {
    state: Arc<Mutex<State>>,
}

impl FakeRemote {
    pub(crate) fn new(server: Snapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                server,
                ..State::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Every subsequent call fails with a server error.
    pub(crate) fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Only the three list fetches fail; mutations still succeed.
    pub(crate) fn set_failing_fetches(&self, failing: bool) {
        self.lock().failing_fetches = failing;
    }

    /// Change the server-side data directly.
    pub(crate) fn edit(&self, f: impl FnOnce(&mut Snapshot)) {
        f(&mut self.lock().server);
    }

    /// Record `call` and run `f` against the server data unless failing.
    fn serve<T>(&self, call: Call, f: impl FnOnce(&mut Snapshot) -> T) -> Result<T, ApiError> {
        let mut state = self.lock();
        let fetch = matches!(
            call,
            Call::FetchAthletes | Call::FetchGroups | Call::FetchSchedules
        );
        state.calls.push(call);
        if state.failing || (fetch && state.failing_fetches) {
            return Err(ApiError::ServerError("service unavailable".into()));
        }
        Ok(f(&mut state.server))
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

impl RemoteStore for FakeRemote {
    async fn fetch_athletes(&self) -> Result<Vec<Athlete>, ApiError> {
        self.serve(Call::FetchAthletes, |s| s.athletes.clone())
    }

    async fn fetch_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.serve(Call::FetchGroups, |s| s.groups.clone())
    }

    async fn fetch_schedules(&self) -> Result<Vec<Schedule>, ApiError> {
        self.serve(Call::FetchSchedules, |s| s.schedules.clone())
    }

    async fn create_athlete(&self, draft: &AthleteDraft) -> Result<Athlete, ApiError> {
        self.serve(Call::CreateAthlete(draft.clone()), |s| {
            let athlete = Athlete {
                id: next_id(s.athletes.iter().map(|a| a.id)),
                name: draft.name.clone(),
                group: draft.group.clone(),
                attendance: Attendance::default(),
                status: draft.status,
                last_visit: "never".into(),
                checked: false,
            };
            if let Some(group) = s.groups.iter_mut().find(|g| g.name == draft.group) {
                group.count += 1;
            }
            s.athletes.push(athlete.clone());
            athlete
        })
    }

    async fn update_athlete(&self, athlete: &Athlete) -> Result<(), ApiError> {
        self.serve(Call::UpdateAthlete(athlete.clone()), |s| {
            if let Some(slot) = s.athletes.iter_mut().find(|a| a.id == athlete.id) {
                *slot = Athlete {
                    checked: false,
                    ..athlete.clone()
                };
            }
        })
    }

    async fn update_group(&self, group: &Group) -> Result<(), ApiError> {
        self.serve(Call::UpdateGroup(group.clone()), |s| {
            if let Some(slot) = s.groups.iter_mut().find(|g| g.id == group.id) {
                *slot = group.clone();
            }
        })
    }

    async fn check_in(&self, athlete_id: i64) -> Result<(), ApiError> {
        self.serve(Call::CheckIn(athlete_id), |s| {
            if let Some(athlete) = s.athletes.iter_mut().find(|a| a.id == athlete_id) {
                athlete.last_visit = "today".into();
            }
        })
    }

    async fn create_schedule(&self, draft: &ScheduleDraft) -> Result<Schedule, ApiError> {
        self.serve(Call::CreateSchedule(draft.clone()), |s| {
            let schedule = Schedule {
                id: next_id(s.schedules.iter().map(|x| x.id)),
                group: draft.group.clone(),
                day: draft.day.clone(),
                time: draft.time.clone(),
                duration: draft.duration.clone(),
            };
            s.schedules.push(schedule.clone());
            schedule
        })
    }

    async fn delete_schedule(&self, id: i64) -> Result<(), ApiError> {
        self.serve(Call::DeleteSchedule(id), |s| s.schedules.retain(|x| x.id != id))
    }
}

fn athlete(
    id: i64,
    name: &str,
    group: &str,
    attendance: u8,
    status: AthleteStatus,
    last_visit: &str,
) -> Athlete {
    Athlete {
        id,
        name: name.into(),
        group: group.into(),
        attendance: Attendance::new(attendance).unwrap(),
        status,
        last_visit: last_visit.into(),
        checked: false,
    }
}

fn slot(id: i64, group: &str, day: &str, time: &str, duration: &str) -> Schedule {
    Schedule {
        id,
        group: group.into(),
        day: day.into(),
        time: time.into(),
        duration: duration.into(),
    }
}

/// Six athletes in three groups with four weekly slots.
pub(crate) fn roster() -> Snapshot {
    use AthleteStatus::*;

    Snapshot {
        athletes: vec![
            athlete(1, "Alexey Smirnov", "Boxers", 95, Active, "today"),
            athlete(2, "Maria Petrova", "Wrestlers", 88, Rest, "yesterday"),
            athlete(3, "Dmitry Kozlov", "Boxers", 72, Injured, "3 days ago"),
            athlete(4, "Anna Volkova", "Crossfit", 91, Active, "today"),
            athlete(5, "Sergey Ivanov", "Wrestlers", 65, Active, "5 days ago"),
            athlete(6, "Elena Morozova", "Crossfit", 98, Active, "today"),
        ],
        groups: vec![
            Group {
                id: 1,
                name: "Boxers".into(),
                count: 2,
                color: "bg-primary".into(),
            },
            Group {
                id: 2,
                name: "Wrestlers".into(),
                count: 2,
                color: "bg-secondary".into(),
            },
            Group {
                id: 3,
                name: "Crossfit".into(),
                count: 2,
                color: "bg-accent".into(),
            },
        ],
        schedules: vec![
            slot(1, "Boxers", "Wednesday", "18:00", "90 min"),
            slot(2, "Wrestlers", "Tuesday", "19:00", "90 min"),
            slot(3, "Boxers", "Monday", "18:00", "90 min"),
            slot(4, "Crossfit", "Friday", "07:00", "60 min"),
        ],
    }
}
