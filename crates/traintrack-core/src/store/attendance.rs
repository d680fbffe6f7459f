use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::models::athlete::validate_athlete;
use crate::models::{
    Athlete, AthleteDraft, AttendanceStats, Group, Schedule, ScheduleDraft, ValidationError,
};

use super::error::StoreError;
use super::remote::RemoteStore;
use super::sync::{EntityKey, SyncLedger, SyncState};

/// The three entity lists as one unit. Loads replace all of them at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub athletes: Vec<Athlete>,
    pub groups: Vec<Group>,
    pub schedules: Vec<Schedule>,
}

impl Snapshot {
    pub fn group_named(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.group_named(name).is_some()
    }

    fn require_group(&self, name: &str) -> Result<(), ValidationError> {
        if self.has_group(name) {
            Ok(())
        } else {
            Err(ValidationError::UnknownGroup(name.to_string()))
        }
    }
}

/// Fetch all three lists concurrently. Fails if any request fails.
pub async fn fetch_snapshot<R: RemoteStore>(remote: &R) -> Result<Snapshot, ApiError> {
    let (athletes, groups, schedules) = futures::try_join!(
        remote.fetch_athletes(),
        remote.fetch_groups(),
        remote.fetch_schedules(),
    )?;

    Ok(Snapshot {
        athletes,
        groups,
        schedules,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No load has been attempted.
    #[default]
    Idle,
    Loading,
    Loaded { at: DateTime<Utc> },
    Failed(String),
}

/// Captured by `begin_load`, handed back to `finish_load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    since: u64,
}

/// In-memory copy of the remote athlete, group and schedule lists.
///
/// Mutations validate locally first and never touch the network when
/// validation fails. Successful mutations are merged into the cached
/// lists right away; a later load replaces them with the server's view,
/// except for entities changed after that load was issued.
pub struct AttendanceStore<R> {
    remote: R,
    today_label: String,
    data: Option<Snapshot>,
    ledger: SyncLedger,
    load_state: LoadState,
    last_applied: Option<u64>,
}

impl<R: RemoteStore> AttendanceStore<R> {
    pub fn new(remote: R, today_label: impl Into<String>) -> Self {
        Self {
            remote,
            today_label: today_label.into(),
            data: None,
            ledger: SyncLedger::new(),
            load_state: LoadState::Idle,
            last_applied: None,
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn today_label(&self) -> &str {
        &self.today_label
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True once a live snapshot has been applied.
    pub fn is_loaded(&self) -> bool {
        self.last_applied.is_some()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.data.as_ref()
    }

    pub fn athletes(&self) -> &[Athlete] {
        self.data.as_ref().map(|d| d.athletes.as_slice()).unwrap_or(&[])
    }

    pub fn groups(&self) -> &[Group] {
        self.data.as_ref().map(|d| d.groups.as_slice()).unwrap_or(&[])
    }

    pub fn schedules(&self) -> &[Schedule] {
        self.data.as_ref().map(|d| d.schedules.as_slice()).unwrap_or(&[])
    }

    pub fn athlete(&self, id: i64) -> Option<&Athlete> {
        self.athletes().iter().find(|a| a.id == id)
    }

    pub fn group(&self, id: i64) -> Option<&Group> {
        self.groups().iter().find(|g| g.id == id)
    }

    pub fn schedule(&self, id: i64) -> Option<&Schedule> {
        self.schedules().iter().find(|s| s.id == id)
    }

    /// Athletes whose group name matches `group`.
    pub fn members_of(&self, group: &Group) -> Vec<&Athlete> {
        self.athletes().iter().filter(|a| a.group == group.name).collect()
    }

    /// Schedule entries of `group`, in calendar order.
    pub fn schedules_of(&self, group: &Group) -> Vec<&Schedule> {
        let mut slots: Vec<&Schedule> = self
            .schedules()
            .iter()
            .filter(|s| s.group == group.name)
            .collect();
        slots.sort_by(|a, b| a.calendar_cmp(b));
        slots
    }

    pub fn stats(&self) -> AttendanceStats {
        AttendanceStats::compute(self.athletes(), &self.today_label)
    }

    pub fn sync_state(&self, key: EntityKey) -> SyncState {
        self.ledger.state(key)
    }

    pub fn ledger(&self) -> &SyncLedger {
        &self.ledger
    }

    fn loaded(&self) -> Result<&Snapshot, StoreError> {
        match (&self.data, self.last_applied) {
            (Some(data), Some(_)) => Ok(data),
            _ => Err(StoreError::NotLoaded),
        }
    }

    fn athlete_slot(&mut self, id: i64) -> Option<&mut Athlete> {
        self.data.as_mut()?.athletes.iter_mut().find(|a| a.id == id)
    }

    fn group_slot(&mut self, id: i64) -> Option<&mut Group> {
        self.data.as_mut()?.groups.iter_mut().find(|g| g.id == id)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Show previously cached data until the first live load completes.
    /// Ignored once any data is present.
    pub fn seed(&mut self, snapshot: Snapshot) {
        if self.data.is_none() {
            debug!(athletes = snapshot.athletes.len(), "Seeding store from cache");
            self.data = Some(snapshot);
        }
    }

    /// Fetch and apply all three lists.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        let ticket = self.begin_load();
        let result = fetch_snapshot(&self.remote).await;
        self.finish_load(ticket, result)
    }

    /// Mark a load as started. The fetch itself can run elsewhere (see
    /// `fetch_snapshot`); its outcome goes to `finish_load`.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_state = LoadState::Loading;
        LoadTicket {
            since: self.ledger.checkpoint(),
        }
    }

    /// Apply the outcome of a load started with `begin_load`.
    ///
    /// A failure leaves the cached lists untouched. Outcomes of loads
    /// issued before the last applied one are discarded.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Snapshot, ApiError>,
    ) -> Result<(), StoreError> {
        if matches!(self.last_applied, Some(last) if ticket.since < last) {
            debug!(since = ticket.since, "Discarding outcome of superseded load");
            return Ok(());
        }

        match result {
            Ok(snapshot) => {
                self.apply_snapshot(ticket, snapshot);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Load failed");
                self.load_state = LoadState::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    fn apply_snapshot(&mut self, ticket: LoadTicket, fresh: Snapshot) {
        let newer = self.ledger.newer_than(ticket.since);
        let previous = self.data.take().unwrap_or_default();

        // Server rows never carry `checked`, so a reload clears it except
        // for athletes checked in after this load was issued.
        let athletes = merge(fresh.athletes, &previous.athletes, &newer, |a| {
            EntityKey::Athlete(a.id)
        });
        let groups = merge(fresh.groups, &previous.groups, &newer, |g| EntityKey::Group(g.id));
        let schedules = merge(fresh.schedules, &previous.schedules, &newer, |s| {
            EntityKey::Schedule(s.id)
        });

        info!(
            athletes = athletes.len(),
            groups = groups.len(),
            schedules = schedules.len(),
            kept_local = newer.len(),
            "Snapshot applied"
        );

        self.data = Some(Snapshot {
            athletes,
            groups,
            schedules,
        });
        self.ledger.settle(ticket.since);
        self.last_applied = Some(ticket.since);
        self.load_state = LoadState::Loaded { at: Utc::now() };
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Toggle the session check-in flag of an athlete after notifying the
    /// server. Returns the new flag. When the athlete becomes checked, the
    /// last-visit label is set to the today label.
    pub async fn check_in(&mut self, athlete_id: i64) -> Result<bool, StoreError> {
        if self.loaded()?.athletes.iter().all(|a| a.id != athlete_id) {
            return Err(ValidationError::UnknownAthlete(athlete_id).into());
        }

        let key = EntityKey::Athlete(athlete_id);
        self.ledger.mark_pending(key);

        if let Err(e) = self.remote.check_in(athlete_id).await {
            warn!(athlete_id, error = %e, "Check-in failed");
            self.ledger.mark_failed(key, e.to_string());
            return Err(e.into());
        }

        let today = self.today_label.clone();
        let athlete = self
            .athlete_slot(athlete_id)
            .ok_or(ValidationError::UnknownAthlete(athlete_id))?;
        athlete.checked = !athlete.checked;
        if athlete.checked {
            athlete.last_visit = today;
        }
        let checked = athlete.checked;

        self.ledger.mark_reconciled(key);
        info!(athlete_id, checked, "Check-in recorded");
        Ok(checked)
    }

    /// Create an athlete, then reload everything so server-side effects
    /// (group counts) are picked up. A failed reload is logged and leaves
    /// the created athlete in the list.
    pub async fn create_athlete(&mut self, draft: AthleteDraft) -> Result<Athlete, StoreError> {
        draft.validate()?;
        self.loaded()?.require_group(&draft.group)?;

        let created = match self.remote.create_athlete(&draft).await {
            Ok(created) => created,
            Err(e) => {
                warn!(name = %draft.name, error = %e, "Failed to create athlete");
                return Err(e.into());
            }
        };
        info!(id = created.id, name = %created.name, "Athlete created");

        self.ledger.mark_reconciled(EntityKey::Athlete(created.id));
        if let Some(data) = self.data.as_mut() {
            data.athletes.push(created.clone());
        }

        if let Err(e) = self.load().await {
            warn!(error = %e, "Reload after creating athlete failed");
        }
        Ok(created)
    }

    /// Replace an athlete. On success the cached copy is exactly `athlete`.
    pub async fn update_athlete(&mut self, athlete: Athlete) -> Result<(), StoreError> {
        validate_athlete(&athlete)?;
        let data = self.loaded()?;
        if data.athletes.iter().all(|a| a.id != athlete.id) {
            return Err(ValidationError::UnknownAthlete(athlete.id).into());
        }
        data.require_group(&athlete.group)?;

        let key = EntityKey::Athlete(athlete.id);
        self.ledger.mark_pending(key);

        if let Err(e) = self.remote.update_athlete(&athlete).await {
            warn!(id = athlete.id, error = %e, "Failed to update athlete");
            self.ledger.mark_failed(key, e.to_string());
            return Err(e.into());
        }

        info!(id = athlete.id, "Athlete updated");
        if let Some(slot) = self.athlete_slot(athlete.id) {
            *slot = athlete;
        }
        self.ledger.mark_reconciled(key);
        Ok(())
    }

    /// Replace a group. On success the cached copy is exactly `group`.
    ///
    /// Athletes and schedule entries refer to groups by name; renaming a
    /// group does not rewrite them.
    pub async fn update_group(&mut self, group: Group) -> Result<(), StoreError> {
        group.validate()?;
        let data = self.loaded()?;
        if data.groups.iter().all(|g| g.id != group.id) {
            return Err(ValidationError::UnknownGroupId(group.id).into());
        }
        if data.groups.iter().any(|g| g.id != group.id && g.name == group.name) {
            return Err(ValidationError::DuplicateGroup(group.name).into());
        }

        let key = EntityKey::Group(group.id);
        self.ledger.mark_pending(key);

        if let Err(e) = self.remote.update_group(&group).await {
            warn!(id = group.id, error = %e, "Failed to update group");
            self.ledger.mark_failed(key, e.to_string());
            return Err(e.into());
        }

        info!(id = group.id, name = %group.name, "Group updated");
        if let Some(slot) = self.group_slot(group.id) {
            *slot = group;
        }
        self.ledger.mark_reconciled(key);
        Ok(())
    }

    pub async fn create_schedule(&mut self, draft: ScheduleDraft) -> Result<Schedule, StoreError> {
        draft.validate()?;
        self.loaded()?.require_group(&draft.group)?;

        let created = match self.remote.create_schedule(&draft).await {
            Ok(created) => created,
            Err(e) => {
                warn!(group = %draft.group, error = %e, "Failed to create schedule entry");
                return Err(e.into());
            }
        };
        info!(id = created.id, group = %created.group, day = %created.day, "Schedule entry created");

        self.ledger.mark_reconciled(EntityKey::Schedule(created.id));
        if let Some(data) = self.data.as_mut() {
            data.schedules.push(created.clone());
        }
        Ok(created)
    }

    /// Remove exactly the schedule entry with `id`.
    pub async fn delete_schedule(&mut self, id: i64) -> Result<(), StoreError> {
        if self.loaded()?.schedules.iter().all(|s| s.id != id) {
            return Err(ValidationError::UnknownSchedule(id).into());
        }

        let key = EntityKey::Schedule(id);
        self.ledger.mark_pending(key);

        if let Err(e) = self.remote.delete_schedule(id).await {
            warn!(id, error = %e, "Failed to delete schedule entry");
            self.ledger.mark_failed(key, e.to_string());
            return Err(e.into());
        }

        if let Some(data) = self.data.as_mut() {
            data.schedules.retain(|s| s.id != id);
        }
        self.ledger.mark_reconciled(key);
        info!(id, "Schedule entry deleted");
        Ok(())
    }
}

/// Combine a fresh list with the local one. Entities in `newer` keep their
/// local state: the local copy if there is one, otherwise they are dropped
/// (deleted locally). Locally created entities missing from `fresh` are
/// appended.
fn merge<T: Clone>(
    fresh: Vec<T>,
    local: &[T],
    newer: &HashSet<EntityKey>,
    key: impl Fn(&T) -> EntityKey,
) -> Vec<T> {
    let mut seen = HashSet::with_capacity(fresh.len());
    let mut merged = Vec::with_capacity(fresh.len());

    for item in fresh {
        let k = key(&item);
        seen.insert(k);
        if newer.contains(&k) {
            if let Some(mine) = local.iter().find(|l| key(l) == k) {
                merged.push(mine.clone());
            }
        } else {
            merged.push(item);
        }
    }

    merged.extend(
        local
            .iter()
            .filter(|l| {
                let k = key(l);
                newer.contains(&k) && !seen.contains(&k)
            })
            .cloned(),
    );
    merged
}
