//! Application state management for TrainTrack.
//!
//! This module contains the `App` struct that owns the attendance store and
//! all UI state, and coordinates background loads.

use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use traintrack_core::api::{ApiClient, ApiError};
use traintrack_core::cache::CacheManager;
use traintrack_core::models::{Athlete, Group, Schedule};
use traintrack_core::store::{fetch_snapshot, LoadState, LoadTicket, Snapshot};
use traintrack_core::{AttendanceStore, Config};

use crate::form::{Form, Submission};
use crate::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background load channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Status messages that describe progress rather than an outcome.
const LOADING_MESSAGE: &str = "Refreshing data...";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Athletes,
    Groups,
    Schedule,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Athletes, Tab::Groups, Tab::Schedule];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Athletes => "Athletes",
            Tab::Groups => "Groups",
            Tab::Schedule => "Schedule",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Athletes => Tab::Groups,
            Tab::Groups => Tab::Schedule,
            Tab::Schedule => Tab::Athletes,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Athletes => Tab::Schedule,
            Tab::Groups => Tab::Athletes,
            Tab::Schedule => Tab::Groups,
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    EditingForm,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Outcome of a background load, sent back to the UI task.
struct RefreshResult {
    ticket: LoadTicket,
    result: Result<Snapshot, ApiError>,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub store: AttendanceStore<ApiClient>,
    pub cache: CacheManager,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,

    // Selection indices
    pub athlete_selection: usize,
    pub group_selection: usize,
    pub member_selection: usize,
    pub schedule_selection: usize,

    // Dialogs
    pub form: Option<Form>,
    pub pending_delete: Option<i64>,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,
    load_in_flight: bool,

    // Status message
    pub status_message: Option<String>,

    // Cache age for status bar
    pub cache_age: Option<String>,
    pub cache_stale: bool,
}

impl App {
    /// Create a new application instance for `config`.
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config.api_url()?, config.timeout())?;
        debug!(api_url = %api.base_url(), "API client configured");

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");
        let cache = CacheManager::new(cache_dir)?;

        Ok(Self::from_parts(config, api, cache))
    }

    pub fn from_parts(config: Config, api: ApiClient, cache: CacheManager) -> Self {
        let store = AttendanceStore::new(api, config.today_label);
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            store,
            cache,

            state: AppState::Normal,
            current_tab: Tab::Athletes,
            focus: Focus::List,
            search_query: String::new(),

            athlete_selection: 0,
            group_selection: 0,
            member_selection: 0,
            schedule_selection: 0,

            form: None,
            pending_delete: None,

            refresh_rx: rx,
            refresh_tx: tx,
            load_in_flight: false,

            status_message: None,
            cache_age: None,
            cache_stale: false,
        }
    }

    // =========================================================================
    // Cache
    // =========================================================================

    /// Show the cached snapshot until the first live load arrives.
    pub fn load_from_cache(&mut self) {
        match self.cache.load_snapshot() {
            Ok(Some(cached)) => {
                self.cache_age = Some(cached.age_display());
                self.cache_stale = cached.is_stale();
                self.store.seed(cached.data);
                self.clamp_selections();
            }
            Ok(None) => debug!("No cached snapshot"),
            Err(e) => warn!(error = %e, "Failed to read cached snapshot"),
        }
    }

    fn save_cache(&mut self) {
        let Some(snapshot) = self.store.snapshot() else {
            return;
        };
        match self.cache.save_snapshot(snapshot) {
            Ok(()) => {
                self.cache_age = Some("just now".to_string());
                self.cache_stale = false;
            }
            Err(e) => warn!(error = %e, "Failed to cache snapshot"),
        }
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task that reloads all three lists.
    pub fn refresh_background(&mut self) {
        if self.load_in_flight {
            debug!("Load already in flight");
            return;
        }
        info!("Starting background refresh");

        let ticket = self.store.begin_load();
        let remote = self.store.remote().clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            let result = fetch_snapshot(&remote).await;
            if tx.send(RefreshResult { ticket, result }).await.is_err() {
                debug!("App closed before load finished");
            }
        });

        self.load_in_flight = true;
        self.status_message = Some(LOADING_MESSAGE.to_string());
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(refresh) = self.refresh_rx.try_recv() {
            self.process_refresh_result(refresh);
        }
    }

    fn process_refresh_result(&mut self, refresh: RefreshResult) {
        self.load_in_flight = false;
        match self.store.finish_load(refresh.ticket, refresh.result) {
            Ok(()) => {
                self.save_cache();
                self.clamp_selections();
                // Only clear progress messages, keep errors visible
                if self.status_message.as_deref() == Some(LOADING_MESSAGE) {
                    self.status_message = None;
                }
            }
            Err(e) => {
                self.status_message = Some(e.user_message());
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.load_in_flight || matches!(self.store.load_state(), LoadState::Loading)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Toggle check-in of the selected athlete.
    pub async fn check_in_selected(&mut self) {
        let Some((id, name)) = self
            .selected_athlete()
            .map(|a| (a.id, a.name.clone()))
        else {
            return;
        };

        match self.store.check_in(id).await {
            Ok(true) => {
                self.status_message = Some(format!("{} checked in", name));
                self.save_cache();
            }
            Ok(false) => {
                self.status_message = Some(format!("{} check-in cleared", name));
                self.save_cache();
            }
            Err(e) => self.status_message = Some(e.user_message()),
        }
    }

    fn group_names(&self) -> Vec<String> {
        self.store.groups().iter().map(|g| g.name.clone()).collect()
    }

    fn open_form(&mut self, form: Form) {
        self.form = Some(form);
        self.state = AppState::EditingForm;
    }

    pub fn start_new_athlete(&mut self) {
        self.open_form(Form::new_athlete(self.group_names()));
    }

    pub fn start_edit_athlete(&mut self) {
        if let Some(athlete) = self.selected_athlete() {
            let form = Form::edit_athlete(athlete, self.group_names());
            self.open_form(form);
        }
    }

    pub fn start_edit_group(&mut self) {
        if let Some(group) = self.selected_group() {
            let form = Form::edit_group(group);
            self.open_form(form);
        }
    }

    pub fn start_new_schedule(&mut self) {
        let mut form = Form::new_schedule(self.group_names());
        // From the Groups tab, start with the highlighted group
        if self.current_tab == Tab::Groups {
            if let Some(group) = self.selected_group().map(|g| g.name.clone()) {
                if let Some(field) = form.fields.iter_mut().find(|f| f.label == "Group") {
                    field.value = group;
                }
            }
        }
        self.open_form(form);
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Send the open form to the store. On failure the form stays open
    /// with the message.
    pub async fn submit_form(&mut self) {
        let Some(submission) = self.form.as_ref().map(Form::submission) else {
            return;
        };

        let result = match submission {
            Submission::CreateAthlete(draft) => self
                .store
                .create_athlete(draft)
                .await
                .map(|a| format!("Added {}", a.name)),
            Submission::UpdateAthlete(athlete) => {
                let name = athlete.name.clone();
                self.store
                    .update_athlete(athlete)
                    .await
                    .map(|()| format!("Saved {}", name))
            }
            Submission::UpdateGroup(group) => {
                let name = group.name.clone();
                self.store
                    .update_group(group)
                    .await
                    .map(|()| format!("Saved group {}", name))
            }
            Submission::CreateSchedule(draft) => self
                .store
                .create_schedule(draft)
                .await
                .map(|s| format!("Added {} on {} at {}", s.group, s.day, s.time)),
        };

        match result {
            Ok(message) => {
                self.cancel_form();
                self.status_message = Some(message);
                self.save_cache();
                self.clamp_selections();
            }
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(e.user_message());
                }
            }
        }
    }

    pub fn start_delete_schedule(&mut self) {
        if let Some(id) = self.selected_schedule().map(|s| s.id) {
            self.pending_delete = Some(id);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    pub async fn confirm_delete(&mut self) {
        let Some(id) = self.pending_delete.take() else {
            self.state = AppState::Normal;
            return;
        };
        self.state = AppState::Normal;

        match self.store.delete_schedule(id).await {
            Ok(()) => {
                self.status_message = Some("Schedule entry deleted".to_string());
                self.save_cache();
                self.clamp_selections();
            }
            Err(e) => self.status_message = Some(e.user_message()),
        }
    }

    // =========================================================================
    // Data Access Methods
    // =========================================================================

    /// Check if an athlete matches the search query.
    /// Query should already be lowercased.
    fn athlete_matches_search(athlete: &Athlete, query: &str) -> bool {
        contains_ignore_case(&athlete.name, query)
            || contains_ignore_case(&athlete.group, query)
            || contains_ignore_case(athlete.status.as_str(), query)
    }

    /// Athletes filtered by the search query, in server order.
    pub fn visible_athletes(&self) -> Vec<&Athlete> {
        let query = self.search_query.to_lowercase();
        self.store
            .athletes()
            .iter()
            .filter(|a| Self::athlete_matches_search(a, &query))
            .collect()
    }

    /// Schedule entries in calendar order.
    pub fn sorted_schedules(&self) -> Vec<&Schedule> {
        let mut schedules: Vec<&Schedule> = self.store.schedules().iter().collect();
        schedules.sort_by(|a, b| a.calendar_cmp(b));
        schedules
    }

    pub fn selected_athlete(&self) -> Option<&Athlete> {
        self.visible_athletes().get(self.athlete_selection).copied()
    }

    pub fn selected_group(&self) -> Option<&Group> {
        self.store.groups().get(self.group_selection)
    }

    pub fn selected_schedule(&self) -> Option<&Schedule> {
        self.sorted_schedules().get(self.schedule_selection).copied()
    }

    /// Length of the list the arrow keys currently move through.
    pub fn current_list_len(&self) -> usize {
        match (self.current_tab, self.focus) {
            (Tab::Athletes, _) => self.visible_athletes().len(),
            (Tab::Groups, Focus::List) => self.store.groups().len(),
            (Tab::Groups, Focus::Detail) => self
                .selected_group()
                .map(|g| self.store.members_of(g).len())
                .unwrap_or(0),
            (Tab::Schedule, _) => self.store.schedules().len(),
        }
    }

    fn current_selection_mut(&mut self) -> &mut usize {
        match (self.current_tab, self.focus) {
            (Tab::Athletes, _) => &mut self.athlete_selection,
            (Tab::Groups, Focus::List) => &mut self.group_selection,
            (Tab::Groups, Focus::Detail) => &mut self.member_selection,
            (Tab::Schedule, _) => &mut self.schedule_selection,
        }
    }

    /// Move the current selection by `delta`, clamped to the list.
    pub fn move_selection(&mut self, delta: isize) {
        let max_index = self.current_list_len().saturating_sub(1);
        let selection = self.current_selection_mut();
        *selection = selection.saturating_add_signed(delta).min(max_index);
        if self.current_tab == Tab::Groups && self.focus == Focus::List {
            self.member_selection = 0;
        }
    }

    pub fn select_last(&mut self) {
        let max_index = self.current_list_len().saturating_sub(1);
        *self.current_selection_mut() = max_index;
    }

    /// Keep selections inside their lists after data changes.
    pub fn clamp_selections(&mut self) {
        let clamp = |selection: &mut usize, len: usize| {
            *selection = (*selection).min(len.saturating_sub(1));
        };
        let athletes = self.visible_athletes().len();
        let groups = self.store.groups().len();
        let schedules = self.store.schedules().len();
        clamp(&mut self.athlete_selection, athletes);
        clamp(&mut self.group_selection, groups);
        clamp(&mut self.schedule_selection, schedules);
        let members = self
            .selected_group()
            .map(|g| self.store.members_of(g).len())
            .unwrap_or(0);
        clamp(&mut self.member_selection, members);
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.focus = Focus::List;
    }
}

// ============================================================================
// Tests
// ============================================================================
