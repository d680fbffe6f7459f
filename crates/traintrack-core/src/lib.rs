//! Core library for TrainTrack.
//!
//! Holds everything that is independent of the terminal front-end:
//!
//! - `api`: HTTP client for the attendance API
//! - `models`: athletes, groups, schedules, drafts and statistics
//! - `store`: the `AttendanceStore` and its per-entity sync ledger
//! - `cache`: JSON snapshot cache for offline start-up
//! - `config`: user configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use store::{AttendanceStore, RemoteStore, Snapshot, StoreError};
