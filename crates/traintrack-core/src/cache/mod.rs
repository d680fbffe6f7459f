//! Local snapshot cache for start-up display and offline viewing.
//!
//! The last successfully loaded snapshot is stored as JSON and considered
//! stale after 60 minutes. The session-local check-in flag is not stored.

pub mod manager;

pub use manager::{CacheManager, CachedData};
