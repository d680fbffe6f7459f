//! The attendance store: an in-memory copy of the athlete, group and
//! schedule lists kept in step with the remote API.
//!
//! - `AttendanceStore`: cached lists plus the load and mutation operations
//! - `SyncLedger`: per-entity `Clean -> Pending -> Reconciled | Failed`
//!   tracking used to merge reloads with local mutations
//! - `RemoteStore`: the seam between the store and the HTTP client

pub mod attendance;
pub mod error;
pub mod remote;
pub mod sync;

#[cfg(test)]
pub(crate) mod fake;

pub use attendance::{fetch_snapshot, AttendanceStore, LoadState, LoadTicket, Snapshot};
pub use error::StoreError;
pub use remote::RemoteStore;
pub use sync::{EntityKey, SyncLedger, SyncState};
