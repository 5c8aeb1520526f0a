//! DEP Device Sync
//!
//! Drives a DEP name's device cursor forward: full fetches, delta syncs,
//! cursor-expiry recovery, and handing newly added devices to the profile
//! assigner.

mod assigner;
mod syncer;

pub use assigner::*;
pub use syncer::*;

use dep_client::DepError;
use dep_storage::StorageError;

/// Errors from the syncer and assigner.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Dep(#[from] DepError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
