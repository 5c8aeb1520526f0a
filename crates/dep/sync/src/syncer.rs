//! The cursor-driven device sync loop.

use std::time::Duration;

use tokio::sync::watch;

use dep_client::{ClientStorage, DepClient};
use dep_core::DeviceRequest;
use dep_storage::{AssignerProfileStore, CursorStore};

use crate::{DeviceAssigner, SyncError};

/// Polls the DEP device endpoints for one DEP name, persisting the cursor
/// and dispatching responses to the profile assigner.
///
/// Run exactly one syncer per DEP name per process; distinct names sync
/// independently.
pub struct DeviceSyncer<S> {
    client: DepClient<S>,
    store: S,
    name: String,
    limit: Option<u32>,
    assigner: DeviceAssigner<S>,
}

impl<S> DeviceSyncer<S>
where
    S: ClientStorage + AssignerProfileStore + CursorStore + Clone,
{
    /// Create a new syncer for a DEP name.
    pub fn new(client: DepClient<S>, store: S, name: impl Into<String>) -> Self {
        let name = name.into();
        let assigner = DeviceAssigner::new(client.clone(), store.clone(), name.clone());
        Self { client, store, name, limit: None, assigner }
    }

    /// Set the per-request device limit (Apple default 100, maximum 1000).
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// One sync iteration.
    ///
    /// An empty persisted cursor starts a full fetch, anything else a
    /// delta sync. Pagination continues within the iteration while the
    /// responses flag `more_to_follow`. An invalid or expired cursor is
    /// cleared and the iteration restarts as a fetch, once; an exhausted
    /// cursor ends the iteration normally.
    pub async fn run_once(&self) -> Result<(), SyncError> {
        let mut cursor = self.store.retrieve_cursor(&self.name)?;
        let mut fetching = cursor.is_empty();
        let mut cursor_reset = false;

        loop {
            let req = DeviceRequest {
                cursor: (!cursor.is_empty()).then(|| cursor.clone()),
                limit: self.limit,
            };
            let result = if fetching {
                self.client.fetch_devices(&self.name, &req).await
            } else {
                self.client.sync_devices(&self.name, &req).await
            };

            let resp = match result {
                Ok(resp) => resp,
                Err(e) if e.is_cursor_exhausted() => {
                    // normal: the cursor has already returned everything
                    tracing::debug!(name = %self.name, "cursor exhausted");
                    return Ok(());
                }
                Err(e) if !cursor_reset && (e.is_cursor_invalid() || e.is_cursor_expired()) => {
                    tracing::info!(name = %self.name, error = %e, "clearing cursor");
                    self.store.store_cursor(&self.name, "")?;
                    cursor.clear();
                    fetching = true;
                    cursor_reset = true;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            tracing::info!(
                name = %self.name,
                phase = if fetching { "fetch" } else { "sync" },
                devices = resp.devices.len(),
                more_to_follow = resp.more_to_follow,
                "device response"
            );

            self.assigner.process_device_response(&resp).await?;

            self.store.store_cursor(&self.name, &resp.cursor)?;
            cursor = resp.cursor.clone();

            if !resp.more_to_follow {
                return Ok(());
            }
        }
    }

    /// Run iterations every `interval` until `shutdown` flips to true.
    ///
    /// Cancellation is observed between iterations and during the sleep,
    /// never in the middle of a DEP call.
    pub async fn run(
        &self,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), SyncError> {
        loop {
            if *shutdown.borrow() {
                return Ok(());
            }
            self.run_once().await?;
            tokio::select! {
                _ = shutdown.changed() => return Ok(()),
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}
