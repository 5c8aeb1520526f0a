//! Profile assignment for synced devices.

use std::collections::HashMap;

use dep_client::{ClientStorage, DepClient};
use dep_core::{Device, DeviceResponse};
use dep_storage::AssignerProfileStore;

use crate::SyncError;

/// Assigns devices synced from the DEP APIs to the stored assigner
/// profile UUID of one DEP name.
pub struct DeviceAssigner<S> {
    client: DepClient<S>,
    store: S,
    name: String,
}

impl<S> DeviceAssigner<S>
where
    S: ClientStorage + AssignerProfileStore,
{
    /// Create a new assigner for a DEP name, looking up the profile UUID
    /// in `store`.
    pub fn new(client: DepClient<S>, store: S, name: impl Into<String>) -> Self {
        Self { client, store, name: name.into() }
    }

    /// Assign the stored profile UUID to the newly added devices of a
    /// fetch or sync response, in one bulk call.
    pub async fn process_device_response(&self, resp: &DeviceResponse) -> Result<(), SyncError> {
        if resp.devices.is_empty() {
            // no devices means we can't assign anything
            return Ok(());
        }
        let (profile_uuid, _) = self.store.retrieve_assigner_profile(&self.name)?;
        if profile_uuid.is_empty() {
            // the operator may simply not have set up an assigner profile
            tracing::debug!(name = %self.name, "empty assigner profile UUID");
            return Ok(());
        }

        // note that we may see multiple "events" per serial number
        let serials: Vec<String> = resp
            .devices
            .iter()
            .filter(|d| should_assign_device(d))
            .map(|d| d.serial_number.clone())
            .collect();

        if serials.is_empty() {
            tracing::debug!(
                name = %self.name,
                devices = resp.devices.len(),
                "no serials to assign"
            );
            return Ok(());
        }

        let api_resp = match self.client.assign_profile(&self.name, &profile_uuid, &serials).await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::info!(
                    name = %self.name,
                    profile_uuid = %profile_uuid,
                    devices = serials.len(),
                    error = %e,
                    "assign profile"
                );
                return Err(e.into());
            }
        };

        let counts = AssignCounts::from_results(&api_resp.devices);
        tracing::info!(
            name = %self.name,
            profile_uuid = %profile_uuid,
            devices = serials.len(),
            success = counts.success,
            not_accessible = counts.not_accessible,
            failed = counts.failed,
            other = counts.other,
            "profile assigned"
        );

        Ok(())
    }
}

/// Whether a device "event" should be passed to the assigner.
///
/// Only the `added` op type is assignable; the other op types are
/// ambiguous and re-assigning the profile on every update would be
/// needless.
fn should_assign_device(device: &Device) -> bool {
    device
        .op_type
        .as_deref()
        .is_some_and(|op| op.eq_ignore_ascii_case("added"))
}

/// Aggregated per-device assignment results.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct AssignCounts {
    pub success: usize,
    pub not_accessible: usize,
    pub failed: usize,
    pub other: usize,
}

impl AssignCounts {
    pub(crate) fn from_results(results: &HashMap<String, String>) -> Self {
        let mut counts = Self::default();
        for result in results.values() {
            match result.to_lowercase().as_str() {
                "success" => counts.success += 1,
                "not_accessible" => counts.not_accessible += 1,
                "failed" => counts.failed += 1,
                _ => counts.other += 1,
            }
        }
        counts
    }
}
