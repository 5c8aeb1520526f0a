//! Assigner profile handlers.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dep_storage::AllStorage;

use crate::{ApiError, ApiState};

/// The assigner profile of a DEP name: the profile UUID assigned to
/// newly added devices, and when it was last changed.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignerProfile {
    pub profile_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_time: Option<DateTime<Utc>>,
}

/// Return the assigner profile for the DEP name in the path. The UUID is
/// empty when none is configured.
pub(crate) async fn retrieve_assigner_profile<S>(
    State(state): State<ApiState<S>>,
    Path(name): Path<String>,
) -> Result<Json<AssignerProfile>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (profile_uuid, mod_time) = state
        .store
        .retrieve_assigner_profile(&name)
        .map_err(|e| ApiError::internal("retrieving assigner profile", e))?;
    Ok(Json(AssignerProfile { profile_uuid, mod_time }))
}

/// Store the assigner profile UUID for the DEP name in the path.
pub(crate) async fn store_assigner_profile<S>(
    State(state): State<ApiState<S>>,
    Path(name): Path<String>,
    Json(profile): Json<AssignerProfile>,
) -> Result<Json<AssignerProfile>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    if profile.profile_uuid.is_empty() {
        return Err(ApiError::bad_request("empty profile UUID"));
    }
    state
        .store
        .store_assigner_profile(&name, &profile.profile_uuid)
        .map_err(|e| ApiError::internal("storing assigner profile", e))?;
    tracing::debug!(name = %name, profile_uuid = %profile.profile_uuid, "stored assigner profile");
    Ok(Json(profile))
}
