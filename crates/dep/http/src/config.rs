//! Per-name config handlers.

use axum::extract::{Path, State};
use axum::Json;

use dep_core::DepConfig;
use dep_storage::AllStorage;

use crate::{ApiError, ApiState};

/// Return the stored config for the DEP name in the path; `null` when
/// none is stored.
pub(crate) async fn retrieve_config<S>(
    State(state): State<ApiState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Option<DepConfig>>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let config = state
        .store
        .retrieve_config(&name)
        .map_err(|e| ApiError::internal("retrieving config", e))?;
    Ok(Json(config))
}

/// Store (overwrite) the config for the DEP name in the path.
pub(crate) async fn store_config<S>(
    State(state): State<ApiState<S>>,
    Path(name): Path<String>,
    Json(config): Json<DepConfig>,
) -> Result<Json<DepConfig>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    if config.base_url.is_empty() {
        return Err(ApiError::bad_request("empty base URL"));
    }
    state
        .store
        .store_config(&name, &config)
        .map_err(|e| ApiError::internal("storing config", e))?;
    tracing::debug!(name = %name, base_url = %config.base_url, "stored config");
    Ok(Json(config))
}
