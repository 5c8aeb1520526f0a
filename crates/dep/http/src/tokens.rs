//! OAuth1 token handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use dep_core::OAuth1Tokens;
use dep_storage::AllStorage;

use crate::{ApiError, ApiState};

/// The consumer-key guard rejection message. The guard catches an
/// accidental overwrite of an existing DEP name's tokens during a renewal;
/// a legitimately different DEP user renewing can bypass it with
/// `force=1`.
pub const CK_MISMATCH: &str = "mismatched consumer key";

#[derive(Deserialize)]
pub(crate) struct StoreTokensQuery {
    force: Option<String>,
}

/// Return the stored OAuth1 tokens for the DEP name in the path.
pub(crate) async fn retrieve_auth_tokens<S>(
    State(state): State<ApiState<S>>,
    Path(name): Path<String>,
) -> Result<Json<OAuth1Tokens>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let tokens = state
        .store
        .retrieve_auth_tokens(&name)
        .map_err(|e| ApiError::internal("retrieving auth tokens", e))?;
    Ok(Json(tokens))
}

/// Store OAuth1 tokens for the DEP name in the path.
///
/// Unless `force=1`, a non-empty previously stored consumer key must match
/// the incoming one.
pub(crate) async fn store_auth_tokens<S>(
    State(state): State<ApiState<S>>,
    Path(name): Path<String>,
    Query(query): Query<StoreTokensQuery>,
    Json(tokens): Json<OAuth1Tokens>,
) -> Result<Json<OAuth1Tokens>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    if !tokens.valid() {
        return Err(ApiError::bad_request("invalid tokens"));
    }

    let force = query.force.as_deref() == Some("1");
    if !force {
        match state.store.retrieve_auth_tokens(&name) {
            Ok(prev) if !prev.consumer_key.is_empty() && prev.consumer_key != tokens.consumer_key => {
                tracing::info!(
                    name = %name,
                    consumer_key = %tokens.consumer_key,
                    prev_consumer_key = %prev.consumer_key,
                    "checking consumer key (use force to bypass)"
                );
                return Err(ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: CK_MISMATCH.to_string(),
                });
            }
            Ok(_) => {}
            Err(e) => {
                // a missing or unreadable prior record is not a mismatch
                tracing::debug!(error = %e, "retrieving prior auth tokens; proceeding to store");
            }
        }
    }

    state
        .store
        .store_auth_tokens(&name, &tokens)
        .map_err(|e| ApiError::internal("storing auth tokens", e))?;
    tracing::debug!(name = %name, force = force, "stored auth tokens");
    Ok(Json(tokens))
}
