//! MAID JWT handler.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;

use dep_crypto::new_maid_jwt;
use dep_storage::AllStorage;

use crate::{ApiError, ApiState};

#[derive(Deserialize)]
pub(crate) struct MaidQuery {
    server_uuid: Option<String>,
}

/// Return a JWT for DEP Access Management, for replying to an MDM
/// client's CheckIn "GetToken" message.
///
/// The issuer claim comes from the `server_uuid` parameter when supplied;
/// otherwise the account-detail endpoint is queried live.
pub(crate) async fn maid_jwt<S>(
    State(state): State<ApiState<S>>,
    Path(name): Path<String>,
    Query(query): Query<MaidQuery>,
) -> Result<Response, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let server_uuid = match query.server_uuid.filter(|uuid| !uuid.is_empty()) {
        Some(uuid) => uuid,
        None => state
            .client
            .account_detail(&name)
            .await
            .map_err(|e| ApiError::internal("getting account detail", e))?
            .server_uuid
            .filter(|uuid| !uuid.is_empty())
            .ok_or_else(|| ApiError::internal("validating account detail", "missing server UUID"))?,
    };

    let (_, key_pem) = state
        .store
        .retrieve_current_token_pki(&name)
        .map_err(|e| ApiError::internal("retrieving token keypair", e))?;

    let jti = uuid::Uuid::new_v4().to_string();
    let jwt = new_maid_jwt(&key_pem, &server_uuid, Utc::now(), &jti)
        .map_err(|e| ApiError::internal("creating MAID JWT", e))?;

    Ok(([(header::CONTENT_TYPE, "application/jwt")], jwt).into_response())
}
