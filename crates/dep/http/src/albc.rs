//! Bypass code utility handler.

use axum::extract::Query;
use axum::Json;
use dep_albc::BypassCode;
use serde::{Deserialize, Serialize};

use crate::ApiError;

#[derive(Deserialize)]
pub(crate) struct BypassCodeQuery {
    raw: Option<String>,
    code: Option<String>,
}

/// All three forms of one bypass code.
#[derive(Debug, Serialize, Deserialize)]
pub struct BypassCodeResponse {
    /// Hex encoded raw form.
    pub raw: String,
    /// Dash-separated "human readable" form.
    pub code: String,
    /// PBKDF2 derived hash.
    pub hash: String,
}

/// Convert between bypass code forms: from `raw` hex, from a `code`
/// string, or a newly generated random code when neither is given.
pub(crate) async fn bypass_code(
    Query(query): Query<BypassCodeQuery>,
) -> Result<Json<BypassCodeResponse>, ApiError> {
    let raw = query.raw.filter(|raw| !raw.is_empty());
    let code = query.code.filter(|code| !code.is_empty());

    let bc = match (raw, code) {
        (Some(_), Some(_)) => {
            return Err(ApiError::bad_request("raw or code but not both"));
        }
        (None, None) => BypassCode::new(),
        (Some(raw), None) => {
            let bytes = hex::decode(&raw)
                .map_err(|e| ApiError::bad_request(format!("decoding raw: {e}")))?;
            BypassCode::from_bytes(&bytes)
                .map_err(|e| ApiError::bad_request(e.to_string()))?
        }
        (None, Some(code)) => BypassCode::from_code(&code)
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
    };

    Ok(Json(BypassCodeResponse {
        raw: hex::encode(bc.as_bytes()),
        code: bc.code(),
        hash: bc.hash(),
    }))
}
