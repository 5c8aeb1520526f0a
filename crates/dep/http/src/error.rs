//! JSON error rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// The error body every failed admin call renders.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An admin API failure: 500 by default, 4xx where the handler classified
/// the caller's mistake.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// A server-side failure; logged with its handler context.
    pub(crate) fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::info!(error = %err, "{}", context);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::info!(error = %message, "bad request");
        Self { status: StatusCode::BAD_REQUEST, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

/// Handler for the name-less forms of per-name endpoints.
pub(crate) async fn missing_dep_name() -> ApiError {
    ApiError::bad_request("missing DEP name")
}
