//! Version endpoint.

use axum::Json;

/// Report the running version.
pub(crate) async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }))
}
