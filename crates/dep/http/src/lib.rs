//! DEP Admin HTTP Layer
//!
//! Axum handlers for the administrative API: token and config CRUD, the
//! token-PKI exchange, assigner profiles, DEP name listing, MAID JWTs,
//! and bypass codes. The DEP name rides as the trailing path segment.

mod albc;
mod assigner;
mod config;
mod depnames;
mod error;
mod maid;
mod middleware;
mod tokenpki;
mod tokens;
mod version;

pub use albc::BypassCodeResponse;
pub use assigner::AssignerProfile;
pub use error::{ApiError, ErrorResponse};
pub use middleware::logging_middleware;
pub use tokens::CK_MISMATCH;

use axum::routing::get;
use axum::Router;

use dep_client::{ClientStorage, DepClient};
use dep_storage::AllStorage;

/// Shared state of the admin API: the store and a DEP client over it.
pub struct ApiState<S> {
    pub store: S,
    pub client: DepClient<S>,
}

impl<S: Clone> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), client: self.client.clone() }
    }
}

impl<S: ClientStorage + Clone> ApiState<S> {
    /// Create state with a fresh DEP client reading from `store`.
    pub fn new(store: S) -> Self {
        let client = DepClient::new(store.clone());
        Self { store, client }
    }
}

/// Create the admin API router.
pub fn api_router<S>(state: ApiState<S>) -> Router
where
    S: AllStorage + Clone + 'static,
{
    Router::new()
        .route("/version", get(version::version))
        .route(
            "/v1/tokens/:name",
            get(tokens::retrieve_auth_tokens::<S>).put(tokens::store_auth_tokens::<S>),
        )
        .route(
            "/v1/config/:name",
            get(config::retrieve_config::<S>).put(config::store_config::<S>),
        )
        .route(
            "/v1/tokenpki/:name",
            get(tokenpki::get_cert::<S>).put(tokenpki::decrypt_token_pki::<S>),
        )
        .route(
            "/v1/assigner-profile/:name",
            get(assigner::retrieve_assigner_profile::<S>)
                .put(assigner::store_assigner_profile::<S>),
        )
        .route("/v1/dep-names", get(depnames::query_dep_names::<S>))
        .route("/v1/maidjwt/:name", get(maid::maid_jwt::<S>))
        .route("/v1/bypasscode", get(albc::bypass_code))
        // name-less forms of the per-name endpoints are client mistakes
        .route("/v1/tokens", get(error::missing_dep_name).put(error::missing_dep_name))
        .route("/v1/config", get(error::missing_dep_name).put(error::missing_dep_name))
        .route("/v1/tokenpki", get(error::missing_dep_name).put(error::missing_dep_name))
        .route(
            "/v1/assigner-profile",
            get(error::missing_dep_name).put(error::missing_dep_name),
        )
        .route("/v1/maidjwt", get(error::missing_dep_name))
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .with_state(state)
}
