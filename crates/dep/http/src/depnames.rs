//! DEP name listing handler.

use axum::extract::{Query, State};
use axum::Json;

use dep_storage::{
    AllStorage, DepNamesQueryFilter, DepNamesQueryRequest, DepNamesQueryResult, Pagination,
    StorageError,
};

use crate::{ApiError, ApiState};

/// Query DEP names: those with a staged certificate, optionally filtered
/// by repeated `dep_name` parameters, paginated with `limit`/`offset` or
/// an opaque `cursor`.
pub(crate) async fn query_dep_names<S>(
    State(state): State<ApiState<S>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<DepNamesQueryResult>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let mut pagination = Pagination::default();
    let mut dep_names = Vec::new();
    for (key, value) in params {
        match key.as_str() {
            "limit" => {
                pagination.limit = Some(value.parse().map_err(|e| {
                    ApiError::bad_request(format!("converting limit param: {e}"))
                })?);
            }
            "offset" => {
                pagination.offset = Some(value.parse().map_err(|e| {
                    ApiError::bad_request(format!("converting offset param: {e}"))
                })?);
            }
            "cursor" => pagination.cursor = Some(value),
            "dep_name" => dep_names.push(value),
            _ => {}
        }
    }

    let req = DepNamesQueryRequest {
        filter: Some(DepNamesQueryFilter { dep_names }),
        pagination: Some(pagination),
    };

    let result = state.store.query_dep_names(&req).map_err(|e| match e {
        StorageError::OnlyOffset | StorageError::InvalidPagination(_) => {
            ApiError::bad_request(e.to_string())
        }
        e => ApiError::internal("querying DEP names", e),
    })?;

    tracing::debug!(count = result.dep_names.len(), "queried DEP names");
    Ok(Json(result))
}
