//! DEP name query parameters and pagination.

use serde::{Deserialize, Serialize};

use crate::StorageError;

/// Default page size for DEP name queries.
pub const DEFAULT_QUERY_LIMIT: u64 = 100;

/// Pagination for DEP name queries: either offset/limit or an opaque
/// backend cursor, never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl Pagination {
    /// Reject mixing the cursor method with offset/limit.
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.cursor.is_some() && (self.offset.is_some() || self.limit.is_some()) {
            return Err(StorageError::InvalidPagination(
                "cursor cannot be combined with offset or limit".into(),
            ));
        }
        Ok(())
    }

    /// The effective offset and limit, with `default_limit` when unset.
    pub fn offset_limit_or(&self, default_limit: u64) -> (u64, u64) {
        (self.offset.unwrap_or(0), self.limit.unwrap_or(default_limit))
    }
}

/// Filter parameters for querying DEP names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepNamesQueryFilter {
    /// When non-empty, only these DEP names are candidates.
    #[serde(default)]
    pub dep_names: Vec<String>,
}

/// Parameters for querying DEP names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepNamesQueryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<DepNamesQueryFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl DepNamesQueryRequest {
    /// Validate pagination and return the effective offset, limit, and
    /// name filter.
    pub(crate) fn offset_limit_filter(
        &self,
    ) -> Result<(u64, u64, &[String]), StorageError> {
        let pagination = self.pagination.clone().unwrap_or_default();
        pagination.validate()?;
        if pagination.cursor.is_some() {
            // no shipped backend implements cursor pagination
            return Err(StorageError::OnlyOffset);
        }
        let (offset, limit) = pagination.offset_limit_or(DEFAULT_QUERY_LIMIT);
        let filter = self
            .filter
            .as_ref()
            .map(|f| f.dep_names.as_slice())
            .unwrap_or(&[]);
        Ok((offset, limit, filter))
    }
}

/// Result of a DEP names query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepNamesQueryResult {
    pub dep_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
