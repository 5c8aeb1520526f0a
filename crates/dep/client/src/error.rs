//! DEP client error types.

use dep_storage::StorageError;

/// An HTTP-level error response from the DEP API. The API returns error
/// information in the response body.
#[derive(Debug, thiserror::Error)]
#[error("DEP HTTP error: {status} {status_text}: {body}")]
pub struct HttpError {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

/// Errors from DEP API calls.
#[derive(Debug, thiserror::Error)]
pub enum DepError {
    /// The DEP session could not be established (or re-established): the
    /// OAuth1 credentials were rejected.
    #[error("DEP auth error: {status}: {body}")]
    Auth { status: u16, body: String },

    /// A non-2xx response after authentication succeeded.
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("encoding body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(String),
}

impl DepError {
    /// Whether this is an HTTP error with the given status whose body
    /// contains `needle`. The DEP simulator returns the error strings with
    /// surrounding quotes, so the body is searched rather than compared.
    fn http_error_contains(&self, status: u16, needle: &str) -> bool {
        matches!(self, DepError::Http(e) if e.status == status && e.body.contains(needle))
    }

    /// A DEP "exhausted cursor" error: the fetch cursor has already
    /// returned all devices.
    pub fn is_cursor_exhausted(&self) -> bool {
        self.http_error_contains(400, "EXHAUSTED_CURSOR")
    }

    /// A DEP "invalid cursor" error.
    pub fn is_cursor_invalid(&self) -> bool {
        self.http_error_contains(400, "INVALID_CURSOR")
    }

    /// A DEP "expired cursor" error. Per Apple this indicates the cursor
    /// is older than seven days.
    pub fn is_cursor_expired(&self) -> bool {
        self.http_error_contains(400, "EXPIRED_CURSOR")
    }

    /// Whether the organization doesn't allow beta access.
    pub fn is_apple_seed_for_it_turned_off(&self) -> bool {
        self.http_error_contains(403, "APPLE_SEED_FOR_IT_TURNED_OFF")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_err(status: u16, body: &str) -> DepError {
        DepError::Http(HttpError {
            status,
            status_text: String::new(),
            body: body.to_string(),
        })
    }

    #[test]
    fn classifies_cursor_errors_by_substring() {
        // the depsim simulator wraps the strings in quotes
        assert!(http_err(400, "\"EXPIRED_CURSOR\"").is_cursor_expired());
        assert!(http_err(400, "EXHAUSTED_CURSOR").is_cursor_exhausted());
        assert!(http_err(400, "{\"error\":\"INVALID_CURSOR\"}").is_cursor_invalid());

        // wrong status code does not match
        assert!(!http_err(500, "EXPIRED_CURSOR").is_cursor_expired());
        // other error kinds never match
        assert!(!DepError::Auth { status: 401, body: "EXPIRED_CURSOR".into() }
            .is_cursor_expired());
    }

    #[test]
    fn classifies_beta_denial() {
        assert!(http_err(403, "\"APPLE_SEED_FOR_IT_TURNED_OFF\"").is_apple_seed_for_it_turned_off());
        assert!(!http_err(400, "APPLE_SEED_FOR_IT_TURNED_OFF").is_apple_seed_for_it_turned_off());
    }
}
