//! Storage traits.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dep_core::{DepConfig, OAuth1Tokens};

use crate::{DepNamesQueryRequest, DepNamesQueryResult, StorageError};

/// OAuth1 token storage operations.
pub trait AuthTokenStore: Send + Sync {
    /// Retrieve the OAuth tokens for a DEP name. [`StorageError::NotFound`]
    /// when no tokens have been stored.
    fn retrieve_auth_tokens(&self, name: &str) -> Result<OAuth1Tokens, StorageError>;

    /// Store (overwrite) the OAuth tokens for a DEP name.
    fn store_auth_tokens(&self, name: &str, tokens: &OAuth1Tokens) -> Result<(), StorageError>;
}

/// Per-name client configuration storage.
pub trait ConfigStore: Send + Sync {
    /// Retrieve the config for a DEP name. `None` (not an error) when the
    /// name or config does not exist.
    fn retrieve_config(&self, name: &str) -> Result<Option<DepConfig>, StorageError>;

    /// Store (overwrite) the config for a DEP name.
    fn store_config(&self, name: &str, config: &DepConfig) -> Result<(), StorageError>;
}

/// Assigner profile UUID storage.
pub trait AssignerProfileStore: Send + Sync {
    /// Retrieve the assigner profile UUID and its modification time for a
    /// DEP name. An absent profile is an empty UUID, never an error.
    fn retrieve_assigner_profile(
        &self,
        name: &str,
    ) -> Result<(String, Option<DateTime<Utc>>), StorageError>;

    /// Store the assigner profile UUID for a DEP name; the modification
    /// time is set to now.
    fn store_assigner_profile(&self, name: &str, profile_uuid: &str) -> Result<(), StorageError>;
}

/// Device sync cursor storage.
pub trait CursorStore: Send + Sync {
    /// Retrieve the sync cursor for a DEP name. An absent cursor is an
    /// empty string, never an error.
    fn retrieve_cursor(&self, name: &str) -> Result<String, StorageError>;

    /// Store the sync cursor for a DEP name.
    fn store_cursor(&self, name: &str, cursor: &str) -> Result<(), StorageError>;
}

/// Token-exchange PKI storage: a staging slot overwritten on every
/// certificate request and a current slot promoted on successful
/// token-bundle decryption.
pub trait TokenPkiStore: Send + Sync {
    /// Store PEM cert and key bytes into the staging slot.
    fn store_token_pki(
        &self,
        name: &str,
        pem_cert: &[u8],
        pem_key: &[u8],
    ) -> Result<(), StorageError>;

    /// Retrieve the staging PEM cert and key.
    fn retrieve_staging_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError>;

    /// Retrieve the current (previously upstaged) PEM cert and key.
    fn retrieve_current_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError>;

    /// Copy the staging slot over the current slot.
    ///
    /// Warning: not atomic on every backend; a crash mid-upstage is
    /// recovered by re-posting the token bundle.
    fn upstage_token_pki(&self, name: &str) -> Result<(), StorageError>;
}

/// DEP name listing.
pub trait DepNameQuerier: Send + Sync {
    /// Query DEP names for which a staging certificate has been stored.
    /// Backends without cursor pagination return
    /// [`StorageError::OnlyOffset`] when a cursor is supplied.
    fn query_dep_names(
        &self,
        req: &DepNamesQueryRequest,
    ) -> Result<DepNamesQueryResult, StorageError>;
}

/// Combined storage trait.
pub trait AllStorage:
    AuthTokenStore + ConfigStore + AssignerProfileStore + CursorStore + TokenPkiStore + DepNameQuerier
{
}

impl<T> AllStorage for T where
    T: AuthTokenStore
        + ConfigStore
        + AssignerProfileStore
        + CursorStore
        + TokenPkiStore
        + DepNameQuerier
{
}

// Delegation through Arc so binaries can select a backend at runtime and
// hand an Arc<dyn AllStorage> to the generic handlers.

impl<T: AuthTokenStore + ?Sized> AuthTokenStore for Arc<T> {
    fn retrieve_auth_tokens(&self, name: &str) -> Result<OAuth1Tokens, StorageError> {
        (**self).retrieve_auth_tokens(name)
    }
    fn store_auth_tokens(&self, name: &str, tokens: &OAuth1Tokens) -> Result<(), StorageError> {
        (**self).store_auth_tokens(name, tokens)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn retrieve_config(&self, name: &str) -> Result<Option<DepConfig>, StorageError> {
        (**self).retrieve_config(name)
    }
    fn store_config(&self, name: &str, config: &DepConfig) -> Result<(), StorageError> {
        (**self).store_config(name, config)
    }
}

impl<T: AssignerProfileStore + ?Sized> AssignerProfileStore for Arc<T> {
    fn retrieve_assigner_profile(
        &self,
        name: &str,
    ) -> Result<(String, Option<DateTime<Utc>>), StorageError> {
        (**self).retrieve_assigner_profile(name)
    }
    fn store_assigner_profile(&self, name: &str, profile_uuid: &str) -> Result<(), StorageError> {
        (**self).store_assigner_profile(name, profile_uuid)
    }
}

impl<T: CursorStore + ?Sized> CursorStore for Arc<T> {
    fn retrieve_cursor(&self, name: &str) -> Result<String, StorageError> {
        (**self).retrieve_cursor(name)
    }
    fn store_cursor(&self, name: &str, cursor: &str) -> Result<(), StorageError> {
        (**self).store_cursor(name, cursor)
    }
}

impl<T: TokenPkiStore + ?Sized> TokenPkiStore for Arc<T> {
    fn store_token_pki(
        &self,
        name: &str,
        pem_cert: &[u8],
        pem_key: &[u8],
    ) -> Result<(), StorageError> {
        (**self).store_token_pki(name, pem_cert, pem_key)
    }
    fn retrieve_staging_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError> {
        (**self).retrieve_staging_token_pki(name)
    }
    fn retrieve_current_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError> {
        (**self).retrieve_current_token_pki(name)
    }
    fn upstage_token_pki(&self, name: &str) -> Result<(), StorageError> {
        (**self).upstage_token_pki(name)
    }
}

impl<T: DepNameQuerier + ?Sized> DepNameQuerier for Arc<T> {
    fn query_dep_names(
        &self,
        req: &DepNamesQueryRequest,
    ) -> Result<DepNamesQueryResult, StorageError> {
        (**self).query_dep_names(req)
    }
}
