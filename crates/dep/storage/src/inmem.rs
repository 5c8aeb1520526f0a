//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dep_core::{DepConfig, OAuth1Tokens};

use crate::{
    AssignerProfileStore, AuthTokenStore, ConfigStore, CursorStore, DepNameQuerier,
    DepNamesQueryRequest, DepNamesQueryResult, StorageError, TokenPkiStore,
};

#[derive(Debug, Default, Clone)]
struct Record {
    tokens: Option<OAuth1Tokens>,
    config: Option<DepConfig>,
    profile_uuid: String,
    profile_mod_time: Option<DateTime<Utc>>,
    cursor: String,
    staging_pki: Option<(Vec<u8>, Vec<u8>)>,
    current_pki: Option<(Vec<u8>, Vec<u8>)>,
}

/// In-memory storage, mostly useful for tests and experiments. Nothing
/// survives the process.
#[derive(Debug, Default)]
pub struct InMemStorage {
    records: Mutex<HashMap<String, Record>>,
}

impl InMemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, name: &str, f: impl FnOnce(Option<&Record>) -> R) -> R {
        let records = self.records.lock().expect("storage lock");
        f(records.get(name))
    }

    fn with_mut<R>(&self, name: &str, f: impl FnOnce(&mut Record) -> R) -> R {
        let mut records = self.records.lock().expect("storage lock");
        f(records.entry(name.to_string()).or_default())
    }
}

impl AuthTokenStore for InMemStorage {
    fn retrieve_auth_tokens(&self, name: &str) -> Result<OAuth1Tokens, StorageError> {
        self.with(name, |r| {
            r.and_then(|r| r.tokens.clone()).ok_or(StorageError::NotFound)
        })
    }

    fn store_auth_tokens(&self, name: &str, tokens: &OAuth1Tokens) -> Result<(), StorageError> {
        self.with_mut(name, |r| r.tokens = Some(tokens.clone()));
        Ok(())
    }
}

impl ConfigStore for InMemStorage {
    fn retrieve_config(&self, name: &str) -> Result<Option<DepConfig>, StorageError> {
        Ok(self.with(name, |r| r.and_then(|r| r.config.clone())))
    }

    fn store_config(&self, name: &str, config: &DepConfig) -> Result<(), StorageError> {
        self.with_mut(name, |r| r.config = Some(config.clone()));
        Ok(())
    }
}

impl AssignerProfileStore for InMemStorage {
    fn retrieve_assigner_profile(
        &self,
        name: &str,
    ) -> Result<(String, Option<DateTime<Utc>>), StorageError> {
        Ok(self.with(name, |r| match r {
            Some(r) => (r.profile_uuid.clone(), r.profile_mod_time),
            None => (String::new(), None),
        }))
    }

    fn store_assigner_profile(&self, name: &str, profile_uuid: &str) -> Result<(), StorageError> {
        self.with_mut(name, |r| {
            r.profile_uuid = profile_uuid.to_string();
            r.profile_mod_time = Some(Utc::now());
        });
        Ok(())
    }
}

impl CursorStore for InMemStorage {
    fn retrieve_cursor(&self, name: &str) -> Result<String, StorageError> {
        Ok(self.with(name, |r| r.map(|r| r.cursor.clone()).unwrap_or_default()))
    }

    fn store_cursor(&self, name: &str, cursor: &str) -> Result<(), StorageError> {
        self.with_mut(name, |r| r.cursor = cursor.to_string());
        Ok(())
    }
}

impl TokenPkiStore for InMemStorage {
    fn store_token_pki(
        &self,
        name: &str,
        pem_cert: &[u8],
        pem_key: &[u8],
    ) -> Result<(), StorageError> {
        self.with_mut(name, |r| {
            r.staging_pki = Some((pem_cert.to_vec(), pem_key.to_vec()));
        });
        Ok(())
    }

    fn retrieve_staging_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError> {
        self.with(name, |r| {
            r.and_then(|r| r.staging_pki.clone()).ok_or(StorageError::NotFound)
        })
    }

    fn retrieve_current_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError> {
        self.with(name, |r| {
            r.and_then(|r| r.current_pki.clone()).ok_or(StorageError::NotFound)
        })
    }

    fn upstage_token_pki(&self, name: &str) -> Result<(), StorageError> {
        self.with_mut(name, |r| match r.staging_pki.clone() {
            Some(pki) => {
                r.current_pki = Some(pki);
                Ok(())
            }
            None => Err(StorageError::NotFound),
        })
    }
}

impl DepNameQuerier for InMemStorage {
    fn query_dep_names(
        &self,
        req: &DepNamesQueryRequest,
    ) -> Result<DepNamesQueryResult, StorageError> {
        let (offset, limit, filter) = req.offset_limit_filter()?;

        let records = self.records.lock().expect("storage lock");
        let mut names: Vec<String> = records
            .iter()
            .filter(|(_, r)| r.staging_pki.is_some())
            .map(|(name, _)| name.clone())
            .filter(|name| filter.is_empty() || filter.iter().any(|f| f == name))
            .collect();
        names.sort();

        let dep_names = names
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok(DepNamesQueryResult { dep_names, next_cursor: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery;

    #[test]
    fn storage_battery() {
        let store = InMemStorage::new();
        battery::run(&store);
    }
}
