//! Filesystem storage backend.
//!
//! One directory, one file per record:
//! `<name>.tokens.json`, `<name>.config.json`, `<name>.profile.txt`,
//! `<name>.cursor.txt`, and `<name>.tokenpki.[staging.]{cert,key}.txt`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dep_core::{DepConfig, OAuth1Tokens};

use crate::{
    AssignerProfileStore, AuthTokenStore, ConfigStore, CursorStore, DepNameQuerier,
    DepNamesQueryRequest, DepNamesQueryResult, StorageError, TokenPkiStore,
};

const STAGING_CERT_SUFFIX: &str = ".tokenpki.staging.cert.txt";

/// Filesystem-backed storage for DEP services.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a new backend rooted at `path`, creating the directory if
    /// needed.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        match fs::create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !path.is_dir() {
                    return Err(StorageError::Io(std::io::Error::new(
                        ErrorKind::AlreadyExists,
                        "path is not a directory",
                    )));
                }
            }
            Err(e) => return Err(e.into()),
        }
        Ok(Self { path })
    }

    fn tokens_filename(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.tokens.json"))
    }

    fn config_filename(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.config.json"))
    }

    fn profile_filename(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.profile.txt"))
    }

    fn cursor_filename(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.cursor.txt"))
    }

    fn tokenpki_filename(&self, name: &str, kind: &str) -> PathBuf {
        self.path.join(format!("{name}.tokenpki.{kind}.txt"))
    }
}

/// Read a file, mapping a missing file to [`StorageError::NotFound`].
fn read_or_not_found(path: &Path) -> Result<Vec<u8>, StorageError> {
    match fs::read(path) {
        Ok(b) => Ok(b),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound),
        Err(e) => Err(e.into()),
    }
}

impl AuthTokenStore for FileStorage {
    fn retrieve_auth_tokens(&self, name: &str) -> Result<OAuth1Tokens, StorageError> {
        let raw = read_or_not_found(&self.tokens_filename(name))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    fn store_auth_tokens(&self, name: &str, tokens: &OAuth1Tokens) -> Result<(), StorageError> {
        Ok(fs::write(
            self.tokens_filename(name),
            serde_json::to_vec(tokens)?,
        )?)
    }
}

impl ConfigStore for FileStorage {
    fn retrieve_config(&self, name: &str) -> Result<Option<DepConfig>, StorageError> {
        match fs::read(self.config_filename(name)) {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store_config(&self, name: &str, config: &DepConfig) -> Result<(), StorageError> {
        Ok(fs::write(
            self.config_filename(name),
            serde_json::to_vec(config)?,
        )?)
    }
}

impl AssignerProfileStore for FileStorage {
    fn retrieve_assigner_profile(
        &self,
        name: &str,
    ) -> Result<(String, Option<DateTime<Utc>>), StorageError> {
        let path = self.profile_filename(name);
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            // an 'empty' profile is valid
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((String::new(), None)),
            Err(e) => return Err(e.into()),
        };
        let mod_time = fs::metadata(&path)?.modified()?;
        Ok((raw.trim().to_string(), Some(mod_time.into())))
    }

    fn store_assigner_profile(&self, name: &str, profile_uuid: &str) -> Result<(), StorageError> {
        Ok(fs::write(
            self.profile_filename(name),
            format!("{profile_uuid}\n"),
        )?)
    }
}

impl CursorStore for FileStorage {
    fn retrieve_cursor(&self, name: &str) -> Result<String, StorageError> {
        match fs::read_to_string(self.cursor_filename(name)) {
            Ok(s) => Ok(s.trim().to_string()),
            // an 'empty' cursor is valid
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store_cursor(&self, name: &str, cursor: &str) -> Result<(), StorageError> {
        Ok(fs::write(self.cursor_filename(name), format!("{cursor}\n"))?)
    }
}

impl TokenPkiStore for FileStorage {
    fn store_token_pki(
        &self,
        name: &str,
        pem_cert: &[u8],
        pem_key: &[u8],
    ) -> Result<(), StorageError> {
        fs::write(self.tokenpki_filename(name, "staging.cert"), pem_cert)?;
        fs::write(self.tokenpki_filename(name, "staging.key"), pem_key)?;
        Ok(())
    }

    fn retrieve_staging_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError> {
        Ok((
            read_or_not_found(&self.tokenpki_filename(name, "staging.cert"))?,
            read_or_not_found(&self.tokenpki_filename(name, "staging.key"))?,
        ))
    }

    fn retrieve_current_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError> {
        Ok((
            read_or_not_found(&self.tokenpki_filename(name, "cert"))?,
            read_or_not_found(&self.tokenpki_filename(name, "key"))?,
        ))
    }

    // Warning: two separate copies; not atomic.
    fn upstage_token_pki(&self, name: &str) -> Result<(), StorageError> {
        fs::copy(
            self.tokenpki_filename(name, "staging.cert"),
            self.tokenpki_filename(name, "cert"),
        )?;
        fs::copy(
            self.tokenpki_filename(name, "staging.key"),
            self.tokenpki_filename(name, "key"),
        )?;
        Ok(())
    }
}

impl DepNameQuerier for FileStorage {
    fn query_dep_names(
        &self,
        req: &DepNamesQueryRequest,
    ) -> Result<DepNamesQueryResult, StorageError> {
        let (offset, limit, filter) = req.offset_limit_filter()?;

        // a name becomes query-able once a certificate has been staged
        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let file_name = entry?.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(STAGING_CERT_SUFFIX) {
                if filter.is_empty() || filter.iter().any(|f| f == name) {
                    names.push(name.to_string());
                }
            }
        }
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
        let dir = tempfile::tempdir().unwrap();
        let store = FileStorage::new(dir.path().join("db")).unwrap();
        battery::run(&store);
    }

    #[test]
    fn new_rejects_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, b"x").unwrap();
        assert!(FileStorage::new(&file).is_err());
    }

    #[test]
    fn reopens_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        let store = FileStorage::new(&path).unwrap();
        store.store_cursor("acme", "c_123").unwrap();
        drop(store);

        let store = FileStorage::new(&path).unwrap();
        assert_eq!(store.retrieve_cursor("acme").unwrap(), "c_123");
    }
}
