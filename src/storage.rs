//! Storage backend selection.

use std::sync::Arc;

use color_eyre::eyre::bail;
use dep_storage::{AllStorage, FileStorage, InMemStorage, SqliteStorage};

/// Parse a storage name and DSN into a storage backend.
///
/// - `file` (the default): DSN is a directory path, default `db`
/// - `inmem`: nothing persists; DSN ignored
/// - `sqlite`: DSN is the database file path, default `depgate.db`
pub fn parse_storage(storage: &str, dsn: &str) -> color_eyre::Result<Arc<dyn AllStorage>> {
    match storage {
        "" | "file" => {
            let dsn = if dsn.is_empty() { "db" } else { dsn };
            Ok(Arc::new(FileStorage::new(dsn)?))
        }
        "inmem" => Ok(Arc::new(InMemStorage::new())),
        "sqlite" => {
            let dsn = if dsn.is_empty() { "depgate.db" } else { dsn };
            let store = SqliteStorage::new(dsn)?;
            store.run_migrations()?;
            Ok(Arc::new(store))
        }
        _ => bail!("unknown storage: {storage:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dep_storage::DepNameQuerier as _;

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(parse_storage("mongodb", "").is_err());
    }

    #[test]
    fn inmem_is_always_available() {
        let store = parse_storage("inmem", "").unwrap();
        assert!(store.query_dep_names(&Default::default()).unwrap().dep_names.is_empty());
    }
}
