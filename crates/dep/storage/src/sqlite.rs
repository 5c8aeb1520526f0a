//! SQLite storage backend.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use dep_core::{DepConfig, OAuth1Tokens};

use crate::schema::dep_names;
use crate::{
    AssignerProfileStore, AuthTokenStore, ConfigStore, CursorStore, DepNameQuerier,
    DepNamesQueryRequest, DepNamesQueryResult, StorageError, TokenPkiStore,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// SQLite-backed storage. A single `dep_names` row carries every record
/// slot for one DEP name.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage from a database URL (a file path).
    pub fn new(database_url: &str) -> Result<Self, StorageError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Run pending migrations.
    pub fn run_migrations(&self) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    fn conn(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, StorageError> {
        self.pool.get().map_err(|e| StorageError::Database(e.to_string()))
    }
}

impl AuthTokenStore for SqliteStorage {
    fn retrieve_auth_tokens(&self, name: &str) -> Result<OAuth1Tokens, StorageError> {
        let mut conn = self.conn()?;

        type Row = (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<chrono::NaiveDateTime>,
        );
        let row: Option<Row> = dep_names::table
            .filter(dep_names::name.eq(name))
            .select((
                dep_names::consumer_key,
                dep_names::consumer_secret,
                dep_names::access_token,
                dep_names::access_secret,
                dep_names::access_token_expiry,
            ))
            .first(&mut conn)
            .optional()?;

        match row {
            Some((Some(ck), cs, at, asec, expiry)) => Ok(OAuth1Tokens {
                consumer_key: ck,
                consumer_secret: cs.unwrap_or_default(),
                access_token: at.unwrap_or_default(),
                access_secret: asec.unwrap_or_default(),
                access_token_expiry: DateTime::from_naive_utc_and_offset(
                    expiry.unwrap_or_default(),
                    Utc,
                ),
            }),
            // row exists without tokens, or no row at all
            _ => Err(StorageError::NotFound),
        }
    }

    fn store_auth_tokens(&self, name: &str, tokens: &OAuth1Tokens) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let expiry = tokens.access_token_expiry.naive_utc();

        diesel::insert_into(dep_names::table)
            .values((
                dep_names::name.eq(name),
                dep_names::consumer_key.eq(&tokens.consumer_key),
                dep_names::consumer_secret.eq(&tokens.consumer_secret),
                dep_names::access_token.eq(&tokens.access_token),
                dep_names::access_secret.eq(&tokens.access_secret),
                dep_names::access_token_expiry.eq(expiry),
            ))
            .on_conflict(dep_names::name)
            .do_update()
            .set((
                dep_names::consumer_key.eq(&tokens.consumer_key),
                dep_names::consumer_secret.eq(&tokens.consumer_secret),
                dep_names::access_token.eq(&tokens.access_token),
                dep_names::access_secret.eq(&tokens.access_secret),
                dep_names::access_token_expiry.eq(expiry),
            ))
            .execute(&mut conn)?;
        Ok(())
    }
}

impl ConfigStore for SqliteStorage {
    fn retrieve_config(&self, name: &str) -> Result<Option<DepConfig>, StorageError> {
        let mut conn = self.conn()?;

        let row: Option<Option<String>> = dep_names::table
            .filter(dep_names::name.eq(name))
            .select(dep_names::config_base_url)
            .first(&mut conn)
            .optional()?;

        Ok(row.flatten().map(|base_url| DepConfig { base_url }))
    }

    fn store_config(&self, name: &str, config: &DepConfig) -> Result<(), StorageError> {
        let mut conn = self.conn()?;

        diesel::insert_into(dep_names::table)
            .values((
                dep_names::name.eq(name),
                dep_names::config_base_url.eq(&config.base_url),
            ))
            .on_conflict(dep_names::name)
            .do_update()
            .set(dep_names::config_base_url.eq(&config.base_url))
            .execute(&mut conn)?;
        Ok(())
    }
}

impl AssignerProfileStore for SqliteStorage {
    fn retrieve_assigner_profile(
        &self,
        name: &str,
    ) -> Result<(String, Option<DateTime<Utc>>), StorageError> {
        let mut conn = self.conn()?;

        let row: Option<(Option<String>, Option<chrono::NaiveDateTime>)> = dep_names::table
            .filter(dep_names::name.eq(name))
            .select((
                dep_names::assigner_profile_uuid,
                dep_names::assigner_profile_uuid_at,
            ))
            .first(&mut conn)
            .optional()?;

        // an 'empty' profile is valid
        let Some((uuid, at)) = row else {
            return Ok((String::new(), None));
        };
        Ok((
            uuid.unwrap_or_default(),
            at.map(|t| DateTime::from_naive_utc_and_offset(t, Utc)),
        ))
    }

    fn store_assigner_profile(&self, name: &str, profile_uuid: &str) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        diesel::insert_into(dep_names::table)
            .values((
                dep_names::name.eq(name),
                dep_names::assigner_profile_uuid.eq(profile_uuid),
                dep_names::assigner_profile_uuid_at.eq(now),
            ))
            .on_conflict(dep_names::name)
            .do_update()
            .set((
                dep_names::assigner_profile_uuid.eq(profile_uuid),
                dep_names::assigner_profile_uuid_at.eq(now),
            ))
            .execute(&mut conn)?;
        Ok(())
    }
}

impl CursorStore for SqliteStorage {
    fn retrieve_cursor(&self, name: &str) -> Result<String, StorageError> {
        let mut conn = self.conn()?;

        let row: Option<Option<String>> = dep_names::table
            .filter(dep_names::name.eq(name))
            .select(dep_names::syncer_cursor)
            .first(&mut conn)
            .optional()?;

        // an 'empty' cursor is valid
        Ok(row.flatten().unwrap_or_default())
    }

    fn store_cursor(&self, name: &str, cursor: &str) -> Result<(), StorageError> {
        let mut conn = self.conn()?;

        diesel::insert_into(dep_names::table)
            .values((dep_names::name.eq(name), dep_names::syncer_cursor.eq(cursor)))
            .on_conflict(dep_names::name)
            .do_update()
            .set(dep_names::syncer_cursor.eq(cursor))
            .execute(&mut conn)?;
        Ok(())
    }
}

impl TokenPkiStore for SqliteStorage {
    fn store_token_pki(
        &self,
        name: &str,
        pem_cert: &[u8],
        pem_key: &[u8],
    ) -> Result<(), StorageError> {
        let mut conn = self.conn()?;

        diesel::insert_into(dep_names::table)
            .values((
                dep_names::name.eq(name),
                dep_names::tokenpki_staging_cert_pem.eq(pem_cert),
                dep_names::tokenpki_staging_key_pem.eq(pem_key),
            ))
            .on_conflict(dep_names::name)
            .do_update()
            .set((
                dep_names::tokenpki_staging_cert_pem.eq(pem_cert),
                dep_names::tokenpki_staging_key_pem.eq(pem_key),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    fn retrieve_staging_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError> {
        let mut conn = self.conn()?;

        let row: Option<(Option<Vec<u8>>, Option<Vec<u8>>)> = dep_names::table
            .filter(dep_names::name.eq(name))
            .select((
                dep_names::tokenpki_staging_cert_pem,
                dep_names::tokenpki_staging_key_pem,
            ))
            .first(&mut conn)
            .optional()?;

        match row {
            Some((Some(cert), Some(key))) => Ok((cert, key)),
            _ => Err(StorageError::NotFound),
        }
    }

    fn retrieve_current_token_pki(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StorageError> {
        let mut conn = self.conn()?;

        let row: Option<(Option<Vec<u8>>, Option<Vec<u8>>)> = dep_names::table
            .filter(dep_names::name.eq(name))
            .select((dep_names::tokenpki_cert_pem, dep_names::tokenpki_key_pem))
            .first(&mut conn)
            .optional()?;

        match row {
            Some((Some(cert), Some(key))) => Ok((cert, key)),
            _ => Err(StorageError::NotFound),
        }
    }

    fn upstage_token_pki(&self, name: &str) -> Result<(), StorageError> {
        let mut conn = self.conn()?;

        let updated = diesel::update(dep_names::table.filter(dep_names::name.eq(name)))
            .set((
                dep_names::tokenpki_cert_pem.eq(dep_names::tokenpki_staging_cert_pem),
                dep_names::tokenpki_key_pem.eq(dep_names::tokenpki_staging_key_pem),
            ))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

impl DepNameQuerier for SqliteStorage {
    fn query_dep_names(
        &self,
        req: &DepNamesQueryRequest,
    ) -> Result<DepNamesQueryResult, StorageError> {
        let (offset, limit, filter) = req.offset_limit_filter()?;
        let mut conn = self.conn()?;

        let mut query = dep_names::table
            .filter(dep_names::tokenpki_staging_cert_pem.is_not_null())
            .into_boxed();
        if !filter.is_empty() {
            query = query.filter(dep_names::name.eq_any(filter));
        }

        let names = query
            .select(dep_names::name)
            .order(dep_names::name.asc())
            .offset(offset as i64)
            .limit(limit as i64)
            .load(&mut conn)?;

        Ok(DepNamesQueryResult { dep_names: names, next_cursor: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery;

    #[test]
    fn storage_battery() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("test.db");
        let store = SqliteStorage::new(url.to_str().unwrap()).unwrap();
        store.run_migrations().unwrap();
        battery::run(&store);
    }
}
