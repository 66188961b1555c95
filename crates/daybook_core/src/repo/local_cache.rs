//! Local cache port and SQLite implementation.
//!
//! # Responsibility
//! - Provide the fast, always-available key-value side of the dual write.
//! - Model the quota-exceeded failure mode of constrained client storage.
//!
//! # Invariants
//! - `set` either stores the full value or fails with no partial write.
//! - Cache failures surface to the immediate caller; they are never
//!   swallowed the way remote failures are.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for one cached value, roughly a browser localStorage quota.
pub const DEFAULT_VALUE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub type CacheResult<T> = Result<T, CacheError>;

/// Local cache failure taxonomy.
#[derive(Debug)]
pub enum CacheError {
    /// The value exceeds the configured per-value quota.
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },
    /// A cached payload (or a payload to cache) failed JSON conversion.
    Codec(String),
    /// The underlying storage rejected the operation.
    Storage(DbError),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded { key, size, quota } => write!(
                f,
                "cache value for `{key}` is {size} bytes, over the {quota} byte quota"
            ),
            Self::Codec(message) => write!(f, "cache payload codec failure: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for CacheError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for CacheError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// Key-value port for the local side of the dual write.
pub trait LocalCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> CacheResult<()>;
    fn remove(&self, key: &str) -> CacheResult<()>;
}

impl<T: LocalCache + ?Sized> LocalCache for &T {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        (**self).remove(key)
    }
}

/// SQLite-backed local cache over the `record_cache` table.
pub struct SqliteLocalCache<'conn> {
    conn: &'conn Connection,
    value_quota_bytes: usize,
}

impl<'conn> SqliteLocalCache<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_quota(conn, DEFAULT_VALUE_QUOTA_BYTES)
    }

    /// Creates a cache with an explicit per-value quota, mainly for tests
    /// exercising the quota-exceeded path.
    pub fn with_quota(conn: &'conn Connection, value_quota_bytes: usize) -> Self {
        Self {
            conn,
            value_quota_bytes,
        }
    }
}

impl LocalCache for SqliteLocalCache<'_> {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM record_cache WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        if value.len() > self.value_quota_bytes {
            return Err(CacheError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                quota: self.value_quota_bytes,
            });
        }

        self.conn.execute(
            "INSERT INTO record_cache (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        self.conn
            .execute("DELETE FROM record_cache WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheError, LocalCache, SqliteLocalCache};
    use crate::db::open_db_in_memory;

    #[test]
    fn set_get_remove_round_trip() {
        let conn = open_db_in_memory().expect("in-memory db");
        let cache = SqliteLocalCache::new(&conn);

        assert_eq!(cache.get("k").expect("get"), None);
        cache.set("k", "v1").expect("set");
        assert_eq!(cache.get("k").expect("get").as_deref(), Some("v1"));

        cache.set("k", "v2").expect("overwrite");
        assert_eq!(cache.get("k").expect("get").as_deref(), Some("v2"));

        cache.remove("k").expect("remove");
        assert_eq!(cache.get("k").expect("get"), None);
        // Removing an absent key stays idempotent.
        cache.remove("k").expect("remove again");
    }

    #[test]
    fn oversized_value_fails_with_quota_error() {
        let conn = open_db_in_memory().expect("in-memory db");
        let cache = SqliteLocalCache::with_quota(&conn, 8);

        let err = cache.set("k", "123456789").unwrap_err();
        assert!(matches!(err, CacheError::QuotaExceeded { size: 9, .. }));
        assert_eq!(cache.get("k").expect("get"), None);
    }
}
