//! Dual-write coordinator over the local cache and remote store.
//!
//! # Responsibility
//! - Write every record to the local cache synchronously, then push it to
//!   the remote store best-effort.
//! - Read remote-first when the store is reachable, falling back to the
//!   local copy.
//!
//! # Invariants
//! - A completed local write is never blocked or reverted by a remote
//!   failure; remote failures are logged and swallowed here.
//! - Remote child reconciliation upserts all current rows before deleting
//!   orphans, so a concurrent remote reader never observes an empty child
//!   set for a record that has children.
//! - Legacy journal migration runs on every load path.

use crate::model::metrics::migrate_legacy_journal;
use crate::model::record::DailyRecord;
use crate::repo::local_cache::{CacheError, CacheResult, LocalCache};
use crate::repo::remote::{RemoteError, RemoteResult, RemoteStore};
use crate::repo::rows::{assemble_record, record_to_rows};
use chrono::NaiveDate;
use log::{info, warn};

const CACHE_KEY_PREFIX: &str = "daybook_record_";

/// Returns the local cache key for one record date.
pub fn cache_key(date: NaiveDate) -> String {
    format!("{CACHE_KEY_PREFIX}{date}")
}

/// Where a loaded record came from, or that neither side had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The remote store answered; its copy won and refreshed the cache.
    Remote(DailyRecord),
    /// The remote store was unavailable or empty; the cached copy was used.
    Local(DailyRecord),
    /// Neither side holds a record for the date.
    NotFound,
}

impl LoadOutcome {
    pub fn into_record(self) -> Option<DailyRecord> {
        match self {
            Self::Remote(record) | Self::Local(record) => Some(record),
            Self::NotFound => None,
        }
    }

    fn map_record(self, f: impl FnOnce(DailyRecord) -> DailyRecord) -> Self {
        match self {
            Self::Remote(record) => Self::Remote(f(record)),
            Self::Local(record) => Self::Local(f(record)),
            Self::NotFound => Self::NotFound,
        }
    }
}

/// Read-preference policy: the remote copy wins whenever the remote store
/// answered with data; the local copy is the fallback for remote absence
/// or failure.
pub fn prefer_remote(
    remote: RemoteResult<Option<DailyRecord>>,
    local: Option<DailyRecord>,
) -> LoadOutcome {
    match remote {
        Ok(Some(record)) => LoadOutcome::Remote(record),
        Ok(None) | Err(_) => match local {
            Some(record) => LoadOutcome::Local(record),
            None => LoadOutcome::NotFound,
        },
    }
}

/// Persistence facade coordinating one local cache and one remote store.
pub struct RecordStore<C: LocalCache, R: RemoteStore> {
    cache: C,
    remote: R,
}

impl<C: LocalCache, R: RemoteStore> RecordStore<C, R> {
    pub fn new(cache: C, remote: R) -> Self {
        Self { cache, remote }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Saves one record: local cache first and synchronously, then a
    /// best-effort remote push.
    ///
    /// # Contract
    /// - The returned result reflects the local write only; once it is
    ///   `Ok` the state is durable locally regardless of the remote.
    /// - Remote failures (including a signed-out user) are logged and
    ///   swallowed; the next save re-pushes full current state, so there
    ///   is no retry queue.
    pub fn save(&self, record: &DailyRecord) -> CacheResult<()> {
        let key = cache_key(record.date);
        let payload = serde_json::to_string(record)
            .map_err(|err| CacheError::Codec(err.to_string()))?;
        self.cache.set(&key, &payload)?;

        match self.push_remote(record) {
            Ok(()) => info!(
                "event=record_save module=persistence status=ok date={} remote=ok",
                record.date
            ),
            Err(RemoteError::AuthRequired) => info!(
                "event=record_save module=persistence status=ok date={} remote=skipped error_code=auth_required",
                record.date
            ),
            Err(err) => warn!(
                "event=record_save module=persistence status=ok date={} remote=failed error_code=remote_write_failed error={err}",
                record.date
            ),
        }

        Ok(())
    }

    /// Loads one record remote-first, falling back to the local cache.
    ///
    /// On a remote hit the local cache is overwritten with the remote copy
    /// (remote wins on read). `NotFound` means neither side has data. The
    /// legacy journal migration is applied to whichever copy is returned.
    pub fn load(&self, date: NaiveDate) -> CacheResult<LoadOutcome> {
        let remote = self.read_remote(date);
        if let Err(err) = &remote {
            match err {
                RemoteError::AuthRequired => info!(
                    "event=record_load module=persistence status=fallback date={date} error_code=auth_required"
                ),
                other => warn!(
                    "event=record_load module=persistence status=fallback date={date} error_code=remote_read_failed error={other}"
                ),
            }
        }

        // The cache is only the fallback: a cache read failure must not
        // abort a load the remote side already answered.
        let local = match &remote {
            Ok(Some(_)) => None,
            Ok(None) | Err(_) => self.load_cached(date)?,
        };
        let outcome = prefer_remote(remote, local);

        if let LoadOutcome::Remote(record) = &outcome {
            if let Err(err) = self.write_cached(record) {
                warn!(
                    "event=record_load module=persistence status=ok date={date} error_code=cache_refresh_failed error={err}"
                );
            }
        }

        Ok(outcome.map_record(migrate_legacy_journal))
    }

    /// Synchronous local-only load; never touches the remote store.
    pub fn load_local(&self, date: NaiveDate) -> CacheResult<LoadOutcome> {
        let outcome = match self.load_cached(date)? {
            Some(record) => LoadOutcome::Local(migrate_legacy_journal(record)),
            None => LoadOutcome::NotFound,
        };
        Ok(outcome)
    }

    /// Drops the locally cached copy for one date. The remote copy, if
    /// any, is untouched; deletion there is an administrative concern.
    pub fn evict_local(&self, date: NaiveDate) -> CacheResult<()> {
        self.cache.remove(&cache_key(date))
    }

    fn load_cached(&self, date: NaiveDate) -> CacheResult<Option<DailyRecord>> {
        let Some(payload) = self.cache.get(&cache_key(date))? else {
            return Ok(None);
        };
        let record = serde_json::from_str(&payload)
            .map_err(|err| CacheError::Codec(err.to_string()))?;
        Ok(Some(record))
    }

    fn write_cached(&self, record: &DailyRecord) -> CacheResult<()> {
        let payload = serde_json::to_string(record)
            .map_err(|err| CacheError::Codec(err.to_string()))?;
        self.cache.set(&cache_key(record.date), &payload)
    }

    /// Pushes full record state to the remote store.
    ///
    /// Ordering is load-bearing: the record upsert and both child upserts
    /// run to completion before either orphan delete. Collapsing this into
    /// delete-then-insert would open a window where a remote reader sees
    /// zero child rows.
    fn push_remote(&self, record: &DailyRecord) -> RemoteResult<()> {
        let Some(user_id) = self.remote.current_user_id() else {
            return Err(RemoteError::AuthRequired);
        };

        let record_id = record.record_id();
        let (record_row, task_rows, entry_rows) = record_to_rows(record, &user_id);

        self.remote.upsert_record(&record_row)?;
        self.remote.upsert_tasks(&task_rows)?;
        self.remote.upsert_journal_entries(&entry_rows)?;

        let keep_tasks: Vec<_> = record.tasks.iter().map(|task| task.id).collect();
        let keep_entries: Vec<_> = record.journal_entries.iter().map(|entry| entry.id).collect();
        self.remote
            .delete_tasks_not_in(&record_id, &user_id, &keep_tasks)?;
        self.remote
            .delete_journal_entries_not_in(&record_id, &user_id, &keep_entries)?;

        Ok(())
    }

    fn read_remote(&self, date: NaiveDate) -> RemoteResult<Option<DailyRecord>> {
        let Some(user_id) = self.remote.current_user_id() else {
            return Err(RemoteError::AuthRequired);
        };

        let record_id = date.to_string();
        let Some(record_row) = self.remote.select_record(&record_id, &user_id)? else {
            return Ok(None);
        };
        let task_rows = self.remote.select_tasks(&record_id, &user_id)?;
        let entry_rows = self.remote.select_journal_entries(&record_id, &user_id)?;

        let record = assemble_record(record_row, task_rows, entry_rows)
            .map_err(|err| RemoteError::Rejected(err.to_string()))?;
        Ok(Some(record))
    }
}
