//! Core engine for Daybook daily records.
//! This crate is the single source of truth for record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::content::{is_valid_content, strip_markup};
pub use model::journal::{overall_mood, sorted_by_time_desc};
pub use model::metrics::{
    can_seal, completion_rate, migrate_legacy_journal, MIN_SEALABLE_JOURNAL_LEN,
};
pub use model::record::{DailyRecord, EntryId, JournalEntry, Mood, Priority, Task, TaskId};
pub use repo::local_cache::{CacheError, CacheResult, LocalCache, SqliteLocalCache};
pub use repo::record_store::{cache_key, prefer_remote, LoadOutcome, RecordStore};
pub use repo::remote::{MemoryRemoteStore, RemoteError, RemoteResult, RemoteStore};
pub use repo::rows::{JournalEntryRow, RecordRow, TaskRow, UserId};
pub use service::day_session::DaySession;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
