//! Remote store port and in-memory reference implementation.
//!
//! # Responsibility
//! - Define the authoritative, user-scoped remote contract the dual-write
//!   coordinator pushes to and reads from.
//! - Provide an in-memory implementation for tests and offline development,
//!   with failure injection and an operation log.
//!
//! # Invariants
//! - Every row carries `user_id` and every query filters by it; this is
//!   the only isolation boundary between users.
//! - Write and read failures are reported, never masked, so the
//!   coordinator can decide what to swallow.

use crate::model::record::{EntryId, TaskId};
use crate::repo::rows::{JournalEntryRow, RecordRow, TaskRow, UserId};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote store failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No authenticated user; remote calls must short-circuit.
    AuthRequired,
    /// The store could not be reached.
    Unreachable(String),
    /// The store reached but refused the operation, or returned rows the
    /// engine cannot accept.
    Rejected(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "remote operation requires an authenticated user"),
            Self::Unreachable(message) => write!(f, "remote store unreachable: {message}"),
            Self::Rejected(message) => write!(f, "remote store rejected operation: {message}"),
        }
    }
}

impl Error for RemoteError {}

/// Row-level, user-scoped contract of the authoritative remote store.
pub trait RemoteStore {
    /// Returns the authenticated user, or `None` when signed out.
    fn current_user_id(&self) -> Option<UserId>;

    fn upsert_record(&self, row: &RecordRow) -> RemoteResult<()>;
    fn upsert_tasks(&self, rows: &[TaskRow]) -> RemoteResult<()>;
    fn upsert_journal_entries(&self, rows: &[JournalEntryRow]) -> RemoteResult<()>;

    /// Deletes this record's remote task rows whose id is not in `keep`.
    fn delete_tasks_not_in(
        &self,
        record_id: &str,
        user_id: &str,
        keep: &[TaskId],
    ) -> RemoteResult<()>;

    /// Deletes this record's remote entry rows whose id is not in `keep`.
    fn delete_journal_entries_not_in(
        &self,
        record_id: &str,
        user_id: &str,
        keep: &[EntryId],
    ) -> RemoteResult<()>;

    fn select_record(&self, record_id: &str, user_id: &str) -> RemoteResult<Option<RecordRow>>;

    /// Returns task rows ordered by `sort_order`.
    fn select_tasks(&self, record_id: &str, user_id: &str) -> RemoteResult<Vec<TaskRow>>;

    /// Returns entry rows ordered ascending by `created_at`.
    fn select_journal_entries(
        &self,
        record_id: &str,
        user_id: &str,
    ) -> RemoteResult<Vec<JournalEntryRow>>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for &T {
    fn current_user_id(&self) -> Option<UserId> {
        (**self).current_user_id()
    }

    fn upsert_record(&self, row: &RecordRow) -> RemoteResult<()> {
        (**self).upsert_record(row)
    }

    fn upsert_tasks(&self, rows: &[TaskRow]) -> RemoteResult<()> {
        (**self).upsert_tasks(rows)
    }

    fn upsert_journal_entries(&self, rows: &[JournalEntryRow]) -> RemoteResult<()> {
        (**self).upsert_journal_entries(rows)
    }

    fn delete_tasks_not_in(
        &self,
        record_id: &str,
        user_id: &str,
        keep: &[TaskId],
    ) -> RemoteResult<()> {
        (**self).delete_tasks_not_in(record_id, user_id, keep)
    }

    fn delete_journal_entries_not_in(
        &self,
        record_id: &str,
        user_id: &str,
        keep: &[EntryId],
    ) -> RemoteResult<()> {
        (**self).delete_journal_entries_not_in(record_id, user_id, keep)
    }

    fn select_record(&self, record_id: &str, user_id: &str) -> RemoteResult<Option<RecordRow>> {
        (**self).select_record(record_id, user_id)
    }

    fn select_tasks(&self, record_id: &str, user_id: &str) -> RemoteResult<Vec<TaskRow>> {
        (**self).select_tasks(record_id, user_id)
    }

    fn select_journal_entries(
        &self,
        record_id: &str,
        user_id: &str,
    ) -> RemoteResult<Vec<JournalEntryRow>> {
        (**self).select_journal_entries(record_id, user_id)
    }
}

#[derive(Default)]
struct MemoryRemoteState {
    user_id: Option<UserId>,
    records: BTreeMap<(UserId, String), RecordRow>,
    tasks: Vec<TaskRow>,
    entries: Vec<JournalEntryRow>,
    op_log: Vec<String>,
    fail_writes: bool,
    fail_reads: bool,
}

/// In-memory remote store used by tests and offline development.
///
/// Records every operation name in an op log so callers can assert
/// ordering (upserts strictly before orphan deletes), and supports
/// injecting unreachable-store failures per direction.
#[derive(Default)]
pub struct MemoryRemoteStore {
    state: Mutex<MemoryRemoteState>,
}

impl MemoryRemoteStore {
    /// Creates a store authenticated as `user_id`.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        let store = Self::default();
        store.lock().user_id = Some(user_id.into());
        store
    }

    /// Creates a signed-out store; every push must short-circuit on it.
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Returns the names of all operations executed so far, in order.
    pub fn op_log(&self) -> Vec<String> {
        self.lock().op_log.clone()
    }

    /// Returns task rows currently held for one record, unordered.
    pub fn stored_tasks(&self, record_id: &str) -> Vec<TaskRow> {
        self.lock()
            .tasks
            .iter()
            .filter(|row| row.record_id == record_id)
            .cloned()
            .collect()
    }

    /// Returns entry rows currently held for one record, unordered.
    pub fn stored_entries(&self, record_id: &str) -> Vec<JournalEntryRow> {
        self.lock()
            .entries
            .iter()
            .filter(|row| row.record_id == record_id)
            .cloned()
            .collect()
    }

    /// Returns the record row currently held for `record_id`, if any.
    pub fn stored_record(&self, record_id: &str, user_id: &str) -> Option<RecordRow> {
        self.lock()
            .records
            .get(&(user_id.to_string(), record_id.to_string()))
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryRemoteState> {
        // Mutex poisoning only happens if a holder panicked mid-test.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(state: &mut MemoryRemoteState, op: &str) -> RemoteResult<()> {
        state.op_log.push(op.to_string());
        if state.fail_writes {
            return Err(RemoteError::Unreachable(format!("injected failure in {op}")));
        }
        Ok(())
    }

    fn read_guard(state: &mut MemoryRemoteState, op: &str) -> RemoteResult<()> {
        state.op_log.push(op.to_string());
        if state.fail_reads {
            return Err(RemoteError::Unreachable(format!("injected failure in {op}")));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn current_user_id(&self) -> Option<UserId> {
        self.lock().user_id.clone()
    }

    fn upsert_record(&self, row: &RecordRow) -> RemoteResult<()> {
        let mut state = self.lock();
        Self::write_guard(&mut state, "upsert_record")?;
        state
            .records
            .insert((row.user_id.clone(), row.id.clone()), row.clone());
        Ok(())
    }

    fn upsert_tasks(&self, rows: &[TaskRow]) -> RemoteResult<()> {
        let mut state = self.lock();
        Self::write_guard(&mut state, "upsert_tasks")?;
        for row in rows {
            match state.tasks.iter_mut().find(|held| held.id == row.id) {
                Some(held) => *held = row.clone(),
                None => state.tasks.push(row.clone()),
            }
        }
        Ok(())
    }

    fn upsert_journal_entries(&self, rows: &[JournalEntryRow]) -> RemoteResult<()> {
        let mut state = self.lock();
        Self::write_guard(&mut state, "upsert_journal_entries")?;
        for row in rows {
            match state.entries.iter_mut().find(|held| held.id == row.id) {
                Some(held) => *held = row.clone(),
                None => state.entries.push(row.clone()),
            }
        }
        Ok(())
    }

    fn delete_tasks_not_in(
        &self,
        record_id: &str,
        user_id: &str,
        keep: &[TaskId],
    ) -> RemoteResult<()> {
        let mut state = self.lock();
        Self::write_guard(&mut state, "delete_tasks_not_in")?;
        state.tasks.retain(|row| {
            row.record_id != record_id || row.user_id != user_id || keep.contains(&row.id)
        });
        Ok(())
    }

    fn delete_journal_entries_not_in(
        &self,
        record_id: &str,
        user_id: &str,
        keep: &[EntryId],
    ) -> RemoteResult<()> {
        let mut state = self.lock();
        Self::write_guard(&mut state, "delete_journal_entries_not_in")?;
        state.entries.retain(|row| {
            row.record_id != record_id || row.user_id != user_id || keep.contains(&row.id)
        });
        Ok(())
    }

    fn select_record(&self, record_id: &str, user_id: &str) -> RemoteResult<Option<RecordRow>> {
        let mut state = self.lock();
        Self::read_guard(&mut state, "select_record")?;
        Ok(state
            .records
            .get(&(user_id.to_string(), record_id.to_string()))
            .cloned())
    }

    fn select_tasks(&self, record_id: &str, user_id: &str) -> RemoteResult<Vec<TaskRow>> {
        let mut state = self.lock();
        Self::read_guard(&mut state, "select_tasks")?;
        let mut rows: Vec<TaskRow> = state
            .tasks
            .iter()
            .filter(|row| row.record_id == record_id && row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.sort_order);
        Ok(rows)
    }

    fn select_journal_entries(
        &self,
        record_id: &str,
        user_id: &str,
    ) -> RemoteResult<Vec<JournalEntryRow>> {
        let mut state = self.lock();
        Self::read_guard(&mut state, "select_journal_entries")?;
        let mut rows: Vec<JournalEntryRow> = state
            .entries
            .iter()
            .filter(|row| row.record_id == record_id && row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }
}
