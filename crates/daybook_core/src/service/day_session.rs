//! Daily record session context.
//!
//! # Responsibility
//! - Own the single "current" record for a date and expose the engine
//!   operations on it.
//! - Enforce seal eligibility before the seal transition.
//! - Persist after every successful mutation through the record store.
//!
//! # Invariants
//! - Exactly one record is current per session; `switch_date` replaces it,
//!   `close` ends the session (logout).
//! - A rejected mutation never triggers a save.
//! - Save results reflect the local cache only; remote outcomes are the
//!   record store's concern.

use crate::model::metrics::can_seal;
use crate::model::record::{DailyRecord, EntryId, Mood, Priority, TaskId};
use crate::repo::local_cache::{CacheResult, LocalCache};
use crate::repo::record_store::RecordStore;
use crate::repo::remote::RemoteStore;
use chrono::NaiveDate;
use log::info;

/// Explicit session context replacing any ambient "current record" state.
///
/// Lifecycle: [`DaySession::open`] on date load, [`DaySession::switch_date`]
/// on date change, [`DaySession::close`] on logout.
pub struct DaySession<C: LocalCache, R: RemoteStore> {
    store: RecordStore<C, R>,
    record: DailyRecord,
}

impl<C: LocalCache, R: RemoteStore> DaySession<C, R> {
    /// Opens a session on one date, loading the stored record or creating
    /// an empty open one on first access.
    ///
    /// The freshly created record is not persisted until its first
    /// successful mutation.
    pub fn open(store: RecordStore<C, R>, date: NaiveDate) -> CacheResult<Self> {
        let record = store
            .load(date)?
            .into_record()
            .unwrap_or_else(|| DailyRecord::new(date));
        info!("event=session_open module=service status=ok date={date}");
        Ok(Self { store, record })
    }

    /// Replaces the current record with the one for `date`.
    ///
    /// The previous record needs no flush here: every successful mutation
    /// already saved it.
    pub fn switch_date(&mut self, date: NaiveDate) -> CacheResult<()> {
        self.record = self
            .store
            .load(date)?
            .into_record()
            .unwrap_or_else(|| DailyRecord::new(date));
        info!("event=session_switch module=service status=ok date={date}");
        Ok(())
    }

    /// Ends the session, handing the persistence facade back to the caller.
    pub fn close(self) -> RecordStore<C, R> {
        info!(
            "event=session_close module=service status=ok date={}",
            self.record.date
        );
        self.store
    }

    pub fn record(&self) -> &DailyRecord {
        &self.record
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn store(&self) -> &RecordStore<C, R> {
        &self.store
    }

    // Task collection ------------------------------------------------------

    /// Adds a task; `Ok(None)` is a validation or seal rejection.
    pub fn add_task(
        &mut self,
        description: &str,
        priority: Priority,
        tags: Vec<String>,
    ) -> CacheResult<Option<TaskId>> {
        let id = self.record.add_task(description, priority, tags);
        if id.is_some() {
            self.persist()?;
        }
        Ok(id)
    }

    pub fn remove_task(&mut self, id: TaskId) -> CacheResult<bool> {
        let removed = self.record.remove_task(id);
        self.persist_if(removed)
    }

    pub fn toggle_task(&mut self, id: TaskId) -> CacheResult<bool> {
        let toggled = self.record.toggle_task(id);
        self.persist_if(toggled)
    }

    pub fn reorder_tasks(&mut self, new_sequence: &[TaskId]) -> CacheResult<bool> {
        let reordered = self.record.reorder_tasks(new_sequence);
        self.persist_if(reordered)
    }

    /// Applies completion updates in one pass; returns how many applied.
    pub fn batch_toggle(&mut self, updates: &[(TaskId, bool)]) -> CacheResult<usize> {
        let applied = self.record.batch_toggle(updates);
        if applied > 0 {
            self.persist()?;
        }
        Ok(applied)
    }

    // Journal collection ---------------------------------------------------

    /// Adds a journal entry; `Ok(None)` is a validation or seal rejection.
    pub fn add_entry(&mut self, content: &str, mood: Option<Mood>) -> CacheResult<Option<EntryId>> {
        let id = self.record.add_entry(content, mood).map(|entry| entry.id);
        if id.is_some() {
            self.persist()?;
        }
        Ok(id)
    }

    pub fn edit_entry(&mut self, id: EntryId, content: &str) -> CacheResult<bool> {
        let edited = self.record.edit_entry(id, content);
        self.persist_if(edited)
    }

    pub fn set_entry_mood(&mut self, id: EntryId, mood: Option<Mood>) -> CacheResult<bool> {
        let changed = self.record.set_entry_mood(id, mood);
        self.persist_if(changed)
    }

    pub fn delete_entry(&mut self, id: EntryId) -> CacheResult<bool> {
        let deleted = self.record.delete_entry(id);
        self.persist_if(deleted)
    }

    // Lifecycle & metrics --------------------------------------------------

    /// Seals the record when it is open and eligible; `Ok(false)` otherwise.
    ///
    /// This is where the eligibility policy is enforced; the record's seal
    /// primitive only guards the state transition.
    pub fn seal(&mut self) -> CacheResult<bool> {
        if !can_seal(&self.record) {
            return Ok(false);
        }
        let sealed = self.record.seal();
        if sealed {
            info!(
                "event=record_seal module=service status=ok date={}",
                self.record.date
            );
        }
        self.persist_if(sealed)
    }

    /// Reopens a sealed record; `Ok(false)` when already open.
    pub fn unseal(&mut self) -> CacheResult<bool> {
        let unsealed = self.record.unseal();
        if unsealed {
            info!(
                "event=record_unseal module=service status=ok date={}",
                self.record.date
            );
        }
        self.persist_if(unsealed)
    }

    pub fn can_seal(&self) -> bool {
        can_seal(&self.record)
    }

    pub fn completion_rate(&self) -> u8 {
        self.record.completion_rate
    }

    pub fn overall_mood(&self) -> Option<Mood> {
        self.record.overall_mood()
    }

    fn persist_if(&self, mutated: bool) -> CacheResult<bool> {
        if mutated {
            self.persist()?;
        }
        Ok(mutated)
    }

    fn persist(&self) -> CacheResult<()> {
        self.store.save(&self.record)
    }
}
