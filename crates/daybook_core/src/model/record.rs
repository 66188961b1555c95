//! Daily record domain model.
//!
//! # Responsibility
//! - Define the per-date record and its task/journal-entry children.
//! - Provide the seal/unseal state transitions.
//!
//! # Invariants
//! - `date` is the natural key; the persisted row id is its YYYY-MM-DD string.
//! - `completed_at` is `Some` iff `completed` is true on every task.
//! - Task `order` values are dense indexes `0..tasks.len()`.
//! - `sealed_at` survives `unseal` as historical provenance.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task item.
pub type TaskId = Uuid;

/// Stable identifier for a journal entry.
pub type EntryId = Uuid;

/// Task urgency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Mood attached to a journal entry, or to a whole legacy record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Neutral,
    Sad,
    Excited,
    Tired,
}

/// One actionable item inside a daily record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Non-empty trimmed text; validated before construction.
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub tags: Vec<String>,
    /// Dense rank equal to the task's index in its collection.
    pub order: u32,
    pub created_at: DateTime<Utc>,
    /// `Some` iff `completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates an open task at the given rank.
    ///
    /// Callers must have validated and trimmed `description` already.
    pub(crate) fn new(
        description: impl Into<String>,
        priority: Priority,
        tags: Vec<String>,
        order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            completed: false,
            priority,
            tags,
            order,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// One journal entry inside a daily record.
///
/// `created_at` is immutable after creation; `content` and `mood` stay
/// mutable until the parent record is sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,
    /// Non-empty trimmed text; may carry sanitized markup.
    pub content: String,
    pub mood: Option<Mood>,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Creates an entry stamped with the current time.
    pub(crate) fn new(content: impl Into<String>, mood: Option<Mood>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            mood,
            created_at: Utc::now(),
        }
    }
}

/// The per-date bundle of tasks, journal entries, mood and seal state.
///
/// Exactly one record exists per calendar date per user. The legacy
/// free-text `journal` and single `mood` fields are retained only so the
/// one-shot migration in [`crate::model::metrics::migrate_legacy_journal`]
/// can upgrade old records; new writes go through `journal_entries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Natural key. The persisted row id is `date.to_string()` (YYYY-MM-DD).
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
    /// Legacy free-text journal, kept for migration. Empty on new records.
    #[serde(default)]
    pub journal: String,
    pub journal_entries: Vec<JournalEntry>,
    /// Legacy single record-level mood, kept for migration.
    #[serde(default)]
    pub mood: Option<Mood>,
    pub is_sealed: bool,
    /// Derived from `tasks`; recomputed after every task mutation.
    pub completion_rate: u8,
    pub created_at: DateTime<Utc>,
    /// Stamp of the most recent seal. Survives `unseal`.
    pub sealed_at: Option<DateTime<Utc>>,
}

impl DailyRecord {
    /// Creates the empty, open record for first access to a date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            tasks: Vec::new(),
            journal: String::new(),
            journal_entries: Vec::new(),
            mood: None,
            is_sealed: false,
            completion_rate: 0,
            created_at: Utc::now(),
            sealed_at: None,
        }
    }

    /// Returns the persisted row id (YYYY-MM-DD).
    pub fn record_id(&self) -> String {
        self.date.to_string()
    }

    /// Seals the record, making every mutation a rejected no-op.
    ///
    /// Valid only from the open state; returns `false` without effect when
    /// already sealed. This primitive enforces the state transition only;
    /// seal eligibility is the caller's concern (see
    /// [`crate::model::metrics::can_seal`]).
    pub fn seal(&mut self) -> bool {
        if self.is_sealed {
            return false;
        }
        self.is_sealed = true;
        self.sealed_at = Some(Utc::now());
        true
    }

    /// Reopens a sealed record, re-enabling all mutations.
    ///
    /// Valid only from the sealed state. `sealed_at` is retained as
    /// provenance of the previous seal; a later re-seal restamps it.
    pub fn unseal(&mut self) -> bool {
        if !self.is_sealed {
            return false;
        }
        self.is_sealed = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{DailyRecord, NaiveDate};

    fn record() -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date"))
    }

    #[test]
    fn new_record_is_open_and_empty() {
        let record = record();
        assert!(!record.is_sealed);
        assert!(record.tasks.is_empty());
        assert!(record.journal_entries.is_empty());
        assert_eq!(record.completion_rate, 0);
        assert_eq!(record.sealed_at, None);
        assert_eq!(record.record_id(), "2024-03-09");
    }

    #[test]
    fn seal_is_valid_only_from_open() {
        let mut record = record();
        assert!(record.seal());
        assert!(record.is_sealed);
        assert!(record.sealed_at.is_some());
        assert!(!record.seal());
    }

    #[test]
    fn unseal_retains_sealed_at() {
        let mut record = record();
        assert!(!record.unseal());

        record.seal();
        let sealed_at = record.sealed_at;
        assert!(record.unseal());
        assert!(!record.is_sealed);
        assert_eq!(record.sealed_at, sealed_at);
    }

    #[test]
    fn reseal_restamps_sealed_at() {
        let mut record = record();
        record.seal();
        let first = record.sealed_at.expect("sealed_at set");
        record.unseal();
        record.seal();
        let second = record.sealed_at.expect("sealed_at set");
        assert!(second >= first);
    }
}
