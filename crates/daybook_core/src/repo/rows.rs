//! Persisted row shapes and domain conversions.
//!
//! # Responsibility
//! - Define the record/task/journal-entry rows exchanged with the remote
//!   store, every row carrying its owning `user_id`.
//! - Convert losslessly between rows and the in-memory domain model.
//!
//! # Invariants
//! - A record row's `id` equals its `date` string (natural key).
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::record::{
    DailyRecord, EntryId, JournalEntry, Mood, Priority, Task, TaskId,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque user identifier applied to every remote row and query.
pub type UserId = String;

/// Rejection of malformed persisted row data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRowData(pub String);

impl Display for InvalidRowData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid persisted row data: {}", self.0)
    }
}

impl Error for InvalidRowData {}

/// Remote row for one daily record (children stored separately).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    /// Equals `date` (YYYY-MM-DD).
    pub id: String,
    pub date: String,
    pub journal: String,
    pub mood: Option<Mood>,
    pub is_sealed: bool,
    pub completion_rate: u8,
    pub created_at: DateTime<Utc>,
    pub sealed_at: Option<DateTime<Utc>>,
    pub user_id: UserId,
}

/// Remote row for one task item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: TaskId,
    pub record_id: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    /// JSON array text, e.g. `["errands","home"]`.
    pub tags: String,
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub user_id: UserId,
}

/// Remote row for one journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryRow {
    pub id: EntryId,
    pub record_id: String,
    pub content: String,
    pub mood: Option<Mood>,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
}

impl RecordRow {
    pub fn from_record(record: &DailyRecord, user_id: &str) -> Self {
        let id = record.record_id();
        Self {
            id: id.clone(),
            date: id,
            journal: record.journal.clone(),
            mood: record.mood,
            is_sealed: record.is_sealed,
            completion_rate: record.completion_rate,
            created_at: record.created_at,
            sealed_at: record.sealed_at,
            user_id: user_id.to_string(),
        }
    }
}

impl TaskRow {
    pub fn from_task(task: &Task, record_id: &str, user_id: &str) -> Self {
        Self {
            id: task.id,
            record_id: record_id.to_string(),
            description: task.description.clone(),
            completed: task.completed,
            priority: task.priority,
            tags: serde_json::to_string(&task.tags).unwrap_or_else(|_| "[]".to_string()),
            sort_order: task.order,
            created_at: task.created_at,
            completed_at: task.completed_at,
            user_id: user_id.to_string(),
        }
    }

    fn into_task(self) -> Result<Task, InvalidRowData> {
        if self.completed != self.completed_at.is_some() {
            return Err(InvalidRowData(format!(
                "task {} has completed={} but completed_at={:?}",
                self.id, self.completed, self.completed_at
            )));
        }
        let tags: Vec<String> = serde_json::from_str(&self.tags).map_err(|err| {
            InvalidRowData(format!("task {} has malformed tags text: {err}", self.id))
        })?;

        Ok(Task {
            id: self.id,
            description: self.description,
            completed: self.completed,
            priority: self.priority,
            tags,
            order: self.sort_order,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

impl JournalEntryRow {
    pub fn from_entry(entry: &JournalEntry, record_id: &str, user_id: &str) -> Self {
        Self {
            id: entry.id,
            record_id: record_id.to_string(),
            content: entry.content.clone(),
            mood: entry.mood,
            created_at: entry.created_at,
            user_id: user_id.to_string(),
        }
    }

    fn into_entry(self) -> JournalEntry {
        JournalEntry {
            id: self.id,
            content: self.content,
            mood: self.mood,
            created_at: self.created_at,
        }
    }
}

/// Splits one record into its remote rows.
pub fn record_to_rows(
    record: &DailyRecord,
    user_id: &str,
) -> (RecordRow, Vec<TaskRow>, Vec<JournalEntryRow>) {
    let record_id = record.record_id();
    let record_row = RecordRow::from_record(record, user_id);
    let task_rows = record
        .tasks
        .iter()
        .map(|task| TaskRow::from_task(task, &record_id, user_id))
        .collect();
    let entry_rows = record
        .journal_entries
        .iter()
        .map(|entry| JournalEntryRow::from_entry(entry, &record_id, user_id))
        .collect();
    (record_row, task_rows, entry_rows)
}

/// Reassembles one record from its remote rows.
///
/// Rejects rows that break persisted-state invariants: unparseable or
/// mismatched record id/date, a completion rate above 100, malformed tag
/// text, or a `completed`/`completed_at` mismatch. Tasks come back sorted
/// by `sort_order`, entries ascending by `created_at`.
pub fn assemble_record(
    record_row: RecordRow,
    task_rows: Vec<TaskRow>,
    entry_rows: Vec<JournalEntryRow>,
) -> Result<DailyRecord, InvalidRowData> {
    let date = NaiveDate::parse_from_str(&record_row.date, "%Y-%m-%d").map_err(|_| {
        InvalidRowData(format!("unparseable record date `{}`", record_row.date))
    })?;
    if record_row.id != record_row.date {
        return Err(InvalidRowData(format!(
            "record id `{}` does not equal its date `{}`",
            record_row.id, record_row.date
        )));
    }
    if record_row.completion_rate > 100 {
        return Err(InvalidRowData(format!(
            "completion rate {} out of range",
            record_row.completion_rate
        )));
    }

    let mut tasks = task_rows
        .into_iter()
        .map(TaskRow::into_task)
        .collect::<Result<Vec<_>, _>>()?;
    tasks.sort_by_key(|task| task.order);

    let mut journal_entries: Vec<JournalEntry> =
        entry_rows.into_iter().map(JournalEntryRow::into_entry).collect();
    journal_entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    Ok(DailyRecord {
        date,
        tasks,
        journal: record_row.journal,
        journal_entries,
        mood: record_row.mood,
        is_sealed: record_row.is_sealed,
        completion_rate: record_row.completion_rate,
        created_at: record_row.created_at,
        sealed_at: record_row.sealed_at,
    })
}
