//! Derived metrics and legacy journal migration.
//!
//! # Responsibility
//! - Compute the completion rate and seal eligibility for a record.
//! - Upgrade legacy single-field journals into the multi-entry model.
//!
//! # Invariants
//! - All functions are pure; callers own when results are applied.
//! - `completion_rate` stays within `0..=100`.
//! - `migrate_legacy_journal` is idempotent.

use crate::model::record::{DailyRecord, JournalEntry, Task};
use uuid::Uuid;

/// Minimum trimmed legacy-journal length that makes a record with open
/// tasks still eligible for sealing.
pub const MIN_SEALABLE_JOURNAL_LEN: usize = 10;

/// Returns `round(100 * completed / total)`, or `0` for an empty list.
pub fn completion_rate(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }

    let completed = tasks.iter().filter(|task| task.completed).count();
    let rate = (100.0 * completed as f64 / tasks.len() as f64).round();
    rate as u8
}

/// Decides whether a record has enough substance to be sealed.
///
/// With tasks present, any one of: all tasks completed, trimmed legacy
/// journal at least [`MIN_SEALABLE_JOURNAL_LEN`] characters, or at least
/// one journal entry. With no tasks: any non-blank legacy journal, a
/// legacy mood, or at least one entry.
pub fn can_seal(record: &DailyRecord) -> bool {
    let has_entries = !record.journal_entries.is_empty();
    let journal_len = record.journal.trim().chars().count();

    if record.tasks.is_empty() {
        journal_len > 0 || record.mood.is_some() || has_entries
    } else {
        record.tasks.iter().all(|task| task.completed)
            || journal_len >= MIN_SEALABLE_JOURNAL_LEN
            || has_entries
    }
}

/// One-shot upgrade of a legacy free-text journal into the entry model.
///
/// When `journal_entries` is empty and the legacy `journal` field is
/// non-blank, synthesizes the sole entry from it: content is the trimmed
/// legacy text, mood is the legacy record mood, `created_at` is the
/// record's own creation time. Otherwise returns the record unchanged,
/// which makes a second application a no-op.
pub fn migrate_legacy_journal(mut record: DailyRecord) -> DailyRecord {
    let legacy = record.journal.trim();
    if !record.journal_entries.is_empty() || legacy.is_empty() {
        return record;
    }

    record.journal_entries.push(JournalEntry {
        id: Uuid::new_v4(),
        content: legacy.to_string(),
        mood: record.mood,
        created_at: record.created_at,
    });
    record
}
