//! Journal entry operations on a daily record.
//!
//! # Responsibility
//! - Add/edit/delete journal entries and adjust entry moods.
//! - Derive time-ordered views and the record's overall mood.
//!
//! # Invariants
//! - Every mutation is a rejected no-op while the record is sealed.
//! - `created_at` never changes after an entry is created.
//! - Sorting helpers are stable and never mutate their input.

use crate::model::content::is_valid_content;
use crate::model::record::{DailyRecord, EntryId, JournalEntry, Mood};

impl DailyRecord {
    /// Appends a new journal entry stamped with the current time.
    ///
    /// Rejects (returns `None`, collection unchanged) when the record is
    /// sealed or `content` fails content validation. Returns a reference
    /// to the stored entry on success.
    pub fn add_entry(&mut self, content: &str, mood: Option<Mood>) -> Option<&JournalEntry> {
        if self.is_sealed || !is_valid_content(content) {
            return None;
        }

        self.journal_entries
            .push(JournalEntry::new(content.trim(), mood));
        self.journal_entries.last()
    }

    /// Replaces one entry's content, preserving id, mood and `created_at`.
    pub fn edit_entry(&mut self, id: EntryId, content: &str) -> bool {
        if self.is_sealed || !is_valid_content(content) {
            return false;
        }
        let Some(entry) = self.journal_entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };

        entry.content = content.trim().to_string();
        true
    }

    /// Sets or clears one entry's mood.
    pub fn set_entry_mood(&mut self, id: EntryId, mood: Option<Mood>) -> bool {
        if self.is_sealed {
            return false;
        }
        let Some(entry) = self.journal_entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };

        entry.mood = mood;
        true
    }

    /// Removes one entry.
    pub fn delete_entry(&mut self, id: EntryId) -> bool {
        if self.is_sealed {
            return false;
        }
        let Some(position) = self.journal_entries.iter().position(|entry| entry.id == id) else {
            return false;
        };

        self.journal_entries.remove(position);
        true
    }

    /// Returns this record's overall mood; see [`overall_mood`].
    pub fn overall_mood(&self) -> Option<Mood> {
        overall_mood(&self.journal_entries)
    }
}

/// Returns a new sequence ordered most-recent-first.
///
/// The sort is stable: entries sharing a `created_at` keep their original
/// relative order. The input is not mutated.
pub fn sorted_by_time_desc(entries: &[JournalEntry]) -> Vec<JournalEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Derives the overall mood from the most recent mooded entry.
///
/// Entries are sorted ascending by `created_at` (stable), then scanned from
/// the end; the first non-null mood wins. `None` when no entry has a mood.
pub fn overall_mood(entries: &[JournalEntry]) -> Option<Mood> {
    let mut ascending = entries.to_vec();
    ascending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    ascending.iter().rev().find_map(|entry| entry.mood)
}
