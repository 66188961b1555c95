use chrono::{Duration, NaiveDate};
use daybook_core::{overall_mood, sorted_by_time_desc, DailyRecord, EntryId, Mood};

fn record() -> DailyRecord {
    DailyRecord::new(NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date"))
}

#[test]
fn add_entry_trims_and_stamps() {
    let mut record = record();
    let entry = record
        .add_entry("  slow morning  ", Some(Mood::Tired))
        .expect("entry added");

    assert_eq!(entry.content, "slow morning");
    assert_eq!(entry.mood, Some(Mood::Tired));
    assert_eq!(record.journal_entries.len(), 1);
}

#[test]
fn add_entry_rejects_blank_content() {
    let mut record = record();
    assert!(record.add_entry("   ", None).is_none());
    assert!(record.add_entry("<p>&nbsp;</p>", Some(Mood::Happy)).is_none());
    assert!(record.journal_entries.is_empty());
}

#[test]
fn edit_preserves_id_mood_and_created_at() {
    let mut record = record();
    let (id, mood, created_at) = {
        let entry = record
            .add_entry("draft", Some(Mood::Neutral))
            .expect("entry added");
        (entry.id, entry.mood, entry.created_at)
    };

    assert!(record.edit_entry(id, "  final text  "));
    let entry = &record.journal_entries[0];
    assert_eq!(entry.content, "final text");
    assert_eq!(entry.id, id);
    assert_eq!(entry.mood, mood);
    assert_eq!(entry.created_at, created_at);

    assert!(!record.edit_entry(id, "   "));
    assert!(!record.edit_entry(EntryId::new_v4(), "valid text"));
    assert_eq!(record.journal_entries[0].content, "final text");
}

#[test]
fn set_entry_mood_updates_and_clears() {
    let mut record = record();
    let id = record.add_entry("note", None).expect("entry added").id;

    assert!(record.set_entry_mood(id, Some(Mood::Excited)));
    assert_eq!(record.journal_entries[0].mood, Some(Mood::Excited));

    assert!(record.set_entry_mood(id, None));
    assert_eq!(record.journal_entries[0].mood, None);

    assert!(!record.set_entry_mood(EntryId::new_v4(), Some(Mood::Sad)));
}

#[test]
fn delete_entry_requires_known_id() {
    let mut record = record();
    let id = record.add_entry("gone soon", None).expect("entry added").id;

    assert!(!record.delete_entry(EntryId::new_v4()));
    assert_eq!(record.journal_entries.len(), 1);

    assert!(record.delete_entry(id));
    assert!(record.journal_entries.is_empty());
    assert!(!record.delete_entry(id));
}

#[test]
fn sort_desc_is_stable_and_non_mutating() {
    let mut record = record();
    record.add_entry("first", None).expect("entry added");
    record.add_entry("second", None).expect("entry added");
    record.add_entry("third", None).expect("entry added");

    // Force distinct and equal timestamps.
    let base = record.journal_entries[0].created_at;
    record.journal_entries[1].created_at = base + Duration::seconds(60);
    record.journal_entries[2].created_at = base + Duration::seconds(60);

    let original = record.journal_entries.clone();
    let sorted = sorted_by_time_desc(&record.journal_entries);

    assert_eq!(record.journal_entries, original);
    assert_eq!(sorted[2].content, "first");
    // Tied entries keep original relative order.
    assert_eq!(sorted[0].content, "second");
    assert_eq!(sorted[1].content, "third");
}

#[test]
fn overall_mood_picks_most_recent_mooded_entry() {
    let mut record = record();
    record.add_entry("morning", Some(Mood::Sad)).expect("entry added");
    record.add_entry("noon", Some(Mood::Happy)).expect("entry added");
    record.add_entry("evening", None).expect("entry added");

    let base = record.journal_entries[0].created_at;
    record.journal_entries[1].created_at = base + Duration::seconds(60);
    record.journal_entries[2].created_at = base + Duration::seconds(120);

    // The latest entry has no mood, so the noon mood wins.
    assert_eq!(overall_mood(&record.journal_entries), Some(Mood::Happy));
    assert_eq!(record.overall_mood(), Some(Mood::Happy));
}

#[test]
fn overall_mood_is_none_without_any_mooded_entry() {
    let mut record = record();
    assert_eq!(record.overall_mood(), None);

    record.add_entry("no mood", None).expect("entry added");
    record.add_entry("still none", None).expect("entry added");
    assert_eq!(record.overall_mood(), None);
}
