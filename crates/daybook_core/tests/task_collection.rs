use chrono::NaiveDate;
use daybook_core::{DailyRecord, Priority, TaskId};
use std::collections::HashSet;

fn record() -> DailyRecord {
    DailyRecord::new(NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date"))
}

fn record_with_tasks(count: usize) -> (DailyRecord, Vec<TaskId>) {
    let mut record = record();
    let ids = (0..count)
        .map(|index| {
            record
                .add_task(&format!("task {index}"), Priority::Medium, Vec::new())
                .expect("task added")
        })
        .collect();
    (record, ids)
}

#[test]
fn add_task_trims_and_ranks_at_tail() {
    let mut record = record();
    record
        .add_task("  first  ", Priority::High, vec!["home".to_string()])
        .expect("task added");
    record
        .add_task("second", Priority::Low, Vec::new())
        .expect("task added");

    assert_eq!(record.tasks[0].description, "first");
    assert_eq!(record.tasks[0].order, 0);
    assert_eq!(record.tasks[0].tags, vec!["home".to_string()]);
    assert_eq!(record.tasks[1].order, 1);
    assert!(!record.tasks[1].completed);
    assert_eq!(record.tasks[1].completed_at, None);
}

#[test]
fn add_task_rejects_blank_descriptions() {
    let (mut record, _) = record_with_tasks(1);
    let before = record.clone();

    assert_eq!(record.add_task("", Priority::Medium, Vec::new()), None);
    assert_eq!(record.add_task("   ", Priority::Medium, Vec::new()), None);
    assert_eq!(
        record.add_task("<p><br></p>", Priority::Medium, Vec::new()),
        None
    );
    assert_eq!(record, before);
}

#[test]
fn remove_task_reranks_dense_and_gapless() {
    let (mut record, ids) = record_with_tasks(4);

    assert!(record.remove_task(ids[1]));
    let orders: Vec<u32> = record.tasks.iter().map(|task| task.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert!(!record.tasks.iter().any(|task| task.id == ids[1]));

    let (mut record, ids) = record_with_tasks(1);
    assert!(!record.remove_task(TaskId::new_v4()));
    assert_eq!(record.tasks[0].id, ids[0]);
}

#[test]
fn toggle_twice_restores_completed_and_stamp_nullness() {
    let (mut record, ids) = record_with_tasks(1);
    let id = ids[0];

    assert!(record.toggle_task(id));
    assert!(record.tasks[0].completed);
    assert!(record.tasks[0].completed_at.is_some());

    assert!(record.toggle_task(id));
    assert!(!record.tasks[0].completed);
    assert_eq!(record.tasks[0].completed_at, None);

    // Same property starting from the completed state.
    record.toggle_task(id);
    assert!(record.toggle_task(id));
    assert!(record.toggle_task(id));
    assert!(record.tasks[0].completed);
    assert!(record.tasks[0].completed_at.is_some());
}

#[test]
fn toggle_unknown_id_is_rejected() {
    let (mut record, _) = record_with_tasks(2);
    let before = record.clone();
    assert!(!record.toggle_task(TaskId::new_v4()));
    assert_eq!(record, before);
}

#[test]
fn reorder_accepts_any_full_permutation() {
    let (mut record, ids) = record_with_tasks(4);
    let permutation = vec![ids[2], ids[0], ids[3], ids[1]];

    assert!(record.reorder_tasks(&permutation));
    let reordered: Vec<TaskId> = record.tasks.iter().map(|task| task.id).collect();
    assert_eq!(reordered, permutation);
    let orders: Vec<u32> = record.tasks.iter().map(|task| task.order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);

    let before: HashSet<TaskId> = ids.iter().copied().collect();
    let after: HashSet<TaskId> = record.tasks.iter().map(|task| task.id).collect();
    assert_eq!(before, after);
}

#[test]
fn reorder_rejects_non_permutations() {
    let (mut record, ids) = record_with_tasks(3);
    let before = record.clone();

    // Size mismatch.
    assert!(!record.reorder_tasks(&ids[..2]));
    // Foreign id introduced.
    assert!(!record.reorder_tasks(&[ids[0], ids[1], TaskId::new_v4()]));
    // Duplicate id with matching length.
    assert!(!record.reorder_tasks(&[ids[0], ids[1], ids[1]]));

    assert_eq!(record, before);
}

#[test]
fn batch_toggle_skips_unknown_ids_and_recomputes_once() {
    let (mut record, ids) = record_with_tasks(3);
    let updates = vec![
        (ids[0], true),
        (TaskId::new_v4(), true),
        (ids[2], true),
    ];

    assert_eq!(record.batch_toggle(&updates), 2);
    assert!(record.tasks[0].completed);
    assert!(!record.tasks[1].completed);
    assert!(record.tasks[2].completed);
    assert_eq!(record.completion_rate, 67);
}

#[test]
fn completion_rate_stays_within_bounds() {
    let (mut record, ids) = record_with_tasks(7);
    assert_eq!(record.completion_rate, 0);

    for (index, id) in ids.iter().enumerate() {
        record.toggle_task(*id);
        let expected =
            (100.0 * (index + 1) as f64 / ids.len() as f64).round() as u8;
        assert_eq!(record.completion_rate, expected);
        assert!(record.completion_rate <= 100);
    }
    assert_eq!(record.completion_rate, 100);
}

#[test]
fn buy_milk_walkthrough() {
    let mut record = record();
    let id = record
        .add_task("Buy milk", Priority::Medium, Vec::new())
        .expect("task added");

    assert_eq!(record.tasks.len(), 1);
    assert_eq!(record.tasks[0].description, "Buy milk");
    assert!(!record.tasks[0].completed);
    assert_eq!(record.tasks[0].order, 0);
    assert_eq!(record.tasks[0].priority, Priority::Medium);
    assert_eq!(record.completion_rate, 0);

    assert!(record.toggle_task(id));
    assert_eq!(record.completion_rate, 100);

    let before = record.clone();
    assert_eq!(record.add_task("", Priority::Medium, Vec::new()), None);
    assert_eq!(record, before);
}
