use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use taskboard_core::{
    BoardState, BoardStateError, Column, Priority, Task, TaskDraft, TaskValidationError,
    FALLBACK_COLUMN_TITLE,
};

fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
}

fn task(id: &str, title: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        priority: Priority::Low,
        due_date: None,
        created_at: Utc::now(),
    }
}

fn board_with(lists: &[(&str, Vec<Task>)]) -> BoardState {
    let columns = lists
        .iter()
        .map(|(id, _)| Column::new(*id, id.to_uppercase()))
        .collect();
    let tasks = lists
        .iter()
        .map(|(id, tasks)| (id.to_string(), tasks.clone()))
        .collect();
    BoardState::from_parts(columns, tasks).unwrap()
}

#[test]
fn task_from_draft_trims_and_defaults() {
    let draft = TaskDraft::new("  Write report  ").description("  details ");
    let created = Task::from_draft(&draft).unwrap();

    assert!(created.id.starts_with("task_"));
    assert_eq!(created.title, "Write report");
    assert_eq!(created.description, "details");
    assert_eq!(created.priority, Priority::Low);
    assert_eq!(created.due_date, None);
}

#[test]
fn task_from_draft_rejects_blank_title() {
    let err = Task::from_draft(&TaskDraft::new(" \t ")).unwrap_err();
    assert_eq!(err, TaskValidationError::EmptyTitle);
}

#[test]
fn task_apply_keeps_identity_fields() {
    let mut original = task("task_1", "old");
    let created_at = original.created_at;
    let due = NaiveDate::from_ymd_opt(2024, 6, 1);
    original
        .apply(
            &TaskDraft::new("new")
                .description("body")
                .priority(Priority::High)
                .due_date(due),
        )
        .unwrap();

    assert_eq!(original.id, "task_1");
    assert_eq!(original.created_at, created_at);
    assert_eq!(original.title, "new");
    assert_eq!(original.priority, Priority::High);
    assert_eq!(original.due_date, due);
}

#[test]
fn task_serialization_uses_camel_case_wire_fields() {
    let mut record = task("task_1700000000000", "Ship it");
    record.priority = Priority::Medium;
    record.due_date = NaiveDate::from_ymd_opt(2024, 2, 29);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], "task_1700000000000");
    assert_eq!(json["priority"], "medium");
    assert_eq!(json["dueDate"], "2024-02-29");
    assert!(json["createdAt"].is_string());

    record.due_date = None;
    let json = serde_json::to_value(&record).unwrap();
    assert!(json["dueDate"].is_null());
}

#[test]
fn task_deserialization_treats_empty_strings_as_absent() {
    let value = serde_json::json!({
        "id": "task_1",
        "title": "Legacy",
        "description": "",
        "priority": "",
        "dueDate": "",
        "createdAt": "2024-01-01T10:00:00.000Z"
    });
    let decoded: Task = serde_json::from_value(value).unwrap();
    assert_eq!(decoded.priority, Priority::Low);
    assert_eq!(decoded.due_date, None);

    let minimal: Task = serde_json::from_value(serde_json::json!({
        "id": "task_2",
        "title": "Bare"
    }))
    .unwrap();
    assert_eq!(minimal.description, "");
    assert_eq!(minimal.due_date, None);
}

#[test]
fn task_deserialization_rejects_unknown_priority() {
    let err = serde_json::from_value::<Task>(serde_json::json!({
        "id": "task_1",
        "title": "x",
        "priority": "urgent"
    }))
    .unwrap_err();
    assert!(err.to_string().contains("unknown priority"), "{err}");
}

#[test]
fn priority_labels_are_capitalized() {
    let labels: Vec<&str> = Priority::ALL.iter().map(Priority::label).collect();
    assert_eq!(labels, ["Low", "Medium", "High"]);
}

#[test]
fn tasks_in_unknown_column_fails() {
    let board = BoardState::with_default_columns();
    assert_eq!(
        board.tasks_in("archive").unwrap_err(),
        BoardStateError::UnknownColumn("archive".to_string())
    );
    assert!(board.tasks_in("todo").unwrap().is_empty());
}

#[test]
fn column_title_falls_back_for_unknown_ids() {
    let board = BoardState::with_default_columns();
    assert_eq!(board.column_title("inprogress"), "In Progress");
    assert_eq!(board.column_title("missing"), FALLBACK_COLUMN_TITLE);
}

#[test]
fn from_parts_enforces_structure() {
    let columns = vec![Column::new("a", "A"), Column::new("b", "B")];

    let mut missing = BTreeMap::new();
    missing.insert("a".to_string(), Vec::new());
    assert_eq!(
        BoardState::from_parts(columns.clone(), missing.clone()).unwrap_err(),
        BoardStateError::MissingTaskList("b".to_string())
    );

    let mut orphan = missing.clone();
    orphan.insert("b".to_string(), Vec::new());
    orphan.insert("c".to_string(), Vec::new());
    assert_eq!(
        BoardState::from_parts(columns.clone(), orphan).unwrap_err(),
        BoardStateError::OrphanTaskList("c".to_string())
    );

    let mut duplicate = BTreeMap::new();
    duplicate.insert("a".to_string(), vec![task("t1", "one")]);
    duplicate.insert("b".to_string(), vec![task("t1", "again")]);
    assert_eq!(
        BoardState::from_parts(columns.clone(), duplicate).unwrap_err(),
        BoardStateError::DuplicateTask("t1".to_string())
    );

    let mut blank = BTreeMap::new();
    blank.insert("a".to_string(), vec![task("t1", "  ")]);
    blank.insert("b".to_string(), Vec::new());
    assert!(matches!(
        BoardState::from_parts(columns.clone(), blank).unwrap_err(),
        BoardStateError::InvalidTask { task_id, .. } if task_id == "t1"
    ));

    let twice = vec![Column::new("a", "A"), Column::new("a", "Again")];
    let mut single = BTreeMap::new();
    single.insert("a".to_string(), Vec::new());
    assert_eq!(
        BoardState::from_parts(twice, single).unwrap_err(),
        BoardStateError::DuplicateColumn("a".to_string())
    );
}

#[test]
fn find_task_reports_owning_column() {
    let board = board_with(&[
        ("todo", vec![task("t1", "one")]),
        ("done", vec![task("t2", "two")]),
    ]);
    let (column_id, found) = board.find_task("t2").unwrap();
    assert_eq!(column_id, "done");
    assert_eq!(found.title, "two");
    assert!(board.find_task("t3").is_none());
}

#[test]
fn statistics_count_by_column_id_priority_and_due_date() {
    let mut overdue = task("t1", "late");
    overdue.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);
    overdue.priority = Priority::High;
    let mut done_late = task("t2", "late but done");
    done_late.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);
    let mut future = task("t3", "later");
    future.due_date = NaiveDate::from_ymd_opt(2024, 3, 20);
    let board = board_with(&[
        ("todo", vec![overdue, future]),
        ("inprogress", vec![task("t4", "doing")]),
        ("done", vec![done_late]),
    ]);

    let stats = board.statistics_at(at("2024-03-10", "09:00:00"));
    assert_eq!(stats.total_tasks, 4);
    assert_eq!(stats.completed_tasks, 1);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.high_priority, 1);
    assert_eq!(stats.overdue_tasks, 1);
    assert_eq!(stats.completion_rate, 25);
    assert_eq!(stats.summary_line(), "1/4 tasks completed • 1 overdue");
}

#[test]
fn statistics_on_empty_board_are_zero() {
    let stats = BoardState::with_default_columns().statistics();
    assert_eq!(stats.total_tasks, 0);
    assert_eq!(stats.completion_rate, 0);
}

#[test]
fn statistics_ignore_non_default_column_ids() {
    let board = board_with(&[
        ("backlog", vec![task("t1", "one")]),
        ("finished", vec![task("t2", "two")]),
    ]);
    let stats = board.statistics();
    assert_eq!(stats.total_tasks, 2);
    assert_eq!(stats.completed_tasks, 0);
    assert_eq!(stats.in_progress, 0);
    assert_eq!(stats.completion_rate, 0);
}

#[test]
fn board_serializes_columns_and_task_lists() {
    let board = board_with(&[("todo", vec![task("t1", "one")]), ("done", vec![])]);
    let json = serde_json::to_value(&board).unwrap();
    assert_eq!(json["columns"][0]["id"], "todo");
    assert_eq!(json["tasks"]["todo"][0]["id"], "t1");
    assert!(json["tasks"]["done"].as_array().unwrap().is_empty());

    let decoded: BoardState = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, board);
}
