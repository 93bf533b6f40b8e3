use std::collections::BTreeMap;
use taskboard_core::{BoardState, Column, HistoryStore};

fn board_named(title: &str) -> BoardState {
    let mut tasks = BTreeMap::new();
    tasks.insert("todo".to_string(), Vec::new());
    BoardState::from_parts(vec![Column::new("todo", title)], tasks).unwrap()
}

#[test]
fn checkpoints_grow_linearly() {
    let mut history = HistoryStore::new();
    for n in 1..=5 {
        history.checkpoint(&board_named(&format!("v{n}")));
        assert_eq!(history.len(), n);
        assert_eq!(history.cursor(), Some(n - 1));
    }
    assert!(history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn undo_and_redo_walk_the_cursor() {
    let mut history = HistoryStore::new();
    history.checkpoint(&board_named("v1"));
    history.checkpoint(&board_named("v2"));
    history.checkpoint(&board_named("v3"));

    assert_eq!(history.undo().unwrap().column_title("todo"), "v2");
    assert_eq!(history.undo().unwrap().column_title("todo"), "v1");
    assert!(history.undo().is_none());
    assert_eq!(history.cursor(), Some(0));
    assert!(!history.can_undo());

    assert_eq!(history.redo().unwrap().column_title("todo"), "v2");
    assert_eq!(history.redo().unwrap().column_title("todo"), "v3");
    assert!(history.redo().is_none());
    assert_eq!(history.cursor(), Some(2));
}

#[test]
fn checkpoint_after_undo_discards_redo_branch() {
    let mut history = HistoryStore::new();
    history.checkpoint(&board_named("v1"));
    history.checkpoint(&board_named("v2"));
    history.checkpoint(&board_named("v3"));
    history.undo();
    history.undo();

    history.checkpoint(&board_named("branch"));
    assert_eq!(history.len(), 2);
    assert_eq!(history.cursor(), Some(1));
    assert!(!history.can_redo());
    assert!(history.redo().is_none());
    assert_eq!(history.undo().unwrap().column_title("todo"), "v1");
}

#[test]
fn recorded_entries_are_independent_of_live_state() {
    let mut live = board_named("v1");
    let mut history = HistoryStore::new();
    history.checkpoint(&live);

    live = board_named("mutated");
    assert_eq!(live.column_title("todo"), "mutated");
    assert_eq!(
        history.current().unwrap().snapshot().column_title("todo"),
        "v1"
    );
}

#[test]
fn undo_then_redo_restores_equal_state() {
    let v1 = board_named("v1");
    let v2 = board_named("v2");
    let mut history = HistoryStore::new();
    history.checkpoint(&v1);
    history.checkpoint(&v2);

    assert_eq!(history.undo().unwrap(), v1);
    assert_eq!(history.redo().unwrap(), v2);
}
