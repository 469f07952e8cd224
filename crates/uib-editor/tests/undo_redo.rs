//! Integration tests: snapshot undo/redo (uib-editor).
//!
//! Tests the CommandStack on its own and through the DocumentStore,
//! verifying that edits unwind and replay exactly.

use pretty_assertions::assert_eq;
use serde_json::json;
use uib_core::{
    DataMapping, DataModelEntry, Node, NodePatch, NodeType, create_node, default_tree,
};
use uib_editor::commands::{CommandStack, Snapshot};
use uib_editor::document::{DocumentStore, EditorConfig};

/// Deterministic state: equal labels give equal snapshots.
fn state(label: &str) -> Snapshot {
    let text = Node::from_json(&json!({"id": "label", "type": "Text", "text": label})).unwrap();
    Snapshot::new(default_tree().with_children(vec![text]), DataMapping::default())
}

// ─── CommandStack ────────────────────────────────────────────────────────

#[test]
fn three_undos_return_to_start_and_three_redos_replay() {
    let mut stack = CommandStack::default();
    let states: Vec<_> = ["s0", "s1", "s2", "s3"].into_iter().map(state).collect();

    // Each edit is preceded by a snapshot of the state it changes.
    let mut current = states[0].clone();
    for next in &states[1..] {
        stack.push_snapshot(&current);
        current = next.clone();
    }

    for _ in 0..3 {
        current = stack.undo(&current).expect("undo available");
    }
    assert_eq!(current, states[0]);
    assert!(!stack.can_undo());

    for _ in 0..3 {
        current = stack.redo(&current).expect("redo available");
    }
    assert_eq!(current, states[3]);
    assert!(!stack.can_redo());
}

#[test]
fn history_keeps_only_the_newest_fifty() {
    let mut stack = CommandStack::default();
    for n in 0..60 {
        stack.push_snapshot(&state(&n.to_string()));
    }
    assert_eq!(stack.undo_depth(), 50);

    let mut current = state("latest");
    let mut restored = Vec::new();
    while let Some(prev) = stack.undo(&current) {
        restored.push(prev.clone());
        current = prev;
    }
    assert_eq!(restored.len(), 50);
    // Oldest reachable state is the 11th push; 0..10 are gone.
    assert_eq!(restored.last(), Some(&state("10")));
    assert!(!restored.contains(&state("9")));
}

// ─── Through the DocumentStore ───────────────────────────────────────────

fn store() -> DocumentStore {
    DocumentStore::new(EditorConfig {
        history_depth: 50,
        autosave: false,
    })
}

#[test]
fn store_edits_unwind_in_order() {
    let mut store = store();
    let s0 = store.tree().clone();

    let text = create_node(NodeType::Text);
    let id = text.id.to_string();
    assert!(store.append_node("root", text));
    let s1 = store.tree().clone();
    assert!(store.update_node(&NodePatch::new(id.as_str()).set("text", "edited")));
    let s2 = store.tree().clone();
    assert!(store.delete_node(&id).is_some());

    assert!(store.undo());
    assert_eq!(store.tree(), &s2);
    assert!(store.undo());
    assert_eq!(store.tree(), &s1);
    assert!(store.undo());
    assert_eq!(store.tree(), &s0);
    assert!(!store.undo());

    assert!(store.redo());
    assert!(store.redo());
    assert_eq!(store.tree(), &s2);
}

#[test]
fn refused_edits_leave_history_alone() {
    let mut store = store();
    assert!(!store.update_node(&NodePatch::new("ghost").set("text", "x")));
    assert!(!store.move_node("root", "root", 0));
    assert!(store.delete_node("root").is_none());
    assert!(!store.insert_node("ghost", create_node(NodeType::Spacer), 0));
    assert!(!store.can_undo());
}

#[test]
fn data_mapping_is_part_of_the_snapshot() {
    let mut store = store();
    store.set_data_model(vec![DataModelEntry::new("d1", "count").with_value(json!(1))]);
    assert_eq!(store.data_mapping().data_model.len(), 1);

    assert!(store.undo());
    assert_eq!(store.data_mapping(), &DataMapping::default());
    assert!(store.redo());
    assert_eq!(store.data_mapping().data_model[0].name, "count");
}

#[test]
fn new_edit_after_undo_drops_redo() {
    let mut store = store();
    store.append_node("root", create_node(NodeType::Spacer));
    store.undo();
    assert!(store.can_redo());
    store.append_node("root", create_node(NodeType::Divider));
    assert!(!store.can_redo());
}

#[test]
fn undo_returns_to_the_screen_that_was_edited() {
    let mut store = store();
    let first = store.selected_screen_id().to_string();
    store.append_node("root", create_node(NodeType::Spacer));
    let second = store.add_screen(Some("Second"));
    store.append_node("root", create_node(NodeType::Divider));
    assert!(store.select_screen(&first));

    // Newest edit was on the second screen.
    assert!(store.undo());
    assert_eq!(store.selected_screen_id(), second);
    assert!(store.tree().children().is_empty());

    assert!(store.undo());
    assert_eq!(store.selected_screen_id(), first);
    assert!(store.tree().children().is_empty());
    let second_tree = &store.project().screen(&second).unwrap().tree;
    assert!(second_tree.children().is_empty());

    assert!(store.select_screen(&second));
    assert!(store.redo());
    assert_eq!(store.selected_screen_id(), first);
    assert_eq!(store.tree().children()[0].node_type(), NodeType::Spacer);
    assert!(store.redo());
    assert_eq!(store.selected_screen_id(), second);
    assert_eq!(store.tree().children()[0].node_type(), NodeType::Divider);
}

#[test]
fn snapshot_of_a_deleted_screen_restores_into_the_selected_one() {
    let mut store = store();
    let first = store.selected_screen_id().to_string();
    store.append_node("root", create_node(NodeType::Spacer));
    let second = store.add_screen(None);
    store.append_node("root", create_node(NodeType::Divider));
    assert!(store.select_screen(&first));
    assert!(store.delete_screen(&second));

    assert!(store.undo());
    assert_eq!(store.selected_screen_id(), first);
    assert!(store.tree().children().is_empty());
}
