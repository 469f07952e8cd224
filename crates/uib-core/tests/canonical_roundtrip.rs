//! Integration tests: canvas tree → canonical document → canvas tree.
//!
//! Verifies that node types, child order, and user content survive export
//! and re-import, and that the root wrapping rules hold in both directions.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uib_core::canonical::{CanonicalCodec, to_canonical_json};
use uib_core::styles::canonical_style_keys;
use uib_core::tree::{find_node, walk};
use uib_core::*;

// ─── Helpers ─────────────────────────────────────────────────────────────

/// One node of every type, with user content set away from the defaults.
fn every_type() -> Vec<Node> {
    NodeType::ALL
        .into_iter()
        .map(|ty| {
            let node = create_node(ty);
            match ty {
                NodeType::Text => node.with("text", "Welcome back").with("numberOfLines", 2),
                NodeType::Button => node.with("title", "Sign in").with("width", 200),
                NodeType::Image => node
                    .with("src", "https://example.com/cat.png")
                    .with("alt", "A cat"),
                NodeType::List => node
                    .with("items", json!(["Apples", "Pears"]))
                    .with("loadMoreEnabled", true)
                    .with_children(vec![
                        create_node(NodeType::ListItemContent)
                            .with_children(vec![create_node(NodeType::ListItemText)]),
                    ]),
                NodeType::TextField => node.with("placeholder", "Email"),
                NodeType::SecureField => node.with("placeholder", "PIN"),
                NodeType::Toggle => node.with("isOn", true).with("label", "Wi-Fi"),
                NodeType::Slider => node.with("value", 7).with("min", 1).with("max", 10),
                NodeType::Picker => node
                    .with("options", json!(["Red", "Green"]))
                    .with("selection", "Green"),
                NodeType::ProgressView => node.with("progress", 0.25),
                NodeType::Divider => node.with("axis", "vertical"),
                NodeType::Link => node.with("url", "https://rust-lang.org").with("label", "Rust"),
                NodeType::VStack => node
                    .with("spacing", 4)
                    .with_children(vec![create_node(NodeType::Spacer)]),
                NodeType::BottomSheet => node
                    .with("sheetDetent", "large")
                    .with_children(vec![create_node(NodeType::Text).with("text", "In sheet")]),
                _ => node,
            }
        })
        .collect()
}

const CONTENT_KEYS: &[&str] = &[
    "text",
    "title",
    "src",
    "alt",
    "items",
    "placeholder",
    "isOn",
    "label",
    "value",
    "min",
    "max",
    "selection",
    "options",
    "progress",
    "axis",
    "url",
    "spacing",
    "numberOfLines",
    "loadMoreEnabled",
    "sheetDetent",
    "width",
];

fn flatten(tree: &Node) -> Vec<&Node> {
    let mut out = Vec::new();
    walk(tree, &mut |n| out.push(n));
    out
}

fn roundtrip(tree: &Node) -> Node {
    let doc = to_canonical_json(tree, &DataMapping::default()).to_value();
    from_canonical_json(&doc).expect("re-import failed")
}

// ─── Round-trip identity ─────────────────────────────────────────────────

#[test]
fn every_type_survives_roundtrip() {
    let tree = default_tree().with_children(every_type());
    let back = roundtrip(&tree);

    let before = flatten(&tree);
    let after = flatten(&back);
    assert_eq!(before.len(), after.len(), "node count changed");

    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.node_type(), b.node_type());
        assert_eq!(a.id, b.id);
        assert_eq!(a.children().len(), b.children().len(), "{}", a.id);
        for key in CONTENT_KEYS {
            assert_eq!(a.field(key), b.field(key), "{} `{key}`", a.node_type());
        }
    }
}

#[test]
fn second_export_is_identical_to_first() {
    let tree = default_tree().with_children(every_type());
    let first = to_canonical_json(&tree, &DataMapping::default());
    let second = to_canonical_json(&roundtrip(&tree), &DataMapping::default());
    assert_eq!(first, second);
}

#[test]
fn gestures_and_actions_survive() {
    let button = create_node(NodeType::Button)
        .with("actionEvent", "openBottomSheet")
        .with("actionId", "sheet-1")
        .with("accessibilityLabel", "Open details")
        .with("tag", 3);
    let id = button.id;
    let back = roundtrip(&default_tree().with_children(vec![button]));
    let node = find_node(&back, id).unwrap();
    assert_eq!(node.field("gestures"), Some(json!([{"type": "tap"}])));
    assert_eq!(node.field("actionEvent"), Some(json!("openBottomSheet")));
    assert_eq!(uib_core::sheet::opened_sheet_id(node), Some("sheet-1"));
    assert_eq!(node.field("accessibilityLabel"), Some(json!("Open details")));
    assert_eq!(node.field("tag"), Some(json!(3)));
}

// ─── Defaulting totality ─────────────────────────────────────────────────

#[test]
fn fresh_nodes_export_a_complete_style() {
    let codec = CanonicalCodec::default();
    let keys: Vec<_> = canonical_style_keys().collect();
    for ty in NodeType::ALL {
        let out = codec.node_to_canonical(&create_node(ty));
        let style = out["style"].as_object().expect("style object");
        for key in &keys {
            assert!(style.contains_key(*key), "{ty}: style lacks `{key}`");
        }
        assert_eq!(out["type"], json!(ty.as_str()));
    }
}

// ─── Root wrapping ───────────────────────────────────────────────────────

#[test]
fn screen_wrapper_import_yields_its_children() {
    let doc = json!({
        "schemaVersion": "1.0",
        "root": {
            "type": "View",
            "id": "screen",
            "children": [
                {"type": "Text", "id": "A", "text": "first"},
                {"type": "Text", "id": "B", "text": "second"}
            ]
        }
    });
    let tree = from_canonical_json(&doc).unwrap();
    let ids: Vec<_> = tree.children().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B"]);
    assert!(find_node(&tree, "screen").is_none());
}

#[test]
fn multi_child_view_without_wrapper_id_is_unwrapped() {
    let doc = json!({
        "root": {
            "type": "View",
            "id": "legacy",
            "children": [{"type": "Spacer", "id": "s1"}, {"type": "Spacer", "id": "s2"}]
        }
    });
    let tree = from_canonical_json(&doc).unwrap();
    assert_eq!(tree.children().len(), 2);
}

#[test]
fn single_child_export_promotes_the_child() {
    let x = create_node(NodeType::ZStack);
    let tree = default_tree().with_children(vec![x.clone()]);
    let doc = to_canonical_json(&tree, &DataMapping::default());
    assert_eq!(doc.root["id"], json!(x.id.as_str()));
    assert_eq!(doc.root["type"], json!("ZStack"));

    let back = from_canonical_json(&doc.to_value()).unwrap();
    assert!(back.id.is_root());
    assert_eq!(back.children().len(), 1);
    assert_eq!(back.children()[0].id, x.id);
}

#[test]
fn empty_canvas_exports_an_empty_wrapper() {
    let doc = to_canonical_json(&default_tree(), &DataMapping::default());
    assert_eq!(doc.root["id"], json!("screen"));
    assert_eq!(doc.root["children"], json!([]));
    assert_eq!(from_canonical_json(&doc.to_value()).unwrap().children().len(), 0);
}

// ─── Data mapping ────────────────────────────────────────────────────────

#[test]
fn document_carries_sanitized_data_mapping() {
    let dm = DataMapping::from_json(&json!({
        "dataModel": [{"id": "d1", "name": "greeting", "value": "hi"}],
        "apiUrl": "  ",
        "apiMethod": "FETCH"
    }));
    let doc = to_canonical_json(&default_tree(), &dm).to_value();
    assert_eq!(doc["dataMapping"]["dataModel"][0]["name"], json!("greeting"));
    assert_eq!(doc["dataMapping"].get("dataSource"), None);
    assert_eq!(doc["schemaVersion"], json!("1.0"));
    assert!(matches!(doc["screenId"], Value::String(_)));
}
