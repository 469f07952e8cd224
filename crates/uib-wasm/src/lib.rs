//! WASM bridge for the UI builder: exposes the document store to the
//! browser editor.
//!
//! Compiled via `wasm-pack build --target web`. Nodes, patches, and
//! documents cross the boundary as JSON strings in the flat editor shape;
//! failures are reported on the browser console and surface to JS as
//! `false` / empty strings.

mod local;

use serde_json::{Value, json};
use std::collections::HashMap;
use uib_core::components::{component_description, component_display_name, NAVIGATION_BAR};
use uib_core::data::bindable_targets;
use uib_core::{Node, NodePatch, NodeType, create_node_named};
use uib_editor::document::{DocumentEvent, DocumentStore, EditorConfig, SubscriptionId};
use wasm_bindgen::prelude::*;

pub use local::LocalStorage;

/// The main WASM-facing editor controller. All edits from the page go
/// through this struct.
#[wasm_bindgen]
pub struct UiBuilder {
    store: DocumentStore,
    subscriptions: HashMap<u32, SubscriptionId>,
    next_subscription: u32,
}

impl Default for UiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl UiBuilder {
    /// In-memory editor with a fresh project and no persistence.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self::from_store(DocumentStore::new(EditorConfig {
            autosave: false,
            ..EditorConfig::default()
        }))
    }

    /// Editor persisted in `window.localStorage` under `key`, loaded now and
    /// autosaved after every change.
    pub fn with_local_storage(key: &str) -> UiBuilder {
        console_error_panic_hook_setup();
        let mut store =
            DocumentStore::with_storage(EditorConfig::default(), Box::new(LocalStorage::new(key)));
        store.load();
        Self::from_store(store)
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    /// Selected screen's tree in the flat editor shape.
    pub fn tree_json(&self) -> String {
        to_json_string(&self.store.tree().to_json())
    }

    pub fn node_json(&self, node_id: &str) -> String {
        self.store
            .find(node_id)
            .map(|n| to_json_string(&n.to_json()))
            .unwrap_or_default()
    }

    pub fn project_json(&self) -> String {
        to_json_string(&self.store.project_json())
    }

    pub fn data_mapping_json(&self) -> String {
        serde_json::to_string(self.store.data_mapping()).unwrap_or_else(|_| "{}".into())
    }

    pub fn selected_screen_id(&self) -> String {
        self.store.selected_screen_id().to_string()
    }

    /// Canonical document of the selected screen, pretty-printed.
    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(&self.store.export_document())
            .unwrap_or_else(|_| "{}".into())
    }

    /// Every bindable `(node, property)` pair of the selected screen.
    pub fn bindable_targets_json(&self) -> String {
        let targets: Vec<Value> = bindable_targets(self.store.tree())
            .into_iter()
            .map(|t| {
                json!({
                    "nodeId": t.node_id.as_str(),
                    "nodeType": t.node_type.as_str(),
                    "propKey": t.prop_key,
                    "propLabel": t.prop_label,
                    "pathLabel": t.path_label,
                    "currentValue": t.current_value,
                })
            })
            .collect();
        to_json_string(&Value::Array(targets))
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    // ─── Tree edits ──────────────────────────────────────────────────────

    /// A fully defaulted node of `type_name`, or an empty string for an
    /// unknown type. The node is not inserted.
    pub fn create_node_json(&self, type_name: &str) -> String {
        match create_node_named(type_name) {
            Ok(node) => to_json_string(&node.to_json()),
            Err(e) => {
                report("create_node", e);
                String::new()
            }
        }
    }

    pub fn insert_node_json(&mut self, parent_id: &str, node_json: &str, index: usize) -> bool {
        match parse_node(node_json) {
            Some(node) => self.store.insert_node(parent_id, node, index),
            None => false,
        }
    }

    pub fn append_node_json(&mut self, parent_id: &str, node_json: &str) -> bool {
        match parse_node(node_json) {
            Some(node) => self.store.append_node(parent_id, node),
            None => false,
        }
    }

    pub fn move_node(&mut self, node_id: &str, target_parent_id: &str, index: usize) -> bool {
        self.store.move_node(node_id, target_parent_id, index)
    }

    pub fn delete_node(&mut self, node_id: &str) -> bool {
        self.store.delete_node(node_id).is_some()
    }

    /// Merge `{id, ...fields}` into the node with that id.
    pub fn update_node_json(&mut self, patch_json: &str) -> bool {
        match parse_value(patch_json).as_ref().and_then(NodePatch::from_json) {
            Some(patch) => self.store.update_node(&patch),
            None => {
                report("update_node", "patch needs an object with an id");
                false
            }
        }
    }

    /// Merge an array of patches as one undo step. Returns how many applied.
    pub fn update_nodes_json(&mut self, patches_json: &str) -> u32 {
        let patches: Vec<NodePatch> = parse_value(patches_json)
            .as_ref()
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(NodePatch::from_json).collect())
            .unwrap_or_default();
        self.store.update_nodes(&patches) as u32
    }

    /// Replace the selected screen's tree with a flat View tree.
    pub fn load_tree_json(&mut self, tree_json: &str) -> bool {
        self.store
            .load_tree_json(tree_json)
            .map_err(|e| report("load_tree", e))
            .is_ok()
    }

    /// Import a canonical document (or bare View tree) into the selected
    /// screen.
    pub fn import_json(&mut self, doc_json: &str) -> bool {
        self.store
            .import_document(doc_json)
            .map_err(|e| report("import", e))
            .is_ok()
    }

    // ─── Data mapping ────────────────────────────────────────────────────

    pub fn set_data_mapping_json(&mut self, data_mapping_json: &str) -> bool {
        match parse_value(data_mapping_json) {
            Some(value) if value.is_object() => {
                self.store
                    .set_data_mapping(uib_core::DataMapping::from_json(&value));
                true
            }
            _ => false,
        }
    }

    pub fn reset_data_mapping(&mut self) {
        self.store.reset_data_mapping();
    }

    /// Returns how many node properties received a bound value.
    pub fn apply_mock_bindings(&mut self) -> u32 {
        self.store.apply_mock_bindings() as u32
    }

    pub fn set_entry_value_json(&mut self, entry_id: &str, value_json: &str) -> bool {
        match parse_value(value_json) {
            Some(value) => self.store.set_entry_value(entry_id, value),
            None => false,
        }
    }

    // ─── Projects & screens ──────────────────────────────────────────────

    pub fn open_project_json(&mut self, project_json: &str) -> bool {
        let Some(value) = parse_value(project_json) else {
            return false;
        };
        self.store
            .open_project(&value)
            .map_err(|e| report("open_project", e))
            .is_ok()
    }

    pub fn new_project(&mut self, name: Option<String>) {
        self.store.new_project(name.as_deref());
    }

    /// Returns the new screen's id.
    pub fn add_screen(&mut self, name: Option<String>) -> String {
        self.store.add_screen(name.as_deref())
    }

    pub fn delete_screen(&mut self, screen_id: &str) -> bool {
        self.store.delete_screen(screen_id)
    }

    pub fn rename_screen(&mut self, screen_id: &str, name: &str) -> bool {
        self.store.rename_screen(screen_id, name)
    }

    pub fn select_screen(&mut self, screen_id: &str) -> bool {
        self.store.select_screen(screen_id)
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    pub fn save(&mut self) -> bool {
        self.store.save().map_err(|e| report("save", e)).is_ok()
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    /// Call `callback` with a JSON event string after every change.
    /// Returns a handle for [`UiBuilder::unsubscribe`].
    pub fn subscribe(&mut self, callback: js_sys::Function) -> u32 {
        let sid = self.store.subscribe(move |event| {
            let payload = JsValue::from_str(&event_json(event).to_string());
            if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                report("subscriber", format!("{e:?}"));
            }
        });
        let handle = self.next_subscription;
        self.next_subscription += 1;
        self.subscriptions.insert(handle, sid);
        handle
    }

    pub fn unsubscribe(&mut self, handle: u32) -> bool {
        self.subscriptions
            .remove(&handle)
            .is_some_and(|sid| self.store.unsubscribe(sid))
    }
}

impl UiBuilder {
    fn from_store(store: DocumentStore) -> Self {
        Self {
            store,
            subscriptions: HashMap::new(),
            next_subscription: 0,
        }
    }

    /// The wrapped store, for Rust callers.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

// ─── Standalone helpers (no editor needed) ───────────────────────────────

/// Palette entries: every node type plus composite presets, as JSON
/// `[{type, name, description, container}]`.
#[wasm_bindgen]
pub fn palette_json() -> String {
    let mut entries: Vec<Value> = NodeType::ALL
        .into_iter()
        .map(|ty| {
            json!({
                "type": ty.as_str(),
                "name": ty.display_name(),
                "description": ty.description(),
                "container": ty.is_container(),
            })
        })
        .collect();
    entries.push(json!({
        "type": NAVIGATION_BAR,
        "name": component_display_name(NAVIGATION_BAR),
        "description": component_description(NAVIGATION_BAR),
        "container": true,
    }));
    to_json_string(&Value::Array(entries))
}

/// A fresh navigation bar composite in the flat editor shape.
#[wasm_bindgen]
pub fn create_navigation_bar_json() -> String {
    to_json_string(&uib_core::components::create_navigation_bar().to_json())
}

/// Validate a canonical document. Returns JSON: `{"ok":true}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_document(doc_json: &str) -> String {
    let result = serde_json::from_str::<Value>(doc_json)
        .map_err(|e| e.to_string())
        .and_then(|doc| {
            uib_core::from_canonical_json(&doc)
                .map(|_| ())
                .ok_or_else(|| "not a recognized export shape".to_string())
        });
    let out = match result {
        Ok(()) => json!({"ok": true}),
        Err(error) => json!({"ok": false, "error": error}),
    };
    out.to_string()
}

// ─── Internals ───────────────────────────────────────────────────────────

fn event_json(event: &DocumentEvent) -> Value {
    match event {
        DocumentEvent::TreeChanged { screen_id } => {
            json!({"type": "treeChanged", "screenId": screen_id})
        }
        DocumentEvent::DataMappingChanged => json!({"type": "dataMappingChanged"}),
        DocumentEvent::ScreensChanged => json!({"type": "screensChanged"}),
        DocumentEvent::ScreenSelected { screen_id } => {
            json!({"type": "screenSelected", "screenId": screen_id})
        }
        DocumentEvent::ProjectReplaced => json!({"type": "projectReplaced"}),
        DocumentEvent::HistoryRestored => json!({"type": "historyRestored"}),
        DocumentEvent::Saved => json!({"type": "saved"}),
    }
}

fn to_json_string(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn parse_value(text: &str) -> Option<Value> {
    serde_json::from_str(text)
        .map_err(|e| report("parse", e))
        .ok()
}

fn parse_node(text: &str) -> Option<Node> {
    let value = parse_value(text)?;
    Node::from_json(&value).map_err(|e| report("node", e)).ok()
}

/// Console on the web, the log facade elsewhere.
fn report(context: &str, error: impl std::fmt::Display) {
    let msg = format!("uib {context}: {error}");
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    log::warn!("{msg}");
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("uib WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
