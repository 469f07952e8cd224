//! The document store: the one place editor state lives.
//!
//! A [`DocumentStore`] owns the open [`Project`], which screen is selected,
//! the screen's [`DataMapping`], the undo history, an optional persistence
//! backend, and change subscribers. Every edit goes through a method here so
//! that history, autosave, and notifications stay consistent.
//!
//! Edits that would not apply (missing ids, refused moves) return `false`
//! and leave history untouched.

use crate::commands::{CommandStack, DEFAULT_HISTORY_DEPTH, Snapshot};
use crate::storage::{Persistence, StorageError};
use serde_json::Value;
use uib_core::canonical::CanonicalDocument;
use uib_core::patch::{apply_update_in_place, apply_updates_in_place};
use uib_core::project::{
    data_mapping_from_project_json, normalize_tree, parse_project_json, project_to_json,
};
use uib_core::tree::{
    add_node_in_place, check_move, find_node, move_node_in_place, remove_node_in_place,
};
use uib_core::{
    ApiBinding, DataMapping, DataModelEntry, Node, NodeId, NodePatch, NodeType, Project,
    apply_bindings, binding_patches, default_project, from_canonical_json, to_canonical_json,
};

// ─── Configuration ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Undo steps kept.
    pub history_depth: usize,
    /// Save to the persistence backend after every committed change.
    pub autosave: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            autosave: true,
        }
    }
}

// ─── Events & errors ─────────────────────────────────────────────────────

/// What changed, sent to every subscriber after the change is in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The selected screen's tree changed.
    TreeChanged { screen_id: String },
    DataMappingChanged,
    /// Screens were added, removed, or renamed.
    ScreensChanged,
    ScreenSelected { screen_id: String },
    /// A whole project was opened or created.
    ProjectReplaced,
    /// Undo or redo installed a snapshot.
    HistoryRestored,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not a recognized export shape")]
    NotRecognized,
    #[error("not a recognized project file")]
    NotAProject,
}

type Listener = Box<dyn FnMut(&DocumentEvent)>;

// ─── Store ───────────────────────────────────────────────────────────────

pub struct DocumentStore {
    config: EditorConfig,
    project: Project,
    selected_screen: String,
    data_mapping: DataMapping,
    history: CommandStack,
    storage: Option<Box<dyn Persistence>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("config", &self.config)
            .field("project", &self.project.id)
            .field("selected_screen", &self.selected_screen)
            .field("history", &self.history)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl DocumentStore {
    /// Store holding a fresh default project, without persistence.
    pub fn new(config: EditorConfig) -> Self {
        let project = default_project(None);
        let selected_screen = first_screen_id(&project);
        Self {
            history: CommandStack::new(config.history_depth),
            config,
            project,
            selected_screen,
            data_mapping: DataMapping::default(),
            storage: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Store backed by `storage`. Call [`DocumentStore::load`] to read it.
    pub fn with_storage(config: EditorConfig, storage: Box<dyn Persistence>) -> Self {
        let mut store = Self::new(config);
        store.storage = Some(storage);
        store
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn selected_screen_id(&self) -> &str {
        &self.selected_screen
    }

    /// Tree of the selected screen.
    pub fn tree(&self) -> &Node {
        match self.project.screen(&self.selected_screen) {
            Some(screen) => &screen.tree,
            None => &self.project.screens[0].tree,
        }
    }

    pub fn data_mapping(&self) -> &DataMapping {
        &self.data_mapping
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        find_node(self.tree(), id)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Replace the store's contents with the stored project. Missing or
    /// unreadable storage leaves a fresh default project. History is reset.
    pub fn load(&mut self) {
        let stored = match self.storage.as_ref().map(|s| s.load()) {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                log::warn!("could not load stored project: {e}");
                None
            }
            None => None,
        };
        let loaded = stored.as_ref().and_then(|value| {
            let project = parse_project_json(value)?;
            let dm = data_mapping_from_project_json(value).unwrap_or_default();
            Some((project, dm))
        });
        let (project, data_mapping) = loaded.unwrap_or_else(|| {
            if stored.is_some() {
                log::warn!("stored project is not a recognized project shape");
            }
            (default_project(None), DataMapping::default())
        });
        self.selected_screen = first_screen_id(&project);
        self.project = project;
        self.data_mapping = data_mapping;
        self.history.clear();
        self.emit(&DocumentEvent::ProjectReplaced);
    }

    /// Write the project and data mapping to storage. A store without
    /// storage saves nothing and succeeds.
    pub fn save(&mut self) -> Result<(), StorageError> {
        let Some(storage) = self.storage.as_mut() else {
            return Ok(());
        };
        storage.save(&project_to_json(&self.project, Some(&self.data_mapping)))?;
        self.emit(&DocumentEvent::Saved);
        Ok(())
    }

    /// The single-file project JSON, data mapping included.
    pub fn project_json(&self) -> Value {
        project_to_json(&self.project, Some(&self.data_mapping))
    }

    fn autosave(&mut self) {
        if !self.config.autosave || self.storage.is_none() {
            return;
        }
        if let Err(e) = self.save() {
            log::warn!("autosave failed: {e}");
        }
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: &DocumentEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.tree().clone(), self.data_mapping.clone())
            .on_screen(self.selected_screen.as_str())
    }

    fn push_snapshot(&mut self) {
        let current = self.snapshot();
        self.history.push_snapshot(&current);
    }

    /// Select the screen a snapshot was taken from. Snapshots from screens
    /// that no longer exist restore into the selected screen.
    fn focus_snapshot_screen(&mut self, screen_id: Option<String>) {
        if let Some(id) = screen_id
            && !self.select_screen(&id)
        {
            log::debug!("snapshot screen {id} is gone, restoring into {}", self.selected_screen);
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        *self.tree_mut() = snapshot.tree;
        self.data_mapping = snapshot.data_mapping;
        self.emit(&DocumentEvent::HistoryRestored);
        self.autosave();
    }

    pub fn undo(&mut self) -> bool {
        let Some(target) = self.history.peek_undo().map(|s| s.screen_id.clone()) else {
            return false;
        };
        self.focus_snapshot_screen(target);
        let current = self.snapshot();
        match self.history.undo(&current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let Some(target) = self.history.peek_redo().map(|s| s.screen_id.clone()) else {
            return false;
        };
        self.focus_snapshot_screen(target);
        let current = self.snapshot();
        match self.history.redo(&current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    // ─── Tree edits ──────────────────────────────────────────────────────

    fn tree_mut(&mut self) -> &mut Node {
        let pos = self
            .project
            .screens
            .iter()
            .position(|s| s.id == self.selected_screen)
            .unwrap_or(0);
        &mut self.project.screens[pos].tree
    }

    fn commit_tree(&mut self) {
        self.project.touch();
        let screen_id = self.selected_screen.clone();
        self.emit(&DocumentEvent::TreeChanged { screen_id });
        self.autosave();
    }

    /// Replace the selected screen's tree. The tree is normalized first.
    pub fn set_tree(&mut self, tree: Node) {
        self.push_snapshot();
        *self.tree_mut() = normalize_tree(tree);
        self.commit_tree();
    }

    /// Insert `node` under `parent` at `index` (clamped). `false` when the
    /// parent is missing or cannot hold children.
    pub fn insert_node(&mut self, parent: &str, node: Node, index: usize) -> bool {
        if !find_node(self.tree(), parent).is_some_and(Node::is_container) {
            log::debug!("insert_node: {parent} is not a container in this tree");
            return false;
        }
        self.push_snapshot();
        let inserted = add_node_in_place(self.tree_mut(), parent, node, index).is_ok();
        self.commit_tree();
        inserted
    }

    /// Insert `node` as the last child of `parent`.
    pub fn append_node(&mut self, parent: &str, node: Node) -> bool {
        self.insert_node(parent, node, usize::MAX)
    }

    pub fn move_node(&mut self, id: &str, target_parent: &str, index: usize) -> bool {
        let (id, target) = (NodeId::intern(id), NodeId::intern(target_parent));
        if let Err(e) = check_move(self.tree(), id, target) {
            log::debug!("move_node {id} -> {target} refused: {e}");
            return false;
        }
        self.push_snapshot();
        let moved = move_node_in_place(self.tree_mut(), id, target, index).is_ok();
        self.commit_tree();
        moved
    }

    /// Remove a node and its subtree, returning it. The root stays.
    pub fn delete_node(&mut self, id: &str) -> Option<Node> {
        let node_id = NodeId::intern(id);
        if node_id.is_root() || find_node(self.tree(), node_id).is_none() {
            return None;
        }
        self.push_snapshot();
        let removed = remove_node_in_place(self.tree_mut(), node_id);
        self.commit_tree();
        removed
    }

    /// Merge one patch. `false` when no node has its id.
    pub fn update_node(&mut self, patch: &NodePatch) -> bool {
        if find_node(self.tree(), patch.id).is_none() {
            log::debug!("update_node: no node {}", patch.id);
            return false;
        }
        self.push_snapshot();
        apply_update_in_place(self.tree_mut(), patch);
        self.commit_tree();
        true
    }

    /// Merge several patches as one undo step. Returns how many applied.
    pub fn update_nodes(&mut self, patches: &[NodePatch]) -> usize {
        if !patches.iter().any(|p| find_node(self.tree(), p.id).is_some()) {
            return 0;
        }
        self.push_snapshot();
        let applied = apply_updates_in_place(self.tree_mut(), patches);
        self.commit_tree();
        applied
    }

    // ─── Data mapping edits ──────────────────────────────────────────────

    fn commit_data_mapping(&mut self) {
        self.emit(&DocumentEvent::DataMappingChanged);
        self.autosave();
    }

    /// Replace the whole data mapping.
    pub fn set_data_mapping(&mut self, data_mapping: DataMapping) {
        self.update_data_mapping(|dm| *dm = data_mapping);
    }

    /// Edit the data mapping in place as one undo step. Nothing is recorded
    /// when the edit leaves the mapping unchanged.
    pub fn update_data_mapping(&mut self, edit: impl FnOnce(&mut DataMapping)) {
        let mut next = self.data_mapping.clone();
        edit(&mut next);
        if next == self.data_mapping {
            return;
        }
        self.push_snapshot();
        self.data_mapping = next;
        self.commit_data_mapping();
    }

    pub fn set_data_model(&mut self, entries: Vec<DataModelEntry>) {
        self.update_data_mapping(|dm| dm.data_model = entries);
    }

    pub fn set_mock_api_json(&mut self, json: Option<Value>) {
        self.update_data_mapping(|dm| dm.mock_api_json = json);
    }

    pub fn set_mock_api_bindings(&mut self, bindings: Vec<ApiBinding>) {
        self.update_data_mapping(|dm| dm.mock_api_bindings = bindings);
    }

    /// API endpoint settings; blank values clear the setting.
    pub fn set_api_config(&mut self, url: Option<&str>, method: Option<&str>) {
        let clean = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let (url, method) = (clean(url), clean(method));
        self.update_data_mapping(|dm| {
            dm.api_url = url;
            dm.api_method = method;
        });
    }

    /// Back to an empty mapping.
    pub fn reset_data_mapping(&mut self) {
        self.set_data_mapping(DataMapping::default());
    }

    /// Run the mock response through the bindings, then push every bound
    /// entry's value into its node. Both halves land as one undo step.
    /// Returns the number of node patches applied.
    pub fn apply_mock_bindings(&mut self) -> usize {
        let Some(response) = self.data_mapping.mock_api_json.as_ref() else {
            log::debug!("apply_mock_bindings: no mock response set");
            return 0;
        };
        let data_model = apply_bindings(
            response,
            &self.data_mapping.mock_api_bindings,
            &self.data_mapping.data_model,
        );
        let patches = binding_patches(&data_model);
        let tree_changes = patches
            .iter()
            .any(|p| find_node(self.tree(), p.id).is_some());
        if data_model == self.data_mapping.data_model && !tree_changes {
            return 0;
        }
        self.push_snapshot();
        self.data_mapping.data_model = data_model;
        let applied = apply_updates_in_place(self.tree_mut(), &patches);
        self.commit_data_mapping();
        if applied > 0 {
            self.commit_tree();
        }
        applied
    }

    /// Set one entry's value and, when the entry is bound, the bound node
    /// property with it, as one undo step. `false` for an unknown entry.
    pub fn set_entry_value(&mut self, entry_id: &str, value: Value) -> bool {
        let Some(entry) = self.data_mapping.entry(entry_id) else {
            log::debug!("set_entry_value: no entry {entry_id}");
            return false;
        };
        let patch = binding_patches(&[entry.clone().with_value(value.clone())])
            .into_iter()
            .next();
        self.push_snapshot();
        if let Some(entry) = self
            .data_mapping
            .data_model
            .iter_mut()
            .find(|e| e.id == entry_id)
        {
            entry.value = Some(value);
        }
        self.commit_data_mapping();
        if let Some(patch) = patch
            && apply_update_in_place(self.tree_mut(), &patch)
        {
            self.commit_tree();
        }
        true
    }

    // ─── Import / export ─────────────────────────────────────────────────

    /// Load a flat editor tree (the in-memory node shape) into the selected
    /// screen. The root must be a View.
    pub fn load_tree_json(&mut self, text: &str) -> Result<(), ImportError> {
        let value: Value = serde_json::from_str(text)?;
        let tree = match Node::from_json(&value) {
            Ok(tree) if tree.node_type() == NodeType::View => tree,
            Ok(tree) => {
                log::warn!("load_tree_json: root is {}, not View", tree.node_type());
                return Err(ImportError::NotRecognized);
            }
            Err(e) => {
                log::warn!("load_tree_json: {e}");
                return Err(ImportError::NotRecognized);
            }
        };
        self.set_tree(tree);
        Ok(())
    }

    /// Import a canonical document, or a bare flat View tree, into the
    /// selected screen. A canonical document also replaces the data mapping.
    /// Nothing changes on failure.
    pub fn import_document(&mut self, text: &str) -> Result<(), ImportError> {
        let value: Value = serde_json::from_str(text)?;
        self.import_value(&value)
    }

    pub fn import_value(&mut self, value: &Value) -> Result<(), ImportError> {
        if value.get("root").is_some() {
            let tree = from_canonical_json(value).ok_or(ImportError::NotRecognized)?;
            let data_mapping = value
                .get("dataMapping")
                .map(|dm| DataMapping::from_json(dm).sanitized())
                .unwrap_or_default();
            self.push_snapshot();
            *self.tree_mut() = tree;
            self.data_mapping = data_mapping;
            self.commit_data_mapping();
            self.commit_tree();
            return Ok(());
        }
        match value.get("type").and_then(Value::as_str) {
            Some(ty) if ty == NodeType::View.as_str() => {
                let tree = Node::from_json(value).map_err(|e| {
                    log::warn!("import: {e}");
                    ImportError::NotRecognized
                })?;
                self.set_tree(tree);
                Ok(())
            }
            _ => {
                log::warn!("import: document has neither a root nor a View tree");
                Err(ImportError::NotRecognized)
            }
        }
    }

    /// Canonical document for the selected screen.
    pub fn export_document(&self) -> CanonicalDocument {
        to_canonical_json(self.tree(), &self.data_mapping)
    }

    // ─── Projects ────────────────────────────────────────────────────────

    /// Open a single-file project, selecting its first screen.
    pub fn open_project(&mut self, value: &Value) -> Result<(), ImportError> {
        let project = parse_project_json(value).ok_or(ImportError::NotAProject)?;
        let data_mapping = data_mapping_from_project_json(value).unwrap_or_default();
        self.replace_project(project, data_mapping);
        Ok(())
    }

    /// Start over with an empty project.
    pub fn new_project(&mut self, name: Option<&str>) {
        self.replace_project(default_project(name), DataMapping::default());
    }

    fn replace_project(&mut self, project: Project, data_mapping: DataMapping) {
        self.push_snapshot();
        self.selected_screen = first_screen_id(&project);
        self.project = project;
        self.data_mapping = data_mapping;
        self.emit(&DocumentEvent::ProjectReplaced);
        self.autosave();
    }

    // ─── Screens ─────────────────────────────────────────────────────────

    /// Add an empty screen and select it. Returns the new screen's id.
    pub fn add_screen(&mut self, name: Option<&str>) -> String {
        let id = self.project.add_screen(name);
        self.emit(&DocumentEvent::ScreensChanged);
        self.select_screen(&id);
        self.autosave();
        id
    }

    /// Delete a screen. Deleting the selected one selects the first
    /// remaining screen. The last screen can't be deleted.
    pub fn delete_screen(&mut self, id: &str) -> bool {
        if !self.project.delete_screen(id) {
            return false;
        }
        self.emit(&DocumentEvent::ScreensChanged);
        if self.selected_screen == id {
            let first = first_screen_id(&self.project);
            self.select_screen(&first);
        }
        self.autosave();
        true
    }

    pub fn rename_screen(&mut self, id: &str, name: &str) -> bool {
        if !self.project.rename_screen(id, name) {
            return false;
        }
        self.emit(&DocumentEvent::ScreensChanged);
        self.autosave();
        true
    }

    pub fn select_screen(&mut self, id: &str) -> bool {
        if self.project.screen(id).is_none() {
            return false;
        }
        if self.selected_screen != id {
            self.selected_screen = id.to_string();
            self.emit(&DocumentEvent::ScreenSelected {
                screen_id: id.to_string(),
            });
        }
        true
    }
}

fn first_screen_id(project: &Project) -> String {
    project
        .screens
        .first()
        .map(|s| s.id.clone())
        .unwrap_or_default()
}
