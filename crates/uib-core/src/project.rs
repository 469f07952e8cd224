//! Projects: an ordered set of screens, each one canvas tree.
//!
//! Loading goes through [`normalize_project`], which accepts anything
//! JSON-shaped and either produces a well-formed project or `None`.

use crate::data::DataMapping;
use crate::id::NodeId;
use crate::model::{Node, NodeType, PresentationStyle, scalar_string};
use crate::tree::dedupe_ids;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};

pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";
pub const MANIFEST_FILENAME: &str = "project.json";
pub const SCREENS_DIR: &str = "screens";

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub id: String,
    pub name: String,
    pub tree: Node,
    pub presentation_style: PresentationStyle,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub screens: Vec<Screen>,
}

// ─── Construction ────────────────────────────────────────────────────────

/// New screen with a fresh id. A given tree is normalized (root id forced).
pub fn create_screen(name: &str, tree: Option<Node>) -> Screen {
    Screen {
        id: NodeId::generate().to_string(),
        name: name.to_string(),
        tree: tree.map_or_else(crate::model::default_tree, normalize_tree),
        presentation_style: PresentationStyle::Push,
        order: 0,
    }
}

/// Project with one empty screen. Blank names become "Untitled Project".
pub fn default_project(name: Option<&str>) -> Project {
    let now = now_timestamp();
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_PROJECT_NAME);
    Project {
        id: NodeId::generate().to_string(),
        name: name.to_string(),
        created_at: now.clone(),
        updated_at: now,
        screens: vec![create_screen("Screen 1", None)],
    }
}

// ─── Normalization ───────────────────────────────────────────────────────

/// Decode a flat node, logging and discarding anything invalid.
pub fn normalize_node(value: &Value) -> Option<Node> {
    match Node::from_json(value) {
        Ok(node) => Some(node),
        Err(e) => {
            log::warn!("normalize: {e}");
            None
        }
    }
}

/// Make `tree` a valid screen canvas: a View with id `"root"` and unique
/// ids below it. Any other root type is wrapped in a fresh canvas.
pub fn normalize_tree(tree: Node) -> Node {
    let mut canvas = if tree.node_type() == NodeType::View {
        let mut tree = tree;
        tree.id = NodeId::root();
        tree
    } else {
        crate::model::default_tree().with_children(vec![tree])
    };
    dedupe_ids(&mut canvas);
    canvas
}

fn normalize_screen(index: usize, raw: &Map<String, Value>) -> Screen {
    let tree = raw
        .get("tree")
        .filter(|t| t.is_object())
        .and_then(normalize_node)
        .map_or_else(crate::model::default_tree, normalize_tree);
    Screen {
        id: raw
            .get("id")
            .and_then(scalar_string)
            .unwrap_or_else(|| NodeId::generate().to_string()),
        name: raw
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("Screen {}", index + 1), str::to_string),
        tree,
        presentation_style: PresentationStyle::from_json(raw.get("presentationStyle")),
        order: raw
            .get("order")
            .and_then(Value::as_u64)
            .and_then(|o| u32::try_from(o).ok())
            .unwrap_or(index as u32),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Validate a loaded project. `None` without an object and a truthy `id`.
/// Missing names and timestamps are defaulted, every screen tree is
/// normalized, and an empty screen list gets one blank screen.
pub fn normalize_project(raw: &Value) -> Option<Project> {
    let obj = raw.as_object()?;
    let id = obj.get("id").filter(|v| is_truthy(v)).and_then(scalar_string);
    let Some(id) = id else {
        log::warn!("project has no id");
        return None;
    };
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    let mut screens: Vec<Screen> = obj
        .get("screens")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .enumerate()
                .filter_map(|(i, s)| s.as_object().map(|s| normalize_screen(i, s)))
                .collect()
        })
        .unwrap_or_default();
    if screens.is_empty() {
        screens.push(create_screen("Screen 1", None));
    }
    Some(Project {
        id,
        name: text("name").unwrap_or_else(|| DEFAULT_PROJECT_NAME.into()),
        created_at: text("createdAt").unwrap_or_else(now_timestamp),
        updated_at: text("updatedAt").unwrap_or_else(now_timestamp),
        screens,
    })
}

// ─── Storage forms ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenManifest {
    pub id: String,
    pub name: String,
    pub presentation_style: PresentationStyle,
    pub order: u32,
}

/// Project metadata without trees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub screens: Vec<ScreenManifest>,
}

pub fn project_manifest(project: &Project) -> ProjectManifest {
    ProjectManifest {
        id: project.id.clone(),
        name: project.name.clone(),
        created_at: project.created_at.clone(),
        updated_at: project.updated_at.clone(),
        screens: project
            .screens
            .iter()
            .map(|s| ScreenManifest {
                id: s.id.clone(),
                name: s.name.clone(),
                presentation_style: s.presentation_style,
                order: s.order,
            })
            .collect(),
    }
}

/// Single-file project: manifest plus trees, and the screen data mapping
/// when given.
pub fn project_to_json(project: &Project, data_mapping: Option<&DataMapping>) -> Value {
    let mut value = serde_json::to_value(project).unwrap_or(Value::Null);
    if let (Some(dm), Value::Object(map)) = (data_mapping, &mut value) {
        map.insert(
            "dataMapping".into(),
            serde_json::to_value(dm).unwrap_or(Value::Null),
        );
    }
    value
}

/// Read a single-file project. Same contract as [`normalize_project`].
pub fn parse_project_json(value: &Value) -> Option<Project> {
    normalize_project(value)
}

/// The `dataMapping` stored alongside a project, if any.
pub fn data_mapping_from_project_json(value: &Value) -> Option<DataMapping> {
    value
        .get("dataMapping")
        .filter(|dm| dm.is_object())
        .map(DataMapping::from_json)
}

/// One file of a project bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleEntry {
    pub path: String,
    pub contents: Value,
}

/// Whether `id` can name a file directly under `screens/`.
pub fn is_file_safe_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\', ':', '\0'])
}

/// `project.json` plus a redundant `screens/<id>.json` per screen. Screens
/// whose id cannot be a file name only appear in the manifest.
pub fn bundle_entries(project: &Project, data_mapping: Option<&DataMapping>) -> Vec<BundleEntry> {
    let mut entries = vec![BundleEntry {
        path: MANIFEST_FILENAME.into(),
        contents: project_to_json(project, data_mapping),
    }];
    let screens = project.screens.iter().filter(|s| {
        let safe = is_file_safe_id(&s.id);
        if !safe {
            log::warn!("screen id {:?} is not a safe file name, not bundled", s.id);
        }
        safe
    });
    entries.extend(screens.map(|s| {
        BundleEntry {
            path: format!("{SCREENS_DIR}/{}.json", s.id),
            contents: json!({
                "id": s.id,
                "name": s.name,
                "presentationStyle": s.presentation_style,
                "order": s.order,
                "tree": s.tree,
            }),
        }
    }));
    entries
}

// ─── Screen operations ───────────────────────────────────────────────────

impl Project {
    pub fn screen(&self, id: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == id)
    }

    pub fn screen_mut(&mut self, id: &str) -> Option<&mut Screen> {
        self.screens.iter_mut().find(|s| s.id == id)
    }

    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }

    /// Append an empty screen and return its id. Blank names become
    /// "Screen N".
    pub fn add_screen(&mut self, name: Option<&str>) -> String {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| format!("Screen {}", self.screens.len() + 1), str::to_string);
        self.push_screen(create_screen(&name, None))
    }

    /// Append a screen holding `tree`. `None` unless the tree is a View.
    pub fn add_screen_from_tree(&mut self, name: &str, tree: Node) -> Option<String> {
        if tree.node_type() != NodeType::View {
            log::debug!("add_screen_from_tree: root is {}", tree.node_type());
            return None;
        }
        Some(self.push_screen(create_screen(name, Some(tree))))
    }

    fn push_screen(&mut self, mut screen: Screen) -> String {
        screen.order = self.screens.len() as u32;
        let id = screen.id.clone();
        self.screens.push(screen);
        self.touch();
        id
    }

    /// Remove a screen and renumber the rest. The last screen can't go.
    pub fn delete_screen(&mut self, id: &str) -> bool {
        if self.screens.len() <= 1 {
            log::debug!("delete_screen: refusing to delete the last screen");
            return false;
        }
        let Some(pos) = self.screens.iter().position(|s| s.id == id) else {
            return false;
        };
        self.screens.remove(pos);
        for (i, screen) in self.screens.iter_mut().enumerate() {
            screen.order = i as u32;
        }
        self.touch();
        true
    }

    /// Rename with surrounding whitespace trimmed.
    pub fn rename_screen(&mut self, id: &str, name: &str) -> bool {
        let Some(screen) = self.screen_mut(id) else {
            return false;
        };
        screen.name = name.trim().to_string();
        self.touch();
        true
    }
}
