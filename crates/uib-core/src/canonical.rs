//! Canonical JSON: the fully defaulted export format native renderers read.
//!
//! Every exported node carries `type`, `id`, a `style` object with the full
//! style + layout key set, its type's content keys, and the cross-cutting
//! keys. The canvas root is never exported as-is: a single top-level child
//! is promoted to `root`, otherwise the canvas becomes a wrapper View with
//! id `"screen"`. Import reverses both cases.
//!
//! Container types that need more than the generic table (BottomSheet)
//! plug in through [`ContainerCodec`].

use crate::data::{DataMapping, ExportedDataMapping};
use crate::fields::FieldGroup;
use crate::id::{NodeId, SCREEN_WRAPPER_ID};
use crate::model::{Node, NodeKind, NodeType, PresentationStyle};
use crate::sheet::BottomSheetCodec;
use crate::styles::{canonical_style_default, canonical_style_keys};
use crate::tree::dedupe_ids;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

pub const SCHEMA_VERSION: &str = "1.0";

// ─── Extension point ─────────────────────────────────────────────────────

/// Type-specific encoding for a container type.
///
/// A registered codec owns the node's `children` in the export: `recurse`
/// encodes one child with the full codec. On import the core has already
/// decoded children, style, and content before `from_canonical` runs.
pub trait ContainerCodec: Send + Sync {
    fn to_canonical(
        &self,
        node: &Node,
        out: &mut Map<String, Value>,
        recurse: &dyn Fn(&Node) -> Value,
    );

    fn from_canonical(&self, canonical: &Map<String, Value>, node: &mut Node);
}

// ─── Per-type content keys ───────────────────────────────────────────────

fn content_keys(ty: NodeType) -> &'static [&'static str] {
    match ty {
        NodeType::View => &["fitToScreen", "presentationStyle"],
        NodeType::VStack | NodeType::HStack => &["spacing", "alignment"],
        NodeType::ZStack => &["alignment"],
        NodeType::Text => &["text", "alignment", "numberOfLines", "boundListItemProperty"],
        NodeType::Button => &["title", "boundListItemProperty"],
        NodeType::Image => &[
            "src",
            "alt",
            "contentMode",
            "useAsset",
            "assetBundleName",
            "assetImageName",
            "boundListItemProperty",
            "showLoadingIndicator",
        ],
        NodeType::List => &[
            "items",
            "loadMoreEnabled",
            "loadMoreFooterLabel",
            "loadMoreLoadingLabel",
            "sectionGroupingEnabled",
            "listRowSpacing",
            "listSpacingAboveFirst",
            "listSpacingBelowLast",
        ],
        NodeType::ListItemText => &["itemProperty"],
        NodeType::TextField | NodeType::SecureField => &["placeholder", "text"],
        NodeType::Toggle => &["isOn", "label"],
        NodeType::Slider => &["value", "min", "max"],
        NodeType::Picker => &["selection", "options"],
        NodeType::ProgressView => &["progress", "indeterminate"],
        NodeType::Divider => &["axis"],
        NodeType::Link => &["url", "label"],
        NodeType::ListItemContent | NodeType::Spacer | NodeType::BottomSheet => &[],
    }
}

/// Emitted on every node regardless of type.
fn is_cross_cutting(group: FieldGroup) -> bool {
    matches!(
        group,
        FieldGroup::Localization
            | FieldGroup::Accessibility
            | FieldGroup::Behavior
            | FieldGroup::Action
            | FieldGroup::Gesture
            | FieldGroup::Format
    )
}

const CROSS_CUTTING_EXTRAS: [&str; 2] = ["fillRemainingWidth", "componentName"];

fn cross_cutting_keys() -> impl Iterator<Item = &'static str> {
    crate::fields::FIELDS
        .iter()
        .filter(|s| is_cross_cutting(s.group))
        .map(|s| s.key)
        .chain(CROSS_CUTTING_EXTRAS)
}

/// Full style object: set values over the default table. `textColor`
/// falls back to the legacy `color`.
fn pick_style(node: &Node) -> Map<String, Value> {
    canonical_style_keys()
        .map(|key| {
            let mut value = node.field(key).filter(|v| !v.is_null());
            if key == "textColor" && value.is_none() {
                value = node.field("color").filter(|v| !v.is_null());
            }
            let value = value.unwrap_or_else(|| canonical_style_default(key));
            (key.to_string(), value)
        })
        .collect()
}

// ─── Document ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalDocument {
    pub schema_version: String,
    pub root: Value,
    pub screen_id: String,
    pub data_mapping: ExportedDataMapping,
}

impl CanonicalDocument {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ─── Codec ───────────────────────────────────────────────────────────────

pub struct CanonicalCodec {
    contributors: HashMap<NodeType, Box<dyn ContainerCodec>>,
}

impl Default for CanonicalCodec {
    fn default() -> Self {
        let mut codec = Self::empty();
        codec.register_container_codec(NodeType::BottomSheet, Box::new(BottomSheetCodec));
        codec
    }
}

impl std::fmt::Debug for CanonicalCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonicalCodec")
            .field("contributors", &self.contributors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CanonicalCodec {
    /// Codec with no container contributors.
    pub fn empty() -> Self {
        Self {
            contributors: HashMap::new(),
        }
    }

    /// Route `ty` through `codec`, replacing any earlier registration.
    pub fn register_container_codec(&mut self, ty: NodeType, codec: Box<dyn ContainerCodec>) {
        if self.contributors.insert(ty, codec).is_some() {
            log::debug!("replaced container codec for {ty}");
        }
    }

    /// Encode one node and its subtree.
    pub fn node_to_canonical(&self, node: &Node) -> Value {
        let ty = node.node_type();
        let mut out = Map::new();
        out.insert("type".into(), ty.as_str().into());
        out.insert("id".into(), node.id.as_str().into());
        out.insert("style".into(), Value::Object(pick_style(node)));

        for &key in content_keys(ty) {
            out.insert(key.into(), node.field(key).unwrap_or(Value::Null));
        }
        if let NodeKind::Picker { selection, options } = &node.kind
            && selection.is_empty()
        {
            let first = options.first().cloned().unwrap_or_else(|| "Option 1".into());
            out.insert("selection".into(), first);
        }

        match self.contributors.get(&ty) {
            Some(contributor) => {
                let recurse = |child: &Node| self.node_to_canonical(child);
                contributor.to_canonical(node, &mut out, &recurse);
            }
            None if node.is_container() => {
                let children = node
                    .children()
                    .iter()
                    .map(|c| self.node_to_canonical(c))
                    .collect();
                out.insert("children".into(), Value::Array(children));
            }
            None => {}
        }

        for key in cross_cutting_keys() {
            out.insert(key.into(), node.field(key).unwrap_or(Value::Null));
        }
        Value::Object(out)
    }

    /// Decode one canonical node. `None` for non-objects and missing or
    /// unknown types. Absent keys keep the type's defaults.
    pub fn node_from_canonical(&self, value: &Value) -> Option<Node> {
        let obj = value.as_object()?;
        let Some(type_name) = obj.get("type").and_then(Value::as_str) else {
            log::debug!("canonical node without a type dropped");
            return None;
        };
        let ty: NodeType = match type_name.parse() {
            Ok(ty) => ty,
            Err(e) => {
                log::warn!("canonical import: {e}");
                return None;
            }
        };
        let id = obj
            .get("id")
            .and_then(NodeId::from_json)
            .unwrap_or_else(NodeId::generate);
        let mut node = Node::new(id, NodeKind::defaults(ty));

        if let Some(style) = obj.get("style").and_then(Value::as_object) {
            node.apply_fields_where(style, |s| {
                matches!(s.group, FieldGroup::Style | FieldGroup::Layout)
            });
        }
        for &key in content_keys(ty) {
            if let Some(v) = obj.get(key)
                && let Err(e) = node.set_field(key, v)
            {
                log::debug!("canonical import {id}: {e}");
            }
        }
        if ty.is_container() {
            let children = obj
                .get("children")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(|c| self.node_from_canonical(c))
                        .collect()
                })
                .unwrap_or_default();
            node.set_children(children);
        }
        if let Some(contributor) = self.contributors.get(&ty) {
            contributor.from_canonical(obj, &mut node);
        }
        node.apply_fields_where(obj, |s| {
            is_cross_cutting(s.group) || CROSS_CUTTING_EXTRAS.contains(&s.key)
        });
        Some(node)
    }

    /// Export a screen tree with its data mapping.
    pub fn to_canonical_json(&self, tree: &Node, data_mapping: &DataMapping) -> CanonicalDocument {
        let root = match tree.children() {
            [only] => {
                let mut root = self.node_to_canonical(only);
                if let Value::Object(map) = &mut root {
                    let fit = tree.field("fitToScreen").unwrap_or(Value::Bool(false));
                    let style = tree
                        .field("presentationStyle")
                        .unwrap_or_else(|| PresentationStyle::Push.as_str().into());
                    map.insert("fitToScreen".into(), fit);
                    map.insert("presentationStyle".into(), style);
                }
                root
            }
            _ => {
                let mut root = self.node_to_canonical(tree);
                if let Value::Object(map) = &mut root {
                    map.insert("id".into(), SCREEN_WRAPPER_ID.into());
                }
                root
            }
        };
        let screen_id = match tree.field("screenId") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        CanonicalDocument {
            schema_version: SCHEMA_VERSION.into(),
            root,
            screen_id,
            data_mapping: data_mapping.to_export(),
        }
    }

    /// Import a canonical document as a canvas tree rooted at `"root"`.
    /// `None` when `doc.root` is missing or not an object.
    pub fn from_canonical_json(&self, doc: &Value) -> Option<Node> {
        let Some(root) = doc.get("root").and_then(Value::as_object) else {
            log::warn!("canonical import: document has no root object");
            return None;
        };
        let root_children = root.get("children").and_then(Value::as_array);
        let is_wrapper = root.get("id").and_then(Value::as_str) == Some(SCREEN_WRAPPER_ID)
            || (root.get("type").and_then(Value::as_str) == Some(NodeType::View.as_str())
                && root_children.is_some_and(|c| c.len() > 1));

        let children: Vec<Node> = if is_wrapper {
            root_children
                .map(|list| {
                    list.iter()
                        .filter_map(|c| self.node_from_canonical(c))
                        .collect()
                })
                .unwrap_or_default()
        } else {
            doc.get("root")
                .and_then(|r| self.node_from_canonical(r))
                .into_iter()
                .collect()
        };

        let mut canvas = Node::new(
            NodeId::root(),
            NodeKind::View {
                children,
                fit_to_screen: root.get("fitToScreen") == Some(&Value::Bool(true)),
                presentation_style: PresentationStyle::from_json(root.get("presentationStyle")),
                screen_id: doc
                    .get("screenId")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
        );
        let rewritten = dedupe_ids(&mut canvas);
        if rewritten > 0 {
            log::debug!("canonical import rewrote {rewritten} duplicate ids");
        }
        Some(canvas)
    }
}

static DEFAULT_CODEC: LazyLock<CanonicalCodec> = LazyLock::new(CanonicalCodec::default);

/// [`CanonicalCodec::to_canonical_json`] with the default contributors.
pub fn to_canonical_json(tree: &Node, data_mapping: &DataMapping) -> CanonicalDocument {
    DEFAULT_CODEC.to_canonical_json(tree, data_mapping)
}

/// [`CanonicalCodec::from_canonical_json`] with the default contributors.
pub fn from_canonical_json(doc: &Value) -> Option<Node> {
    DEFAULT_CODEC.from_canonical_json(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::create_node;
    use crate::tree::find_node;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn screen(children: Vec<Node>) -> Node {
        crate::model::default_tree().with_children(children)
    }

    #[test]
    fn style_object_has_every_key_for_every_type() {
        let expected: Vec<_> = canonical_style_keys().collect();
        for ty in NodeType::ALL {
            let out = CanonicalCodec::default().node_to_canonical(&create_node(ty));
            let style = out["style"].as_object().unwrap();
            let keys: Vec<_> = style.keys().map(String::as_str).collect();
            assert_eq!(keys.len(), expected.len(), "{ty}");
            for key in &expected {
                assert!(style.contains_key(*key), "{ty} style lacks {key}");
            }
        }
    }

    #[test]
    fn text_color_falls_back_to_legacy_color() {
        let mut text = create_node(NodeType::Text);
        text.style.text_color = None;
        let out = CanonicalCodec::default().node_to_canonical(&text);
        assert_eq!(out["style"]["textColor"], json!("#111111"));

        let bare = Node::new(NodeId::intern("t"), NodeKind::defaults(NodeType::Text));
        let out = CanonicalCodec::default().node_to_canonical(&bare);
        assert_eq!(out["style"]["textColor"], json!("#000000"));
        assert_eq!(out["style"]["width"], Value::Null);
        assert_eq!(out["style"]["paddingTop"], json!(0));
    }

    #[test]
    fn cross_cutting_keys_on_every_node() {
        let out = CanonicalCodec::default().node_to_canonical(&create_node(NodeType::Spacer));
        for key in [
            "localizationEnabled",
            "accessibilityLabel",
            "tag",
            "isUserInteractionEnabled",
            "actionBoundDataModelId",
            "gestures",
            "displayFormat",
            "fillRemainingWidth",
            "componentName",
        ] {
            assert!(out.get(key).is_some(), "missing {key}");
        }
        assert_eq!(out["displayFormat"], Value::Null);
        assert_eq!(out.get("children"), None);
    }

    #[test]
    fn empty_picker_selection_exports_first_option() {
        let picker = create_node(NodeType::Picker)
            .with("selection", "")
            .with("options", json!(["A", "B"]));
        let out = CanonicalCodec::default().node_to_canonical(&picker);
        assert_eq!(out["selection"], json!("A"));

        let empty = create_node(NodeType::Picker)
            .with("selection", "")
            .with("options", json!([]));
        let out = CanonicalCodec::default().node_to_canonical(&empty);
        assert_eq!(out["selection"], json!("Option 1"));
    }

    #[test]
    fn single_child_is_promoted_to_root() {
        let stack = create_node(NodeType::VStack);
        let id = stack.id;
        let tree = screen(vec![stack]).with("fitToScreen", true).with("presentationStyle", "modal");
        let doc = to_canonical_json(&tree, &DataMapping::default());
        assert_eq!(doc.root["id"], json!(id.as_str()));
        assert_eq!(doc.root["fitToScreen"], json!(true));
        assert_eq!(doc.root["presentationStyle"], json!("modal"));
        assert_eq!(doc.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn several_children_export_a_screen_wrapper() {
        let tree = screen(vec![create_node(NodeType::Text), create_node(NodeType::Button)])
            .with("screenId", "home");
        let doc = to_canonical_json(&tree, &DataMapping::default());
        assert_eq!(doc.root["id"], json!("screen"));
        assert_eq!(doc.root["type"], json!("View"));
        assert_eq!(doc.root["children"].as_array().map(Vec::len), Some(2));
        assert_eq!(doc.screen_id, "home");
    }

    #[test]
    fn wrapper_import_spreads_children_onto_canvas() {
        let doc = json!({
            "root": {
                "type": "View",
                "id": "screen",
                "children": [
                    {"type": "Text", "id": "a", "text": "A"},
                    {"type": "Button", "id": "b", "title": "B"}
                ]
            },
            "screenId": "s1"
        });
        let tree = from_canonical_json(&doc).unwrap();
        assert!(tree.id.is_root());
        let ids: Vec<_> = tree.children().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(tree.field("screenId"), Some(json!("s1")));
    }

    #[test]
    fn single_root_import_becomes_only_child() {
        let doc = json!({"root": {"type": "VStack", "id": "v", "children": [], "fitToScreen": true}});
        let tree = from_canonical_json(&doc).unwrap();
        assert_eq!(tree.children().len(), 1);
        assert_eq!(tree.children()[0].id.as_str(), "v");
        assert_eq!(tree.field("fitToScreen"), Some(json!(true)));
        assert_eq!(tree.field("presentationStyle"), Some(json!("push")));
    }

    #[test]
    fn import_requires_root_object() {
        assert_eq!(from_canonical_json(&json!({})), None);
        assert_eq!(from_canonical_json(&json!({"root": "nope"})), None);
        assert_eq!(from_canonical_json(&json!(null)), None);
    }

    #[test]
    fn partial_nodes_are_completed_with_defaults() {
        let doc = json!({"root": {"type": "Text", "id": "t", "numberOfLines": -3, "gestures": [{}]}});
        let tree = from_canonical_json(&doc).unwrap();
        let text = find_node(&tree, "t").unwrap();
        assert_eq!(text.field("text"), Some(json!("Hello")));
        assert_eq!(text.field("numberOfLines"), Some(json!(0)));
        assert_eq!(text.field("gestures"), Some(json!([{"type": "tap"}])));
        assert!(text.behavior.is_user_interaction_enabled);
    }

    #[test]
    fn unknown_types_and_duplicate_ids() {
        let doc = json!({
            "root": {
                "type": "View",
                "id": "screen",
                "children": [
                    {"type": "Carousel", "id": "x"},
                    {"id": "untyped"},
                    {"type": "Text", "id": "dup"},
                    {"type": "Text", "id": "dup"},
                    {"type": "Text", "id": "root"}
                ]
            }
        });
        let tree = from_canonical_json(&doc).unwrap();
        let ids: Vec<_> = tree.children().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], "dup");
        assert_ne!(ids[1], "dup");
        assert_ne!(ids[2], "root");
    }

    #[test]
    fn registered_contributor_owns_its_type() {
        struct Marker;
        impl ContainerCodec for Marker {
            fn to_canonical(
                &self,
                node: &Node,
                out: &mut Map<String, Value>,
                recurse: &dyn Fn(&Node) -> Value,
            ) {
                let kids: Vec<_> = node.children().iter().map(recurse).collect();
                out.insert("items".into(), Value::Array(kids));
                out.insert("marker".into(), true.into());
            }

            fn from_canonical(&self, _: &Map<String, Value>, node: &mut Node) {
                node.component_name = "marked".into();
            }
        }

        let mut codec = CanonicalCodec::empty();
        codec.register_container_codec(NodeType::ZStack, Box::new(Marker));
        let z = create_node(NodeType::ZStack).with_children(vec![create_node(NodeType::Spacer)]);
        let out = codec.node_to_canonical(&z);
        assert_eq!(out["marker"], json!(true));
        assert_eq!(out.get("children"), None);
        assert_eq!(out["items"].as_array().map(Vec::len), Some(1));

        let back = codec.node_from_canonical(&json!({"type": "ZStack", "id": "z"})).unwrap();
        assert_eq!(back.component_name, "marked");
    }
}
