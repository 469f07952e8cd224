//! Core data model for UI builder trees.
//!
//! A screen is a tree of `Node`s rooted at a canvas View whose id is always
//! `"root"`. Every node carries the same cross-cutting blocks (style, layout,
//! localization, accessibility, behavior, action, gestures, display format)
//! plus a `NodeKind` holding the type-specific fields. Container kinds own
//! their children, so a non-container can never hold any.
//!
//! Style and layout values are sparse (`Option`): a missing value means
//! "use the default" and is filled in by the canonical codec on export.

use crate::id::NodeId;
use crate::sheet::SheetProps;
use crate::styles::STYLE_DEFINITIONS;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

// ─── Node types ──────────────────────────────────────────────────────────

/// The closed set of node types a tree may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    View,
    VStack,
    HStack,
    ZStack,
    Text,
    Button,
    Image,
    List,
    ListItemContent,
    ListItemText,
    BottomSheet,
    TextField,
    Toggle,
    Slider,
    Picker,
    ProgressView,
    Divider,
    Spacer,
    Link,
    SecureField,
}

/// Returned when a type name is not one of [`NodeType::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node type `{0}`")]
pub struct UnknownTypeError(pub String);

impl NodeType {
    pub const ALL: [NodeType; 20] = [
        NodeType::View,
        NodeType::VStack,
        NodeType::HStack,
        NodeType::ZStack,
        NodeType::Text,
        NodeType::Button,
        NodeType::Image,
        NodeType::List,
        NodeType::ListItemContent,
        NodeType::ListItemText,
        NodeType::BottomSheet,
        NodeType::TextField,
        NodeType::Toggle,
        NodeType::Slider,
        NodeType::Picker,
        NodeType::ProgressView,
        NodeType::Divider,
        NodeType::Spacer,
        NodeType::Link,
        NodeType::SecureField,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            NodeType::View => "View",
            NodeType::VStack => "VStack",
            NodeType::HStack => "HStack",
            NodeType::ZStack => "ZStack",
            NodeType::Text => "Text",
            NodeType::Button => "Button",
            NodeType::Image => "Image",
            NodeType::List => "List",
            NodeType::ListItemContent => "ListItemContent",
            NodeType::ListItemText => "ListItemText",
            NodeType::BottomSheet => "BottomSheet",
            NodeType::TextField => "TextField",
            NodeType::Toggle => "Toggle",
            NodeType::Slider => "Slider",
            NodeType::Picker => "Picker",
            NodeType::ProgressView => "ProgressView",
            NodeType::Divider => "Divider",
            NodeType::Spacer => "Spacer",
            NodeType::Link => "Link",
            NodeType::SecureField => "SecureField",
        }
    }

    /// Containers hold an ordered list of children; nothing else does.
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            NodeType::View
                | NodeType::VStack
                | NodeType::HStack
                | NodeType::ZStack
                | NodeType::List
                | NodeType::ListItemContent
                | NodeType::BottomSheet
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = UnknownTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTypeError(s.to_string()))
    }
}

// ─── Enumerated field values ─────────────────────────────────────────────

/// How a node is sized and placed relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    /// Flow inside the parent stack.
    #[default]
    AutoLayout,
    /// Fill the parent.
    AutoResize,
    /// Fixed frame at `x`/`y`.
    FreeForm,
}

impl LayoutMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            LayoutMode::AutoLayout => "autoLayout",
            LayoutMode::AutoResize => "autoResize",
            LayoutMode::FreeForm => "freeForm",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "autoLayout" => Some(LayoutMode::AutoLayout),
            "autoResize" => Some(LayoutMode::AutoResize),
            "freeForm" => Some(LayoutMode::FreeForm),
            _ => None,
        }
    }
}

/// How a screen (or a View standing in for one) is presented natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationStyle {
    #[default]
    Push,
    Present,
    Modal,
}

impl PresentationStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            PresentationStyle::Push => "push",
            PresentationStyle::Present => "present",
            PresentationStyle::Modal => "modal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "push" => Some(PresentationStyle::Push),
            "present" => Some(PresentationStyle::Present),
            "modal" => Some(PresentationStyle::Modal),
            _ => None,
        }
    }

    /// Lenient read used by importers: anything unrecognized is `Push`.
    pub fn from_json(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_str)
            .and_then(Self::parse)
            .unwrap_or_default()
    }
}

/// Divider orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    pub const fn as_str(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "horizontal" => Some(Axis::Horizontal),
            "vertical" => Some(Axis::Vertical),
            _ => None,
        }
    }
}

// ─── Style & layout ──────────────────────────────────────────────────────

/// Visual style values. Unset values fall back to the style-definition
/// defaults on export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<String>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub foreground_color: Option<String>,
    pub border_color: Option<String>,
    pub corner_radius: Option<f64>,
    pub opacity: Option<f64>,
    pub blur: Option<f64>,
    /// Legacy text color; `text_color` takes precedence when both are set.
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Padding {
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Margin {
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

/// Distance from the parent's edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inset {
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub bottom: Option<f64>,
    pub right: Option<f64>,
}

/// Size, position, spacing, and layout mode.
///
/// `width`/`height` of `None` mean "auto". `x`/`y` only matter in
/// [`LayoutMode::FreeForm`]. `auto_resize` is the legacy flag mirrored from
/// `layout_mode` for older consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub padding: Padding,
    pub margin: Margin,
    pub inset: Inset,
    pub layout_mode: Option<LayoutMode>,
    pub auto_resize: Option<bool>,
}

impl Layout {
    /// Layout with every spacing value zeroed, origin at 0/0, auto size,
    /// and `autoLayout` mode.
    pub fn seeded() -> Self {
        Self {
            width: None,
            height: None,
            x: Some(0.0),
            y: Some(0.0),
            padding: Padding {
                horizontal: Some(0.0),
                vertical: Some(0.0),
                top: Some(0.0),
                bottom: Some(0.0),
            },
            margin: Margin {
                horizontal: Some(0.0),
                vertical: Some(0.0),
                top: Some(0.0),
                bottom: Some(0.0),
                left: Some(0.0),
                right: Some(0.0),
            },
            inset: Inset {
                top: Some(0.0),
                left: Some(0.0),
                bottom: Some(0.0),
                right: Some(0.0),
            },
            layout_mode: Some(LayoutMode::AutoLayout),
            auto_resize: Some(false),
        }
    }

    /// Set the layout mode and keep the legacy `auto_resize` flag in sync.
    pub fn set_mode(&mut self, mode: LayoutMode) {
        self.layout_mode = Some(mode);
        self.auto_resize = Some(mode == LayoutMode::AutoResize);
    }

    /// Set the legacy flag and derive the layout mode from it.
    pub fn set_auto_resize(&mut self, on: bool) {
        self.auto_resize = Some(on);
        if on {
            self.layout_mode = Some(LayoutMode::AutoResize);
        } else if self.layout_mode == Some(LayoutMode::AutoResize) {
            self.layout_mode = Some(LayoutMode::AutoLayout);
        }
    }
}

// ─── Cross-cutting blocks ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Localization {
    pub enabled: bool,
    pub key: String,
    pub default_value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accessibility {
    pub enabled: bool,
    pub identifier: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    pub tag: i64,
    pub is_user_interaction_enabled: bool,
    pub is_hidden: bool,
    pub automation_identifier: String,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            tag: 0,
            is_user_interaction_enabled: true,
            is_hidden: false,
            automation_identifier: String::new(),
        }
    }
}

/// What happens when the user triggers the node, and which node property or
/// data-model entry the action is bound to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Action {
    pub action_id: String,
    pub action_event: String,
    pub bound_node_id: String,
    pub bound_property: String,
    pub bound_data_model_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "minDuration", default, skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<f64>,
}

impl Gesture {
    pub fn tap() -> Self {
        Self {
            kind: "tap".into(),
            min_duration: None,
        }
    }

    /// Lenient read: a missing type is a tap, a non-numeric duration is dropped.
    pub fn from_json(value: &Value) -> Self {
        let kind = match value.get("type") {
            None | Some(Value::Null) => "tap".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Self {
            kind,
            min_duration: value.get("minDuration").and_then(Value::as_f64),
        }
    }
}

/// Formatting applied to the node's displayed value (dates, currency, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFormat {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter_id: Option<String>,
}

impl DisplayFormat {
    /// `None` unless `value` is an object with a non-empty `type`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let kind = scalar_string(obj.get("type")?)?;
        if kind.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            pattern: obj.get("pattern").and_then(scalar_string),
            locale: obj.get("locale").and_then(scalar_string),
            formatter_id: obj.get("formatterId").and_then(scalar_string),
        })
    }
}

/// String form of a JSON scalar; `None` for null, arrays, and objects.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ─── Node kinds ──────────────────────────────────────────────────────────

/// Type-specific fields, one variant per [`NodeType`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    View {
        children: Vec<Node>,
        fit_to_screen: bool,
        presentation_style: PresentationStyle,
        /// Only meaningful on a screen's canvas root.
        screen_id: String,
    },
    VStack {
        children: Vec<Node>,
        spacing: f64,
        alignment: String,
    },
    HStack {
        children: Vec<Node>,
        spacing: f64,
        alignment: String,
    },
    ZStack {
        children: Vec<Node>,
        alignment: String,
    },
    Text {
        text: String,
        alignment: String,
        number_of_lines: u32,
        bound_list_item_property: String,
    },
    Button {
        title: String,
        bound_list_item_property: String,
    },
    Image {
        src: String,
        alt: String,
        content_mode: String,
        use_asset: bool,
        asset_bundle_name: String,
        asset_image_name: String,
        bound_list_item_property: String,
        show_loading_indicator: bool,
    },
    List {
        children: Vec<Node>,
        items: Vec<Value>,
        load_more_enabled: bool,
        load_more_footer_label: String,
        load_more_loading_label: String,
        section_grouping_enabled: bool,
        list_row_spacing: f64,
        list_spacing_above_first: f64,
        list_spacing_below_last: f64,
    },
    /// Row template of a List.
    ListItemContent { children: Vec<Node> },
    /// Shows a property of the current List row.
    ListItemText { item_property: String },
    BottomSheet {
        children: Vec<Node>,
        sheet: SheetProps,
    },
    TextField { placeholder: String, text: String },
    Toggle { is_on: bool, label: String },
    Slider { value: f64, min: f64, max: f64 },
    Picker {
        selection: String,
        options: Vec<Value>,
    },
    ProgressView { progress: f64, indeterminate: bool },
    Divider { axis: Axis },
    Spacer,
    Link { url: String, label: String },
    SecureField { placeholder: String, text: String },
}

impl NodeKind {
    /// Fresh type-specific fields for `ty`, seeded with the creation defaults.
    pub fn defaults(ty: NodeType) -> Self {
        match ty {
            NodeType::View => NodeKind::View {
                children: Vec::new(),
                fit_to_screen: false,
                presentation_style: PresentationStyle::Push,
                screen_id: String::new(),
            },
            NodeType::VStack => NodeKind::VStack {
                children: Vec::new(),
                spacing: 12.0,
                alignment: "center".into(),
            },
            NodeType::HStack => NodeKind::HStack {
                children: Vec::new(),
                spacing: 12.0,
                alignment: "center".into(),
            },
            NodeType::ZStack => NodeKind::ZStack {
                children: Vec::new(),
                alignment: "center".into(),
            },
            NodeType::Text => NodeKind::Text {
                text: "Hello".into(),
                alignment: "start".into(),
                number_of_lines: 0,
                bound_list_item_property: String::new(),
            },
            NodeType::Button => NodeKind::Button {
                title: "Tap Me".into(),
                bound_list_item_property: String::new(),
            },
            NodeType::Image => NodeKind::Image {
                src: String::new(),
                alt: "Image".into(),
                content_mode: "contain".into(),
                use_asset: false,
                asset_bundle_name: String::new(),
                asset_image_name: String::new(),
                bound_list_item_property: String::new(),
                show_loading_indicator: false,
            },
            NodeType::List => NodeKind::List {
                children: Vec::new(),
                items: vec!["Item 1".into(), "Item 2".into(), "Item 3".into()],
                load_more_enabled: false,
                load_more_footer_label: "Load more".into(),
                load_more_loading_label: "Loading...".into(),
                section_grouping_enabled: false,
                list_row_spacing: 0.0,
                list_spacing_above_first: 0.0,
                list_spacing_below_last: 0.0,
            },
            NodeType::ListItemContent => NodeKind::ListItemContent {
                children: Vec::new(),
            },
            NodeType::ListItemText => NodeKind::ListItemText {
                item_property: String::new(),
            },
            NodeType::BottomSheet => NodeKind::BottomSheet {
                children: Vec::new(),
                sheet: SheetProps::default(),
            },
            NodeType::TextField => NodeKind::TextField {
                placeholder: "Enter text".into(),
                text: String::new(),
            },
            NodeType::Toggle => NodeKind::Toggle {
                is_on: false,
                label: "Toggle".into(),
            },
            NodeType::Slider => NodeKind::Slider {
                value: 50.0,
                min: 0.0,
                max: 100.0,
            },
            NodeType::Picker => NodeKind::Picker {
                selection: "Option 1".into(),
                options: vec!["Option 1".into(), "Option 2".into(), "Option 3".into()],
            },
            NodeType::ProgressView => NodeKind::ProgressView {
                progress: 0.5,
                indeterminate: false,
            },
            NodeType::Divider => NodeKind::Divider {
                axis: Axis::Horizontal,
            },
            NodeType::Spacer => NodeKind::Spacer,
            NodeType::Link => NodeKind::Link {
                url: "https://example.com".into(),
                label: "Link".into(),
            },
            NodeType::SecureField => NodeKind::SecureField {
                placeholder: "Password".into(),
                text: String::new(),
            },
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::View { .. } => NodeType::View,
            NodeKind::VStack { .. } => NodeType::VStack,
            NodeKind::HStack { .. } => NodeType::HStack,
            NodeKind::ZStack { .. } => NodeType::ZStack,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Button { .. } => NodeType::Button,
            NodeKind::Image { .. } => NodeType::Image,
            NodeKind::List { .. } => NodeType::List,
            NodeKind::ListItemContent { .. } => NodeType::ListItemContent,
            NodeKind::ListItemText { .. } => NodeType::ListItemText,
            NodeKind::BottomSheet { .. } => NodeType::BottomSheet,
            NodeKind::TextField { .. } => NodeType::TextField,
            NodeKind::Toggle { .. } => NodeType::Toggle,
            NodeKind::Slider { .. } => NodeType::Slider,
            NodeKind::Picker { .. } => NodeType::Picker,
            NodeKind::ProgressView { .. } => NodeType::ProgressView,
            NodeKind::Divider { .. } => NodeType::Divider,
            NodeKind::Spacer => NodeType::Spacer,
            NodeKind::Link { .. } => NodeType::Link,
            NodeKind::SecureField { .. } => NodeType::SecureField,
        }
    }

    fn children(&self) -> Option<&Vec<Node>> {
        match self {
            NodeKind::View { children, .. }
            | NodeKind::VStack { children, .. }
            | NodeKind::HStack { children, .. }
            | NodeKind::ZStack { children, .. }
            | NodeKind::List { children, .. }
            | NodeKind::ListItemContent { children }
            | NodeKind::BottomSheet { children, .. } => Some(children),
            _ => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            NodeKind::View { children, .. }
            | NodeKind::VStack { children, .. }
            | NodeKind::HStack { children, .. }
            | NodeKind::ZStack { children, .. }
            | NodeKind::List { children, .. }
            | NodeKind::ListItemContent { children }
            | NodeKind::BottomSheet { children, .. } => Some(children),
            _ => None,
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A single element of a UI tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub style: Style,
    pub layout: Layout,
    pub localization: Localization,
    pub accessibility: Accessibility,
    pub behavior: Behavior,
    pub action: Action,
    pub gestures: SmallVec<[Gesture; 2]>,
    pub display_format: Option<DisplayFormat>,
    /// Composite marker (e.g. `NavigationBar`); display only.
    pub component_name: String,
    /// Inside an HStack, take the width left over by the siblings.
    pub fill_remaining_width: bool,
}

impl Node {
    /// A node with the given kind and every style/layout value unset.
    /// Use [`create_node`] for a fully seeded node.
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            style: Style::default(),
            layout: Layout::default(),
            localization: Localization::default(),
            accessibility: Accessibility::default(),
            behavior: Behavior::default(),
            action: Action::default(),
            gestures: SmallVec::new(),
            display_format: None,
            component_name: String::new(),
            fill_remaining_width: false,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn is_container(&self) -> bool {
        self.node_type().is_container()
    }

    /// Children in order; empty for non-containers.
    pub fn children(&self) -> &[Node] {
        self.kind.children().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable children, or `None` for non-containers.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        self.kind.children_mut()
    }

    /// Replace the children of a container. Returns `false` (and leaves the
    /// node untouched) for non-containers.
    pub fn set_children(&mut self, children: Vec<Node>) -> bool {
        match self.kind.children_mut() {
            Some(slot) => {
                *slot = children;
                true
            }
            None => false,
        }
    }

    /// Builder form of [`Node::set_children`].
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        if !self.set_children(children) {
            log::debug!("ignoring children on non-container {}", self.node_type());
        }
        self
    }

    /// Builder for a single field, see [`Node::set_field`]. Values that do
    /// not apply to the node's type are ignored.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Err(e) = self.set_field(key, &value.into()) {
            log::debug!("with({key}) on {}: {e}", self.id);
        }
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(Node::subtree_len).sum::<usize>()
    }

    /// Seed every style key with its style-definition default and every
    /// layout key with the layout default.
    pub fn seed_defaults(&mut self) {
        for def in STYLE_DEFINITIONS {
            if let Err(e) = self.set_field(def.key, &def.default.to_value()) {
                log::warn!("style default {}: {e}", def.key);
            }
        }
        self.layout = Layout::seeded();
    }
}

/// True iff the node's type is a container type.
pub fn is_container(node: &Node) -> bool {
    node.is_container()
}

/// Create a fully defaulted node of `ty` with a fresh unique id.
///
/// Total and idempotent: two calls for the same type differ only in `id`.
pub fn create_node(ty: NodeType) -> Node {
    let mut node = Node::new(NodeId::generate(), NodeKind::defaults(ty));
    node.seed_defaults();
    match ty {
        NodeType::Text => node.style.color = Some("#111111".into()),
        NodeType::Button => node.gestures.push(Gesture::tap()),
        NodeType::View | NodeType::VStack | NodeType::HStack | NodeType::ZStack => {
            node.style.background_color = Some("#ffffff".into());
        }
        _ => {}
    }
    node
}

/// String-keyed [`create_node`] for callers holding a type name.
pub fn create_node_named(name: &str) -> Result<Node, UnknownTypeError> {
    name.parse().map(create_node)
}

/// An empty screen canvas: `{id: "root", type: "View", children: []}`.
pub fn default_tree() -> Node {
    Node::new(NodeId::root(), NodeKind::defaults(NodeType::View))
}
