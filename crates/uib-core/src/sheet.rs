//! Bottom sheets: modal containers with their own data mapping.
//!
//! A sheet's mapping is independent of the screen's `doc.dataMapping`. The
//! canonical codec delegates BottomSheet nodes to [`BottomSheetCodec`].

use crate::canonical::ContainerCodec;
use crate::data::{
    API_METHODS, ApiBinding, DataModelEntry, bindings_from_json, entries_from_json, mock_json,
};
use crate::id::NodeId;
use crate::model::{Node, NodeKind, NodeType};
use crate::styles::number;
use crate::tree::{node_chain, walk};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// `actionEvent` value that makes a control open the sheet named by its `actionId`.
pub const ACTION_OPEN_BOTTOM_SHEET: &str = "openBottomSheet";

pub const DETENT_OPTIONS: [(SheetDetent, &str); 3] = [
    (SheetDetent::Small, "Small (peek)"),
    (SheetDetent::Medium, "Half"),
    (SheetDetent::Large, "Full"),
];

pub const DEFAULT_BACKDROP_OPACITY: f64 = 0.5;

pub const DISPLAY_NAME: &str = "Bottom sheet";
pub const DESCRIPTION: &str = "Modal sheet from bottom; has its own data mapping and can be opened by controls (e.g. Button with action Open bottom sheet).";

/// Resting height of an open sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetDetent {
    Small,
    #[default]
    Medium,
    Large,
}

impl SheetDetent {
    pub const fn as_str(self) -> &'static str {
        match self {
            SheetDetent::Small => "small",
            SheetDetent::Medium => "medium",
            SheetDetent::Large => "large",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "small" => Some(SheetDetent::Small),
            "medium" => Some(SheetDetent::Medium),
            "large" => Some(SheetDetent::Large),
            _ => None,
        }
    }
}

/// BottomSheet-only node fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetProps {
    pub detent: SheetDetent,
    pub dismissible: bool,
    pub show_handle: bool,
    /// Always within `0.0..=1.0`.
    pub backdrop_opacity: f64,
    pub data_mapping: Option<SheetDataMapping>,
}

impl Default for SheetProps {
    fn default() -> Self {
        Self {
            detent: SheetDetent::Medium,
            dismissible: true,
            show_handle: true,
            backdrop_opacity: DEFAULT_BACKDROP_OPACITY,
            data_mapping: None,
        }
    }
}

// ─── Sheet data mapping ──────────────────────────────────────────────────

/// Data mapping owned by one sheet. Unlike the screen mapping, strings are
/// kept as typed (empty rather than absent) and the method defaults to GET.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetDataMapping {
    pub api_url: String,
    pub api_method: String,
    pub data_model: Vec<DataModelEntry>,
    pub mock_api_json: Option<Value>,
    pub mock_api_bindings: Vec<ApiBinding>,
    pub load_more_page_param_name: String,
    pub load_more_page_param_in_query: bool,
    pub load_more_has_next_page_path: String,
}

impl Default for SheetDataMapping {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_method: "GET".into(),
            data_model: Vec::new(),
            mock_api_json: None,
            mock_api_bindings: Vec::new(),
            load_more_page_param_name: String::new(),
            load_more_page_param_in_query: false,
            load_more_has_next_page_path: String::new(),
        }
    }
}

fn valid_method(method: Option<&str>) -> String {
    match method {
        Some(m) if API_METHODS.contains(&m) => m.to_string(),
        _ => "GET".into(),
    }
}

fn non_empty(s: &str) -> Value {
    if s.is_empty() { Value::Null } else { s.into() }
}

impl SheetDataMapping {
    /// Lenient read; `None` unless `value` is an object.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| {
            obj.get(key)
                .and_then(crate::model::scalar_string)
                .unwrap_or_default()
        };
        Some(Self {
            api_url: text("apiUrl"),
            api_method: valid_method(obj.get("apiMethod").and_then(Value::as_str)),
            data_model: entries_from_json(obj.get("dataModel")),
            mock_api_json: mock_json(obj.get("mockApiJson")),
            mock_api_bindings: bindings_from_json(obj.get("mockApiBindings")),
            load_more_page_param_name: text("loadMorePageParamName"),
            load_more_page_param_in_query: obj
                .get("loadMorePageParamInQuery")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            load_more_has_next_page_path: text("loadMoreHasNextPagePath"),
        })
    }

    /// Editor/storage form: every key present, strings as typed.
    pub fn to_json(&self) -> Value {
        json!({
            "apiUrl": self.api_url,
            "apiMethod": self.api_method,
            "dataModel": self.data_model,
            "mockApiJson": self.mock_api_json,
            "mockApiBindings": self.mock_api_bindings,
            "loadMorePageParamName": self.load_more_page_param_name,
            "loadMorePageParamInQuery": self.load_more_page_param_in_query,
            "loadMoreHasNextPagePath": self.load_more_has_next_page_path,
        })
    }

    /// Canonical form: empty strings become null, unknown methods GET.
    pub fn to_export(&self) -> Value {
        json!({
            "apiUrl": non_empty(&self.api_url),
            "apiMethod": valid_method(Some(&self.api_method)),
            "dataModel": self.data_model,
            "mockApiJson": self.mock_api_json,
            "mockApiBindings": self.mock_api_bindings,
            "loadMorePageParamName": non_empty(&self.load_more_page_param_name),
            "loadMorePageParamInQuery": self.load_more_page_param_in_query,
            "loadMoreHasNextPagePath": non_empty(&self.load_more_has_next_page_path),
        })
    }
}

// ─── Canonical codec ─────────────────────────────────────────────────────

/// Canonical encoding of BottomSheet nodes: children plus the `sheet*` keys.
#[derive(Debug, Default)]
pub struct BottomSheetCodec;

impl ContainerCodec for BottomSheetCodec {
    fn to_canonical(
        &self,
        node: &Node,
        out: &mut Map<String, Value>,
        recurse: &dyn Fn(&Node) -> Value,
    ) {
        let NodeKind::BottomSheet { children, sheet } = &node.kind else {
            return;
        };
        out.insert(
            "children".into(),
            Value::Array(children.iter().map(recurse).collect()),
        );
        out.insert("sheetDetent".into(), sheet.detent.as_str().into());
        out.insert("sheetDismissible".into(), sheet.dismissible.into());
        out.insert("sheetShowHandle".into(), sheet.show_handle.into());
        out.insert(
            "sheetBackdropOpacity".into(),
            number(sheet.backdrop_opacity.clamp(0.0, 1.0)),
        );
        out.insert(
            "sheetDataMapping".into(),
            sheet
                .data_mapping
                .as_ref()
                .map_or(Value::Null, SheetDataMapping::to_export),
        );
    }

    fn from_canonical(&self, canonical: &Map<String, Value>, node: &mut Node) {
        let NodeKind::BottomSheet { sheet, .. } = &mut node.kind else {
            return;
        };
        *sheet = SheetProps {
            detent: canonical
                .get("sheetDetent")
                .and_then(Value::as_str)
                .and_then(SheetDetent::parse)
                .unwrap_or_default(),
            dismissible: canonical.get("sheetDismissible") != Some(&Value::Bool(false)),
            show_handle: canonical.get("sheetShowHandle") != Some(&Value::Bool(false)),
            backdrop_opacity: canonical
                .get("sheetBackdropOpacity")
                .and_then(Value::as_f64)
                .map_or(DEFAULT_BACKDROP_OPACITY, |o| o.clamp(0.0, 1.0)),
            data_mapping: canonical
                .get("sheetDataMapping")
                .and_then(SheetDataMapping::from_json),
        };
    }
}

// ─── Queries ─────────────────────────────────────────────────────────────

/// Every BottomSheet in the tree, pre-order.
pub fn collect_sheet_nodes(tree: &Node) -> Vec<&Node> {
    let mut out = Vec::new();
    walk(tree, &mut |node| {
        if node.node_type() == NodeType::BottomSheet {
            out.push(node);
        }
    });
    out
}

/// The sheet containing `id`: the node itself if it is a sheet, else its
/// nearest BottomSheet ancestor.
pub fn find_sheet_for_selection(tree: &Node, id: impl Into<NodeId>) -> Option<&Node> {
    node_chain(tree, id)
        .into_iter()
        .rev()
        .find(|n| n.node_type() == NodeType::BottomSheet)
}

/// Sheet id a control opens, when its action is [`ACTION_OPEN_BOTTOM_SHEET`].
pub fn opened_sheet_id(node: &Node) -> Option<&str> {
    (node.action.action_event == ACTION_OPEN_BOTTOM_SHEET && !node.action.action_id.is_empty())
        .then_some(node.action.action_id.as_str())
}
