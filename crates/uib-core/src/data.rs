//! Screen data mapping: the data model, mock API bindings, and API config.
//!
//! A data-model entry is a named value that may be bound to one node
//! property. Mock API bindings copy values out of a response JSON into
//! entries; bound entries then flow into their nodes as patches.

use crate::fields::is_mergeable;
use crate::id::NodeId;
use crate::model::{Node, NodeKind, NodeType, scalar_string};
use crate::patch::NodePatch;
use crate::path::get_value_at_path;
use crate::tree::{path_to_node, walk};
use serde::Serialize;
use serde_json::Value;

pub const API_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

// ─── Entries & bindings ──────────────────────────────────────────────────

/// A named value, optionally bound to exactly one `(node, property)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelEntry {
    pub id: String,
    pub name: String,
    /// `None` when the entry has no value yet; `Some(Null)` is an explicit null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_property: Option<String>,
}

impl DataModelEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: None,
            bound_node_id: None,
            bound_property: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn bound_to(mut self, node_id: impl Into<String>, property: impl Into<String>) -> Self {
        self.bound_node_id = Some(node_id.into());
        self.bound_property = Some(property.into());
        self
    }

    /// Lenient read. Ids and names are coerced to strings; empty bindings
    /// are dropped. `None` for non-objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).and_then(scalar_string);
        Some(Self {
            id: text("id").unwrap_or_default(),
            name: text("name").unwrap_or_default(),
            value: obj.get("value").cloned(),
            bound_node_id: text("boundNodeId").filter(|s| !s.is_empty()),
            bound_property: text("boundProperty").filter(|s| !s.is_empty()),
        })
    }

    pub fn is_bound_to(&self, node_id: &str, property: &str) -> bool {
        self.bound_node_id.as_deref() == Some(node_id)
            && self.bound_property.as_deref() == Some(property)
    }
}

/// Copies the value at `api_path` of a response into entry `data_model_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBinding {
    pub api_path: String,
    pub data_model_id: String,
}

impl ApiBinding {
    pub fn new(api_path: impl Into<String>, data_model_id: impl Into<String>) -> Self {
        Self {
            api_path: api_path.into(),
            data_model_id: data_model_id.into(),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(scalar_string).unwrap_or_default();
        Self {
            api_path: text("apiPath"),
            data_model_id: text("dataModelId"),
        }
    }
}

pub(crate) fn entries_from_json(value: Option<&Value>) -> Vec<DataModelEntry> {
    value
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(DataModelEntry::from_json).collect())
        .unwrap_or_default()
}

pub(crate) fn bindings_from_json(value: Option<&Value>) -> Vec<ApiBinding> {
    value
        .and_then(Value::as_array)
        .map(|list| list.iter().map(ApiBinding::from_json).collect())
        .unwrap_or_default()
}

/// Mock JSON is kept only when it is an object or array.
pub(crate) fn mock_json(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| v.is_object() || v.is_array()).cloned()
}

// ─── Data mapping ────────────────────────────────────────────────────────

/// Everything about a screen's data that is not the tree. This is also the
/// non-tree half of an undo snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMapping {
    pub data_model: Vec<DataModelEntry>,
    pub mock_api_json: Option<Value>,
    pub mock_api_bindings: Vec<ApiBinding>,
    pub api_config_method: Option<String>,
    pub api_url: Option<String>,
    pub api_method: Option<String>,
    pub load_more_page_param_name: Option<String>,
    pub load_more_page_param_in_query: bool,
    pub load_more_has_next_page_path: Option<String>,
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl DataMapping {
    /// Lenient read of a stored or imported mapping; values of the wrong
    /// JSON type fall back to empty. Non-objects give the empty mapping.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            data_model: entries_from_json(obj.get("dataModel")),
            mock_api_json: mock_json(obj.get("mockApiJson")),
            mock_api_bindings: bindings_from_json(obj.get("mockApiBindings")),
            api_config_method: text("apiConfigMethod"),
            api_url: text("apiUrl"),
            api_method: text("apiMethod"),
            load_more_page_param_name: text("loadMorePageParamName"),
            load_more_page_param_in_query: obj
                .get("loadMorePageParamInQuery")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            load_more_has_next_page_path: text("loadMoreHasNextPagePath"),
        }
    }

    /// Strings trimmed, blanks removed, unknown HTTP methods dropped.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            data_model: self.data_model.clone(),
            mock_api_json: self.mock_api_json.clone(),
            mock_api_bindings: self.mock_api_bindings.clone(),
            api_config_method: trimmed(self.api_config_method.as_deref()),
            api_url: trimmed(self.api_url.as_deref()),
            api_method: self
                .api_method
                .clone()
                .filter(|m| API_METHODS.contains(&m.as_str())),
            load_more_page_param_name: trimmed(self.load_more_page_param_name.as_deref()),
            load_more_page_param_in_query: self.load_more_page_param_in_query,
            load_more_has_next_page_path: trimmed(self.load_more_has_next_page_path.as_deref()),
        }
    }

    pub fn has_api_config(&self) -> bool {
        self.api_config_method.is_some() || self.api_url.is_some() || self.api_method.is_some()
    }

    /// Export form for `doc.dataMapping`.
    pub fn to_export(&self) -> ExportedDataMapping {
        let clean = self.sanitized();
        let api = clean.has_api_config().then(|| ExportedApi {
            api_config_method: clean.api_config_method.clone(),
            api_url: clean.api_url.clone(),
            api_method: clean.api_method.clone(),
            data_source: DataSource {
                kind: "api".into(),
                config_method: clean.api_config_method.clone(),
                url: clean.api_url.clone(),
                method: clean.api_method.clone(),
            },
        });
        ExportedDataMapping {
            data_model: clean.data_model,
            mock_api_json: clean.mock_api_json,
            mock_api_bindings: clean.mock_api_bindings,
            load_more_page_param_name: clean.load_more_page_param_name,
            load_more_page_param_in_query: clean.load_more_page_param_in_query,
            load_more_has_next_page_path: clean.load_more_has_next_page_path,
            api,
        }
    }

    pub fn entry(&self, id: &str) -> Option<&DataModelEntry> {
        self.data_model.iter().find(|e| e.id == id)
    }
}

/// Sanitized `doc.dataMapping`. API fields (and the legacy `dataSource`
/// mirror) appear only when some API setting is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDataMapping {
    pub data_model: Vec<DataModelEntry>,
    pub mock_api_json: Option<Value>,
    pub mock_api_bindings: Vec<ApiBinding>,
    pub load_more_page_param_name: Option<String>,
    pub load_more_page_param_in_query: bool,
    pub load_more_has_next_page_path: Option<String>,
    #[serde(flatten)]
    pub api: Option<ExportedApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedApi {
    pub api_config_method: Option<String>,
    pub api_url: Option<String>,
    pub api_method: Option<String>,
    pub data_source: DataSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub config_method: Option<String>,
    pub url: Option<String>,
    pub method: Option<String>,
}

// ─── Bindable properties ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindableProperty {
    pub key: &'static str,
    pub label: &'static str,
}

const fn prop(key: &'static str, label: &'static str) -> BindableProperty {
    BindableProperty { key, label }
}

const TEXT_PROPS: &[BindableProperty] = &[prop("text", "Text")];
const BUTTON_PROPS: &[BindableProperty] = &[prop("title", "Title")];
const IMAGE_PROPS: &[BindableProperty] = &[prop("src", "Image URL"), prop("alt", "Alt text")];
const FIELD_PROPS: &[BindableProperty] =
    &[prop("text", "Text"), prop("placeholder", "Placeholder")];
const TOGGLE_PROPS: &[BindableProperty] = &[prop("label", "Label"), prop("isOn", "On")];
const SLIDER_PROPS: &[BindableProperty] = &[prop("value", "Value")];
const PICKER_PROPS: &[BindableProperty] =
    &[prop("selection", "Selection"), prop("options", "Options")];
const PROGRESS_PROPS: &[BindableProperty] = &[prop("progress", "Progress")];
const LINK_PROPS: &[BindableProperty] = &[prop("label", "Label"), prop("url", "URL")];
const LIST_PROPS: &[BindableProperty] = &[prop("items", "Items")];

impl NodeType {
    /// Properties of this type that can be bound to the data model.
    pub fn bindable_properties(self) -> &'static [BindableProperty] {
        match self {
            NodeType::Text => TEXT_PROPS,
            NodeType::Button => BUTTON_PROPS,
            NodeType::Image => IMAGE_PROPS,
            NodeType::TextField | NodeType::SecureField => FIELD_PROPS,
            NodeType::Toggle => TOGGLE_PROPS,
            NodeType::Slider => SLIDER_PROPS,
            NodeType::Picker => PICKER_PROPS,
            NodeType::ProgressView => PROGRESS_PROPS,
            NodeType::Link => LINK_PROPS,
            NodeType::List => LIST_PROPS,
            _ => &[],
        }
    }

    /// The one property a drop-to-bind gesture binds; `None` for layout types.
    pub fn primary_bindable_property(self) -> Option<BindableProperty> {
        let key = match self {
            NodeType::Text | NodeType::TextField | NodeType::SecureField => "text",
            NodeType::Button => "title",
            NodeType::Image => "src",
            NodeType::Toggle | NodeType::Link => "label",
            NodeType::Slider => "value",
            NodeType::Picker => "selection",
            NodeType::ProgressView => "progress",
            NodeType::List => "items",
            _ => return None,
        };
        let props = self.bindable_properties();
        props.iter().find(|p| p.key == key).or(props.first()).copied()
    }

    pub fn is_bindable(self) -> bool {
        !self.bindable_properties().is_empty()
    }
}

/// Current value of a bindable property for display; missing values read
/// as `""` (or `false` for `isOn`).
pub fn node_prop_value(node: &Node, key: &str) -> Value {
    match node.field(key) {
        Some(v) if !v.is_null() => v,
        _ if key == "isOn" => Value::Bool(false),
        _ => Value::String(String::new()),
    }
}

/// One bindable `(node, property)` pair found in a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct BindableTarget {
    pub node_id: NodeId,
    pub node_type: NodeType,
    pub prop_key: &'static str,
    pub prop_label: &'static str,
    /// Ancestor type names joined with ` › `.
    pub path_label: String,
    pub current_value: Value,
}

/// Every bindable property of every node below the canvas root.
pub fn bindable_targets(tree: &Node) -> Vec<BindableTarget> {
    let mut out = Vec::new();
    for child in tree.children() {
        walk(child, &mut |node| {
            let node_type = node.node_type();
            let path: Vec<_> = path_to_node(tree, node.id)
                .into_iter()
                .map(NodeType::as_str)
                .collect();
            let path_label = if path.is_empty() {
                node_type.as_str().to_string()
            } else {
                path.join(" › ")
            };
            for p in node_type.bindable_properties() {
                out.push(BindableTarget {
                    node_id: node.id,
                    node_type,
                    prop_key: p.key,
                    prop_label: p.label,
                    path_label: path_label.clone(),
                    current_value: node_prop_value(node, p.key),
                });
            }
        });
    }
    out
}

// ─── Applying data ───────────────────────────────────────────────────────

/// Data model with each bound entry's value replaced by the response value
/// at its binding path. Paths that do not resolve leave the entry alone.
pub fn apply_bindings(
    response: &Value,
    bindings: &[ApiBinding],
    data_model: &[DataModelEntry],
) -> Vec<DataModelEntry> {
    let mut out = data_model.to_vec();
    for binding in bindings {
        let Some(value) = get_value_at_path(response, &binding.api_path) else {
            log::trace!("binding path `{}` did not resolve", binding.api_path);
            continue;
        };
        if let Some(entry) = out.iter_mut().find(|e| e.id == binding.data_model_id) {
            entry.value = Some(value.clone());
        }
    }
    out
}

/// Node patches that push each bound entry's value into its node.
pub fn binding_patches(data_model: &[DataModelEntry]) -> Vec<NodePatch> {
    data_model
        .iter()
        .filter_map(|entry| {
            let node_id = entry.bound_node_id.as_deref()?;
            let property = entry.bound_property.as_deref()?;
            let value = entry.value.clone()?;
            if !is_mergeable(property) {
                log::debug!("entry {} is bound to unknown property `{property}`", entry.id);
                return None;
            }
            Some(NodePatch::new(node_id).set(property, value))
        })
        .collect()
}

/// Rows of a List: the array bound to its `items` property, else the
/// node's own items. `None` for non-List nodes.
pub fn list_items(data_model: &[DataModelEntry], list: &Node) -> Option<Vec<Value>> {
    let NodeKind::List { items, .. } = &list.kind else {
        return None;
    };
    let bound = data_model
        .iter()
        .find(|e| e.is_bound_to(list.id.as_str(), "items"))
        .and_then(|e| e.value.as_ref())
        .and_then(Value::as_array);
    Some(bound.unwrap_or(items).clone())
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text shown for one List row. With a property, reads it from an object
/// row (dotted paths allowed); otherwise falls back to `text`, `title`,
/// `label`, or the row's JSON.
pub fn list_item_display_value(item: &Value, item_property: &str) -> String {
    match item {
        Value::Null => String::new(),
        Value::Object(obj) if !item_property.is_empty() => {
            let value = if item_property.contains('.') {
                get_value_at_path(item, item_property)
            } else {
                obj.get(item_property)
            };
            value.filter(|v| !v.is_null()).map(display).unwrap_or_default()
        }
        Value::Object(obj) => ["text", "title", "label"]
            .iter()
            .find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
            .map(display)
            .unwrap_or_else(|| item.to_string()),
        Value::Array(_) => item.to_string(),
        other => display(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::create_node;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn entry_from_json_coerces_and_drops_empty_bindings() {
        let entry = DataModelEntry::from_json(&json!({
            "id": 3, "name": "title", "value": null, "boundNodeId": "", "boundProperty": "text"
        }))
        .unwrap();
        assert_eq!(entry.id, "3");
        assert_eq!(entry.value, Some(Value::Null));
        assert_eq!(entry.bound_node_id, None);
        assert_eq!(entry.bound_property.as_deref(), Some("text"));
        assert_eq!(DataModelEntry::from_json(&json!("nope")), None);
    }

    #[test]
    fn sanitize_trims_and_validates() {
        let dm = DataMapping::from_json(&json!({
            "apiConfigMethod": "  loadHome ",
            "apiUrl": "   ",
            "apiMethod": "FETCH",
            "loadMorePageParamName": " page ",
            "loadMorePageParamInQuery": "yes",
            "mockApiJson": "not json"
        }))
        .sanitized();
        assert_eq!(dm.api_config_method.as_deref(), Some("loadHome"));
        assert_eq!(dm.api_url, None);
        assert_eq!(dm.api_method, None);
        assert_eq!(dm.load_more_page_param_name.as_deref(), Some("page"));
        assert!(!dm.load_more_page_param_in_query);
        assert_eq!(dm.mock_api_json, None);
    }

    #[test]
    fn export_mirrors_api_fields_only_when_configured() {
        let plain = serde_json::to_value(DataMapping::default().to_export()).unwrap();
        assert_eq!(
            plain,
            json!({
                "dataModel": [],
                "mockApiJson": null,
                "mockApiBindings": [],
                "loadMorePageParamName": null,
                "loadMorePageParamInQuery": false,
                "loadMoreHasNextPagePath": null
            })
        );

        let dm = DataMapping {
            api_url: Some("https://api.example.com/home".into()),
            api_method: Some("GET".into()),
            ..DataMapping::default()
        };
        let exported = serde_json::to_value(dm.to_export()).unwrap();
        assert_eq!(exported["apiUrl"], json!("https://api.example.com/home"));
        assert_eq!(exported["apiConfigMethod"], Value::Null);
        assert_eq!(
            exported["dataSource"],
            json!({"type": "api", "configMethod": null, "url": "https://api.example.com/home", "method": "GET"})
        );
    }

    #[test]
    fn bindable_tables() {
        assert_eq!(NodeType::View.bindable_properties(), &[]);
        assert_eq!(NodeType::List.primary_bindable_property().map(|p| p.key), Some("items"));
        assert_eq!(NodeType::Toggle.primary_bindable_property().map(|p| p.key), Some("label"));
        assert_eq!(NodeType::ZStack.primary_bindable_property(), None);
        assert!(NodeType::Picker.bindable_properties().iter().any(|p| p.key == "options"));
    }

    #[test]
    fn bindable_tables_outlive_the_call() {
        let tables: Vec<&'static [BindableProperty]> = [NodeType::Image, NodeType::TextField]
            .into_iter()
            .map(NodeType::bindable_properties)
            .collect();
        let keys: Vec<Vec<&str>> =
            tables.iter().map(|t| t.iter().map(|p| p.key).collect()).collect();
        assert_eq!(keys, vec![vec!["src", "alt"], vec!["text", "placeholder"]]);
        assert_eq!(NodeType::SecureField.bindable_properties(), tables[1]);
    }

    #[test]
    fn prop_values_default_to_empty() {
        let toggle = create_node(NodeType::Toggle);
        assert_eq!(node_prop_value(&toggle, "isOn"), json!(false));
        let text = create_node(NodeType::Text).with("text", "Hi");
        assert_eq!(node_prop_value(&text, "text"), json!("Hi"));
        assert_eq!(node_prop_value(&text, "title"), json!(""));
    }

    #[test]
    fn bindings_copy_resolved_values_only() {
        let response = json!({"user": {"name": "Ada"}, "items": [{"title": "a"}]});
        let model = vec![
            DataModelEntry::new("e1", "name").with_value("old"),
            DataModelEntry::new("e2", "first"),
            DataModelEntry::new("e3", "missing").with_value("keep"),
        ];
        let bindings = vec![
            ApiBinding::new("user.name", "e1"),
            ApiBinding::new("items[0].title", "e2"),
            ApiBinding::new("nope.nothing", "e3"),
            ApiBinding::new("user.name", "unknown-entry"),
        ];
        let out = apply_bindings(&response, &bindings, &model);
        assert_eq!(out[0].value, Some(json!("Ada")));
        assert_eq!(out[1].value, Some(json!("a")));
        assert_eq!(out[2].value, Some(json!("keep")));
    }

    #[test]
    fn patches_only_for_bound_entries_with_values() {
        let model = vec![
            DataModelEntry::new("e1", "title").with_value("Hi").bound_to("t1", "text"),
            DataModelEntry::new("e2", "unbound").with_value("x"),
            DataModelEntry::new("e3", "empty").bound_to("t2", "text"),
            DataModelEntry::new("e4", "bogus").with_value(1).bound_to("t3", "notAField"),
        ];
        let patches = binding_patches(&model);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].id.as_str(), "t1");
        assert_eq!(patches[0].fields["text"], json!("Hi"));
    }

    #[test]
    fn list_items_prefer_bound_array() {
        let list = create_node(NodeType::List);
        let own = list_items(&[], &list).unwrap();
        assert_eq!(own.len(), 3);

        let model = vec![DataModelEntry::new("rows", "rows")
            .with_value(json!([{"title": "x"}]))
            .bound_to(list.id.as_str(), "items")];
        assert_eq!(list_items(&model, &list), Some(vec![json!({"title": "x"})]));
        assert_eq!(list_items(&model, &create_node(NodeType::Text)), None);
    }

    #[test]
    fn list_item_display_fallbacks() {
        assert_eq!(list_item_display_value(&json!({"user": {"name": "Ada"}}), "user.name"), "Ada");
        assert_eq!(list_item_display_value(&json!({"price": 3}), "price"), "3");
        assert_eq!(list_item_display_value(&json!({"price": 3}), "missing"), "");
        assert_eq!(list_item_display_value(&json!({"title": "T"}), ""), "T");
        assert_eq!(list_item_display_value(&json!({"a": 1}), ""), r#"{"a":1}"#);
        assert_eq!(list_item_display_value(&json!("plain"), "title"), "plain");
        assert_eq!(list_item_display_value(&Value::Null, ""), "");
    }
}
