//! Field registry: every JSON key a node can carry.
//!
//! `FIELDS` drives three things: the patch/merge allow-list, the flat
//! (editor/storage) node format, and canonical import of the non-style keys.
//! `Node::field` / `Node::set_field` are the only code that maps between a
//! JSON key and the typed node, so adding a field means adding it here.

use crate::id::NodeId;
use crate::model::{
    Axis, DisplayFormat, Gesture, LayoutMode, Layout, Node, NodeKind, NodeType, PresentationStyle,
    Style, UnknownTypeError, scalar_string,
};
use crate::sheet::{SheetDataMapping, SheetDetent};
use crate::styles::number;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

// ─── Registry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Style,
    Layout,
    Content,
    Screen,
    Localization,
    Accessibility,
    Behavior,
    Action,
    Gesture,
    Format,
    Sheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub group: FieldGroup,
}

const fn f(key: &'static str, group: FieldGroup) -> FieldSpec {
    FieldSpec { key, group }
}

/// All node keys except `id`, `type` and `children`, in apply order.
/// `autoResize` precedes `layoutMode` so an explicit mode wins.
pub const FIELDS: &[FieldSpec] = {
    use FieldGroup::*;
    &[
        f("fontFamily", Style),
        f("fontSize", Style),
        f("fontWeight", Style),
        f("textColor", Style),
        f("backgroundColor", Style),
        f("foregroundColor", Style),
        f("borderColor", Style),
        f("cornerRadius", Style),
        f("opacity", Style),
        f("blur", Style),
        f("color", Style),
        f("width", Layout),
        f("height", Layout),
        f("x", Layout),
        f("y", Layout),
        f("paddingHorizontal", Layout),
        f("paddingVertical", Layout),
        f("paddingTop", Layout),
        f("paddingBottom", Layout),
        f("marginHorizontal", Layout),
        f("marginVertical", Layout),
        f("marginTop", Layout),
        f("marginBottom", Layout),
        f("marginLeft", Layout),
        f("marginRight", Layout),
        f("insetFromParentTop", Layout),
        f("insetFromParentLeft", Layout),
        f("insetFromParentBottom", Layout),
        f("insetFromParentRight", Layout),
        f("autoResize", Layout),
        f("layoutMode", Layout),
        f("fillRemainingWidth", Layout),
        f("alignment", Content),
        f("spacing", Content),
        f("text", Content),
        f("numberOfLines", Content),
        f("boundListItemProperty", Content),
        f("title", Content),
        f("src", Content),
        f("alt", Content),
        f("contentMode", Content),
        f("useAsset", Content),
        f("assetBundleName", Content),
        f("assetImageName", Content),
        f("showLoadingIndicator", Content),
        f("items", Content),
        f("loadMoreEnabled", Content),
        f("loadMoreFooterLabel", Content),
        f("loadMoreLoadingLabel", Content),
        f("sectionGroupingEnabled", Content),
        f("listRowSpacing", Content),
        f("listSpacingAboveFirst", Content),
        f("listSpacingBelowLast", Content),
        f("itemProperty", Content),
        f("placeholder", Content),
        f("isOn", Content),
        f("label", Content),
        f("value", Content),
        f("min", Content),
        f("max", Content),
        f("selection", Content),
        f("options", Content),
        f("progress", Content),
        f("indeterminate", Content),
        f("axis", Content),
        f("url", Content),
        f("componentName", Content),
        f("fitToScreen", Screen),
        f("screenId", Screen),
        f("presentationStyle", Screen),
        f("localizationEnabled", Localization),
        f("localizationKey", Localization),
        f("localizationDefaultValue", Localization),
        f("accessibilityEnabled", Accessibility),
        f("accessibilityIdentifier", Accessibility),
        f("accessibilityLabel", Accessibility),
        f("tag", Behavior),
        f("isUserInteractionEnabled", Behavior),
        f("isHidden", Behavior),
        f("automationIdentifier", Behavior),
        f("actionId", Action),
        f("actionEvent", Action),
        f("actionBoundNodeId", Action),
        f("actionBoundProperty", Action),
        f("actionBoundDataModelId", Action),
        f("gestures", Gesture),
        f("displayFormat", Format),
        f("sheetDetent", Sheet),
        f("sheetDismissible", Sheet),
        f("sheetShowHandle", Sheet),
        f("sheetBackdropOpacity", Sheet),
        f("sheetDataMapping", Sheet),
    ]
};

pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|s| s.key == key)
}

/// True if a patch may carry `key`.
pub fn is_mergeable(key: &str) -> bool {
    field_spec(key).is_some()
}

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("unknown field `{0}`")]
    Unknown(String),
    #[error("field `{key}` does not apply to {node_type} nodes")]
    NotApplicable { key: String, node_type: NodeType },
    #[error("field `{key}` expects {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

/// Failure to decode a node from the flat format.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NodeError {
    #[error("node must be a JSON object")]
    NotAnObject,
    #[error("node has no `type`")]
    MissingType,
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),
}

fn mismatch(key: &str, expected: &'static str) -> FieldError {
    FieldError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

// ─── Value readers ───────────────────────────────────────────────────────

fn text(key: &str, v: &Value) -> Result<String, FieldError> {
    scalar_string(v).ok_or_else(|| mismatch(key, "a string"))
}

fn num(key: &str, v: &Value) -> Result<f64, FieldError> {
    v.as_f64().ok_or_else(|| mismatch(key, "a number"))
}

/// Non-negative integer; integral floats such as `2.0` count.
fn count(key: &str, v: &Value) -> Result<u32, FieldError> {
    v.as_u64()
        .or_else(|| {
            v.as_f64()
                .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0)
                .map(|n| n as u64)
        })
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| mismatch(key, "a non-negative integer"))
}

fn flag(key: &str, v: &Value) -> Result<bool, FieldError> {
    v.as_bool().ok_or_else(|| mismatch(key, "a boolean"))
}

fn array(key: &str, v: &Value) -> Result<Vec<Value>, FieldError> {
    v.as_array().cloned().ok_or_else(|| mismatch(key, "an array"))
}

fn optional<T>(
    v: &Value,
    read: impl FnOnce() -> Result<T, FieldError>,
) -> Result<Option<T>, FieldError> {
    if v.is_null() { Ok(None) } else { read().map(Some) }
}

// ─── Optional style/layout slots ─────────────────────────────────────────

macro_rules! slots {
    ($owner:ty => $t:ty { $($key:literal => $($field:ident).+),+ $(,)? }, $get:ident, $get_mut:ident) => {
        impl $owner {
            fn $get(&self, key: &str) -> Option<&Option<$t>> {
                match key {
                    $($key => Some(&self.$($field).+),)+
                    _ => None,
                }
            }

            fn $get_mut(&mut self, key: &str) -> Option<&mut Option<$t>> {
                match key {
                    $($key => Some(&mut self.$($field).+),)+
                    _ => None,
                }
            }
        }
    };
}

slots!(Style => String {
    "fontFamily" => font_family,
    "fontWeight" => font_weight,
    "textColor" => text_color,
    "backgroundColor" => background_color,
    "foregroundColor" => foreground_color,
    "borderColor" => border_color,
    "color" => color,
}, text_slot, text_slot_mut);

slots!(Style => f64 {
    "fontSize" => font_size,
    "cornerRadius" => corner_radius,
    "opacity" => opacity,
    "blur" => blur,
}, number_slot, number_slot_mut);

slots!(Layout => f64 {
    "width" => width,
    "height" => height,
    "x" => x,
    "y" => y,
    "paddingHorizontal" => padding.horizontal,
    "paddingVertical" => padding.vertical,
    "paddingTop" => padding.top,
    "paddingBottom" => padding.bottom,
    "marginHorizontal" => margin.horizontal,
    "marginVertical" => margin.vertical,
    "marginTop" => margin.top,
    "marginBottom" => margin.bottom,
    "marginLeft" => margin.left,
    "marginRight" => margin.right,
    "insetFromParentTop" => inset.top,
    "insetFromParentLeft" => inset.left,
    "insetFromParentBottom" => inset.bottom,
    "insetFromParentRight" => inset.right,
}, number_slot, number_slot_mut);

// ─── Read / write ────────────────────────────────────────────────────────

impl Node {
    /// Current JSON value of `key`, or `None` when the key is unset or does
    /// not apply to this node's type.
    pub fn field(&self, key: &str) -> Option<Value> {
        if let Some(slot) = self.style.text_slot(key) {
            return slot.clone().map(Value::String);
        }
        if let Some(slot) = self.style.number_slot(key) {
            return slot.map(number);
        }
        if let Some(slot) = self.layout.number_slot(key) {
            return slot.map(number);
        }
        let value = match key {
            "layoutMode" => return self.layout.layout_mode.map(|m| m.as_str().into()),
            "autoResize" => return self.layout.auto_resize.map(Value::Bool),
            "fillRemainingWidth" => self.fill_remaining_width.into(),
            "componentName" => self.component_name.clone().into(),
            "localizationEnabled" => self.localization.enabled.into(),
            "localizationKey" => self.localization.key.clone().into(),
            "localizationDefaultValue" => self.localization.default_value.clone().into(),
            "accessibilityEnabled" => self.accessibility.enabled.into(),
            "accessibilityIdentifier" => self.accessibility.identifier.clone().into(),
            "accessibilityLabel" => self.accessibility.label.clone().into(),
            "tag" => self.behavior.tag.into(),
            "isUserInteractionEnabled" => self.behavior.is_user_interaction_enabled.into(),
            "isHidden" => self.behavior.is_hidden.into(),
            "automationIdentifier" => self.behavior.automation_identifier.clone().into(),
            "actionId" => self.action.action_id.clone().into(),
            "actionEvent" => self.action.action_event.clone().into(),
            "actionBoundNodeId" => self.action.bound_node_id.clone().into(),
            "actionBoundProperty" => self.action.bound_property.clone().into(),
            "actionBoundDataModelId" => self.action.bound_data_model_id.clone().into(),
            "gestures" => Value::Array(self.gestures.iter().map(gesture_json).collect()),
            "displayFormat" => self
                .display_format
                .as_ref()
                .and_then(|df| serde_json::to_value(df).ok())
                .unwrap_or(Value::Null),
            _ => return kind_field(&self.kind, key),
        };
        Some(value)
    }

    /// Write `key`. `null` clears optional values; values of the wrong JSON
    /// type and keys foreign to this node's type are rejected untouched.
    pub fn set_field(&mut self, key: &str, value: &Value) -> Result<(), FieldError> {
        if field_spec(key).is_none() {
            return Err(FieldError::Unknown(key.to_string()));
        }
        if let Some(slot) = self.style.text_slot_mut(key) {
            *slot = optional(value, || text(key, value))?;
            return Ok(());
        }
        if let Some(slot) = self.style.number_slot_mut(key) {
            *slot = optional(value, || num(key, value))?;
            return Ok(());
        }
        if let Some(slot) = self.layout.number_slot_mut(key) {
            *slot = optional(value, || num(key, value))?;
            return Ok(());
        }
        match key {
            "layoutMode" => match optional(value, || {
                value
                    .as_str()
                    .and_then(LayoutMode::parse)
                    .ok_or_else(|| mismatch(key, "autoLayout, autoResize or freeForm"))
            })? {
                Some(mode) => self.layout.set_mode(mode),
                None => self.layout.layout_mode = None,
            },
            "autoResize" => match optional(value, || flag(key, value))? {
                Some(on) => self.layout.set_auto_resize(on),
                None => self.layout.auto_resize = None,
            },
            "fillRemainingWidth" => self.fill_remaining_width = flag(key, value)?,
            "componentName" => self.component_name = text(key, value)?,
            "localizationEnabled" => self.localization.enabled = flag(key, value)?,
            "localizationKey" => self.localization.key = text(key, value)?,
            "localizationDefaultValue" => self.localization.default_value = text(key, value)?,
            "accessibilityEnabled" => self.accessibility.enabled = flag(key, value)?,
            "accessibilityIdentifier" => self.accessibility.identifier = text(key, value)?,
            "accessibilityLabel" => self.accessibility.label = text(key, value)?,
            "tag" => {
                self.behavior.tag = value
                    .as_i64()
                    .or_else(|| value.as_f64().filter(|n| n.is_finite()).map(|n| n as i64))
                    .ok_or_else(|| mismatch(key, "a number"))?;
            }
            "isUserInteractionEnabled" => {
                self.behavior.is_user_interaction_enabled = flag(key, value)?;
            }
            "isHidden" => self.behavior.is_hidden = flag(key, value)?,
            "automationIdentifier" => self.behavior.automation_identifier = text(key, value)?,
            "actionId" => self.action.action_id = text(key, value)?,
            "actionEvent" => self.action.action_event = text(key, value)?,
            "actionBoundNodeId" => self.action.bound_node_id = text(key, value)?,
            "actionBoundProperty" => self.action.bound_property = text(key, value)?,
            "actionBoundDataModelId" => self.action.bound_data_model_id = text(key, value)?,
            "gestures" => {
                self.gestures = value
                    .as_array()
                    .ok_or_else(|| mismatch(key, "an array"))?
                    .iter()
                    .map(Gesture::from_json)
                    .collect();
            }
            "displayFormat" => {
                self.display_format = optional(value, || {
                    DisplayFormat::from_json(value)
                        .ok_or_else(|| mismatch(key, "an object with a `type`"))
                })?;
            }
            _ => {
                let node_type = self.node_type();
                if !set_kind_field(&mut self.kind, key, value)? {
                    return Err(FieldError::NotApplicable {
                        key: key.to_string(),
                        node_type,
                    });
                }
            }
        }
        Ok(())
    }

    /// Apply every registry key present in `source` that passes `filter`,
    /// in registry order. Rejected values are logged and skipped. Returns
    /// the number of keys written.
    pub fn apply_fields_where(
        &mut self,
        source: &Map<String, Value>,
        filter: impl Fn(&FieldSpec) -> bool,
    ) -> usize {
        let mut applied = 0;
        for spec in FIELDS.iter().filter(|s| filter(s)) {
            let Some(value) = source.get(spec.key) else {
                continue;
            };
            match self.set_field(spec.key, value) {
                Ok(()) => applied += 1,
                Err(e @ FieldError::NotApplicable { .. }) => log::trace!("{}: {e}", self.id),
                Err(e) => log::debug!("{}: {e}", self.id),
            }
        }
        applied
    }

    pub fn apply_fields(&mut self, source: &Map<String, Value>) -> usize {
        self.apply_fields_where(source, |_| true)
    }
}

fn kind_field(kind: &NodeKind, key: &str) -> Option<Value> {
    use NodeKind as K;
    let value = match (kind, key) {
        (K::View { fit_to_screen, .. }, "fitToScreen") => (*fit_to_screen).into(),
        (K::View { presentation_style, .. }, "presentationStyle") => presentation_style.as_str().into(),
        (K::View { screen_id, .. }, "screenId") => screen_id.clone().into(),
        (K::VStack { spacing, .. } | K::HStack { spacing, .. }, "spacing") => number(*spacing),
        (
            K::VStack { alignment, .. }
            | K::HStack { alignment, .. }
            | K::ZStack { alignment, .. }
            | K::Text { alignment, .. },
            "alignment",
        ) => alignment.clone().into(),
        (
            K::Text { text, .. } | K::TextField { text, .. } | K::SecureField { text, .. },
            "text",
        ) => text.clone().into(),
        (K::Text { number_of_lines, .. }, "numberOfLines") => (*number_of_lines).into(),
        (
            K::Text { bound_list_item_property: p, .. }
            | K::Button { bound_list_item_property: p, .. }
            | K::Image { bound_list_item_property: p, .. },
            "boundListItemProperty",
        ) => p.clone().into(),
        (K::Button { title, .. }, "title") => title.clone().into(),
        (K::Image { src, .. }, "src") => src.clone().into(),
        (K::Image { alt, .. }, "alt") => alt.clone().into(),
        (K::Image { content_mode, .. }, "contentMode") => content_mode.clone().into(),
        (K::Image { use_asset, .. }, "useAsset") => (*use_asset).into(),
        (K::Image { asset_bundle_name, .. }, "assetBundleName") => asset_bundle_name.clone().into(),
        (K::Image { asset_image_name, .. }, "assetImageName") => asset_image_name.clone().into(),
        (K::Image { show_loading_indicator, .. }, "showLoadingIndicator") => {
            (*show_loading_indicator).into()
        }
        (K::List { items, .. }, "items") => Value::Array(items.clone()),
        (K::List { load_more_enabled, .. }, "loadMoreEnabled") => (*load_more_enabled).into(),
        (K::List { load_more_footer_label, .. }, "loadMoreFooterLabel") => {
            load_more_footer_label.clone().into()
        }
        (K::List { load_more_loading_label, .. }, "loadMoreLoadingLabel") => {
            load_more_loading_label.clone().into()
        }
        (K::List { section_grouping_enabled, .. }, "sectionGroupingEnabled") => {
            (*section_grouping_enabled).into()
        }
        (K::List { list_row_spacing, .. }, "listRowSpacing") => number(*list_row_spacing),
        (K::List { list_spacing_above_first, .. }, "listSpacingAboveFirst") => {
            number(*list_spacing_above_first)
        }
        (K::List { list_spacing_below_last, .. }, "listSpacingBelowLast") => {
            number(*list_spacing_below_last)
        }
        (K::ListItemText { item_property }, "itemProperty") => item_property.clone().into(),
        (
            K::TextField { placeholder, .. } | K::SecureField { placeholder, .. },
            "placeholder",
        ) => placeholder.clone().into(),
        (K::Toggle { is_on, .. }, "isOn") => (*is_on).into(),
        (K::Toggle { label, .. } | K::Link { label, .. }, "label") => label.clone().into(),
        (K::Slider { value, .. }, "value") => number(*value),
        (K::Slider { min, .. }, "min") => number(*min),
        (K::Slider { max, .. }, "max") => number(*max),
        (K::Picker { selection, .. }, "selection") => selection.clone().into(),
        (K::Picker { options, .. }, "options") => Value::Array(options.clone()),
        (K::ProgressView { progress, .. }, "progress") => number(*progress),
        (K::ProgressView { indeterminate, .. }, "indeterminate") => (*indeterminate).into(),
        (K::Divider { axis }, "axis") => axis.as_str().into(),
        (K::Link { url, .. }, "url") => url.clone().into(),
        (K::BottomSheet { sheet, .. }, "sheetDetent") => sheet.detent.as_str().into(),
        (K::BottomSheet { sheet, .. }, "sheetDismissible") => sheet.dismissible.into(),
        (K::BottomSheet { sheet, .. }, "sheetShowHandle") => sheet.show_handle.into(),
        (K::BottomSheet { sheet, .. }, "sheetBackdropOpacity") => number(sheet.backdrop_opacity),
        (K::BottomSheet { sheet, .. }, "sheetDataMapping") => sheet
            .data_mapping
            .as_ref()
            .map_or(Value::Null, SheetDataMapping::to_json),
        _ => return None,
    };
    Some(value)
}

/// Returns `Ok(false)` when `key` does not apply to this kind.
fn set_kind_field(kind: &mut NodeKind, key: &str, v: &Value) -> Result<bool, FieldError> {
    use NodeKind as K;
    match (kind, key) {
        (K::View { fit_to_screen, .. }, "fitToScreen") => *fit_to_screen = flag(key, v)?,
        (K::View { presentation_style, .. }, "presentationStyle") => {
            *presentation_style = v
                .as_str()
                .and_then(PresentationStyle::parse)
                .ok_or_else(|| mismatch(key, "push, present or modal"))?;
        }
        (K::View { screen_id, .. }, "screenId") => *screen_id = text(key, v)?,
        (K::VStack { spacing, .. } | K::HStack { spacing, .. }, "spacing") => {
            *spacing = num(key, v)?;
        }
        (
            K::VStack { alignment, .. }
            | K::HStack { alignment, .. }
            | K::ZStack { alignment, .. }
            | K::Text { alignment, .. },
            "alignment",
        ) => *alignment = text(key, v)?,
        (
            K::Text { text: t, .. } | K::TextField { text: t, .. } | K::SecureField { text: t, .. },
            "text",
        ) => *t = text(key, v)?,
        (K::Text { number_of_lines, .. }, "numberOfLines") => *number_of_lines = count(key, v)?,
        (
            K::Text { bound_list_item_property: p, .. }
            | K::Button { bound_list_item_property: p, .. }
            | K::Image { bound_list_item_property: p, .. },
            "boundListItemProperty",
        ) => *p = text(key, v)?,
        (K::Button { title, .. }, "title") => *title = text(key, v)?,
        (K::Image { src, .. }, "src") => *src = text(key, v)?,
        (K::Image { alt, .. }, "alt") => *alt = text(key, v)?,
        (K::Image { content_mode, .. }, "contentMode") => *content_mode = text(key, v)?,
        (K::Image { use_asset, .. }, "useAsset") => *use_asset = flag(key, v)?,
        (K::Image { asset_bundle_name, .. }, "assetBundleName") => {
            *asset_bundle_name = text(key, v)?;
        }
        (K::Image { asset_image_name, .. }, "assetImageName") => {
            *asset_image_name = text(key, v)?;
        }
        (K::Image { show_loading_indicator, .. }, "showLoadingIndicator") => {
            *show_loading_indicator = flag(key, v)?;
        }
        (K::List { items, .. }, "items") => *items = array(key, v)?,
        (K::List { load_more_enabled, .. }, "loadMoreEnabled") => {
            *load_more_enabled = flag(key, v)?;
        }
        (K::List { load_more_footer_label, .. }, "loadMoreFooterLabel") => {
            *load_more_footer_label = text(key, v)?;
        }
        (K::List { load_more_loading_label, .. }, "loadMoreLoadingLabel") => {
            *load_more_loading_label = text(key, v)?;
        }
        (K::List { section_grouping_enabled, .. }, "sectionGroupingEnabled") => {
            *section_grouping_enabled = flag(key, v)?;
        }
        (K::List { list_row_spacing, .. }, "listRowSpacing") => *list_row_spacing = num(key, v)?,
        (K::List { list_spacing_above_first, .. }, "listSpacingAboveFirst") => {
            *list_spacing_above_first = num(key, v)?;
        }
        (K::List { list_spacing_below_last, .. }, "listSpacingBelowLast") => {
            *list_spacing_below_last = num(key, v)?;
        }
        (K::ListItemText { item_property }, "itemProperty") => *item_property = text(key, v)?,
        (
            K::TextField { placeholder, .. } | K::SecureField { placeholder, .. },
            "placeholder",
        ) => *placeholder = text(key, v)?,
        (K::Toggle { is_on, .. }, "isOn") => *is_on = flag(key, v)?,
        (K::Toggle { label, .. } | K::Link { label, .. }, "label") => *label = text(key, v)?,
        (K::Slider { value, .. }, "value") => *value = num(key, v)?,
        (K::Slider { min, .. }, "min") => *min = num(key, v)?,
        (K::Slider { max, .. }, "max") => *max = num(key, v)?,
        (K::Picker { selection, .. }, "selection") => *selection = text(key, v)?,
        (K::Picker { options, .. }, "options") => *options = array(key, v)?,
        (K::ProgressView { progress, .. }, "progress") => *progress = num(key, v)?,
        (K::ProgressView { indeterminate, .. }, "indeterminate") => {
            *indeterminate = flag(key, v)?;
        }
        (K::Divider { axis }, "axis") => {
            *axis = v
                .as_str()
                .and_then(Axis::parse)
                .ok_or_else(|| mismatch(key, "horizontal or vertical"))?;
        }
        (K::Link { url, .. }, "url") => *url = text(key, v)?,
        (K::BottomSheet { sheet, .. }, "sheetDetent") => {
            sheet.detent = v
                .as_str()
                .and_then(SheetDetent::parse)
                .ok_or_else(|| mismatch(key, "small, medium or large"))?;
        }
        (K::BottomSheet { sheet, .. }, "sheetDismissible") => sheet.dismissible = flag(key, v)?,
        (K::BottomSheet { sheet, .. }, "sheetShowHandle") => sheet.show_handle = flag(key, v)?,
        (K::BottomSheet { sheet, .. }, "sheetBackdropOpacity") => {
            sheet.backdrop_opacity = num(key, v)?.clamp(0.0, 1.0);
        }
        (K::BottomSheet { sheet, .. }, "sheetDataMapping") => {
            sheet.data_mapping = optional(v, || {
                SheetDataMapping::from_json(v).ok_or_else(|| mismatch(key, "an object"))
            })?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

// ─── Flat format ─────────────────────────────────────────────────────────

impl Node {
    /// Editor/storage shape: `{id, type, children?, <every set field>}`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), self.id.as_str().into());
        map.insert("type".into(), self.node_type().as_str().into());
        for spec in FIELDS {
            if let Some(value) = self.field(spec.key) {
                map.insert(spec.key.into(), value);
            }
        }
        if self.is_container() {
            let children = self.children().iter().map(Node::to_json).collect();
            map.insert("children".into(), Value::Array(children));
        }
        Value::Object(map)
    }

    /// Decode the flat shape. Ids are coerced to strings (missing ids get a
    /// fresh one); children are kept only on container types, and invalid
    /// children are dropped.
    pub fn from_json(value: &Value) -> Result<Node, NodeError> {
        let obj = value.as_object().ok_or(NodeError::NotAnObject)?;
        let ty: NodeType = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(NodeError::MissingType)?
            .parse()?;
        let id = obj
            .get("id")
            .and_then(NodeId::from_json)
            .unwrap_or_else(NodeId::generate);
        let mut node = Node::new(id, NodeKind::defaults(ty));
        node.apply_fields(obj);
        if ty.is_container() {
            let children = obj
                .get("children")
                .and_then(Value::as_array)
                .map(|list| decode_children(list))
                .unwrap_or_default();
            node.set_children(children);
        }
        Ok(node)
    }
}

fn decode_children(list: &[Value]) -> Vec<Node> {
    list.iter()
        .filter_map(|child| match Node::from_json(child) {
            Ok(node) => Some(node),
            Err(e) => {
                log::warn!("dropping child node: {e}");
                None
            }
        })
        .collect()
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Node::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// `{"type": kind}` plus `minDuration` when set.
pub fn gesture_json(gesture: &Gesture) -> Value {
    match gesture.min_duration {
        Some(d) => json!({ "type": gesture.kind, "minDuration": number(d) }),
        None => json!({ "type": gesture.kind }),
    }
}
