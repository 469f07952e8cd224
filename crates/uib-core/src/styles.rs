//! Style definitions and the per-type enabled-style table.
//!
//! `STYLE_DEFINITIONS` is the single list of style properties a node can
//! carry. Each node type enables a subset; the canonical export always emits
//! the full set plus the layout-only keys so two nodes of the same type
//! produce style objects with identical keys.

use crate::model::{Node, NodeType};
use serde_json::{Map, Value};

// ─── Definitions ─────────────────────────────────────────────────────────

/// Editor input used for a style property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleInput {
    /// Fixed choice list of `(value, label)` pairs.
    Select(&'static [(&'static str, &'static str)]),
    Number { min: Option<f64>, max: Option<f64> },
    Color,
    /// Color picker that also offers "transparent".
    ColorTransparent,
    /// Percentage slider over a 0..=1 value.
    Range { min: f64, max: f64 },
}

/// Default value of a style property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleDefault {
    Text(&'static str),
    Number(f64),
}

impl StyleDefault {
    pub fn to_value(self) -> Value {
        match self {
            StyleDefault::Text(s) => Value::String(s.to_string()),
            StyleDefault::Number(n) => number(n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub input: StyleInput,
    pub default: StyleDefault,
}

const FONT_FAMILIES: &[(&str, &str)] = &[
    ("system-ui", "System UI"),
    ("Inter", "Inter"),
    ("Roboto", "Roboto"),
    ("Open Sans", "Open Sans"),
    ("Lato", "Lato"),
    ("Georgia", "Georgia"),
    ("serif", "Serif"),
    ("monospace", "Monospace"),
];

const FONT_WEIGHTS: &[(&str, &str)] = &[
    ("normal", "Normal"),
    ("500", "Medium"),
    ("600", "Semibold"),
    ("bold", "Bold"),
];

pub const STYLE_DEFINITIONS: &[StyleDefinition] = &[
    StyleDefinition {
        key: "fontFamily",
        label: "Font",
        input: StyleInput::Select(FONT_FAMILIES),
        default: StyleDefault::Text("system-ui"),
    },
    StyleDefinition {
        key: "fontSize",
        label: "Font size (px)",
        input: StyleInput::Number {
            min: Some(8.0),
            max: Some(72.0),
        },
        default: StyleDefault::Number(16.0),
    },
    StyleDefinition {
        key: "fontWeight",
        label: "Font weight",
        input: StyleInput::Select(FONT_WEIGHTS),
        default: StyleDefault::Text("normal"),
    },
    StyleDefinition {
        key: "textColor",
        label: "Text color",
        input: StyleInput::Color,
        default: StyleDefault::Text("#000000"),
    },
    StyleDefinition {
        key: "backgroundColor",
        label: "Background color",
        input: StyleInput::ColorTransparent,
        default: StyleDefault::Text("transparent"),
    },
    StyleDefinition {
        key: "foregroundColor",
        label: "Foreground color",
        input: StyleInput::Color,
        default: StyleDefault::Text(""),
    },
    StyleDefinition {
        key: "borderColor",
        label: "Border color",
        input: StyleInput::Color,
        default: StyleDefault::Text(""),
    },
    StyleDefinition {
        key: "cornerRadius",
        label: "Corner radius (px)",
        input: StyleInput::Number {
            min: Some(0.0),
            max: None,
        },
        default: StyleDefault::Number(0.0),
    },
    StyleDefinition {
        key: "opacity",
        label: "Alpha / opacity",
        input: StyleInput::Range {
            min: 0.0,
            max: 100.0,
        },
        default: StyleDefault::Number(1.0),
    },
    StyleDefinition {
        key: "blur",
        label: "Blur (px)",
        input: StyleInput::Number {
            min: Some(0.0),
            max: None,
        },
        default: StyleDefault::Number(0.0),
    },
];

pub fn style_definition(key: &str) -> Option<&'static StyleDefinition> {
    STYLE_DEFINITIONS.iter().find(|d| d.key == key)
}

// ─── Per-type enabled keys ───────────────────────────────────────────────

const TEXT_AND_VISUAL: &[&str] = &[
    "fontFamily",
    "fontSize",
    "fontWeight",
    "textColor",
    "backgroundColor",
    "foregroundColor",
    "borderColor",
    "cornerRadius",
    "opacity",
    "blur",
];

// Text-like controls color their glyphs with textColor, so no foregroundColor.
const TEXT_AND_TEXT_VISUAL: &[&str] = &[
    "fontFamily",
    "fontSize",
    "fontWeight",
    "textColor",
    "backgroundColor",
    "borderColor",
    "cornerRadius",
    "opacity",
    "blur",
];

const VISUAL: &[&str] = &[
    "backgroundColor",
    "foregroundColor",
    "borderColor",
    "cornerRadius",
    "opacity",
    "blur",
];

const DIVIDER: &[&str] = &["backgroundColor", "borderColor", "opacity"];

impl NodeType {
    /// Style keys the editor exposes for this type, in definition order.
    pub fn enabled_style_keys(self) -> &'static [&'static str] {
        match self {
            NodeType::Text
            | NodeType::ListItemContent
            | NodeType::TextField
            | NodeType::SecureField => TEXT_AND_TEXT_VISUAL,
            NodeType::Button
            | NodeType::List
            | NodeType::Toggle
            | NodeType::Picker
            | NodeType::Link => TEXT_AND_VISUAL,
            NodeType::Image
            | NodeType::View
            | NodeType::VStack
            | NodeType::HStack
            | NodeType::ZStack
            | NodeType::Slider
            | NodeType::ProgressView => VISUAL,
            NodeType::Divider => DIVIDER,
            NodeType::Spacer | NodeType::ListItemText | NodeType::BottomSheet => &[],
        }
    }
}

pub fn enabled_style_definitions(ty: NodeType) -> Vec<&'static StyleDefinition> {
    ty.enabled_style_keys()
        .iter()
        .filter_map(|k| style_definition(k))
        .collect()
}

/// Enabled style values that are actually set on `node`.
pub fn style_for_node(node: &Node) -> Map<String, Value> {
    node.node_type()
        .enabled_style_keys()
        .iter()
        .filter_map(|k| {
            node.field(k)
                .filter(|v| !v.is_null())
                .map(|v| (k.to_string(), v))
        })
        .collect()
}

// ─── Canonical style key set ─────────────────────────────────────────────

/// Layout keys exported inside `style` alongside the style definitions.
pub const LAYOUT_KEYS: &[&str] = &[
    "paddingHorizontal",
    "paddingVertical",
    "paddingTop",
    "paddingBottom",
    "marginHorizontal",
    "marginVertical",
    "marginTop",
    "marginBottom",
    "marginLeft",
    "marginRight",
    "insetFromParentTop",
    "insetFromParentLeft",
    "insetFromParentBottom",
    "insetFromParentRight",
    "width",
    "height",
    "x",
    "y",
    "autoResize",
    "layoutMode",
];

/// Every key of an exported `style` object, in export order.
pub fn canonical_style_keys() -> impl Iterator<Item = &'static str> {
    STYLE_DEFINITIONS
        .iter()
        .map(|d| d.key)
        .chain(LAYOUT_KEYS.iter().copied())
}

/// Export default for a layout-only key. `width`/`height` default to null (auto).
pub fn layout_default(key: &str) -> Value {
    match key {
        "width" | "height" => Value::Null,
        "autoResize" => Value::Bool(false),
        "layoutMode" => Value::String("autoLayout".into()),
        _ => Value::from(0),
    }
}

/// Export default for any canonical style key.
pub fn canonical_style_default(key: &str) -> Value {
    match style_definition(key) {
        Some(def) => def.default.to_value(),
        None => layout_default(key),
    }
}

/// JSON number for `n`, integral values as integers (`12`, not `12.0`).
pub fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::create_node;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn canonical_key_set_is_thirty_keys() {
        let keys: Vec<_> = canonical_style_keys().collect();
        assert_eq!(keys.len(), 30);
        assert_eq!(keys[0], "fontFamily");
        assert_eq!(keys[29], "layoutMode");
    }

    #[test]
    fn defaults_come_from_definitions_then_layout_table() {
        assert_eq!(canonical_style_default("fontSize"), json!(16));
        assert_eq!(canonical_style_default("opacity"), json!(1));
        assert_eq!(canonical_style_default("width"), Value::Null);
        assert_eq!(canonical_style_default("marginLeft"), json!(0));
        assert_eq!(canonical_style_default("layoutMode"), json!("autoLayout"));
    }

    #[test]
    fn text_has_no_foreground_color() {
        let keys = NodeType::Text.enabled_style_keys();
        assert!(keys.contains(&"textColor"));
        assert!(!keys.contains(&"foregroundColor"));
        assert!(NodeType::Button.enabled_style_keys().contains(&"foregroundColor"));
        assert!(NodeType::Spacer.enabled_style_keys().is_empty());
    }

    #[test]
    fn enabled_definitions_keep_table_order() {
        let labels: Vec<_> = enabled_style_definitions(NodeType::Divider)
            .into_iter()
            .map(|d| d.label)
            .collect();
        assert_eq!(labels, vec!["Background color", "Border color", "Alpha / opacity"]);
    }

    #[test]
    fn style_for_node_only_reports_enabled_keys() {
        let divider = create_node(NodeType::Divider);
        let style = style_for_node(&divider);
        let keys: Vec<_> = style.keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(!style.contains_key("fontSize"));
        assert_eq!(style["opacity"], json!(1));
    }

    #[test]
    fn integral_numbers_emit_as_integers() {
        assert_eq!(number(12.0).to_string(), "12");
        assert_eq!(number(0.5).to_string(), "0.5");
        assert_eq!(number(f64::NAN), Value::Null);
    }
}
