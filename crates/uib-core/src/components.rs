//! Palette metadata and composite presets.

use crate::model::{Node, NodeKind, NodeType, create_node};
use crate::sheet;

pub const NAVIGATION_BAR: &str = "NavigationBar";

const NAV_BAR_HEIGHT: f64 = 70.0;
const NAV_BAR_SLOT: f64 = 70.0;
const NAV_BAR_BUTTON_SIZE: f64 = 44.0;
const DISPLAY_NAME_MAX_CHARS: usize = 30;

impl NodeType {
    /// Label shown in the palette and inspector.
    pub const fn display_name(self) -> &'static str {
        match self {
            NodeType::View => "Container",
            NodeType::VStack => "Vertical stack",
            NodeType::HStack => "Horizontal stack",
            NodeType::ZStack => "Z stack",
            NodeType::Text => "Text",
            NodeType::Button => "Button",
            NodeType::Image => "Image",
            NodeType::List => "List",
            NodeType::ListItemContent => "Table cell",
            NodeType::ListItemText => "Item text",
            NodeType::BottomSheet => sheet::DISPLAY_NAME,
            NodeType::TextField => "Text field",
            NodeType::Toggle => "Toggle",
            NodeType::Slider => "Slider",
            NodeType::Picker => "Picker",
            NodeType::ProgressView => "Progress",
            NodeType::Divider => "Divider",
            NodeType::Spacer => "Spacer",
            NodeType::Link => "Link",
            NodeType::SecureField => "Secure field",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            NodeType::View => "A box that holds other elements",
            NodeType::VStack => "Stack items top to bottom",
            NodeType::HStack => "Stack items left to right",
            NodeType::ZStack => "Stack items on top of each other",
            NodeType::Text => "A line of text",
            NodeType::Button => "A tappable button",
            NodeType::Image => "A picture from a URL",
            NodeType::List => "A list of items (add a row template as child)",
            NodeType::ListItemContent => {
                "Table cell: add controls inside (Item text, Text, Button, etc.)"
            }
            NodeType::ListItemText => "Shows current row's item (use inside Table cell)",
            NodeType::BottomSheet => sheet::DESCRIPTION,
            NodeType::TextField => "Single-line text input",
            NodeType::Toggle => "On/off switch",
            NodeType::Slider => "Value slider with range",
            NodeType::Picker => "Selection from options",
            NodeType::ProgressView => "Progress bar (determinate or indeterminate)",
            NodeType::Divider => "Horizontal or vertical line",
            NodeType::Spacer => "Flexible space (use inside VStack or HStack)",
            NodeType::Link => "URL link with label",
            NodeType::SecureField => "Password text input",
        }
    }
}

/// Display name for a composite marker such as `NavigationBar`.
pub fn component_display_name(component: &str) -> Option<&'static str> {
    match component {
        NAVIGATION_BAR => Some("Navigation bar"),
        _ => None,
    }
}

pub fn component_description(component: &str) -> Option<&'static str> {
    match component {
        NAVIGATION_BAR => Some(
            "Full-width bar with left button, title text, and right button (exports as View tree)",
        ),
        _ => None,
    }
}

/// Name shown in the layer tree: the composite name, else the first 30
/// characters of a Text's text or a Button's title, else the type name.
pub fn node_display_name(node: &Node) -> String {
    if let Some(name) = component_display_name(&node.component_name) {
        return name.to_string();
    }
    let label = match &node.kind {
        NodeKind::Text { text, .. } => Some(if text.is_empty() { "Text" } else { text }),
        NodeKind::Button { title, .. } => Some(if title.is_empty() { "Button" } else { title }),
        _ => None,
    };
    match label {
        Some(label) => label.chars().take(DISPLAY_NAME_MAX_CHARS).collect(),
        None => node.node_type().display_name().to_string(),
    }
}

fn nav_slot(alt: &str) -> Node {
    let image = create_node(NodeType::Image)
        .with("src", "")
        .with("alt", alt)
        .with("width", NAV_BAR_BUTTON_SIZE)
        .with("height", NAV_BAR_BUTTON_SIZE);
    let button = create_node(NodeType::Button)
        .with("title", "")
        .with("width", NAV_BAR_BUTTON_SIZE)
        .with("height", NAV_BAR_BUTTON_SIZE);
    create_node(NodeType::ZStack)
        .with("width", NAV_BAR_SLOT)
        .with("height", NAV_BAR_SLOT)
        .with_children(vec![image, button])
}

/// A 70pt HStack with a left image/button slot, a centered title that
/// fills the remaining width, and a trailing-aligned right slot.
pub fn create_navigation_bar() -> Node {
    let title = create_node(NodeType::Text)
        .with("text", "Title")
        .with("alignment", "center")
        .with("fillRemainingWidth", true);
    let right = nav_slot("Right").with("alignment", "trailing");
    create_node(NodeType::HStack)
        .with("componentName", NAVIGATION_BAR)
        .with("spacing", 0)
        .with("alignment", "center")
        .with("height", NAV_BAR_HEIGHT)
        .with_children(vec![nav_slot("Left"), title, right])
}
