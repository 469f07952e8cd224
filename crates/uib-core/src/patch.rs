//! Partial node updates.
//!
//! A patch names a node by id and carries only the keys being changed. Keys
//! outside the field registry are dropped when the patch is built, so a
//! patch can never smuggle arbitrary data onto a node.

use crate::fields::{FieldError, is_mergeable};
use crate::id::NodeId;
use crate::model::Node;
use crate::tree::find_node_mut;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct NodePatch {
    pub id: NodeId,
    /// Replacement children; ignored when the target is not a container.
    pub children: Option<Vec<Node>>,
    /// Registry keys only. A present `null` clears an optional value
    /// (`width: null` resets the width to auto).
    pub fields: Map<String, Value>,
}

impl NodePatch {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            children: None,
            fields: Map::new(),
        }
    }

    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        if is_mergeable(key) {
            self.fields.insert(key.to_string(), value.into());
        } else {
            log::debug!("patch for {}: dropping unknown key `{key}`", self.id);
        }
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = Some(children);
        self
    }

    /// Read a patch from `{id, children?, ...fields}`. `None` without an id.
    /// `children` is taken only when it is an array.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id").and_then(NodeId::from_json)?;
        let children = obj.get("children").and_then(Value::as_array).map(|list| {
            list.iter()
                .filter_map(|c| Node::from_json(c).ok())
                .collect()
        });
        let fields = obj
            .iter()
            .filter(|(k, _)| is_mergeable(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Some(Self {
            id,
            children,
            fields,
        })
    }

    /// Patch that sets every field of `node` as it currently stands.
    pub fn from_node(node: &Node) -> Self {
        let fields = match node.to_json() {
            Value::Object(map) => map
                .into_iter()
                .filter(|(k, _)| is_mergeable(k))
                .collect(),
            _ => Map::new(),
        };
        Self {
            id: node.id,
            children: node.is_container().then(|| node.children().to_vec()),
            fields,
        }
    }

    /// Apply to one node. Fields are written in registry order; rejected
    /// values are skipped.
    pub fn apply_to(&self, node: &mut Node) -> Vec<(String, FieldError)> {
        if let Some(children) = &self.children
            && !node.set_children(children.clone())
        {
            log::trace!("patch for {}: leaf ignores children", self.id);
        }
        let mut rejected = Vec::new();
        for (key, value) in crate::fields::FIELDS
            .iter()
            .filter_map(|s| self.fields.get(s.key).map(|v| (s.key, v)))
        {
            if let Err(e) = node.set_field(key, value) {
                rejected.push((key.to_string(), e));
            }
        }
        rejected
    }
}

/// New tree with `patch` merged into the first node matching its id. Keys
/// the patch doesn't mention are left as they were. Missing ids return an
/// unchanged copy.
pub fn apply_update(tree: &Node, patch: &NodePatch) -> Node {
    let mut next = tree.clone();
    apply_update_in_place(&mut next, patch);
    next
}

/// Merge in place. Returns `false` when no node has the patch's id.
pub fn apply_update_in_place(tree: &mut Node, patch: &NodePatch) -> bool {
    let Some(node) = find_node_mut(tree, patch.id) else {
        log::debug!("apply_update: no node {}", patch.id);
        return false;
    };
    for (key, e) in patch.apply_to(node) {
        log::debug!("apply_update {}: `{key}` {e}", patch.id);
    }
    true
}

/// Fold `patches` over the tree in order.
pub fn apply_updates(tree: &Node, patches: &[NodePatch]) -> Node {
    let mut next = tree.clone();
    apply_updates_in_place(&mut next, patches);
    next
}

/// Returns how many patches found their node.
pub fn apply_updates_in_place(tree: &mut Node, patches: &[NodePatch]) -> usize {
    patches
        .iter()
        .filter(|p| apply_update_in_place(tree, p))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeType, create_node, default_tree};
    use crate::tree::find_node;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree_with_text() -> (Node, NodeId) {
        let text = create_node(NodeType::Text)
            .with("width", 100)
            .with("backgroundColor", "#fff")
            .with("text", "A");
        let id = text.id;
        (default_tree().with_children(vec![text]), id)
    }

    #[test]
    fn merge_keeps_fields_the_patch_omits() {
        let (tree, id) = tree_with_text();
        let next = apply_update(&tree, &NodePatch::new(id).set("text", "B"));
        let node = find_node(&next, id).unwrap();
        assert_eq!(node.field("text"), Some(json!("B")));
        assert_eq!(node.field("width"), Some(json!(100)));
        assert_eq!(node.field("backgroundColor"), Some(json!("#fff")));
        assert_eq!(find_node(&tree, id).unwrap().field("text"), Some(json!("A")));
    }

    #[test]
    fn present_null_clears_size() {
        let (tree, id) = tree_with_text();
        let next = apply_update(&tree, &NodePatch::new(id).set("width", Value::Null));
        assert_eq!(find_node(&next, id).unwrap().field("width"), None);
    }

    #[test]
    fn unknown_keys_never_reach_the_node() {
        let (tree, id) = tree_with_text();
        let patch = NodePatch::from_json(&json!({
            "id": id.as_str(), "text": "C", "evil": true, "type": "Button"
        }))
        .unwrap();
        assert_eq!(patch.fields.len(), 1);
        let next = apply_update(&tree, &patch);
        assert_eq!(find_node(&next, id).unwrap().node_type(), NodeType::Text);
    }

    #[test]
    fn leaves_never_gain_children() {
        let (tree, id) = tree_with_text();
        let patch = NodePatch::new(id).with_children(vec![create_node(NodeType::Spacer)]);
        let next = apply_update(&tree, &patch);
        assert!(find_node(&next, id).unwrap().children().is_empty());
    }

    #[test]
    fn containers_take_replacement_children() {
        let tree = default_tree();
        let patch = NodePatch::new("root").with_children(vec![create_node(NodeType::Spacer)]);
        assert_eq!(apply_update(&tree, &patch).children().len(), 1);
    }

    #[test]
    fn missing_id_is_a_no_op() {
        let (tree, _) = tree_with_text();
        assert_eq!(apply_update(&tree, &NodePatch::new("ghost").set("text", "x")), tree);
        assert_eq!(NodePatch::from_json(&json!({"text": "x"})), None);
    }

    #[test]
    fn updates_fold_in_order() {
        let (tree, id) = tree_with_text();
        let next = apply_updates(
            &tree,
            &[
                NodePatch::new(id).set("text", "one"),
                NodePatch::new(id).set("text", "two").set("fontSize", 20),
            ],
        );
        let node = find_node(&next, id).unwrap();
        assert_eq!(node.field("text"), Some(json!("two")));
        assert_eq!(node.field("fontSize"), Some(json!(20)));
    }

    #[test]
    fn only_first_duplicate_is_replaced() {
        let mut a = create_node(NodeType::Text);
        let mut b = create_node(NodeType::Text);
        a.id = NodeId::intern("dup");
        b.id = NodeId::intern("dup");
        let tree = default_tree().with_children(vec![a, b]);
        let next = apply_update(&tree, &NodePatch::new("dup").set("text", "new"));
        assert_eq!(next.children()[0].field("text"), Some(json!("new")));
        assert_eq!(next.children()[1].field("text"), Some(json!("Hello")));
    }

    #[test]
    fn from_node_round_trips_fields() {
        let (tree, id) = tree_with_text();
        let source = find_node(&tree, id).unwrap();
        let mut blank = create_node(NodeType::Text);
        blank.id = id;
        NodePatch::from_node(source).apply_to(&mut blank);
        assert_eq!(&blank, source);
    }
}
