//! Id-addressed queries and edits over a node tree.
//!
//! The plain functions are pure: they take `&Node` and return a new tree,
//! leaving the input untouched. The `_in_place` variants mutate and report
//! whether anything changed; the document store uses those.
//!
//! Missing ids and invalid moves are silent no-ops.

use crate::id::NodeId;
use crate::model::{Node, NodeType};
use std::collections::HashSet;

// ─── Queries ─────────────────────────────────────────────────────────────

/// Pre-order visit of every node in the subtree.
pub fn walk<'a, F: FnMut(&'a Node)>(node: &'a Node, visit: &mut F) {
    visit(node);
    for child in node.children() {
        walk(child, visit);
    }
}

/// First node with `id`, depth-first pre-order.
pub fn find_node(tree: &Node, id: impl Into<NodeId>) -> Option<&Node> {
    find(tree, id.into())
}

fn find(node: &Node, id: NodeId) -> Option<&Node> {
    if node.id == id {
        return Some(node);
    }
    node.children().iter().find_map(|c| find(c, id))
}

pub fn find_node_mut(tree: &mut Node, id: impl Into<NodeId>) -> Option<&mut Node> {
    find_mut(tree, id.into())
}

fn find_mut(node: &mut Node, id: NodeId) -> Option<&mut Node> {
    if node.id == id {
        return Some(node);
    }
    node.children_mut()?
        .iter_mut()
        .find_map(|c| find_mut(c, id))
}

/// Direct parent of `id`; `None` for the root or a missing id.
pub fn find_parent(tree: &Node, id: impl Into<NodeId>) -> Option<&Node> {
    let id = id.into();
    let mut chain = node_chain(tree, id);
    chain.pop()?;
    chain.pop()
}

/// Nodes from the root down to `id`, inclusive. Empty when not found.
pub fn node_chain(tree: &Node, id: impl Into<NodeId>) -> Vec<&Node> {
    let mut chain = Vec::new();
    if chain_to(tree, id.into(), &mut chain) {
        chain
    } else {
        Vec::new()
    }
}

fn chain_to<'a>(node: &'a Node, id: NodeId, chain: &mut Vec<&'a Node>) -> bool {
    chain.push(node);
    if node.id == id || node.children().iter().any(|c| chain_to(c, id, chain)) {
        return true;
    }
    chain.pop();
    false
}

/// Type names from the root down to `id`, inclusive. Empty when not found.
pub fn path_to_node(tree: &Node, id: impl Into<NodeId>) -> Vec<NodeType> {
    node_chain(tree, id)
        .into_iter()
        .map(Node::node_type)
        .collect()
}

/// True if `id` is `node` itself or anywhere below it.
pub fn has_descendant(node: &Node, id: impl Into<NodeId>) -> bool {
    find(node, id.into()).is_some()
}

// ─── Edits ───────────────────────────────────────────────────────────────

/// New tree without `id`, plus the detached node. The root itself can't be
/// removed; a missing id returns an unchanged copy and `None`.
pub fn remove_node(tree: &Node, id: impl Into<NodeId>) -> (Node, Option<Node>) {
    let mut next = tree.clone();
    let removed = remove_node_in_place(&mut next, id);
    (next, removed)
}

/// Detach the first node with `id`. Direct children are checked before
/// descending.
pub fn remove_node_in_place(tree: &mut Node, id: impl Into<NodeId>) -> Option<Node> {
    detach(tree, id.into())
}

fn detach(node: &mut Node, id: NodeId) -> Option<Node> {
    let children = node.children_mut()?;
    if let Some(pos) = children.iter().position(|c| c.id == id) {
        return Some(children.remove(pos));
    }
    children.iter_mut().find_map(|c| detach(c, id))
}

/// New tree with `node` inserted under `parent` at `index`, clamped to the
/// parent's child count. Unchanged when `parent` is missing or not a container.
pub fn add_node(tree: &Node, parent: impl Into<NodeId>, node: Node, index: usize) -> Node {
    let mut next = tree.clone();
    if let Err(node) = add_node_in_place(&mut next, parent, node, index) {
        log::debug!("add_node: no container to receive {}", node.id);
    }
    next
}

/// Insert in place. Hands the node back when there is nowhere to put it.
pub fn add_node_in_place(
    tree: &mut Node,
    parent: impl Into<NodeId>,
    node: Node,
    index: usize,
) -> Result<(), Node> {
    let Some(children) = find_mut(tree, parent.into()).and_then(Node::children_mut) else {
        return Err(node);
    };
    let at = index.min(children.len());
    children.insert(at, node);
    Ok(())
}

/// Reason a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("node not found or has no parent")]
    NotFound,
    #[error("node cannot become its own parent")]
    SelfParent,
    #[error("target is inside the moved node")]
    IntoOwnSubtree,
    #[error("target is not a container")]
    TargetNotContainer,
}

/// Check a move without performing it. Guards run in order: the node must
/// exist below the root, must not be the target, must not contain the
/// target, and the target must be a container.
pub fn check_move(tree: &Node, node_id: NodeId, target: NodeId) -> Result<(), MoveError> {
    let node = find_parent(tree, node_id)
        .and_then(|parent| parent.children().iter().find(|c| c.id == node_id))
        .ok_or(MoveError::NotFound)?;
    if node.id == target {
        return Err(MoveError::SelfParent);
    }
    if has_descendant(node, target) {
        return Err(MoveError::IntoOwnSubtree);
    }
    match find(tree, target) {
        Some(t) if t.is_container() => Ok(()),
        _ => Err(MoveError::TargetNotContainer),
    }
}

/// New tree with `node_id` moved under `target` at `index`. The index is
/// taken against the target's children after the node is detached. Any
/// refused move returns an unchanged copy.
pub fn move_node(
    tree: &Node,
    node_id: impl Into<NodeId>,
    target: impl Into<NodeId>,
    index: usize,
) -> Node {
    let mut next = tree.clone();
    if let Err(e) = move_node_in_place(&mut next, node_id, target, index) {
        log::debug!("move_node refused: {e}");
    }
    next
}

pub fn move_node_in_place(
    tree: &mut Node,
    node_id: impl Into<NodeId>,
    target: impl Into<NodeId>,
    index: usize,
) -> Result<(), MoveError> {
    let (node_id, target) = (node_id.into(), target.into());
    check_move(tree, node_id, target)?;
    let node = detach(tree, node_id).ok_or(MoveError::NotFound)?;
    add_node_in_place(tree, target, node, index).map_err(|_| MoveError::TargetNotContainer)
}

/// Give every repeated id after its first pre-order occurrence a fresh id.
/// Returns the number of ids rewritten.
pub fn dedupe_ids(tree: &mut Node) -> usize {
    let mut seen = HashSet::new();
    dedupe(tree, &mut seen)
}

fn dedupe(node: &mut Node, seen: &mut HashSet<NodeId>) -> usize {
    let mut rewritten = 0;
    if !seen.insert(node.id) {
        let fresh = NodeId::generate();
        log::debug!("duplicate id {} rewritten to {fresh}", node.id);
        node.id = fresh;
        seen.insert(fresh);
        rewritten += 1;
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            rewritten += dedupe(child, seen);
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, create_node, default_tree};
    use pretty_assertions::assert_eq;

    fn named(id: &str, ty: NodeType) -> Node {
        let mut node = create_node(ty);
        node.id = NodeId::intern(id);
        node
    }

    /// root → [stack → [a, inner → [b]], c]
    fn sample() -> Node {
        default_tree().with_children(vec![
            named("stack", NodeType::VStack).with_children(vec![
                named("a", NodeType::Text),
                named("inner", NodeType::HStack).with_children(vec![named("b", NodeType::Button)]),
            ]),
            named("c", NodeType::Image),
        ])
    }

    fn ids(node: &Node) -> Vec<&str> {
        let mut out = Vec::new();
        walk(node, &mut |n| out.push(n.id.as_str()));
        out
    }

    #[test]
    fn find_and_parent() {
        let tree = sample();
        assert_eq!(find_node(&tree, "b").map(|n| n.node_type()), Some(NodeType::Button));
        assert!(find_node(&tree, "root").is_some());
        assert!(find_node(&tree, "zzz").is_none());
        assert_eq!(find_parent(&tree, "b").map(|n| n.id.as_str()), Some("inner"));
        assert_eq!(find_parent(&tree, "stack").map(|n| n.id.as_str()), Some("root"));
        assert!(find_parent(&tree, "root").is_none());
        assert!(find_parent(&tree, "zzz").is_none());
    }

    #[test]
    fn numeric_looking_ids_match_their_string_form() {
        let tree = default_tree().with_children(vec![named("5", NodeType::Text)]);
        let id = NodeId::from_json(&serde_json::json!(5)).unwrap();
        assert_eq!(find_node(&tree, id).map(|n| n.id.as_str()), Some("5"));
    }

    #[test]
    fn path_lists_types_root_first() {
        let tree = sample();
        assert_eq!(
            path_to_node(&tree, "b"),
            vec![NodeType::View, NodeType::VStack, NodeType::HStack, NodeType::Button]
        );
        assert_eq!(path_to_node(&tree, "root"), vec![NodeType::View]);
        assert!(path_to_node(&tree, "zzz").is_empty());
    }

    #[test]
    fn descendant_includes_self() {
        let tree = sample();
        let stack = find_node(&tree, "stack").unwrap();
        assert!(has_descendant(stack, "stack"));
        assert!(has_descendant(stack, "b"));
        assert!(!has_descendant(stack, "c"));
    }

    #[test]
    fn remove_is_pure() {
        let tree = sample();
        let (next, removed) = remove_node(&tree, "inner");
        assert_eq!(removed.map(|n| n.subtree_len()), Some(2));
        assert_eq!(ids(&next), vec!["root", "stack", "a", "c"]);
        assert_eq!(tree.subtree_len(), 6);

        let (same, none) = remove_node(&tree, "root");
        assert!(none.is_none());
        assert_eq!(same, tree);
    }

    #[test]
    fn add_clamps_index_and_ignores_leaves() {
        let tree = sample();
        let next = add_node(&tree, "stack", named("d", NodeType::Spacer), 99);
        assert_eq!(ids(&next), vec!["root", "stack", "a", "inner", "b", "d", "c"]);

        let next = add_node(&tree, "stack", named("d", NodeType::Spacer), 0);
        assert_eq!(next.children()[0].children()[0].id.as_str(), "d");

        assert_eq!(add_node(&tree, "a", named("d", NodeType::Spacer), 0), tree);
        assert_eq!(add_node(&tree, "missing", named("d", NodeType::Spacer), 0), tree);
    }

    #[test]
    fn move_reorders_within_and_across_parents() {
        let tree = sample();
        let next = move_node(&tree, "c", "inner", 0);
        assert_eq!(ids(&next), vec!["root", "stack", "a", "inner", "c", "b"]);

        let next = move_node(&tree, "a", "stack", 1);
        assert_eq!(ids(&next), vec!["root", "stack", "inner", "b", "a", "c"]);
    }

    #[test]
    fn move_guards_leave_tree_unchanged() {
        let tree = sample();
        let mut scratch = tree.clone();
        assert_eq!(
            move_node_in_place(&mut scratch, "stack", "stack", 0),
            Err(MoveError::SelfParent)
        );
        assert_eq!(
            move_node_in_place(&mut scratch, "stack", "inner", 0),
            Err(MoveError::IntoOwnSubtree)
        );
        assert_eq!(move_node_in_place(&mut scratch, "b", "a", 0), Err(MoveError::TargetNotContainer));
        assert_eq!(move_node_in_place(&mut scratch, "b", "nowhere", 0), Err(MoveError::TargetNotContainer));
        assert_eq!(move_node_in_place(&mut scratch, "root", "stack", 0), Err(MoveError::NotFound));
        assert_eq!(move_node_in_place(&mut scratch, "ghost", "stack", 0), Err(MoveError::NotFound));
        assert_eq!(scratch, tree);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut tree = default_tree().with_children(vec![
            named("x", NodeType::Text),
            named("stack", NodeType::VStack).with_children(vec![named("x", NodeType::Text)]),
            named("root", NodeType::Spacer),
        ]);
        assert_eq!(dedupe_ids(&mut tree), 2);
        assert_eq!(tree.children()[0].id.as_str(), "x");
        assert_ne!(tree.children()[1].children()[0].id.as_str(), "x");
        assert_ne!(tree.children()[2].id.as_str(), "root");
        assert!(tree.id.is_root());
        assert!(matches!(tree.kind, NodeKind::View { .. }));
    }
}
