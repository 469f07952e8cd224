//! Undo/Redo snapshot stack.
//!
//! Every committed edit is preceded by a snapshot of the whole editable
//! state (tree + data mapping). Undo swaps the current state for the newest
//! snapshot and parks the current one on the redo stack; redo does the
//! reverse. Both stacks are bounded to `max_depth`, dropping the oldest.

use uib_core::{DataMapping, Node};

pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// The editable state of one screen at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tree: Node,
    pub data_mapping: DataMapping,
    /// Screen the tree was taken from, if known.
    pub screen_id: Option<String>,
}

impl Snapshot {
    pub fn new(tree: Node, data_mapping: DataMapping) -> Self {
        Self {
            tree,
            data_mapping,
            screen_id: None,
        }
    }

    pub fn on_screen(mut self, screen_id: impl Into<String>) -> Self {
        self.screen_id = Some(screen_id.into());
        self
    }
}

/// Bounded undo/redo history of [`Snapshot`]s.
#[derive(Debug, Clone)]
pub struct CommandStack {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum entries kept on each stack.
    max_depth: usize,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Record `current` as the state to return to. Any redo history is
    /// discarded; a new edit forks the timeline.
    pub fn push_snapshot(&mut self, current: &Snapshot) {
        push_bounded(&mut self.undo_stack, current.clone(), self.max_depth);
        self.redo_stack.clear();
    }

    /// Step back. `current` goes onto the redo stack and the previous state
    /// is returned for the caller to install.
    pub fn undo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        push_bounded(&mut self.redo_stack, current.clone(), self.max_depth);
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        push_bounded(&mut self.undo_stack, current.clone(), self.max_depth);
        Some(next)
    }

    /// The state the next `undo` would return.
    pub fn peek_undo(&self) -> Option<&Snapshot> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&Snapshot> {
        self.redo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn push_bounded(stack: &mut Vec<Snapshot>, snapshot: Snapshot, max_depth: usize) {
    if max_depth == 0 {
        return;
    }
    stack.push(snapshot);
    if stack.len() > max_depth {
        let overflow = stack.len() - max_depth;
        stack.drain(..overflow);
        log::trace!("history full, dropped {overflow} oldest snapshot(s)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uib_core::{NodeType, create_node, default_tree};

    fn state(n: usize) -> Snapshot {
        let tree = default_tree()
            .with_children(vec![create_node(NodeType::Text).with("text", n.to_string())]);
        Snapshot::new(tree, DataMapping::default())
    }

    #[test]
    fn empty_stack_has_nothing_to_do() {
        let mut stack = CommandStack::default();
        assert_eq!(stack.max_depth(), DEFAULT_HISTORY_DEPTH);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo(&state(0)), None);
        assert_eq!(stack.redo(&state(0)), None);
    }

    #[test]
    fn undo_returns_pushed_state_and_enables_redo() {
        let mut stack = CommandStack::new(10);
        let s0 = state(0);
        let s1 = state(1);
        stack.push_snapshot(&s0);

        assert_eq!(stack.undo(&s1), Some(s0.clone()));
        assert!(stack.can_redo());
        assert_eq!(stack.redo(&s0), Some(s1));
        assert!(stack.can_undo());
    }

    #[test]
    fn new_push_clears_redo() {
        let mut stack = CommandStack::new(10);
        stack.push_snapshot(&state(0));
        stack.undo(&state(1));
        assert!(stack.can_redo());
        stack.push_snapshot(&state(2));
        assert!(!stack.can_redo());
    }

    #[test]
    fn redo_stack_is_bounded_too() {
        let mut stack = CommandStack::new(3);
        for n in 0..3 {
            stack.push_snapshot(&state(n));
        }
        for n in 0..3 {
            stack.undo(&state(10 + n));
        }
        assert_eq!(stack.redo_depth(), 3);
        assert_eq!(stack.undo_depth(), 0);
    }

    #[test]
    fn zero_depth_keeps_nothing() {
        let mut stack = CommandStack::new(0);
        stack.push_snapshot(&state(0));
        assert!(!stack.can_undo());
    }
}
