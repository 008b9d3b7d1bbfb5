//! # Logical tree registry
//!
//! The logical tree is the engine's own parent/children structure over
//! physical node ids. It diverges from the physical tree wherever a marker
//! comment stands in for a grouping that has no physical container: the
//! marker's logical children are physical siblings that follow it.
//!
//! Entries are created lazily by [`Registry::wrap`] and dropped when a node
//! leaves the logical tree. Parents are stored as ids, never as ownership.

use crate::error::{PatchError, PatchResult};
use arbor_dom::{Dom, NodeId};
use std::collections::HashMap;

/// Logical view of one physical node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl LogicalNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Physical node id -> logical node
#[derive(Debug, Clone, Default)]
pub struct Registry {
    nodes: HashMap<NodeId, LogicalNode>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of wrapped nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<&LogicalNode> {
        self.nodes.get(&node)
    }

    pub fn is_wrapped(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Register `node` in the logical tree.
    ///
    /// Idempotent. A node with physical children is only accepted when
    /// `allow_existing_contents` is set, in which case its physical
    /// descendants become its logical descendants in the same order.
    pub fn wrap<D: Dom + ?Sized>(
        &mut self,
        dom: &D,
        node: NodeId,
        allow_existing_contents: bool,
    ) -> PatchResult<&LogicalNode> {
        if !self.nodes.contains_key(&node) {
            let physical_children = dom.children(node);
            if !physical_children.is_empty() && !allow_existing_contents {
                return Err(PatchError::NonEmptyNode(node));
            }

            self.nodes.insert(node, LogicalNode::default());
            for child in physical_children {
                self.wrap(dom, child, true)?;
                self.set_parent(child, Some(node));
                self.children_mut(node)?.push(child);
            }
        }

        self.nodes
            .get(&node)
            .ok_or_else(|| PatchError::mismatch(format!("node {} vanished while wrapping", node)))
    }

    /// Drop the entry of a permanently removed node
    pub fn unwrap(&mut self, node: NodeId) -> Option<LogicalNode> {
        self.nodes.remove(&node)
    }

    /// Drop `node` and every logical descendant, returning the released ids
    pub fn unwrap_subtree(&mut self, node: NodeId) -> Vec<NodeId> {
        let mut released = Vec::new();
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if let Some(entry) = self.nodes.remove(&current) {
                pending.extend(entry.children);
                released.push(current);
            }
        }
        released
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|entry| entry.parent)
    }

    /// Logical children; empty for unwrapped nodes
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|entry| entry.children.as_slice())
            .unwrap_or_default()
    }

    pub fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children(node).get(index).copied()
    }

    pub fn child_count(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(node)?);
        let position = siblings.iter().position(|sibling| *sibling == node)?;
        siblings.get(position + 1).copied()
    }

    /// Existing child at `index`, or a mismatch naming what was expected
    pub(crate) fn require_child(&self, node: NodeId, index: usize) -> PatchResult<NodeId> {
        self.child(node, index).ok_or_else(|| {
            PatchError::mismatch(format!(
                "no logical child at index {} of {} (has {})",
                index,
                node,
                self.child_count(node)
            ))
        })
    }

    pub(crate) fn children_mut(&mut self, node: NodeId) -> PatchResult<&mut Vec<NodeId>> {
        self.nodes
            .get_mut(&node)
            .map(|entry| &mut entry.children)
            .ok_or_else(|| PatchError::mismatch(format!("node {} is not in the logical tree", node)))
    }

    pub(crate) fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.parent = parent;
        }
    }
}
