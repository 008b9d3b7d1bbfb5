//! Structural operations over the logical tree.
//!
//! Every operation keeps both trees in step: the logical children lists are
//! updated through the registry and the physical nodes are moved through the
//! [`Dom`]. A marker's physical range is the marker itself followed by the
//! physical nodes of all its logical descendants; operations that move a
//! marker move the whole range.

use crate::error::{PatchError, PatchResult};
use crate::logical::Registry;
use arbor_dom::{Dom, NodeId, NodeKind};
use tracing::debug;

/// One move of a permutation, as absolute indices into the parent's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationEntry {
    pub from: usize,
    pub to: usize,
}

impl PermutationEntry {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

impl Registry {
    /// Insert `child` as the logical child of `parent` at `index`, moving its
    /// physical range into place. Detaches it from any previous logical
    /// parent first.
    pub fn insert_child<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        child: NodeId,
        parent: NodeId,
        index: usize,
    ) -> PatchResult<()> {
        if !self.is_wrapped(parent) {
            return Err(PatchError::mismatch(format!("node {} is not in the logical tree", parent)));
        }
        // Bounds are checked before anything moves; a child already under
        // `parent` does not count towards the slots
        let mut count = self.child_count(parent);
        if self.parent(child) == Some(parent) {
            count -= 1;
        }
        if index > count {
            return Err(PatchError::mismatch(format!(
                "cannot insert at index {} of {} (has {})",
                index, parent, count
            )));
        }

        self.wrap(dom, child, true)?;

        // A marker with content moves as one range; snapshot it while the
        // old logical siblings still locate its end.
        let mut node_to_insert = child;
        if dom.kind(child) == NodeKind::Comment && self.child_count(child) > 0 {
            let last = self.find_last_physical_descendant(dom, child)?;
            let fragment = dom.create_fragment();
            move_range(dom, child, last, fragment, None)?;
            node_to_insert = fragment;
        }

        if let Some(old_parent) = self.parent(child) {
            self.children_mut(old_parent)?.retain(|sibling| *sibling != child);
            self.set_parent(child, None);
        }

        if let Some(next) = self.child(parent, index) {
            let physical_parent = physical_parent(dom, next)?;
            dom.insert_before(physical_parent, node_to_insert, Some(next));
        } else {
            self.append_physical(dom, node_to_insert, parent)?;
        }

        self.children_mut(parent)?.insert(index, child);
        self.set_parent(child, Some(parent));
        Ok(())
    }

    /// Create a marker comment and insert it as a logical child
    pub fn create_and_insert_marker<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        parent: NodeId,
        index: usize,
        marker_text: &str,
    ) -> PatchResult<NodeId> {
        let marker = dom.create_comment(marker_text);
        self.insert_child(dom, marker, parent, index)?;
        Ok(marker)
    }

    /// Remove the logical child at `index` and its whole logical subtree.
    /// Returns every node that left the logical tree.
    pub fn remove_child<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        parent: NodeId,
        index: usize,
    ) -> PatchResult<Vec<NodeId>> {
        let child = self.require_child(parent, index)?;
        self.children_mut(parent)?.remove(index);

        let mut released = Vec::new();
        if dom.kind(child) == NodeKind::Comment {
            // Marker content lives beside the marker, so it goes one by one
            while self.child_count(child) > 0 {
                released.extend(self.remove_child(dom, child, 0)?);
            }
        }

        dom.remove(child);
        released.extend(self.unwrap_subtree(child));
        Ok(released)
    }

    /// Remove every logical child of `parent`
    pub fn empty_children<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        parent: NodeId,
    ) -> PatchResult<Vec<NodeId>> {
        let mut released = Vec::new();
        while self.child_count(parent) > 0 {
            released.extend(self.remove_child(dom, parent, 0)?);
        }
        Ok(released)
    }

    /// Physically place `node` after the current content of logical `parent`
    pub fn append_physical<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        node: NodeId,
        parent: NodeId,
    ) -> PatchResult<()> {
        let mut parent = parent;
        loop {
            match dom.kind(parent) {
                NodeKind::Element | NodeKind::Fragment => {
                    dom.append_child(parent, node);
                    return Ok(());
                }
                NodeKind::Comment => {
                    // The marker's range ends right before its next sibling
                    if let Some(next) = self.next_sibling(parent) {
                        let physical_parent = physical_parent(dom, next)?;
                        dom.insert_before(physical_parent, node, Some(next));
                        return Ok(());
                    }
                    parent = self.parent(parent).ok_or_else(|| {
                        PatchError::mismatch(format!("marker {} has no logical parent", parent))
                    })?;
                }
                NodeKind::Text => {
                    return Err(PatchError::mismatch(format!(
                        "cannot append into text node {}",
                        parent
                    )))
                }
            }
        }
    }

    /// Last physical node belonging to `node`'s range
    pub fn find_last_physical_descendant<D: Dom + ?Sized>(
        &self,
        dom: &D,
        node: NodeId,
    ) -> PatchResult<NodeId> {
        if dom.kind(node) != NodeKind::Comment {
            return Ok(node);
        }

        if let Some(next) = self.next_sibling(node) {
            return dom.previous_sibling(next).ok_or_else(|| {
                PatchError::mismatch(format!("logical sibling {} has no physical predecessor", next))
            });
        }

        let parent = self
            .parent(node)
            .ok_or_else(|| PatchError::mismatch(format!("marker {} has no logical parent", node)))?;

        if dom.kind(parent).is_container() {
            dom.last_child(parent)
                .ok_or_else(|| PatchError::mismatch(format!("container {} is physically empty", parent)))
        } else {
            self.find_last_physical_descendant(dom, parent)
        }
    }

    /// Nearest physical container: the node itself or its physical parent
    pub fn closest_element<D: Dom + ?Sized>(&self, dom: &D, node: NodeId) -> PatchResult<NodeId> {
        match dom.kind(node) {
            NodeKind::Element | NodeKind::Fragment => Ok(node),
            NodeKind::Comment => physical_parent(dom, node),
            NodeKind::Text => Err(PatchError::mismatch(format!(
                "text node {} has no closest element",
                node
            ))),
        }
    }

    /// Reorder the logical children of `parent`.
    ///
    /// Entries must form a permutation of the affected indices; this is not
    /// checked. Destinations are reserved with temporary markers computed
    /// against the original layout, so moves do not disturb each other.
    pub fn permute<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        parent: NodeId,
        entries: &[PermutationEntry],
        marker_text: &str,
    ) -> PatchResult<()> {
        let siblings = self.children(parent).to_vec();

        let mut ranges = Vec::with_capacity(entries.len());
        for entry in entries {
            let start = *siblings.get(entry.from).ok_or_else(|| {
                PatchError::mismatch(format!("permutation source {} out of range", entry.from))
            })?;
            let end = self.find_last_physical_descendant(dom, start)?;
            ranges.push((start, end));
        }

        let mut markers = Vec::with_capacity(entries.len());
        for entry in entries {
            let marker = dom.create_comment(marker_text);
            match siblings.get(entry.to + 1) {
                Some(&next) => {
                    let physical_parent = physical_parent(dom, next)?;
                    dom.insert_before(physical_parent, marker, Some(next));
                }
                None => self.append_physical(dom, marker, parent)?,
            }
            markers.push(marker);
        }

        for (&(start, end), &marker) in ranges.iter().zip(&markers) {
            let physical_parent = physical_parent(dom, marker)?;
            move_range(dom, start, end, physical_parent, Some(marker))?;
            dom.remove(marker);
        }

        let children = self.children_mut(parent)?;
        for (entry, &(start, _)) in entries.iter().zip(&ranges) {
            let slot = children.get_mut(entry.to).ok_or_else(|| {
                PatchError::mismatch(format!("permutation destination {} out of range", entry.to))
            })?;
            *slot = start;
        }

        debug!(parent = %parent, moves = entries.len(), "Permuted logical children");
        Ok(())
    }
}

fn physical_parent<D: Dom + ?Sized>(dom: &D, node: NodeId) -> PatchResult<NodeId> {
    dom.parent(node)
        .ok_or_else(|| PatchError::mismatch(format!("node {} is not physically attached", node)))
}

/// Move the physical siblings `start..=end` before `reference` in `target`
fn move_range<D: Dom + ?Sized>(
    dom: &mut D,
    start: NodeId,
    end: NodeId,
    target: NodeId,
    reference: Option<NodeId>,
) -> PatchResult<()> {
    let mut current = Some(start);
    while let Some(node) = current {
        let next = dom.next_sibling(node);
        dom.insert_before(target, node, reference);
        if node == end {
            return Ok(());
        }
        current = next;
    }
    Err(PatchError::mismatch(format!(
        "range {}..{} is not a run of physical siblings",
        start, end
    )))
}
