//! # Edit-stream applier
//!
//! [`Renderer`] owns the physical tree, the logical registry and the side
//! tables (component locations, element references, deferred values, event
//! bindings) and applies render batches to them.
//!
//! Edits are interpreted against a cursor: a logical parent, a depth and the
//! child index base at that depth. `stepIn` descends into a logical child,
//! `stepOut` returns to the logical parent and restores the caller's base
//! once back at depth zero. Frame payloads are resolved from the batch's
//! reference frame buffer.
//!
//! Any error aborts the batch. Edits already applied stay applied.

use crate::batch::{ComponentId, Edit, Frame, HandlerId, RenderBatch};
use crate::config::PatcherConfig;
use crate::error::{PatchError, PatchResult};
use crate::events::{DispatchPlan, EventBindings};
use crate::logical::Registry;
use crate::logical_ops::PermutationEntry;
use crate::reconciler::{DeferredValue, Reconciler};
use arbor_dom::{Dom, FragmentParser, Namespace, NodeId, NodeKind};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, trace, warn};

/// What happens to content already inside a root element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootContent {
    /// Cleared when the component first renders (prerendered output)
    #[default]
    Replace,
    /// Kept; the component renders into a marker placed after it
    Append,
}

pub struct Renderer<D: Dom, P: FragmentParser> {
    dom: D,
    parser: P,
    config: PatcherConfig,
    tree: Registry,
    reconciler: Reconciler,
    component_locations: HashMap<ComponentId, NodeId>,
    root_components: HashSet<ComponentId>,
    pending_first_render: HashSet<ComponentId>,
    element_references: HashMap<String, NodeId>,
}

/// Cursor state of one `apply_edits` pass
struct Cursor {
    parent: NodeId,
    depth: usize,
    base: usize,
    root_base: usize,
    permutations: Vec<PermutationEntry>,
}

impl<D: Dom, P: FragmentParser> Renderer<D, P> {
    pub fn new(dom: D, parser: P) -> Self {
        Self::with_config(dom, parser, PatcherConfig::default())
    }

    pub fn with_config(dom: D, parser: P, config: PatcherConfig) -> Self {
        Self {
            reconciler: Reconciler::new(&config),
            dom,
            parser,
            config,
            tree: Registry::new(),
            component_locations: HashMap::new(),
            root_components: HashSet::new(),
            pending_first_render: HashSet::new(),
            element_references: HashMap::new(),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn into_dom(self) -> D {
        self.dom
    }

    pub fn tree(&self) -> &Registry {
        &self.tree
    }

    pub fn config(&self) -> &PatcherConfig {
        &self.config
    }

    pub fn event_bindings(&self) -> &EventBindings {
        self.reconciler.events()
    }

    pub fn pending_value(&self, element: NodeId) -> Option<&DeferredValue> {
        self.reconciler.pending_value(element)
    }

    /// Attach a root component to `element`, replacing its current content
    /// on first render
    pub fn attach_root(&mut self, component_id: ComponentId, element: NodeId) -> PatchResult<()> {
        self.attach_root_with(component_id, element, RootContent::Replace)
    }

    pub fn attach_root_with(
        &mut self,
        component_id: ComponentId,
        element: NodeId,
        content: RootContent,
    ) -> PatchResult<()> {
        self.tree.wrap(&self.dom, element, true)?;

        let location = match content {
            RootContent::Replace => {
                self.pending_first_render.insert(component_id);
                element
            }
            RootContent::Append => {
                let end = self.tree.child_count(element);
                self.tree
                    .create_and_insert_marker(&mut self.dom, element, end, &self.config.marker_text)?
            }
        };
        self.component_locations.insert(component_id, location);
        self.root_components.insert(component_id);

        debug!(component_id, element = %element, ?content, "Attached root component");
        Ok(())
    }

    pub fn component_location(&self, component_id: ComponentId) -> Option<NodeId> {
        self.component_locations.get(&component_id).copied()
    }

    pub fn element_for_reference(&self, capture_id: &str) -> Option<NodeId> {
        self.element_references.get(capture_id).copied()
    }

    pub fn handler_element(&self, handler_id: HandlerId) -> PatchResult<NodeId> {
        self.reconciler.events().element_for(handler_id)
    }

    pub fn handler_for(&self, element: NodeId, event_name: &str) -> Option<HandlerId> {
        self.reconciler.events().handler_for(element, event_name)
    }

    pub fn resolve_dispatch(&self, target: NodeId, event_name: &str) -> DispatchPlan {
        self.reconciler
            .events()
            .resolve_dispatch(&self.dom, target, event_name)
    }

    /// Apply a whole render batch: diffs in order, then disposals
    #[instrument(skip(self, batch), fields(
        diffs = batch.updated_components.len(),
        frames = batch.reference_frames.len(),
        disposed_components = batch.disposed_component_ids.len(),
        disposed_handlers = batch.disposed_event_handler_ids.len()
    ))]
    pub fn apply_batch(&mut self, batch: &RenderBatch) -> PatchResult<()> {
        for diff in &batch.updated_components {
            self.update_component(diff.component_id, &diff.edits, &batch.reference_frames)?;
        }

        for component_id in &batch.disposed_component_ids {
            self.detach_component(*component_id)?;
        }

        for handler_id in &batch.disposed_event_handler_ids {
            self.release_event_handler(*handler_id);
        }

        info!(logical_nodes = self.tree.len(), "Render batch applied");
        Ok(())
    }

    #[instrument(skip(self, edits, frames), fields(edits = edits.len()))]
    pub fn update_component(
        &mut self,
        component_id: ComponentId,
        edits: &[Edit],
        frames: &[Frame],
    ) -> PatchResult<()> {
        let element = self
            .component_location(component_id)
            .ok_or(PatchError::UnknownComponent(component_id))?;

        if self.pending_first_render.remove(&component_id) {
            let released = self.tree.empty_children(&mut self.dom, element)?;
            self.forget(&released);
            debug!(cleared = released.len(), "Cleared prerendered content");
        }

        self.apply_edits(element, 0, edits, frames)
    }

    /// Forget a disposed component. A root component's content is removed;
    /// a child component's content went with its parent's edits.
    pub fn detach_component(&mut self, component_id: ComponentId) -> PatchResult<()> {
        let location = self.component_locations.remove(&component_id);
        self.pending_first_render.remove(&component_id);

        if self.root_components.remove(&component_id) {
            if let Some(element) = location {
                let released = self.tree.empty_children(&mut self.dom, element)?;
                self.forget(&released);
            }
        }

        debug!(component_id, known = location.is_some(), "Detached component");
        Ok(())
    }

    /// Release a disposed handler id. Returns whether it was bound.
    pub fn release_event_handler(&mut self, handler_id: HandlerId) -> bool {
        match self.reconciler.events_mut().remove_listener(handler_id) {
            Some(binding) => {
                debug!(handler_id, event = %binding.event_name, "Released event handler");
                true
            }
            None => {
                warn!(handler_id, "Released event handler was not bound");
                false
            }
        }
    }

    /// Apply `edits` under logical `parent`, starting at `child_index`
    #[instrument(skip(self, parent, edits, frames), fields(parent = %parent, edits = edits.len()))]
    pub fn apply_edits(
        &mut self,
        parent: NodeId,
        child_index: usize,
        edits: &[Edit],
        frames: &[Frame],
    ) -> PatchResult<()> {
        let mut cursor = Cursor {
            parent,
            depth: 0,
            base: child_index,
            root_base: child_index,
            permutations: Vec::new(),
        };

        for edit in edits {
            trace!(edit = edit.kind(), depth = cursor.depth, "Applying edit");
            self.apply_edit(&mut cursor, edit, frames)?;
        }
        Ok(())
    }

    fn apply_edit(&mut self, cursor: &mut Cursor, edit: &Edit, frames: &[Frame]) -> PatchResult<()> {
        match edit {
            Edit::PrependFrame {
                sibling_index,
                reference_frame_index,
            } => {
                let frame = frame_at(frames, *reference_frame_index)?;
                self.insert_frame(
                    cursor.parent,
                    cursor.base + sibling_index,
                    frames,
                    frame,
                    *reference_frame_index,
                )?;
            }
            Edit::RemoveFrame { sibling_index } => {
                let released = self
                    .tree
                    .remove_child(&mut self.dom, cursor.parent, cursor.base + sibling_index)?;
                self.forget(&released);
            }
            Edit::SetAttribute {
                sibling_index,
                reference_frame_index,
            } => {
                let element = self.element_child(cursor, *sibling_index, "set attribute on")?;
                let frame = frame_at(frames, *reference_frame_index)?;
                self.apply_attribute_frame(element, frame)?;
            }
            Edit::RemoveAttribute {
                sibling_index,
                removed_attribute_name,
            } => {
                let element = self.element_child(cursor, *sibling_index, "remove attribute from")?;
                self.reconciler
                    .set_or_remove(&mut self.dom, element, removed_attribute_name, None)?;
            }
            Edit::UpdateText {
                sibling_index,
                reference_frame_index,
            } => {
                let node = self.tree.require_child(cursor.parent, cursor.base + sibling_index)?;
                if self.dom.kind(node) != NodeKind::Text {
                    return Err(PatchError::mismatch(format!(
                        "cannot set text content on non-text child {}",
                        node
                    )));
                }
                let Frame::Text { text_content } = frame_at(frames, *reference_frame_index)? else {
                    return Err(PatchError::mismatch("updateText must reference a text frame"));
                };
                self.dom.set_text(node, text_content);
            }
            Edit::UpdateMarkup {
                sibling_index,
                reference_frame_index,
            } => {
                let index = cursor.base + sibling_index;
                let Frame::Markup { markup_content } = frame_at(frames, *reference_frame_index)? else {
                    return Err(PatchError::mismatch("updateMarkup must reference a markup frame"));
                };
                let released = self.tree.remove_child(&mut self.dom, cursor.parent, index)?;
                self.forget(&released);
                self.insert_markup(cursor.parent, index, markup_content)?;
            }
            Edit::StepIn { sibling_index } => {
                cursor.parent = self.tree.require_child(cursor.parent, cursor.base + sibling_index)?;
                cursor.depth += 1;
                cursor.base = 0;
            }
            Edit::StepOut => {
                if cursor.depth == 0 {
                    return Err(PatchError::mismatch("stepOut without a matching stepIn"));
                }
                cursor.parent = self.tree.parent(cursor.parent).ok_or_else(|| {
                    PatchError::mismatch(format!("node {} has no logical parent", cursor.parent))
                })?;
                cursor.depth -= 1;
                cursor.base = if cursor.depth == 0 { cursor.root_base } else { 0 };
            }
            Edit::PermutationListEntry {
                sibling_index,
                move_to_sibling_index,
            } => {
                cursor.permutations.push(PermutationEntry::new(
                    cursor.base + sibling_index,
                    cursor.base + move_to_sibling_index,
                ));
            }
            Edit::PermutationListEnd => {
                let entries = std::mem::take(&mut cursor.permutations);
                self.tree.permute(
                    &mut self.dom,
                    cursor.parent,
                    &entries,
                    &self.config.permutation_marker_text,
                )?;
            }
            Edit::Unknown => return Err(PatchError::mismatch("unknown edit type")),
        }
        Ok(())
    }

    /// Drop side-table entries of nodes that left the logical tree
    fn forget(&mut self, released: &[NodeId]) {
        if released.is_empty() {
            return;
        }
        self.reconciler.forget(released);

        let gone: HashSet<NodeId> = released.iter().copied().collect();
        let before = self.element_references.len();
        self.element_references.retain(|_, element| !gone.contains(element));

        let dropped = before - self.element_references.len();
        if dropped > 0 {
            debug!(dropped, "Dropped element references of removed nodes");
        }
    }

    fn element_child(&self, cursor: &Cursor, sibling_index: usize, action: &str) -> PatchResult<NodeId> {
        let node = self.tree.require_child(cursor.parent, cursor.base + sibling_index)?;
        if self.dom.kind(node) != NodeKind::Element {
            return Err(PatchError::mismatch(format!(
                "cannot {} non-element child {}",
                action, node
            )));
        }
        Ok(node)
    }

    fn apply_attribute_frame(&mut self, element: NodeId, frame: &Frame) -> PatchResult<()> {
        let Frame::Attribute {
            attribute_name,
            attribute_value,
            attribute_event_handler_id,
        } = frame
        else {
            return Err(PatchError::mismatch(format!(
                "expected an attribute frame, found {}",
                frame.kind()
            )));
        };

        self.reconciler.apply_attribute(
            &mut self.dom,
            element,
            attribute_name,
            attribute_value.as_deref(),
            *attribute_event_handler_id,
        )
    }

    /// Insert one frame at `index` under logical `parent`. Returns the number
    /// of logical children it added.
    fn insert_frame(
        &mut self,
        parent: NodeId,
        index: usize,
        frames: &[Frame],
        frame: &Frame,
        frame_index: usize,
    ) -> PatchResult<usize> {
        match frame {
            Frame::Element { element_name, .. } => {
                self.insert_element(parent, index, frames, element_name, frame_index, frame.subtree_length())?;
                Ok(1)
            }
            Frame::Text { text_content } => {
                let text = self.dom.create_text(text_content);
                self.tree.insert_child(&mut self.dom, text, parent, index)?;
                Ok(1)
            }
            Frame::Attribute { .. } => Err(PatchError::mismatch(
                "attribute frames may only lead the children of an element frame",
            )),
            Frame::Component { component_id, .. } => {
                let marker = self.tree.create_and_insert_marker(
                    &mut self.dom,
                    parent,
                    index,
                    &self.config.marker_text,
                )?;
                self.component_locations.insert(*component_id, marker);
                Ok(1)
            }
            Frame::Region { .. } => {
                self.insert_frame_range(parent, index, frames, frame_index + 1, frame_index + frame.subtree_length())
            }
            Frame::ElementReferenceCapture {
                element_reference_capture_id,
            } => {
                if self.dom.kind(parent) != NodeKind::Element {
                    return Err(PatchError::mismatch(
                        "reference capture frames can only be children of element frames",
                    ));
                }
                self.element_references
                    .insert(element_reference_capture_id.clone(), parent);
                Ok(0)
            }
            Frame::Markup { markup_content } => {
                self.insert_markup(parent, index, markup_content)?;
                Ok(1)
            }
            Frame::NamedEvent { .. } => Ok(0),
            Frame::Unknown => Err(PatchError::mismatch("unknown frame type")),
        }
    }

    fn insert_frame_range(
        &mut self,
        parent: NodeId,
        index: usize,
        frames: &[Frame],
        start: usize,
        end: usize,
    ) -> PatchResult<usize> {
        let mut child_index = index;
        let mut frame_index = start;
        while frame_index < end {
            let frame = frame_at(frames, frame_index)?;
            child_index += self.insert_frame(parent, child_index, frames, frame, frame_index)?;
            frame_index += frame.subtree_length();
        }
        Ok(child_index - index)
    }

    fn insert_element(
        &mut self,
        parent: NodeId,
        index: usize,
        frames: &[Frame],
        tag: &str,
        frame_index: usize,
        subtree_length: usize,
    ) -> PatchResult<()> {
        let namespace = if tag == "svg" || self.is_svg_context(parent)? {
            Namespace::Svg
        } else {
            Namespace::Html
        };
        let element = self.dom.create_element(tag, namespace);
        self.tree.wrap(&self.dom, element, false)?;

        // Leading attributes are applied while the element is detached
        let end = frame_index + subtree_length;
        let mut inserted = false;
        for descendant_index in frame_index + 1..end {
            let descendant = frame_at(frames, descendant_index)?;
            if let Frame::Attribute { .. } = descendant {
                self.apply_attribute_frame(element, descendant)?;
            } else {
                self.tree.insert_child(&mut self.dom, element, parent, index)?;
                inserted = true;
                self.insert_frame_range(element, 0, frames, descendant_index, end)?;
                break;
            }
        }

        if !inserted {
            self.tree.insert_child(&mut self.dom, element, parent, index)?;
        }

        self.reconciler.apply_any_deferred_value(&mut self.dom, element);
        Ok(())
    }

    fn insert_markup(&mut self, parent: NodeId, index: usize, markup: &str) -> PatchResult<()> {
        let marker = self.tree.create_and_insert_marker(
            &mut self.dom,
            parent,
            index,
            &self.config.marker_text,
        )?;

        let markup = if markup.is_empty() {
            self.config.empty_markup_placeholder.as_str()
        } else {
            markup
        };
        let context = self.tree.closest_element(&self.dom, parent)?;
        let nodes = self.parser.parse_fragment(&mut self.dom, markup, context)?;

        for (position, node) in nodes.iter().enumerate() {
            self.tree.insert_child(&mut self.dom, *node, marker, position)?;
        }
        self.reconciler.resolve_choice_container(&mut self.dom, marker);

        debug!(marker = %marker, nodes = nodes.len(), "Inserted markup block");
        Ok(())
    }

    /// Whether children of logical `parent` belong in the SVG namespace
    fn is_svg_context(&self, parent: NodeId) -> PatchResult<bool> {
        let closest = self.tree.closest_element(&self.dom, parent)?;
        Ok(self.dom.namespace(closest) == Some(Namespace::Svg)
            && self.dom.tag_name(closest) != Some("foreignObject"))
    }
}

fn frame_at(frames: &[Frame], index: usize) -> PatchResult<&Frame> {
    frames.get(index).ok_or_else(|| {
        PatchError::mismatch(format!(
            "reference frame {} out of range (have {})",
            index,
            frames.len()
        ))
    })
}
