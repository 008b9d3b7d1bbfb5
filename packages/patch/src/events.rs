//! Event handler bindings and dispatch resolution
//!
//! Handler attributes never reach the physical tree. They land here as
//! `(element, event) -> handler id` bindings with a reverse index so a handler
//! can be released by id alone. Delivery is the host's job; this module only
//! answers which handlers a physical event reaches.

use crate::batch::HandlerId;
use crate::error::{PatchError, PatchResult};
use arbor_dom::{Dom, NodeId, NodeKind};
use std::collections::{HashMap, HashSet};

/// Events a disabled form control swallows
const DISABLEABLE_EVENTS: &[&str] = &["click", "dblclick", "mousedown", "mousemove", "mouseup"];

/// Events delivered to their target only
const NON_BUBBLING_EVENTS: &[&str] = &[
    "abort",
    "blur",
    "canplay",
    "canplaythrough",
    "change",
    "cuechange",
    "durationchange",
    "emptied",
    "ended",
    "error",
    "focus",
    "load",
    "loadeddata",
    "loadedmetadata",
    "loadend",
    "loadstart",
    "mouseenter",
    "mouseleave",
    "pointerenter",
    "pointerleave",
    "pause",
    "play",
    "playing",
    "progress",
    "ratechange",
    "reset",
    "scroll",
    "seeked",
    "seeking",
    "stalled",
    "submit",
    "suspend",
    "timeupdate",
    "toggle",
    "unload",
    "volumechange",
    "waiting",
];

/// A registered handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    pub element: NodeId,
    pub event_name: String,
    pub handler_id: HandlerId,
}

#[derive(Debug, Clone, Default)]
struct ElementEvents {
    handlers: HashMap<String, HandlerId>,
    stop_propagation: HashSet<String>,
    prevent_default: HashSet<String>,
}

impl ElementEvents {
    fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.stop_propagation.is_empty() && self.prevent_default.is_empty()
    }
}

/// Handlers reached by one physical event, innermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchPlan {
    pub handlers: Vec<HandlerId>,
    pub prevent_default: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EventBindings {
    by_handler: HashMap<HandlerId, EventBinding>,
    by_element: HashMap<NodeId, ElementEvents>,
}

impl EventBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_handler.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handler.is_empty()
    }

    /// Bind `handler_id` to `event_name` on `element`. An existing binding
    /// for the same element and event is re-pointed at the new id.
    pub fn set_listener(&mut self, element: NodeId, event_name: &str, handler_id: HandlerId) {
        let events = self.by_element.entry(element).or_default();
        if let Some(previous) = events.handlers.insert(event_name.to_string(), handler_id) {
            if previous != handler_id {
                self.by_handler.remove(&previous);
            }
        }

        self.by_handler.insert(
            handler_id,
            EventBinding {
                element,
                event_name: event_name.to_string(),
                handler_id,
            },
        );
    }

    /// Release a handler. Returns the binding if one existed.
    pub fn remove_listener(&mut self, handler_id: HandlerId) -> Option<EventBinding> {
        let binding = self.by_handler.remove(&handler_id)?;

        if let Some(events) = self.by_element.get_mut(&binding.element) {
            if events.handlers.get(&binding.event_name) == Some(&handler_id) {
                events.handlers.remove(&binding.event_name);
            }
            if events.is_empty() {
                self.by_element.remove(&binding.element);
            }
        }

        Some(binding)
    }

    pub fn set_stop_propagation(&mut self, element: NodeId, event_name: &str, enabled: bool) {
        self.set_flag(element, event_name, enabled, |events| &mut events.stop_propagation);
    }

    pub fn set_prevent_default(&mut self, element: NodeId, event_name: &str, enabled: bool) {
        self.set_flag(element, event_name, enabled, |events| &mut events.prevent_default);
    }

    fn set_flag(
        &mut self,
        element: NodeId,
        event_name: &str,
        enabled: bool,
        flags: impl FnOnce(&mut ElementEvents) -> &mut HashSet<String>,
    ) {
        let events = self.by_element.entry(element).or_default();
        if enabled {
            flags(events).insert(event_name.to_string());
        } else {
            flags(events).remove(event_name);
            if events.is_empty() {
                self.by_element.remove(&element);
            }
        }
    }

    pub fn handler_for(&self, element: NodeId, event_name: &str) -> Option<HandlerId> {
        self.by_element
            .get(&element)
            .and_then(|events| events.handlers.get(event_name))
            .copied()
    }

    pub fn binding(&self, handler_id: HandlerId) -> Option<&EventBinding> {
        self.by_handler.get(&handler_id)
    }

    pub fn element_for(&self, handler_id: HandlerId) -> PatchResult<NodeId> {
        self.by_handler
            .get(&handler_id)
            .map(|binding| binding.element)
            .ok_or(PatchError::MissingHandlerBinding(handler_id))
    }

    pub fn stops_propagation(&self, element: NodeId, event_name: &str) -> bool {
        self.by_element
            .get(&element)
            .is_some_and(|events| events.stop_propagation.contains(event_name))
    }

    pub fn prevents_default(&self, element: NodeId, event_name: &str) -> bool {
        self.by_element
            .get(&element)
            .is_some_and(|events| events.prevent_default.contains(event_name))
    }

    /// Walk from `target` up the physical element chain collecting the
    /// handlers an `event_name` event reaches
    pub fn resolve_dispatch<D: Dom + ?Sized>(
        &self,
        dom: &D,
        target: NodeId,
        event_name: &str,
    ) -> DispatchPlan {
        let mut plan = DispatchPlan::default();
        let bubbles = !NON_BUBBLING_EVENTS.contains(&event_name);

        let mut candidate = Some(target);
        while let Some(element) = candidate {
            if self.by_element.contains_key(&element) {
                if let Some(handler_id) = self.handler_for(element, event_name) {
                    if !is_disabled_for(dom, element, event_name) {
                        plan.handlers.push(handler_id);
                    }
                }
                plan.prevent_default |= self.prevents_default(element, event_name);
                if self.stops_propagation(element, event_name) {
                    break;
                }
            }

            if !bubbles {
                break;
            }
            candidate = dom
                .parent(element)
                .filter(|parent| dom.kind(*parent) == NodeKind::Element);
        }

        plan
    }
}

fn is_disabled_for<D: Dom + ?Sized>(dom: &D, element: NodeId, event_name: &str) -> bool {
    let is_form_control = ["button", "input", "select", "textarea"]
        .iter()
        .any(|tag| dom.is_element_named(element, tag));

    is_form_control && DISABLEABLE_EVENTS.contains(&event_name) && dom.has_attribute(element, "disabled")
}
