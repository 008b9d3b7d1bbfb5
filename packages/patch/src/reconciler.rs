//! # Element property reconciler
//!
//! Attribute writes that are really property writes. Form controls keep
//! state apart from their attributes, and some of that state depends on
//! nodes or attributes that may not exist yet when the write arrives:
//!
//! - a `select` value needs a matching `option`, which may be inserted later
//!   (as a child frame, as markup, or in a later batch);
//! - a range `input` clamps its value against `min`/`max`, which may follow
//!   `value` in the attribute frames.
//!
//! Such writes are applied immediately and also remembered as a deferred
//! value keyed by element. The value is applied again once the element's
//! insertion completes, or once a matching option shows up.

use crate::batch::HandlerId;
use crate::config::PatcherConfig;
use crate::error::{PatchError, PatchResult};
use crate::events::EventBindings;
use arbor_dom::{Dom, NodeId};
use std::collections::HashMap;
use tracing::trace;

/// A value write waiting for its structural precondition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredValue {
    /// Inputs, textareas and single-choice selects
    Scalar(Option<String>),
    /// Multi-choice selects
    Multiple(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    deferred: HashMap<NodeId, DeferredValue>,
    events: EventBindings,
    internal_attribute_prefix: String,
    stop_propagation_prefix: String,
    prevent_default_prefix: String,
}

impl Reconciler {
    pub fn new(config: &PatcherConfig) -> Self {
        Self {
            deferred: HashMap::new(),
            events: EventBindings::new(),
            internal_attribute_prefix: config.internal_attribute_prefix.clone(),
            stop_propagation_prefix: config.stop_propagation_prefix.clone(),
            prevent_default_prefix: config.prevent_default_prefix.clone(),
        }
    }

    pub fn events(&self) -> &EventBindings {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBindings {
        &mut self.events
    }

    pub fn pending_value(&self, element: NodeId) -> Option<&DeferredValue> {
        self.deferred.get(&element)
    }

    /// Apply one attribute frame to `element`
    pub fn apply_attribute<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        element: NodeId,
        name: &str,
        value: Option<&str>,
        handler_id: HandlerId,
    ) -> PatchResult<()> {
        if handler_id != 0 {
            let event_name = strip_on_prefix(name)?;
            self.events.set_listener(element, event_name, handler_id);
            return Ok(());
        }

        self.set_or_remove(dom, element, name, value)
    }

    /// Write `value` to `name`, or remove it when `value` is `None`
    pub fn set_or_remove<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        element: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> PatchResult<()> {
        if self.try_apply_special_property(dom, element, name, value)? {
            return Ok(());
        }

        if let Some(internal) = name.strip_prefix(self.internal_attribute_prefix.as_str()) {
            return self.apply_internal_attribute(element, internal, value.is_some());
        }

        match value {
            Some(value) => dom.set_attribute(element, name, value),
            None => dom.remove_attribute(element, name),
        }
        Ok(())
    }

    fn apply_internal_attribute(&mut self, element: NodeId, name: &str, enabled: bool) -> PatchResult<()> {
        if let Some(event) = name.strip_prefix(self.stop_propagation_prefix.as_str()) {
            let event_name = strip_on_prefix(event)?;
            self.events.set_stop_propagation(element, event_name, enabled);
        } else if let Some(event) = name.strip_prefix(self.prevent_default_prefix.as_str()) {
            let event_name = strip_on_prefix(event)?;
            self.events.set_prevent_default(element, event_name, enabled);
        } else {
            return Err(PatchError::InvalidReservedAttribute(name.to_string()));
        }
        Ok(())
    }

    fn try_apply_special_property<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        element: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> PatchResult<bool> {
        match name {
            "value" => self.try_apply_value(dom, element, value),
            "checked" => Ok(try_apply_checked(dom, element, value)),
            _ => Ok(false),
        }
    }

    fn try_apply_value<D: Dom + ?Sized>(
        &mut self,
        dom: &mut D,
        element: NodeId,
        value: Option<&str>,
    ) -> PatchResult<bool> {
        if dom.is_element_named(element, "option") {
            match value {
                Some(value) => dom.set_attribute(element, "value", value),
                None => dom.remove_attribute(element, "value"),
            }
            self.try_resolve_from_option(dom, element);
            return Ok(true);
        }

        if dom.is_element_named(element, "select") {
            let pending = if is_multiple_select(dom, element) {
                DeferredValue::Multiple(parse_selection(value)?)
            } else {
                DeferredValue::Scalar(value.map(str::to_string))
            };
            let resolved = write_deferrable(dom, element, &pending);
            if resolved {
                self.deferred.remove(&element);
            } else {
                self.deferred.insert(element, pending);
            }
            return Ok(true);
        }

        if dom.is_element_named(element, "input") || dom.is_element_named(element, "textarea") {
            let value = value.map(|value| normalize_input_value(&*dom, element, value));
            let pending = DeferredValue::Scalar(value);
            write_deferrable(dom, element, &pending);
            // Constraint attributes may still follow while the element is being built
            if dom.parent(element).is_none() {
                self.deferred.insert(element, pending);
            }
            return Ok(true);
        }

        Ok(false)
    }

    /// Re-apply what was deferred for `element` once its insertion completes
    pub fn apply_any_deferred_value<D: Dom + ?Sized>(&mut self, dom: &mut D, element: NodeId) {
        if dom.is_element_named(element, "option") {
            self.try_resolve_from_option(dom, element);
            return;
        }

        let Some(pending) = self.deferred.get(&element).cloned() else {
            return;
        };

        // Only a single select still waiting for its option outlives insertion
        let resolved = write_deferrable(dom, element, &pending);
        let awaits_option = !resolved && matches!(pending, DeferredValue::Scalar(_));
        if !awaits_option {
            self.deferred.remove(&element);
        }
        trace!(element = %element, resolved, "Applied deferred value");
    }

    /// An option appeared or changed: settle the pending value of its select
    pub fn try_resolve_from_option<D: Dom + ?Sized>(&mut self, dom: &mut D, option: NodeId) -> bool {
        let Some(select) = closest_select(dom, option) else {
            return false;
        };
        let Some(pending) = self.deferred.get(&select) else {
            return false;
        };

        let option_value = dom.value(option).unwrap_or_default();
        match pending {
            DeferredValue::Multiple(values) => {
                let selected = values.contains(&option_value);
                dom.set_selected(option, selected);
            }
            DeferredValue::Scalar(value) => {
                if value.as_deref() != Some(option_value.as_str()) {
                    return false;
                }
                dom.set_value(select, &option_value);
                self.deferred.remove(&select);
            }
        }
        true
    }

    /// Settle the pending value of the select enclosing `node`, if any.
    /// Used after a markup block lands options in one go.
    pub fn resolve_choice_container<D: Dom + ?Sized>(&mut self, dom: &mut D, node: NodeId) {
        let select = if dom.is_element_named(node, "select") {
            Some(node)
        } else {
            closest_select(dom, node)
        };

        if let Some(select) = select {
            if self.deferred.contains_key(&select) {
                self.apply_any_deferred_value(dom, select);
            }
        }
    }

    /// Drop pending values of nodes that left the tree
    pub fn forget(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            self.deferred.remove(node);
        }
    }
}

/// Write a pending value to the element. Returns whether the value is
/// settled: a single select without a matching option is not, and neither
/// is a multi-select, whose options may still be arriving.
fn write_deferrable<D: Dom + ?Sized>(dom: &mut D, element: NodeId, pending: &DeferredValue) -> bool {
    match pending {
        DeferredValue::Multiple(values) => {
            for option in options_of(dom, element) {
                let selected = dom.value(option).is_some_and(|value| values.contains(&value));
                dom.set_selected(option, selected);
            }
            false
        }
        DeferredValue::Scalar(value) => {
            let value = value.as_deref().unwrap_or_default();
            dom.set_value(element, value);
            if dom.is_element_named(element, "select") {
                dom.value(element).as_deref() == Some(value)
            } else {
                true
            }
        }
    }
}

fn try_apply_checked<D: Dom + ?Sized>(dom: &mut D, element: NodeId, value: Option<&str>) -> bool {
    if dom.is_element_named(element, "input") {
        dom.set_checked(element, value.is_some());
        return true;
    }
    false
}

/// Trim a trailing `:00` (or, without a `step` attribute, any seconds) from
/// time-like input values
pub fn normalize_input_value<D: Dom + ?Sized>(dom: &D, element: NodeId, value: &str) -> String {
    let keep = match dom.attribute(element, "type") {
        Some("time") => 5,
        Some("datetime-local") => 16,
        _ => return value.to_string(),
    };

    let expected_length = keep + 3;
    let trims = value.len() == expected_length && (value.ends_with("00") || !dom.has_attribute(element, "step"));

    match value.get(..keep) {
        Some(trimmed) if trims => trimmed.to_string(),
        _ => value.to_string(),
    }
}

fn strip_on_prefix(name: &str) -> PatchResult<&str> {
    name.strip_prefix("on")
        .ok_or_else(|| PatchError::InvalidEventName(name.to_string()))
}

fn is_multiple_select<D: Dom + ?Sized>(dom: &D, element: NodeId) -> bool {
    dom.has_attribute(element, "multiple")
}

fn parse_selection(value: Option<&str>) -> PatchResult<Vec<String>> {
    match value {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json)
            .map_err(|err| PatchError::InvalidSelection(format!("{} ({})", json, err))),
    }
}

fn closest_select<D: Dom + ?Sized>(dom: &D, node: NodeId) -> Option<NodeId> {
    let mut current = dom.parent(node);
    while let Some(candidate) = current {
        if dom.is_element_named(candidate, "select") {
            return Some(candidate);
        }
        current = dom.parent(candidate);
    }
    None
}

fn options_of<D: Dom + ?Sized>(dom: &D, select: NodeId) -> Vec<NodeId> {
    let mut options = Vec::new();
    let mut pending = dom.children(select);
    pending.reverse();
    while let Some(node) = pending.pop() {
        if dom.is_element_named(node, "option") {
            options.push(node);
        } else {
            let mut children = dom.children(node);
            children.reverse();
            pending.extend(children);
        }
    }
    options
}
