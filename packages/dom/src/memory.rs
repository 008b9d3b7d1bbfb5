//! # In-memory document
//!
//! Arena-backed [`Dom`] implementation. Node ids index into the arena and are
//! never reused, so a removed node keeps its data and can be re-inserted.
//!
//! Form-control state (value, checked, selected) is kept apart from
//! attributes, as a browser does. Range inputs clamp written values to their
//! current `min`/`max` attributes (defaults 0 and 100), which makes write
//! ordering observable.

use crate::{Dom, Namespace, NodeId, NodeKind};

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    tag: Option<String>,
    namespace: Option<Namespace>,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: Option<String>,
    checked: bool,
    selected: bool,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            tag: None,
            namespace: None,
            attributes: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            value: None,
            checked: false,
            selected: false,
        }
    }
}

/// Arena-backed document
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.index()]
    }

    fn data_mut(&mut self, node: NodeId) -> &mut NodeData {
        &mut self.nodes[node.index()]
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    fn sibling_offset(&self, node: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.data(node).parent?;
        let siblings = &self.data(parent).children;
        let position = siblings.iter().position(|sibling| *sibling == node)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.data_mut(node).parent.take() {
            self.data_mut(parent).children.retain(|child| *child != node);
        }
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.attribute(option, "value") {
            Some(value) => value.to_string(),
            None => self.text_content(option).trim().to_string(),
        }
    }

    fn collect_options(&self, node: NodeId, options: &mut Vec<NodeId>) {
        for child in &self.data(node).children {
            if self.is_element_named(*child, "option") {
                options.push(*child);
            } else {
                self.collect_options(*child, options);
            }
        }
    }

    fn input_type(&self, node: NodeId) -> Option<&str> {
        self.attribute(node, "type")
    }

    fn numeric_attribute(&self, node: NodeId, name: &str, default: f64) -> f64 {
        self.attribute(node, name)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .unwrap_or(default)
    }

    fn sanitize_range_value(&self, node: NodeId, value: &str) -> String {
        let min = self.numeric_attribute(node, "min", 0.0);
        let max = self.numeric_attribute(node, "max", 100.0).max(min);
        let number = match value.trim().parse::<f64>() {
            Ok(number) => number.clamp(min, max),
            Err(_) => min + (max - min) / 2.0,
        };
        format_number(number)
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

impl Dom for MemoryDom {
    fn create_element(&mut self, tag: &str, namespace: Namespace) -> NodeId {
        let mut data = NodeData::new(NodeKind::Element);
        data.tag = Some(tag.to_string());
        data.namespace = Some(namespace);
        self.push(data)
    }

    fn create_text(&mut self, content: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Text);
        data.text = content.to_string();
        self.push(data)
    }

    fn create_comment(&mut self, content: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Comment);
        data.text = content.to_string();
        self.push(data)
    }

    fn create_fragment(&mut self) -> NodeId {
        self.push(NodeData::new(NodeKind::Fragment))
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        self.data(node).kind
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.data(node).tag.as_deref()
    }

    fn namespace(&self, node: NodeId) -> Option<Namespace> {
        self.data(node).namespace
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).children.first().copied()
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).children.last().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling_offset(node, 1)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling_offset(node, -1)
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if self.kind(child) == NodeKind::Fragment {
            let moved = std::mem::take(&mut self.data_mut(child).children);
            for node in moved {
                self.data_mut(node).parent = None;
                self.insert_before(parent, node, reference);
            }
            return;
        }

        self.detach(child);

        let siblings = &self.data(parent).children;
        let position = reference
            .and_then(|reference| siblings.iter().position(|sibling| *sibling == reference))
            .unwrap_or(siblings.len());

        self.data_mut(parent).children.insert(position, child);
        self.data_mut(child).parent = Some(parent);
    }

    fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.data(node)
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.data(node).attributes.clone()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let attributes = &mut self.data_mut(node).attributes;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.data_mut(node).attributes.retain(|(key, _)| key != name);
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        let data = self.data(node);
        match data.kind {
            NodeKind::Text | NodeKind::Comment => Some(data.text.as_str()),
            NodeKind::Element | NodeKind::Fragment => None,
        }
    }

    fn set_text(&mut self, node: NodeId, content: &str) {
        match self.kind(node) {
            NodeKind::Text | NodeKind::Comment => self.data_mut(node).text = content.to_string(),
            NodeKind::Element | NodeKind::Fragment => {
                for child in std::mem::take(&mut self.data_mut(node).children) {
                    self.data_mut(child).parent = None;
                }
                let text = self.create_text(content);
                self.append_child(node, text);
            }
        }
    }

    fn value(&self, node: NodeId) -> Option<String> {
        if self.is_element_named(node, "select") {
            let mut options = Vec::new();
            self.collect_options(node, &mut options);
            return options
                .into_iter()
                .find(|option| self.data(*option).selected)
                .map(|option| self.option_value(option));
        }
        if self.is_element_named(node, "option") {
            return Some(self.option_value(node));
        }
        if self.is_element_named(node, "textarea") {
            return Some(
                self.data(node)
                    .value
                    .clone()
                    .unwrap_or_else(|| self.text_content(node)),
            );
        }
        if self.is_element_named(node, "input") {
            return Some(
                self.data(node)
                    .value
                    .clone()
                    .or_else(|| self.attribute(node, "value").map(str::to_string))
                    .unwrap_or_default(),
            );
        }
        self.data(node).value.clone()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if self.is_element_named(node, "select") {
            let mut options = Vec::new();
            self.collect_options(node, &mut options);
            let mut matched = false;
            for option in options {
                let selected = !matched && self.option_value(option) == value;
                matched |= selected;
                self.data_mut(option).selected = selected;
            }
            return;
        }

        let value = if self.is_element_named(node, "input") && self.input_type(node) == Some("range") {
            self.sanitize_range_value(node, value)
        } else {
            value.to_string()
        };
        self.data_mut(node).value = Some(value);
    }

    fn checked(&self, node: NodeId) -> bool {
        self.data(node).checked
    }

    fn set_checked(&mut self, node: NodeId, checked: bool) {
        self.data_mut(node).checked = checked;
    }

    fn selected(&self, node: NodeId) -> bool {
        self.data(node).selected
    }

    fn set_selected(&mut self, node: NodeId, selected: bool) {
        self.data_mut(node).selected = selected;
    }
}
