use crate::{Namespace, NodeId, NodeKind, ParseResult};

/// Capability surface of a physical document tree.
///
/// Node ids handed to these methods must have been issued by the same
/// implementation; passing a foreign id is a programmer error and may panic.
pub trait Dom {
    fn create_element(&mut self, tag: &str, namespace: Namespace) -> NodeId;

    fn create_text(&mut self, content: &str) -> NodeId;

    fn create_comment(&mut self, content: &str) -> NodeId;

    fn create_fragment(&mut self) -> NodeId;

    fn kind(&self, node: NodeId) -> NodeKind;

    /// Tag name as created (elements only)
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn namespace(&self, node: NodeId) -> Option<Namespace>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    fn last_child(&self, node: NodeId) -> Option<NodeId>;

    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Insert `child` into `parent` before `reference`, appending when
    /// `reference` is `None`. The child is detached from its current position
    /// first. Inserting a fragment moves the fragment's children instead.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>);

    /// Detach `node` from its physical parent (no-op when detached)
    fn remove(&mut self, node: NodeId);

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// All attributes in document order
    fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Character data of a text or comment node
    fn text(&self, node: NodeId) -> Option<&str>;

    fn set_text(&mut self, node: NodeId, content: &str);

    /// Current value of a form control
    fn value(&self, node: NodeId) -> Option<String>;

    fn set_value(&mut self, node: NodeId, value: &str);

    fn checked(&self, node: NodeId) -> bool;

    fn set_checked(&mut self, node: NodeId, checked: bool);

    fn selected(&self, node: NodeId) -> bool;

    fn set_selected(&mut self, node: NodeId, selected: bool);

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn has_children(&self, node: NodeId) -> bool {
        self.first_child(node).is_some()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        let mut next = self.first_child(node);
        while let Some(child) = next {
            children.push(child);
            next = self.next_sibling(child);
        }
        children
    }

    /// Concatenated text of all descendant text nodes
    fn text_content(&self, node: NodeId) -> String {
        match self.kind(node) {
            NodeKind::Text => self.text(node).unwrap_or_default().to_string(),
            NodeKind::Comment => String::new(),
            NodeKind::Element | NodeKind::Fragment => self
                .children(node)
                .into_iter()
                .map(|child| self.text_content(child))
                .collect(),
        }
    }

    /// Case-insensitive tag check for HTML elements
    fn is_element_named(&self, node: NodeId, tag: &str) -> bool {
        self.tag_name(node)
            .map(|name| name.eq_ignore_ascii_case(tag))
            .unwrap_or(false)
    }
}

/// Markup parser consumed by the patch engine.
///
/// Returns the top-level nodes of the parsed forest in order, detached from
/// any parent. `context` is the element the nodes will live under; parsers use
/// it to pick the namespace of the parsed elements.
pub trait FragmentParser {
    fn parse_fragment<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        markup: &str,
        context: NodeId,
    ) -> ParseResult<Vec<NodeId>>;
}
