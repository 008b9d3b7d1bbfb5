//! HTML serialization of a physical subtree
//!
//! Used by hosts for debugging and by the test suites for readable
//! assertions. Marker comments are kept by default so logical anchors show up
//! in the output.

use crate::{Dom, NodeId, NodeKind};

/// Options for HTML serialization
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Emit comment nodes (markers)
    pub include_comments: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
            include_comments: true,
        }
    }
}

impl SerializeOptions {
    /// Compact output with marker comments stripped
    pub fn visible() -> Self {
        Self {
            include_comments: false,
            ..Self::default()
        }
    }
}

struct Context {
    options: SerializeOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: SerializeOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        let indent = self.options.indent.clone();
        for _ in 0..self.depth {
            self.add(&indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Serialize `node` and its descendants
pub fn serialize<D: Dom + ?Sized>(dom: &D, node: NodeId, options: SerializeOptions) -> String {
    let mut ctx = Context::new(options);
    write_node(dom, node, &mut ctx);
    ctx.get_output()
}

/// Serialize only the children of `node`
pub fn serialize_children<D: Dom + ?Sized>(
    dom: &D,
    node: NodeId,
    options: SerializeOptions,
) -> String {
    let mut ctx = Context::new(options);
    for child in dom.children(node) {
        write_node(dom, child, &mut ctx);
    }
    ctx.get_output()
}

/// Compact serialization of `node` including its own tag
pub fn outer_html<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    serialize(dom, node, SerializeOptions::default())
}

/// Compact serialization of the children of `node`
pub fn inner_html<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    serialize_children(dom, node, SerializeOptions::default())
}

fn write_node<D: Dom + ?Sized>(dom: &D, node: NodeId, ctx: &mut Context) {
    match dom.kind(node) {
        NodeKind::Element => write_element(dom, node, ctx),
        NodeKind::Text => {
            let text = escape_text(dom.text(node).unwrap_or_default());
            ctx.add_line(&text);
        }
        NodeKind::Comment => {
            if ctx.options.include_comments {
                let comment = format!("<!--{}-->", dom.text(node).unwrap_or_default());
                ctx.add_line(&comment);
            }
        }
        NodeKind::Fragment => {
            for child in dom.children(node) {
                write_node(dom, child, ctx);
            }
        }
    }
}

fn write_element<D: Dom + ?Sized>(dom: &D, node: NodeId, ctx: &mut Context) {
    let tag = dom.tag_name(node).unwrap_or("unknown");
    let attrs = collect_attributes(dom, node);

    let open = format!("<{}{}>", tag, attrs);
    if is_void_element(tag) {
        ctx.add_line(&open);
        return;
    }

    let children = dom.children(node);
    if children.is_empty() {
        ctx.add_line(&format!("{}</{}>", open, tag));
        return;
    }

    ctx.add_line(&open);
    ctx.indent();
    for child in children {
        write_node(dom, child, ctx);
    }
    ctx.dedent();
    ctx.add_line(&format!("</{}>", tag));
}

fn collect_attributes<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    let mut attrs = String::new();
    for (name, value) in dom.attributes(node) {
        if value.is_empty() {
            attrs.push_str(&format!(" {}", name));
        } else {
            attrs.push_str(&format!(" {}=\"{}\"", name, escape_attribute(&value)));
        }
    }
    attrs
}

fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "source" | "track" | "wbr"
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
