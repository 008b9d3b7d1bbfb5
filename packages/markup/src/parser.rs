//! Fragment parser
//!
//! Builds detached physical nodes from an HTML fragment. The content lexer
//! drives the loop; start tags morph it into tag mode to read attributes.
//! Parsing is forgiving the way browsers are: stray close tags are dropped,
//! unclosed elements end with the input and a lone `<` stays text. Only input
//! that cannot be tokenized (an unterminated comment, a tag cut off by the end
//! of input) is an error.

use crate::lexer::{unquoted_value, TagToken, Token};
use arbor_dom::{Dom, FragmentParser, Namespace, NodeId, NodeKind, ParseError, ParseResult};
use logos::{Lexer, Logos};

/// HTML fragment parser backed by the logos lexer
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse `markup` with an explicit namespace for the top-level elements
    pub fn parse_in<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        markup: &str,
        namespace: Namespace,
    ) -> ParseResult<Vec<NodeId>> {
        TreeBuilder::new(dom, markup, namespace).build()
    }
}

impl FragmentParser for HtmlParser {
    fn parse_fragment<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        markup: &str,
        context: NodeId,
    ) -> ParseResult<Vec<NodeId>> {
        let namespace = context_namespace(dom, context);
        self.parse_in(dom, markup, namespace)
    }
}

/// Namespace that children of `context` are created in
fn context_namespace<D: Dom + ?Sized>(dom: &D, context: NodeId) -> Namespace {
    let mut current = Some(context);
    while let Some(node) = current {
        if dom.kind(node) == NodeKind::Element {
            return child_namespace(dom.namespace(node), dom.tag_name(node).unwrap_or_default());
        }
        current = dom.parent(node);
    }
    Namespace::Html
}

fn child_namespace(parent: Option<Namespace>, parent_tag: &str) -> Namespace {
    match parent {
        Some(Namespace::Svg) if !parent_tag.eq_ignore_ascii_case("foreignObject") => Namespace::Svg,
        _ => Namespace::Html,
    }
}

struct OpenElement {
    node: NodeId,
    name: String,
    namespace: Namespace,
}

struct TreeBuilder<'a, D: Dom + ?Sized> {
    dom: &'a mut D,
    source: &'a str,
    base_namespace: Namespace,
    roots: Vec<NodeId>,
    open: Vec<OpenElement>,
    text: String,
}

impl<'a, D: Dom + ?Sized> TreeBuilder<'a, D> {
    fn new(dom: &'a mut D, source: &'a str, base_namespace: Namespace) -> Self {
        Self {
            dom,
            source,
            base_namespace,
            roots: Vec::new(),
            open: Vec::new(),
            text: String::new(),
        }
    }

    fn build(mut self) -> ParseResult<Vec<NodeId>> {
        let mut lexer = Token::lexer(self.source);

        while let Some(result) = lexer.next() {
            let span = lexer.span();
            let token = result.map_err(|_| ParseError::lex_error(span.clone(), "Unterminated comment"))?;

            match token {
                Token::Text(text) => self.text.push_str(&decode_entities(text)),
                Token::Lt => self.text.push('<'),
                Token::Comment(body) => {
                    self.flush_text();
                    let comment = self.dom.create_comment(body);
                    self.attach(comment);
                }
                Token::TagClose(name) => {
                    self.flush_text();
                    self.close_element(name);
                }
                Token::TagOpen(name) => {
                    self.flush_text();
                    let mut tag_lexer = lexer.morph::<TagToken>();
                    let (attributes, self_closing) = read_attributes(&mut tag_lexer)?;
                    lexer = tag_lexer.morph();

                    let raw_text = self.open_element(name, attributes, self_closing);
                    if let Some(tag) = raw_text {
                        self.read_raw_text(&mut lexer, &tag);
                    }
                }
            }
        }

        self.flush_text();
        Ok(self.roots)
    }

    fn attach(&mut self, node: NodeId) {
        match self.open.last() {
            Some(parent) => self.dom.append_child(parent.node, node),
            None => self.roots.push(node),
        }
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        let node = self.dom.create_text(&text);
        self.attach(node);
    }

    fn inherited_namespace(&self) -> Namespace {
        match self.open.last() {
            Some(parent) => child_namespace(Some(parent.namespace), &parent.name),
            None => self.base_namespace,
        }
    }

    /// Create and attach an element. Returns the lowercased tag when the
    /// element's content must be read as raw text.
    fn open_element(
        &mut self,
        name: &str,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    ) -> Option<String> {
        let namespace = if name.eq_ignore_ascii_case("svg") {
            Namespace::Svg
        } else {
            self.inherited_namespace()
        };

        let tag = match namespace {
            Namespace::Html => name.to_ascii_lowercase(),
            Namespace::Svg => name.to_string(),
        };

        let element = self.dom.create_element(&tag, namespace);
        for (attribute, value) in attributes {
            let attribute = match namespace {
                Namespace::Html => attribute.to_ascii_lowercase(),
                Namespace::Svg => attribute,
            };
            // First occurrence wins
            if !self.dom.has_attribute(element, &attribute) {
                self.dom.set_attribute(element, &attribute, &value);
            }
        }
        self.attach(element);

        let closed = match namespace {
            Namespace::Html => is_void_element(&tag),
            Namespace::Svg => self_closing,
        };
        if closed {
            return None;
        }

        self.open.push(OpenElement {
            node: element,
            name: tag.clone(),
            namespace,
        });

        (namespace == Namespace::Html && is_raw_text_element(&tag)).then_some(tag)
    }

    fn close_element(&mut self, name: &str) {
        let position = self
            .open
            .iter()
            .rposition(|open| open.name.eq_ignore_ascii_case(name));

        // Stray close tags are ignored
        if let Some(position) = position {
            self.open.truncate(position);
        }
    }

    fn read_raw_text(&mut self, lexer: &mut Lexer<'a, Token<'a>>, tag: &str) {
        let rest = lexer.remainder();
        let close = format!("</{}", tag);
        let end = rest
            .to_ascii_lowercase()
            .find(&close)
            .unwrap_or(rest.len());

        if end > 0 {
            let content = &rest[..end];
            self.text = if is_escapable_raw_text(tag) {
                decode_entities(content)
            } else {
                content.to_string()
            };
            self.flush_text();
        }
        lexer.bump(end);
    }
}

fn read_attributes<'src>(
    lexer: &mut Lexer<'src, TagToken<'src>>,
) -> ParseResult<(Vec<(String, String)>, bool)> {
    let mut attributes = Vec::new();
    let mut pending: Option<&str> = None;

    loop {
        let Some(result) = lexer.next() else {
            return Err(ParseError::unexpected_eof("'>' to close tag"));
        };
        let span = lexer.span();
        let token = result.map_err(|_| ParseError::lex_error(span.clone(), "Invalid character in tag"))?;

        match token {
            TagToken::Word(name) => {
                if let Some(previous) = pending.replace(name) {
                    attributes.push((previous.to_string(), String::new()));
                }
            }
            TagToken::Eq => {
                let Some(name) = pending.take() else {
                    return Err(ParseError::unexpected_token(span, "attribute name", "="));
                };
                if let Some(value) = unquoted_value(lexer) {
                    attributes.push((name.to_string(), decode_entities(value)));
                    continue;
                }
                let value = match lexer.next() {
                    Some(Ok(TagToken::DoubleQuoted(value)))
                    | Some(Ok(TagToken::SingleQuoted(value))) => decode_entities(value),
                    Some(_) => {
                        return Err(ParseError::unexpected_token(
                            lexer.span(),
                            "attribute value",
                            lexer.slice(),
                        ))
                    }
                    None => return Err(ParseError::unexpected_eof("attribute value")),
                };
                attributes.push((name.to_string(), value));
            }
            TagToken::DoubleQuoted(_) | TagToken::SingleQuoted(_) => {
                return Err(ParseError::unexpected_token(span, "attribute name", lexer.slice()));
            }
            TagToken::End | TagToken::SelfClose => {
                if let Some(name) = pending.take() {
                    attributes.push((name.to_string(), String::new()));
                }
                return Ok((attributes, token == TagToken::SelfClose));
            }
            TagToken::Slash => {}
        }
    }
}

pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "source" | "track" | "wbr"
    )
}

fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "textarea" | "title")
}

fn is_escapable_raw_text(tag: &str) -> bool {
    matches!(tag, "textarea" | "title")
}

/// Decode the character references HTML content commonly carries
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(position) = rest.find('&') {
        output.push_str(&rest[..position]);
        rest = &rest[position..];
        match decode_entity(rest) {
            Some((ch, length)) => {
                output.push(ch);
                rest = &rest[length..];
            }
            None => {
                output.push('&');
                rest = &rest[1..];
            }
        }
    }
    output.push_str(rest);
    output
}

fn decode_entity(input: &str) -> Option<(char, usize)> {
    let end = input.find(';')?;
    if end > 12 {
        return None;
    }

    let ch = match &input[1..end] {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        name => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(|c| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((ch, end + 1))
}
