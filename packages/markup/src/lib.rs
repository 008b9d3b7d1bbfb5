//! # Arbor Markup
//!
//! HTML fragment parser implementing [`arbor_dom::FragmentParser`].
//!
//! The patch engine hands raw markup strings to whatever parser the host
//! provides. This crate is the default: a logos lexer feeding a forgiving
//! tree builder that creates detached nodes through any [`arbor_dom::Dom`].

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{format_errors, ErrorSite, FragmentErrors, ParseError, ParseResult};
pub use parser::{decode_entities, HtmlParser};

use arbor_dom::{Dom, FragmentParser, NodeId};

/// Parse `markup` as children of `context` with the default parser
pub fn parse_fragment<D: Dom + ?Sized>(
    dom: &mut D,
    markup: &str,
    context: NodeId,
) -> ParseResult<Vec<NodeId>> {
    HtmlParser.parse_fragment(dom, markup, context)
}
