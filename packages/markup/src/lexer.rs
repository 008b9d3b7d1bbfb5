//! Lexer for HTML fragments using logos
//!
//! Markup is lexed in two modes. [`Token`] covers content (text, comments,
//! tag boundaries); once a start tag is seen the lexer is morphed into
//! [`TagToken`] to read attributes, then morphed back.

use arbor_dom::TextSpan;
use logos::{Lexer, Logos};

/// Content-mode tokens
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token<'src> {
    /// `<name`, attributes follow in tag mode
    #[regex(r"<[a-zA-Z][a-zA-Z0-9:_.\-]*", |lex| &lex.slice()[1..])]
    TagOpen(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9:_.\-]*[ \t\r\n\f]*>", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].trim_end()
    })]
    TagClose(&'src str),

    #[token("<!--", comment_body)]
    Comment(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    /// A `<` that starts nothing; kept as text
    #[token("<")]
    Lt,
}

/// Tag-mode tokens
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TagToken<'src> {
    /// Attribute name or unquoted attribute value
    #[regex(r#"[^ \t\r\n\f"'<>/=`]+"#, |lex| lex.slice())]
    Word(&'src str),

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]  // Strip quotes
    })]
    DoubleQuoted(&'src str),

    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]  // Strip quotes
    })]
    SingleQuoted(&'src str),

    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,

    #[token("/")]
    Slash,
}

fn comment_body<'src>(lex: &mut Lexer<'src, Token<'src>>) -> Option<&'src str> {
    let rest = lex.remainder();
    let end = rest.find("-->")?;
    lex.bump(end + 3);
    Some(&rest[..end])
}

fn is_tag_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0C')
}

/// Read an unquoted attribute value right after `=`.
///
/// Unquoted values may contain `/` (`href=/home`), which tag mode would
/// otherwise split off as a separate token. Returns `None`, consuming only
/// whitespace, when the value is quoted or missing so the caller can fall
/// back to [`TagToken`]s.
pub fn unquoted_value<'src>(lexer: &mut Lexer<'src, TagToken<'src>>) -> Option<&'src str> {
    let rest = lexer.remainder();
    let value = rest.trim_start_matches(is_tag_whitespace);
    let leading = rest.len() - value.len();

    let length = value
        .find(|c: char| is_tag_whitespace(c) || matches!(c, '"' | '\'' | '<' | '>' | '=' | '`'))
        .unwrap_or(value.len());
    if length == 0 {
        lexer.bump(leading);
        return None;
    }

    lexer.bump(leading + length);
    Some(&value[..length])
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub span: TextSpan,
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub span: TextSpan,
    pub message: String,
}

/// Lex content-mode tokens with spans (tags are not descended into)
pub fn lex(source: &str) -> impl Iterator<Item = Result<SpannedToken<'_>, LexError>> + '_ {
    Token::lexer(source).spanned().map(|(result, span)| match result {
        Ok(token) => Ok(SpannedToken {
            token,
            span: span.into(),
        }),
        Err(_) => Err(LexError {
            span: span.into(),
            message: "Unterminated comment".to_string(),
        }),
    })
}
