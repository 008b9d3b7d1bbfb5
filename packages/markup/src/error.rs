//! Error reporting for markup blocks
//!
//! Parse errors carry byte spans into the markup block that produced them.
//! Reports resolve each span back to the construct it falls in (a start tag,
//! one of its attributes, a comment or plain content) so a failing block
//! reads as "in attribute `href` of `<a>`" rather than as a bare offset.

pub use arbor_dom::{ParseError, ParseResult, TextSpan};
use std::fmt;

/// Errors raised while parsing one markup block
#[derive(Debug, Default)]
pub struct FragmentErrors {
    errors: Vec<ParseError>,
}

impl FragmentErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }
}

impl From<ParseError> for FragmentErrors {
    fn from(error: ParseError) -> Self {
        Self { errors: vec![error] }
    }
}

impl FromIterator<ParseError> for FragmentErrors {
    fn from_iter<I: IntoIterator<Item = ParseError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// The markup construct an error offset falls in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSite {
    /// Inside a start or end tag, outside any attribute value
    Tag(String),
    /// Right after `name=` inside a start tag
    Attribute { tag: String, name: String },
    /// Inside an unterminated `<!--`
    Comment,
    /// Between tags
    Content,
}

impl ErrorSite {
    /// Find the construct `offset` falls in. Quoted values containing `<` or
    /// `>` can mislead the scan; the parser never reports errors inside them.
    pub fn locate(source: &str, offset: usize) -> Self {
        let before = source.get(..offset).unwrap_or(source);

        if let Some(open) = before.rfind("<!--") {
            if !before[open..].contains("-->") {
                return ErrorSite::Comment;
            }
        }

        let Some(lt) = before.rfind('<') else {
            return ErrorSite::Content;
        };
        let inside = &before[lt + 1..];
        if inside.contains('>') {
            return ErrorSite::Content;
        }

        let inside = inside.strip_prefix('/').unwrap_or(inside);
        let tag_length = inside
            .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '=')
            .unwrap_or(inside.len());
        if tag_length == 0 {
            return ErrorSite::Content;
        }
        let tag = inside[..tag_length].to_string();

        let attributes = inside[tag_length..].trim_end();
        if let Some(name) = attributes.strip_suffix('=') {
            let name = name.trim_end().rsplit(|c: char| c.is_ascii_whitespace()).next().unwrap_or_default();
            if !name.is_empty() {
                return ErrorSite::Attribute {
                    tag,
                    name: name.to_string(),
                };
            }
        }
        ErrorSite::Tag(tag)
    }
}

impl fmt::Display for ErrorSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSite::Tag(tag) => write!(f, "in tag `<{}>`", tag),
            ErrorSite::Attribute { tag, name } => write!(f, "in attribute `{}` of `<{}>`", name, tag),
            ErrorSite::Comment => write!(f, "in comment"),
            ErrorSite::Content => write!(f, "in content"),
        }
    }
}

/// Byte range an error points at; errors at the end of input point at the
/// last character
fn error_span(source: &str, error: &ParseError) -> TextSpan {
    error.span().unwrap_or(TextSpan {
        start: source.len().saturating_sub(1),
        end: source.len(),
    })
}

fn error_site(source: &str, error: &ParseError) -> ErrorSite {
    match error.span() {
        Some(span) if source.get(span.start..).is_some_and(|rest| rest.starts_with("<!--")) => ErrorSite::Comment,
        Some(span) => ErrorSite::locate(source, span.start),
        None => ErrorSite::locate(source, source.len()),
    }
}

fn describe(error: &ParseError) -> String {
    match error {
        ParseError::UnexpectedToken { expected, found, .. } => format!("expected {}, found `{}`", expected, found),
        ParseError::UnexpectedEof { expected } => format!("markup ended before {}", expected),
        ParseError::InvalidSyntax { message, .. } | ParseError::LexError { message, .. } => message.clone(),
    }
}

/// 1-based line and column of `offset`
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |last| last.chars().count()) + 1;
    (line, column)
}

/// Render reports for a failed markup block, each labelled with the tag or
/// attribute it occurred in
#[cfg(feature = "pretty-errors")]
pub fn format_errors(source: &str, block: &str, errors: &FragmentErrors) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();

    for error in errors.iter() {
        let span = error_span(source, error);
        let site = error_site(source, error);
        let message = describe(error);

        let report = Report::build(ReportKind::Error, block, span.start)
            .with_message(&message)
            .with_label(
                Label::new((block, span.start..span.end))
                    .with_color(Color::Red)
                    .with_message(site.to_string()),
            )
            .with_note(format!("while parsing markup block `{}`", block))
            .finish();

        if report.write((block, Source::from(source)), &mut output).is_err() {
            output.extend(plain_line(source, block, error).into_bytes());
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}

/// One `block:line:column: message (site)` line per error
#[cfg(not(feature = "pretty-errors"))]
pub fn format_errors(source: &str, block: &str, errors: &FragmentErrors) -> String {
    errors.iter().map(|error| plain_line(source, block, error)).collect()
}

fn plain_line(source: &str, block: &str, error: &ParseError) -> String {
    let span = error_span(source, error);
    let (line, column) = line_column(source, span.start);
    let site = error_site(source, error);
    format!("{}:{}:{}: {} ({})\n", block, line, column, describe(error), site)
}
