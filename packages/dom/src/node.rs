use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a physical node, issued by a [`Dom`](crate::Dom) implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Physical node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Element,
    Text,
    /// Comments double as invisible markers for logical groupings
    Comment,
    Fragment,
}

impl NodeKind {
    /// Element or fragment: something that physically owns its children
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Element | NodeKind::Fragment)
    }
}

/// Element namespace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Namespace {
    #[default]
    Html,
    Svg,
}

impl Namespace {
    pub const HTML_URI: &'static str = "http://www.w3.org/1999/xhtml";
    pub const SVG_URI: &'static str = "http://www.w3.org/2000/svg";

    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => Self::HTML_URI,
            Namespace::Svg => Self::SVG_URI,
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            Self::HTML_URI => Some(Namespace::Html),
            Self::SVG_URI => Some(Namespace::Svg),
            _ => None,
        }
    }
}
