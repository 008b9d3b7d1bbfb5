//! Error types for the patch engine

use crate::batch::{ComponentId, HandlerId};
use arbor_dom::{NodeId, ParseError};
use thiserror::Error;

pub type PatchResult<T> = Result<T, PatchError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    /// An edit does not fit the tree it is applied to
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    #[error("Unsupported internal attribute '{0}'")]
    InvalidReservedAttribute(String),

    #[error("Event name '{0}' does not start with 'on'")]
    InvalidEventName(String),

    #[error("Invalid selection value: {0}")]
    InvalidSelection(String),

    #[error("Node {0} already has children and cannot be wrapped")]
    NonEmptyNode(NodeId),

    #[error("No location is known for component {0}")]
    UnknownComponent(ComponentId),

    #[error("No element is bound to event handler {0}")]
    MissingHandlerBinding(HandlerId),

    #[error("Markup error: {0}")]
    Markup(#[from] ParseError),
}

impl PatchError {
    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::StructuralMismatch(message.into())
    }
}
