//! # Render batch wire format
//!
//! What a producer hands the renderer: per-component edit streams that point
//! into a shared buffer of reference frames, plus the component and event
//! handler ids disposed by the same render pass.
//!
//! All types are serde encodable with a `type` tag and camelCase fields, so a
//! batch can be shipped as JSON:
//!
//! ```json
//! {
//!   "updatedComponents": [
//!     { "componentId": 1, "edits": [{ "type": "prependFrame", "siblingIndex": 0, "referenceFrameIndex": 0 }] }
//!   ],
//!   "referenceFrames": [{ "type": "text", "textContent": "hello" }]
//! }
//! ```

use serde::{Deserialize, Serialize};

pub type ComponentId = u32;

/// Event handler id; 0 means "no handler"
pub type HandlerId = u64;

/// One structural operation, applied against the renderer's cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Edit {
    PrependFrame {
        sibling_index: usize,
        reference_frame_index: usize,
    },
    RemoveFrame {
        sibling_index: usize,
    },
    SetAttribute {
        sibling_index: usize,
        reference_frame_index: usize,
    },
    RemoveAttribute {
        sibling_index: usize,
        removed_attribute_name: String,
    },
    UpdateText {
        sibling_index: usize,
        reference_frame_index: usize,
    },
    UpdateMarkup {
        sibling_index: usize,
        reference_frame_index: usize,
    },
    StepIn {
        sibling_index: usize,
    },
    StepOut,
    PermutationListEntry {
        sibling_index: usize,
        move_to_sibling_index: usize,
    },
    PermutationListEnd,
    /// Any edit type this engine does not know
    #[serde(other)]
    Unknown,
}

impl Edit {
    pub fn prepend(sibling_index: usize, reference_frame_index: usize) -> Self {
        Edit::PrependFrame {
            sibling_index,
            reference_frame_index,
        }
    }

    pub fn remove(sibling_index: usize) -> Self {
        Edit::RemoveFrame { sibling_index }
    }

    pub fn set_attribute(sibling_index: usize, reference_frame_index: usize) -> Self {
        Edit::SetAttribute {
            sibling_index,
            reference_frame_index,
        }
    }

    pub fn remove_attribute(sibling_index: usize, name: impl Into<String>) -> Self {
        Edit::RemoveAttribute {
            sibling_index,
            removed_attribute_name: name.into(),
        }
    }

    pub fn update_text(sibling_index: usize, reference_frame_index: usize) -> Self {
        Edit::UpdateText {
            sibling_index,
            reference_frame_index,
        }
    }

    pub fn update_markup(sibling_index: usize, reference_frame_index: usize) -> Self {
        Edit::UpdateMarkup {
            sibling_index,
            reference_frame_index,
        }
    }

    pub fn step_in(sibling_index: usize) -> Self {
        Edit::StepIn { sibling_index }
    }

    pub fn permutation(sibling_index: usize, move_to_sibling_index: usize) -> Self {
        Edit::PermutationListEntry {
            sibling_index,
            move_to_sibling_index,
        }
    }

    /// Wire name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Edit::PrependFrame { .. } => "prependFrame",
            Edit::RemoveFrame { .. } => "removeFrame",
            Edit::SetAttribute { .. } => "setAttribute",
            Edit::RemoveAttribute { .. } => "removeAttribute",
            Edit::UpdateText { .. } => "updateText",
            Edit::UpdateMarkup { .. } => "updateMarkup",
            Edit::StepIn { .. } => "stepIn",
            Edit::StepOut => "stepOut",
            Edit::PermutationListEntry { .. } => "permutationListEntry",
            Edit::PermutationListEnd => "permutationListEnd",
            Edit::Unknown => "unknown",
        }
    }
}

/// Payload record that edits point into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Frame {
    /// `subtree_length` counts this frame and all of its descendants
    Element {
        element_name: String,
        subtree_length: usize,
    },
    Text {
        text_content: String,
    },
    Attribute {
        attribute_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute_value: Option<String>,
        #[serde(default)]
        attribute_event_handler_id: HandlerId,
    },
    Component {
        component_id: ComponentId,
        subtree_length: usize,
    },
    /// Groups its descendants without a node of its own
    Region {
        subtree_length: usize,
    },
    ElementReferenceCapture {
        element_reference_capture_id: String,
    },
    Markup {
        markup_content: String,
    },
    NamedEvent {
        event_type: String,
        assigned_name: String,
    },
    #[serde(other)]
    Unknown,
}

impl Frame {
    pub fn element(name: impl Into<String>, subtree_length: usize) -> Self {
        Frame::Element {
            element_name: name.into(),
            subtree_length,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Frame::Text {
            text_content: content.into(),
        }
    }

    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Frame::Attribute {
            attribute_name: name.into(),
            attribute_value: Some(value.into()),
            attribute_event_handler_id: 0,
        }
    }

    /// Attribute frame with no value (a removal when used in `setAttribute`)
    pub fn empty_attribute(name: impl Into<String>) -> Self {
        Frame::Attribute {
            attribute_name: name.into(),
            attribute_value: None,
            attribute_event_handler_id: 0,
        }
    }

    pub fn event_handler(name: impl Into<String>, handler_id: HandlerId) -> Self {
        Frame::Attribute {
            attribute_name: name.into(),
            attribute_value: None,
            attribute_event_handler_id: handler_id,
        }
    }

    pub fn component(component_id: ComponentId, subtree_length: usize) -> Self {
        Frame::Component {
            component_id,
            subtree_length,
        }
    }

    pub fn region(subtree_length: usize) -> Self {
        Frame::Region { subtree_length }
    }

    pub fn reference_capture(id: impl Into<String>) -> Self {
        Frame::ElementReferenceCapture {
            element_reference_capture_id: id.into(),
        }
    }

    pub fn markup(content: impl Into<String>) -> Self {
        Frame::Markup {
            markup_content: content.into(),
        }
    }

    pub fn named_event(event_type: impl Into<String>, assigned_name: impl Into<String>) -> Self {
        Frame::NamedEvent {
            event_type: event_type.into(),
            assigned_name: assigned_name.into(),
        }
    }

    /// Frames covered by this one, itself included
    pub fn subtree_length(&self) -> usize {
        match self {
            Frame::Element { subtree_length, .. }
            | Frame::Component { subtree_length, .. }
            | Frame::Region { subtree_length } => (*subtree_length).max(1),
            _ => 1,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Element { .. } => "element",
            Frame::Text { .. } => "text",
            Frame::Attribute { .. } => "attribute",
            Frame::Component { .. } => "component",
            Frame::Region { .. } => "region",
            Frame::ElementReferenceCapture { .. } => "elementReferenceCapture",
            Frame::Markup { .. } => "markup",
            Frame::NamedEvent { .. } => "namedEvent",
            Frame::Unknown => "unknown",
        }
    }
}

/// Edits for one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderTreeDiff {
    pub component_id: ComponentId,
    #[serde(default)]
    pub edits: Vec<Edit>,
}

/// Output of one render pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBatch {
    #[serde(default)]
    pub updated_components: Vec<RenderTreeDiff>,
    #[serde(default)]
    pub reference_frames: Vec<Frame>,
    #[serde(default)]
    pub disposed_component_ids: Vec<ComponentId>,
    #[serde(default)]
    pub disposed_event_handler_ids: Vec<HandlerId>,
}

impl RenderBatch {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
