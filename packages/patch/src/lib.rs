//! # Arbor Patch
//!
//! Applies render-batch edit streams to a physical document tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ producer: RenderBatch (edits + frames)      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: edit-stream applier               │
//! │  - cursor over depth / child index base     │
//! │  - frame insertion (element, markup, ...)   │
//! │  - component locations, reference captures  │
//! └─────────────────────────────────────────────┘
//!          ↓                          ↓
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ logical tree         │  │ reconciler           │
//! │  - registry          │  │  - special props     │
//! │  - insert / remove   │  │  - deferred values   │
//! │  - permute           │  │  - event bindings    │
//! └──────────────────────┘  └──────────────────────┘
//!          ↓                          ↓
//! ┌─────────────────────────────────────────────┐
//! │ arbor-dom: Dom + FragmentParser capability  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Logical vs physical
//!
//! A component or a markup block may render any number of physical nodes
//! without a container. The engine anchors such groups with a marker comment
//! and keeps its own logical tree where the group's nodes are children of the
//! marker, while physically they are the marker's following siblings.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbor_dom::{Dom, MemoryDom, Namespace};
//! use arbor_markup::HtmlParser;
//! use arbor_patch::{RenderBatch, Renderer};
//!
//! let mut dom = MemoryDom::new();
//! let app = dom.create_element("div", Namespace::Html);
//!
//! let mut renderer = Renderer::new(dom, HtmlParser);
//! renderer.attach_root(1, app)?;
//! renderer.apply_batch(&RenderBatch::from_json(json)?)?;
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod logical;
pub mod logical_ops;
pub mod reconciler;
pub mod renderer;

pub use batch::{ComponentId, Edit, Frame, HandlerId, RenderBatch, RenderTreeDiff};
pub use config::{PatcherConfig, DEFAULT_CONFIG_NAME};
pub use error::{PatchError, PatchResult};
pub use events::{DispatchPlan, EventBinding, EventBindings};
pub use logical::{LogicalNode, Registry};
pub use logical_ops::PermutationEntry;
pub use reconciler::{normalize_input_value, DeferredValue, Reconciler};
pub use renderer::{Renderer, RootContent};



#[cfg(test)]
mod tests_applier;

#[cfg(test)]
mod tests_reconciler;
