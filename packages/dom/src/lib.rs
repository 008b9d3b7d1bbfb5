//! # Arbor DOM
//!
//! The physical document tree that the patch engine writes into.
//!
//! The engine never talks to a concrete document. It goes through the [`Dom`]
//! capability (create nodes, move them, read/write attributes, text and
//! form-control state) and the [`FragmentParser`] capability (markup string +
//! context node → detached top-level nodes).
//!
//! [`MemoryDom`] is an arena-backed implementation used by hosts without a
//! real document and by the test suites. The [`serializer`] renders any
//! [`Dom`] subtree back to HTML.

mod dom_trait;
mod error;
mod memory;
mod node;
pub mod serializer;

pub use dom_trait::{Dom, FragmentParser};
pub use error::{ParseError, ParseResult, TextSpan};
pub use memory::MemoryDom;
pub use node::{Namespace, NodeId, NodeKind};
pub use serializer::{inner_html, outer_html, SerializeOptions};
