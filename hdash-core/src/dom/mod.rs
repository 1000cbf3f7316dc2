//! Host Document
//!
//! The engine binds against this in-memory document. It provides exactly
//! what the binding layer needs from a DOM: an element/text tree with
//! attributes, subtree queries, and child-list mutation observation.
//!
//! The document is single-threaded and shared between the host and the
//! engine as a [`SharedDocument`]. Borrows are kept short: the engine never
//! holds a borrow while it runs a subscriber or directive callback.

mod document;
mod mutation;
mod node;

use std::cell::RefCell;
use std::rc::Rc;

pub use document::{Document, DomError};
pub use mutation::{MutationObserver, MutationRecord};
pub use node::{ElementData, NodeId, NodeKind};

/// A document shared between the host and an engine.
pub type SharedDocument = Rc<RefCell<Document>>;

/// Wrap a document for sharing with an engine.
pub fn shared(document: Document) -> SharedDocument {
    Rc::new(RefCell::new(document))
}
