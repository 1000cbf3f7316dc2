//! Diagnostic channel.
//!
//! Errors raised while binding markup (unknown directives, bad arguments,
//! missing formatters, failing behaviors) do not abort anything. They are
//! handed to a [`Reporter`] together with the offending node, and the
//! engine moves on to the next attribute, expression or element.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::error;

use crate::dom::NodeId;
use crate::error::EngineError;

/// Receives every isolated binding error.
pub trait Reporter {
    fn report(&self, error: &EngineError, node: Option<NodeId>);
}

/// Default reporter: one `tracing` error event per diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, err: &EngineError, node: Option<NodeId>) {
        match node {
            Some(node) => error!(node = node.raw(), "{err}"),
            None => error!("{err}"),
        }
    }
}

/// A reported error and the node it was raised for.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub error: EngineError,
    pub node: Option<NodeId>,
}

/// Reporter that keeps every diagnostic for later inspection.
///
/// Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Just the errors, in report order.
    pub fn errors(&self) -> Vec<EngineError> {
        self.entries.lock().iter().map(|d| d.error.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Take and clear the log.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, err: &EngineError, node: Option<NodeId>) {
        error!(node = node.map(|n| n.raw()), "{err}");
        self.entries.lock().push(Diagnostic {
            error: err.clone(),
            node,
        });
    }
}
