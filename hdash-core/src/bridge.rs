//! Mutation Bridge
//!
//! Keeps bindings in step with the document. The bridge owns the engine's
//! mutation observer; each drained batch is processed record by record,
//! additions before removals:
//!
//! - an added text node is interpolated;
//! - an added element has its text nodes interpolated and its directives
//!   (and those of every element below it) dispatched;
//! - a removed text node loses all of its subscriptions;
//! - a removed element loses the subscriptions of every text node that was
//!   below it and the directive subscriptions of itself and every element
//!   that was below it.
//!
//! What was below a removed node comes from the snapshot carried by the
//! record, since the detached subtree may have been rearranged before the
//! batch arrives. Placement is checked against the document as it is when
//! the batch is processed. An "added" node that has since left the root is
//! skipped, and a removed node that is back inside the root (a move) keeps
//! its bindings.

use std::cell::RefCell;

use tracing::{debug, trace};

use crate::directive::dispatch_element;
use crate::dom::{MutationObserver, MutationRecord, NodeId, NodeKind};
use crate::engine::Engine;
use crate::interpolation::{interpolate_node, interpolate_subtree};
use crate::reactive::Classification;

/// Source of mutation batches for one engine.
#[derive(Debug)]
pub(crate) struct MutationBridge {
    observer: RefCell<MutationObserver>,
}

impl MutationBridge {
    pub(crate) fn new(observer: MutationObserver) -> Self {
        Self {
            observer: RefCell::new(observer),
        }
    }

    /// Every record queued since the last call.
    pub(crate) fn take_batch(&self) -> Vec<MutationRecord> {
        self.observer.borrow_mut().take_records()
    }

    pub(crate) fn disconnect(&self) {
        self.observer.borrow_mut().disconnect();
    }
}

/// Apply one batch of records to `engine`'s bindings.
pub(crate) fn apply_batch(engine: &Engine, batch: &[MutationRecord]) {
    if batch.is_empty() {
        return;
    }
    debug!(records = batch.len(), "mutation batch");

    for record in batch {
        for &node in &record.added {
            bind_added(engine, node);
        }
        for &node in &record.removed {
            purge_removed(engine, node, &record.removed_subtree);
        }
    }
}

fn placement(engine: &Engine, node: NodeId) -> (bool, Option<NodeKind>) {
    let document = engine.document().borrow();
    (document.contains(engine.root(), node), document.kind(node))
}

fn bind_added(engine: &Engine, node: NodeId) {
    let (inside, kind) = placement(engine, node);
    if !inside {
        trace!(node = node.raw(), "added node already left the root");
        return;
    }

    match kind {
        Some(NodeKind::Text) => interpolate_node(engine, node),
        Some(NodeKind::Element) => {
            interpolate_subtree(engine, node);
            for element in elements_of(engine, node) {
                dispatch_element(engine, element);
            }
        }
        None => {}
    }
}

fn purge_removed(engine: &Engine, node: NodeId, subtree: &[NodeId]) {
    let mut purged = 0;
    for &id in std::iter::once(&node).chain(subtree) {
        purged += purge_node(engine, id);
    }
    debug!(node = node.raw(), purged, "purge detached node");
}

/// Drop the bindings owned by one detached node. Text nodes lose every
/// subscription; elements lose their directive subscriptions.
fn purge_node(engine: &Engine, node: NodeId) -> usize {
    let (inside, kind) = placement(engine, node);
    if inside {
        trace!(node = node.raw(), "removed node is back inside the root");
        return 0;
    }

    let bus = engine.bus();
    let purged = match kind {
        Some(NodeKind::Text) => bus.unsubscribe_by_identity(node),
        Some(NodeKind::Element) => {
            bus.unsubscribe_by_identity_and_classification(node, Classification::Directive)
        }
        None => 0,
    };
    engine.forget(node);
    purged
}

/// `node` followed by every element below it, in document order.
fn elements_of(engine: &Engine, node: NodeId) -> Vec<NodeId> {
    let document = engine.document().borrow();
    let elements = std::iter::once(node)
        .chain(document.descendants(node))
        .filter(|id| document.is_element(*id))
        .collect();
    elements
}
