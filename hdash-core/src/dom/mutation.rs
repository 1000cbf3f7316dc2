//! Child-list mutation records.
//!
//! A [`Document`](super::Document) pushes one [`MutationRecord`] per
//! structural change into every observer whose root contains the changed
//! parent. Records queue up in an unbounded channel and are only seen when
//! the observer is drained, so a consumer always receives them as a batch
//! after the synchronous work that produced them has finished.

use smallvec::SmallVec;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::NodeId;

/// One child-list change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The parent whose child list changed.
    pub target: NodeId,
    pub added: SmallVec<[NodeId; 2]>,
    pub removed: SmallVec<[NodeId; 2]>,
    /// Every node that was below a removed node at the moment of removal,
    /// in document order. Later edits inside the detached subtree are not
    /// observed, so consumers must rely on this snapshot.
    pub removed_subtree: Vec<NodeId>,
}

impl MutationRecord {
    pub(crate) fn added(target: NodeId, node: NodeId) -> Self {
        Self {
            target,
            added: SmallVec::from_slice(&[node]),
            removed: SmallVec::new(),
            removed_subtree: Vec::new(),
        }
    }

    pub(crate) fn removed(target: NodeId, node: NodeId, subtree: Vec<NodeId>) -> Self {
        Self {
            target,
            added: SmallVec::new(),
            removed: SmallVec::from_slice(&[node]),
            removed_subtree: subtree,
        }
    }
}

/// Sending half kept by the document.
#[derive(Debug)]
pub(crate) struct ObserverSlot {
    pub(crate) root: NodeId,
    pub(crate) sender: UnboundedSender<MutationRecord>,
}

/// Receiving half handed to whoever observes a subtree.
///
/// Dropping the observer stops delivery; the document prunes the slot on
/// its next mutation.
#[derive(Debug)]
pub struct MutationObserver {
    root: NodeId,
    receiver: UnboundedReceiver<MutationRecord>,
}

impl MutationObserver {
    pub(crate) fn channel(root: NodeId) -> (ObserverSlot, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ObserverSlot { root, sender }, Self { root, receiver })
    }

    /// The subtree root this observer watches.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Drain every record queued so far, oldest first.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        let mut records = Vec::new();
        while let Ok(record) = self.receiver.try_recv() {
            records.push(record);
        }
        records
    }

    /// Stop receiving records. Already queued records are discarded.
    pub fn disconnect(&mut self) {
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }
}
