//! In-memory Document
//!
//! An arena-backed element/text tree. Nodes are addressed by [`NodeId`] and
//! are never freed: detaching a node only unlinks it from its parent, so a
//! detached subtree can be inspected or re-attached later.
//!
//! Every child-list change is reported to the observers registered through
//! [`Document::observe`]. Writes to a text node's data are character-data
//! changes and are not reported.

use thiserror::Error;
use tracing::trace;

use super::mutation::{MutationObserver, MutationRecord, ObserverSlot};
use super::node::{ElementData, Node, NodeData, NodeId, NodeKind};

/// Structural errors raised by tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("text nodes cannot have children")]
    TextParent,

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} is not a text node")]
    NotText(NodeId),

    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("unsupported selector \"{0}\" (expected a compound of tag, #id and .class)")]
    InvalidSelector(String),
}

/// An element/text tree with mutation observation.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    observers: Vec<ObserverSlot>,
}

impl Document {
    /// Create a document holding a single empty `html` element.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::element("html")],
            root: NodeId::from_index(0),
            observers: Vec::new(),
        }
    }

    /// The document element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.raw()).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.raw()).ok_or(DomError::UnknownNode(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(el) => Ok(el),
            NodeData::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    /// Element payload of `id`, if it is an element.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.raw())?.data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id.raw()).map(Node::kind)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Element)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Text)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.raw())?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.raw())
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`.
    ///
    /// A child that already has a parent is moved, which is reported as a
    /// removal followed by an addition.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference`, or last when
    /// `reference` is `None`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if self.node(parent)?.kind() == NodeKind::Text {
            return Err(DomError::TextParent);
        }
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        self.detach(child)?;

        let node = self.node_mut(parent)?;
        let index = reference
            .and_then(|r| node.children.iter().position(|c| *c == r))
            .unwrap_or(node.children.len());
        node.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);

        self.record(MutationRecord::added(parent, child));
        Ok(())
    }

    /// Remove `child` from `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child)
    }

    /// Unlink `node` from its parent, if it has one.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(());
        };
        let subtree = if self.observers.is_empty() {
            Vec::new()
        } else {
            self.descendants(node)
        };
        self.node_mut(parent)?.children.retain(|c| *c != node);
        self.node_mut(node)?.parent = None;

        self.record(MutationRecord::removed(parent, node, subtree));
        Ok(())
    }

    /// Whether `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// All nodes below `node` in document order, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Text nodes inside `node` in document order. A text node yields
    /// itself.
    pub fn text_nodes(&self, node: NodeId) -> Vec<NodeId> {
        if self.is_text(node) {
            return vec![node];
        }
        self.descendants(node)
            .into_iter()
            .filter(|id| self.is_text(*id))
            .collect()
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attributes.get(name).map(String::as_str)
    }

    pub fn remove_attribute(
        &mut self,
        node: NodeId,
        name: &str,
    ) -> Result<Option<String>, DomError> {
        Ok(self.element_mut(node)?.attributes.shift_remove(name))
    }

    /// Attribute name/value pairs of an element in source order.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.element(node)
            .map(|el| {
                el.attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Data of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.raw())?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    /// Replace the data of a text node. Not a child-list mutation.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.node_mut(node)?.data {
            NodeData::Text(data) => {
                text.clone_into(data);
                Ok(())
            }
            NodeData::Element(_) => Err(DomError::NotText(node)),
        }
    }

    /// Concatenated data of every text node inside `node`.
    pub fn text_content(&self, node: NodeId) -> String {
        self.text_nodes(node)
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    /// Replace an element's children with a single text node (or nothing,
    /// for empty text). A text node just gets its data replaced.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        if self.is_text(node) {
            return self.set_text(node, text);
        }
        for child in self.children(node).to_vec() {
            self.detach(child)?;
        }
        if !text.is_empty() {
            let child = self.create_text(text);
            self.append_child(node, child)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Selectors
    // ------------------------------------------------------------------

    /// First element in the document matching `selector`.
    ///
    /// Supported selectors are compounds of `tag`, `#id` and `.class`, for
    /// example `div#app.main`. Combinators, attribute selectors and selector
    /// lists are not; they match nothing here and are rejected by
    /// [`Document::try_query_selector`].
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.try_query_selector(selector).ok().flatten()
    }

    /// Like [`Document::query_selector`], but an unsupported selector is an
    /// error instead of a miss.
    pub fn try_query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        let parsed = Selector::parse(selector)
            .ok_or_else(|| DomError::InvalidSelector(selector.to_owned()))?;
        Ok(self.matching(&parsed).into_iter().next())
    }

    /// Every element in the document matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Some(parsed) => self.matching(&parsed),
            None => Vec::new(),
        }
    }

    fn matching(&self, selector: &Selector<'_>) -> Vec<NodeId> {
        let matches = std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|id| self.element(*id).is_some_and(|el| selector.matches(el)))
            .collect();
        matches
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Observe child-list changes anywhere inside `root`.
    pub fn observe(&mut self, root: NodeId) -> MutationObserver {
        let (slot, observer) = MutationObserver::channel(root);
        self.observers.push(slot);
        observer
    }

    /// Queue `record` for every observer whose root contains its target.
    /// Observers whose receiving half is gone are dropped.
    fn record(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        let mut inside = self
            .observers
            .iter()
            .map(|slot| self.contains(slot.root, record.target))
            .collect::<Vec<_>>()
            .into_iter();

        self.observers.retain(|slot| {
            let inside = inside.next().unwrap_or(false);
            if slot.sender.is_closed() {
                trace!(root = ?slot.root, "drop closed observer");
                return false;
            }
            if !inside {
                return true;
            }
            trace!(target = ?record.target, "queue mutation record");
            if slot.sender.send(record.clone()).is_err() {
                trace!(root = ?slot.root, "observer went away while queueing");
                return false;
            }
            true
        });
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A compound selector: optional tag, optional id, any number of classes.
#[derive(Debug, Default, PartialEq, Eq)]
struct Selector<'a> {
    tag: Option<&'a str>,
    id: Option<&'a str>,
    classes: Vec<&'a str>,
}

impl<'a> Selector<'a> {
    fn parse(input: &'a str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let mut selector = Selector::default();
        let mut rest = input;

        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        if tag_end > 0 {
            let tag = &rest[..tag_end];
            if !is_name(tag) {
                return None;
            }
            selector.tag = Some(tag);
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if !is_name(name) {
                return None;
            }
            match marker {
                '#' => selector.id = Some(name),
                _ => selector.classes.push(name),
            }
            rest = &body[end..];
        }
        Some(selector)
    }

    fn matches(&self, el: &ElementData) -> bool {
        if let Some(tag) = self.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = self.id {
            if el.attributes.get("id").map(String::as_str) != Some(id) {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|class| el.classes().any(|c| c == *class))
    }
}

fn is_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
