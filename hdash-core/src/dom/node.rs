//! Document Nodes
//!
//! This module defines the node types that live in the document arena.

use indexmap::IndexMap;

/// Identifier for a node in a [`Document`](super::Document).
///
/// Node ids are arena indices: they are stable for the lifetime of the
/// document and are never reused, which makes them usable as the identity
/// token for bindings attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw arena index.
    pub fn raw(&self) -> usize {
        self.0
    }
}

/// The kind of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An element. Elements carry attributes and may have children.
    Element,

    /// A text node. Text nodes are always leaves.
    Text,
}

/// Element payload: tag name plus attributes in source order.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    pub(crate) tag: String,
    pub(crate) attributes: IndexMap<String, String>,
}

impl ElementData {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(String::as_str)
            .unwrap_or_default()
            .split_whitespace()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Element(ElementData),
    Text(String),
}

/// A node in the document tree.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn element(tag: &str) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                attributes: IndexMap::new(),
            }),
        }
    }

    pub(crate) fn text(text: &str) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data: NodeData::Text(text.to_owned()),
        }
    }

    pub(crate) fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_tags_are_lowercased() {
        let node = Node::element("DIV");
        match &node.data {
            NodeData::Element(el) => assert_eq!(el.tag(), "div"),
            NodeData::Text(_) => panic!("expected an element"),
        }
        assert_eq!(node.kind(), NodeKind::Element);
    }

    #[test]
    fn classes_split_on_whitespace() {
        let mut el = ElementData::default();
        el.attributes.insert("class".into(), " a  b\tc ".into());
        assert_eq!(el.classes().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
