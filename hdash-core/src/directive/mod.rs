//! Directives
//!
//! A directive is a named behavior attached to an element through an
//! attribute such as `h-attr:title="caption"`. This module holds the
//! attribute grammar, the registry that maps names to behaviors, the
//! dispatcher that binds an element's directives, and the builtin
//! directives.

mod attribute;
mod builtins;
mod dispatch;
mod registry;

pub use attribute::{AttributeGrammar, DirectiveAttribute, Modifiers, PrefixGrammar};
pub use registry::{
    register, ArgumentPolicy, Behavior, DirectiveDescriptor, DirectiveFn, DirectiveRegistry,
};

pub(crate) use dispatch::dispatch_element;

use crate::dom::NodeId;

/// Everything a directive behavior is called with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The element carrying the attribute.
    pub element: NodeId,
    /// Directive name, without prefix, argument or modifiers.
    pub name: String,
    /// Raw attribute value.
    pub value: String,
    pub modifiers: Modifiers,
    pub argument: Option<String>,
}
