//! Directive attribute grammar.
//!
//! Decides which attributes of an element are directives and decodes them
//! into a name, an optional argument and a set of modifiers. The default
//! grammar is `h-<name>[:<argument>][.<modifier>]*`, for example
//! `h-on:click.once.passive`.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{EngineError, Result};

/// Ordered set of boolean flags from an attribute suffix.
///
/// Opaque to the engine; directives query it with [`Modifiers::contains`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers(SmallVec<[String; 2]>);

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|m| m == flag)
    }

    /// Add a flag. Duplicates are ignored.
    pub fn insert(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        if !self.contains(&flag) {
            self.0.push(flag);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Modifiers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut modifiers = Self::new();
        for flag in iter {
            modifiers.insert(flag);
        }
        modifiers
    }
}

/// A decoded directive attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveAttribute {
    pub name: String,
    pub argument: Option<String>,
    pub modifiers: Modifiers,
}

impl DirectiveAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: None,
            modifiers: Modifiers::new(),
        }
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.insert(modifier);
        self
    }
}

/// Maps attribute names to directive descriptors and back.
pub trait AttributeGrammar {
    /// `None` for ordinary attributes, `Some(Err(_))` for attributes that
    /// claim to be directives but do not parse.
    fn parse(&self, attribute: &str) -> Option<Result<DirectiveAttribute>>;

    /// The literal attribute name that `parse` decodes into `directive`.
    fn attribute_name(&self, directive: &DirectiveAttribute) -> String;
}

/// `<prefix><name>[:<argument>][.<modifier>]*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixGrammar {
    prefix: String,
}

impl PrefixGrammar {
    pub const DEFAULT_PREFIX: &'static str = "h-";

    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for PrefixGrammar {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}

impl AttributeGrammar for PrefixGrammar {
    fn parse(&self, attribute: &str) -> Option<Result<DirectiveAttribute>> {
        let body = attribute.strip_prefix(self.prefix.as_str())?;
        let malformed = || Some(Err(EngineError::MalformedDirective(attribute.to_owned())));

        let mut parts = body.split('.');
        let head = parts.next().unwrap_or_default();
        let (name, argument) = match head.split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (head, None),
        };
        if name.is_empty() || argument.is_some_and(str::is_empty) {
            return malformed();
        }

        let mut modifiers = Modifiers::new();
        for modifier in parts {
            if modifier.is_empty() {
                return malformed();
            }
            modifiers.insert(modifier);
        }

        Some(Ok(DirectiveAttribute {
            name: name.to_owned(),
            argument: argument.map(str::to_owned),
            modifiers,
        }))
    }

    fn attribute_name(&self, directive: &DirectiveAttribute) -> String {
        let mut out = format!("{}{}", self.prefix, directive.name);
        if let Some(argument) = &directive.argument {
            out.push(':');
            out.push_str(argument);
        }
        for modifier in directive.modifiers.iter() {
            out.push('.');
            out.push_str(modifier);
        }
        out
    }
}

impl fmt::Display for DirectiveAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&PrefixGrammar::default().attribute_name(self))
    }
}
