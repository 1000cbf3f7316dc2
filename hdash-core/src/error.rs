//! Error types for the binding engine.
//!
//! Construction errors abort engine creation. Everything raised while
//! dispatching directives or installing interpolation bindings is isolated
//! to the offending attribute or expression and routed through a
//! [`Reporter`](crate::diagnostics::Reporter) instead.

use thiserror::Error;

use crate::dom::DomError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// How a directive's argument failed its registered policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentMismatch {
    /// The directive takes no argument, but the markup supplied one.
    #[error("takes no argument, but got \"{0}\"")]
    Unexpected(String),

    /// The directive requires an argument, but the markup has none.
    #[error("requires an argument, but there is none")]
    Missing,
}

/// Every failure the engine can surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Read or write of a state key that was not declared at construction.
    #[error("unknown state property \"{0}\"")]
    UnknownProperty(String),

    /// Markup references a directive nobody registered.
    #[error("directive \"{0}\" not found")]
    DirectiveNotFound(String),

    /// Argument cardinality does not match the directive's policy.
    #[error("directive \"{name}\" {reason}")]
    ArgumentPolicy {
        name: String,
        reason: ArgumentMismatch,
    },

    /// An interpolation pipeline names a formatter missing from the table.
    #[error("formatter \"{0}\" not found")]
    FormatterNotFound(String),

    /// The engine could not be initialized.
    #[error("cannot construct engine: {0}")]
    Construction(String),

    /// A prefixed attribute that does not follow the directive grammar.
    #[error("malformed directive attribute \"{0}\"")]
    MalformedDirective(String),

    /// `Engine::call` with a name that is not in the action table.
    #[error("unknown action \"{0}\"")]
    UnknownAction(String),

    /// A directive behavior failed while running.
    #[error("directive \"{name}\" failed: {message}")]
    Directive { name: String, message: String },

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl EngineError {
    /// Shorthand for a failure raised inside a directive behavior.
    pub fn directive(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Directive {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_policy_message_names_directive() {
        let err = EngineError::ArgumentPolicy {
            name: "on".into(),
            reason: ArgumentMismatch::Missing,
        };
        assert_eq!(
            err.to_string(),
            "directive \"on\" requires an argument, but there is none"
        );

        let err = EngineError::ArgumentPolicy {
            name: "text".into(),
            reason: ArgumentMismatch::Unexpected("x".into()),
        };
        assert_eq!(
            err.to_string(),
            "directive \"text\" takes no argument, but got \"x\""
        );
    }

    #[test]
    fn dom_errors_convert() {
        let err: EngineError = DomError::TextParent.into();
        assert!(matches!(err, EngineError::Dom(DomError::TextParent)));
    }
}
