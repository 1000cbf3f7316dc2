//! Directive Registry
//!
//! Maps directive names to descriptors. A process-wide registry, seeded with
//! the builtin directives, is available through [`DirectiveRegistry::global`]
//! and [`register`]; engines can also be handed a private registry.
//! Registering a name twice replaces the earlier descriptor.

use std::fmt;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::debug;

use super::builtins;
use super::Invocation;
use crate::engine::Engine;
use crate::error::Result;

/// Whether a directive accepts an argument (`h-name:argument`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgumentPolicy {
    /// The directive must not be given an argument.
    #[default]
    None,
    /// The directive must be given an argument.
    Required,
    /// Either is fine.
    Optional,
}

/// A directive callback.
pub type DirectiveFn = Arc<dyn Fn(&Engine, &Invocation) -> Result<()> + Send + Sync>;

/// What a directive does when it is dispatched.
#[derive(Clone)]
pub enum Behavior {
    /// Runs once, when the element is bound.
    Immediate(DirectiveFn),

    /// `ready` runs once when the element is bound; `updated` runs again
    /// after every state change for as long as the element stays in the
    /// document.
    Lifecycle {
        ready: DirectiveFn,
        updated: DirectiveFn,
    },
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(_) => f.write_str("Immediate"),
            Self::Lifecycle { .. } => f.write_str("Lifecycle"),
        }
    }
}

/// A registered directive.
#[derive(Debug, Clone)]
pub struct DirectiveDescriptor {
    pub argument_policy: ArgumentPolicy,
    pub behavior: Behavior,
}

impl DirectiveDescriptor {
    /// A directive that runs once per bound element.
    pub fn immediate<F>(argument_policy: ArgumentPolicy, callback: F) -> Self
    where
        F: Fn(&Engine, &Invocation) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            argument_policy,
            behavior: Behavior::Immediate(Arc::new(callback)),
        }
    }

    /// A directive with a mount hook and a per-update hook.
    pub fn lifecycle<R, U>(argument_policy: ArgumentPolicy, ready: R, updated: U) -> Self
    where
        R: Fn(&Engine, &Invocation) -> Result<()> + Send + Sync + 'static,
        U: Fn(&Engine, &Invocation) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            argument_policy,
            behavior: Behavior::Lifecycle {
                ready: Arc::new(ready),
                updated: Arc::new(updated),
            },
        }
    }
}

/// Name to descriptor table.
#[derive(Debug, Default)]
pub struct DirectiveRegistry {
    directives: DashMap<String, Arc<DirectiveDescriptor>>,
}

static GLOBAL: OnceLock<Arc<DirectiveRegistry>> = OnceLock::new();

impl DirectiveRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the builtin directives.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        builtins::register_all(&registry);
        registry
    }

    /// The process-wide registry.
    pub fn global() -> Arc<DirectiveRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::with_builtins())))
    }

    /// Register `descriptor` under `name`, replacing any earlier entry.
    pub fn register(&self, name: impl Into<String>, descriptor: DirectiveDescriptor) {
        let name = name.into();
        debug!(directive = %name, policy = ?descriptor.argument_policy, "register directive");
        self.directives.insert(name, Arc::new(descriptor));
    }

    pub fn get(&self, name: &str) -> Option<Arc<DirectiveDescriptor>> {
        self.directives.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.directives.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// Register a directive with the process-wide registry.
pub fn register(name: impl Into<String>, descriptor: DirectiveDescriptor) {
    DirectiveRegistry::global().register(name, descriptor);
}
