//! Subscription records for the reactive bus.
//!
//! A Subscription ties a callback to a state key (or to every change),
//! together with the metadata the engine needs to garbage-collect it:
//! what kind of binding installed it and which node it belongs to.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::dom::NodeId;

/// Unique identifier for a subscription.
///
/// Each subscription gets a unique ID when created. IDs are never reused,
/// so they stay meaningful after the subscription is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Generate a new unique subscription ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Which notifications a subscription listens to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriptionKey {
    /// Fires once per state write, with no value.
    Any,

    /// Fires when this property is written, with its new value.
    Property(String),
}

impl SubscriptionKey {
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Property(name) => Some(name),
        }
    }
}

/// The empty string is the wildcard key.
impl From<&str> for SubscriptionKey {
    fn from(key: &str) -> Self {
        if key.is_empty() {
            Self::Any
        } else {
            Self::Property(key.to_owned())
        }
    }
}

impl From<String> for SubscriptionKey {
    fn from(key: String) -> Self {
        if key.is_empty() {
            Self::Any
        } else {
            Self::Property(key)
        }
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Property(name) => f.write_str(name),
        }
    }
}

/// What installed a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The `updated` hook of a lifecycle directive.
    Directive,

    /// A text node's interpolation binding.
    Interpolation,

    /// A host-supplied watcher or any other subscription made through the
    /// engine directly.
    Watcher,
}

/// Callback invoked with the notification context and, for keyed
/// subscriptions, the property's current value.
pub type Callback<C> = Rc<dyn Fn(&C, Option<&Value>)>;

/// A registered subscription.
pub struct Subscription<C> {
    id: SubscriptionId,
    key: SubscriptionKey,
    classification: Classification,
    identity: Option<NodeId>,
    active: Cell<bool>,
    callback: Callback<C>,
}

impl<C> Subscription<C> {
    pub(crate) fn new(
        key: SubscriptionKey,
        classification: Classification,
        identity: Option<NodeId>,
        callback: Callback<C>,
    ) -> Self {
        Self {
            id: SubscriptionId::new(),
            key,
            classification,
            identity,
            active: Cell::new(true),
            callback,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn key(&self) -> &SubscriptionKey {
        &self.key
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// The node this subscription belongs to, if any.
    pub fn identity(&self) -> Option<NodeId> {
        self.identity
    }

    /// False once the subscription has been removed from its bus.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub(crate) fn deactivate(&self) {
        self.active.set(false);
    }

    /// Invoke the callback, unless the subscription was removed.
    pub fn invoke(&self, ctx: &C, value: Option<&Value>) {
        if self.is_active() {
            (self.callback)(ctx, value);
        }
    }
}

impl<C> fmt::Debug for Subscription<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("classification", &self.classification)
            .field("identity", &self.identity)
            .field("active", &self.is_active())
            .finish()
    }
}
