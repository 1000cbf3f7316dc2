//! Reactive Primitives
//!
//! This module implements the state-change side of the engine: a closed
//! state store, the proxy that guards it, and the subscription bus that
//! fans writes out to bindings.
//!
//! # Concepts
//!
//! ## State
//!
//! The state is a fixed set of named values. The key set is decided when
//! the engine is constructed and never grows; touching an undeclared key is
//! an error rather than a silent insert.
//!
//! ## Subscriptions
//!
//! A subscription is a callback keyed by a property name or by the wildcard.
//! Each one is tagged with what installed it (a directive, an interpolation
//! binding, a watcher) and, for bindings, the document node it belongs to.
//! Those tags are how the engine finds subscriptions again when their node
//! leaves the document.
//!
//! # Implementation Notes
//!
//! Propagation is synchronous and unbatched: `set` returns only after every
//! subscriber, and every write those subscribers made, has run.

mod bus;
mod state;
mod subscriber;

pub use bus::SubscriptionBus;
pub use state::{State, StateProxy};
pub use subscriber::{Callback, Classification, Subscription, SubscriptionId, SubscriptionKey};
