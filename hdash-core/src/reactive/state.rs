//! Reactive State
//!
//! [`State`] is a closed key/value store: its key set is fixed when it is
//! created, and any read or write of an undeclared key fails with
//! [`EngineError::UnknownProperty`].
//!
//! [`StateProxy`] is the only way application code touches state. A write
//! through the proxy stores the value, then notifies the bus twice: once
//! for the written key and once for the wildcard. Both notifications run
//! synchronously, so a subscriber that writes state again recurses
//! depth-first before the outer `set` returns. Bounding that recursion is
//! the caller's job.

use std::cell::RefCell;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use super::bus::SubscriptionBus;
use super::subscriber::SubscriptionKey;
use crate::error::{EngineError, Result};

/// Closed key/value store backing a proxy.
#[derive(Debug, Default)]
pub struct State {
    values: RefCell<IndexMap<String, Value>>,
}

impl State {
    /// Create a store whose key set is exactly the keys of `values`.
    pub fn new(values: IndexMap<String, Value>) -> Self {
        Self {
            values: RefCell::new(values),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }

    /// Read a declared key.
    pub fn read(&self, key: &str) -> Result<Value> {
        self.values
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::UnknownProperty(key.to_owned()))
    }

    /// Overwrite a declared key without notifying anyone.
    pub fn write(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.borrow_mut();
        let slot = values
            .get_mut(key)
            .ok_or_else(|| EngineError::UnknownProperty(key.to_owned()))?;
        *slot = value;
        Ok(())
    }

    /// Declared keys in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }

    /// A copy of every key/value pair.
    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.values.borrow().clone()
    }
}

/// Accessor that notifies a bus after every successful write.
///
/// `C` is the context handed to subscriber callbacks; the engine passes
/// itself.
pub struct StateProxy<'a, C> {
    state: &'a State,
    bus: &'a SubscriptionBus<C>,
    ctx: &'a C,
}

impl<'a, C> StateProxy<'a, C> {
    pub fn new(state: &'a State, bus: &'a SubscriptionBus<C>, ctx: &'a C) -> Self {
        Self { state, bus, ctx }
    }

    /// Current value of `key`.
    pub fn get(&self, key: &str) -> Result<Value> {
        self.state.read(key)
    }

    /// Store `value` under `key`, then notify `key` and the wildcard.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.state.write(key, value.into())?;
        trace!(key, "state write");

        let lookup = |property: &str| self.state.read(property).ok();
        self.bus
            .notify(self.ctx, &SubscriptionKey::Property(key.to_owned()), lookup);
        self.bus.notify(self.ctx, &SubscriptionKey::Any, lookup);
        Ok(())
    }

    /// Compute a new value from the current one and `set` it.
    pub fn update<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(&Value) -> Value,
    {
        let current = self.get(key)?;
        self.set(key, f(&current))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.contains(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.keys()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
