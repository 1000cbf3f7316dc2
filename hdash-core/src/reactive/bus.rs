//! Subscription Bus
//!
//! An ordered list of subscriptions plus the notification loop.
//!
//! # Firing
//!
//! `notify` snapshots the matching subscriptions before invoking any of
//! them, then releases the list. Callbacks are therefore free to subscribe,
//! to write state (which re-enters `notify` depth-first), or to trigger
//! garbage collection. Subscriptions added while a notification is running
//! do not see that notification; subscriptions removed while it is running
//! are skipped.
//!
//! # Removal
//!
//! Removal never splices the live list in place. The surviving entries are
//! filtered into a new list, and removed entries are deactivated so that
//! any snapshot still holding them will not invoke them.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use super::subscriber::{Callback, Classification, Subscription, SubscriptionKey};
use crate::dom::NodeId;

/// Ordered subscription list, generic over the context passed to callbacks.
pub struct SubscriptionBus<C> {
    subscriptions: RefCell<Vec<Rc<Subscription<C>>>>,
}

impl<C> SubscriptionBus<C> {
    pub fn new() -> Self {
        Self {
            subscriptions: RefCell::new(Vec::new()),
        }
    }

    /// Append a subscription. It fires on every later matching notification.
    pub fn subscribe<F>(
        &self,
        key: SubscriptionKey,
        classification: Classification,
        identity: Option<NodeId>,
        callback: F,
    ) -> Rc<Subscription<C>>
    where
        F: Fn(&C, Option<&Value>) + 'static,
    {
        let callback: Callback<C> = Rc::new(callback);
        let subscription = Rc::new(Subscription::new(key, classification, identity, callback));
        trace!(
            id = ?subscription.id(),
            key = %subscription.key(),
            ?classification,
            ?identity,
            "subscribe"
        );
        self.subscriptions.borrow_mut().push(Rc::clone(&subscription));
        subscription
    }

    /// Fire every subscription registered under `key`, in registration order.
    ///
    /// Keyed subscriptions receive `lookup(property)`, read at the moment
    /// each one runs so that a nested write is visible to later subscribers.
    /// Wildcard subscriptions fire only for a wildcard notification and
    /// receive no value.
    pub fn notify<F>(&self, ctx: &C, key: &SubscriptionKey, lookup: F)
    where
        F: Fn(&str) -> Option<Value>,
    {
        let snapshot: Vec<Rc<Subscription<C>>> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|sub| sub.key() == key)
            .cloned()
            .collect();

        trace!(%key, count = snapshot.len(), "notify");

        for subscription in snapshot {
            match key {
                SubscriptionKey::Any => subscription.invoke(ctx, None),
                SubscriptionKey::Property(property) => {
                    let value = lookup(property);
                    subscription.invoke(ctx, value.as_ref());
                }
            }
        }
    }

    /// Remove every subscription tied to `identity`. Returns how many were
    /// removed.
    pub fn unsubscribe_by_identity(&self, identity: NodeId) -> usize {
        self.remove_where(|sub| sub.identity() == Some(identity))
    }

    /// Remove the subscriptions tied to `identity` that were installed by
    /// one kind of binding. Returns how many were removed.
    pub fn unsubscribe_by_identity_and_classification(
        &self,
        identity: NodeId,
        classification: Classification,
    ) -> usize {
        self.remove_where(|sub| {
            sub.identity() == Some(identity) && sub.classification() == classification
        })
    }

    fn remove_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Subscription<C>) -> bool,
    {
        let current = self.subscriptions.borrow().clone();
        let (removed, kept): (Vec<_>, Vec<_>) =
            current.into_iter().partition(|sub| predicate(&**sub));

        for sub in &removed {
            sub.deactivate();
        }
        *self.subscriptions.borrow_mut() = kept;

        if !removed.is_empty() {
            debug!(count = removed.len(), "unsubscribe");
        }
        removed.len()
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.subscriptions.borrow_mut());
        for sub in &removed {
            sub.deactivate();
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.borrow().is_empty()
    }

    /// Number of live subscriptions tied to `identity`.
    pub fn count_for(&self, identity: NodeId) -> usize {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|sub| sub.identity() == Some(identity))
            .count()
    }
}

impl<C> Default for SubscriptionBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use serde_json::json;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log, label: &str) -> impl Fn(&(), Option<&Value>) + 'static {
        let log = log.clone();
        let label = label.to_owned();
        move |_: &(), value: Option<&Value>| {
            let entry = match value {
                Some(v) => format!("{label}={v}"),
                None => label.clone(),
            };
            log.borrow_mut().push(entry);
        }
    }

    fn nodes(n: usize) -> Vec<NodeId> {
        let mut doc = Document::new();
        (0..n).map(|_| doc.create_element("div")).collect()
    }

    #[test]
    fn keyed_subscribers_fire_in_order_with_value() {
        let bus = SubscriptionBus::new();
        let log: Log = Rc::default();

        bus.subscribe("a".into(), Classification::Watcher, None, recorder(&log, "first"));
        bus.subscribe("b".into(), Classification::Watcher, None, recorder(&log, "other"));
        bus.subscribe("a".into(), Classification::Watcher, None, recorder(&log, "second"));

        bus.notify(&(), &"a".into(), |_| Some(json!(1)));
        assert_eq!(*log.borrow(), vec!["first=1", "second=1"]);
    }

    #[test]
    fn wildcard_fires_only_on_wildcard_notification() {
        let bus = SubscriptionBus::new();
        let log: Log = Rc::default();

        bus.subscribe(SubscriptionKey::Any, Classification::Watcher, None, recorder(&log, "any"));
        bus.subscribe("a".into(), Classification::Watcher, None, recorder(&log, "a"));

        bus.notify(&(), &"a".into(), |_| Some(json!("x")));
        assert_eq!(*log.borrow(), vec!["a=\"x\""]);

        bus.notify(&(), &SubscriptionKey::Any, |_| None);
        assert_eq!(*log.borrow(), vec!["a=\"x\"", "any"]);
    }

    #[test]
    fn unsubscribe_by_identity_and_classification() {
        let bus = SubscriptionBus::new();
        let log: Log = Rc::default();
        let ids = nodes(2);

        let text = recorder(&log, "text");
        let dir = recorder(&log, "dir");
        let keep = recorder(&log, "keep");
        bus.subscribe("a".into(), Classification::Interpolation, Some(ids[0]), text);
        bus.subscribe(SubscriptionKey::Any, Classification::Directive, Some(ids[0]), dir);
        bus.subscribe("a".into(), Classification::Interpolation, Some(ids[1]), keep);

        assert_eq!(
            bus.unsubscribe_by_identity_and_classification(ids[0], Classification::Directive),
            1
        );
        assert_eq!(bus.count_for(ids[0]), 1);

        assert_eq!(bus.unsubscribe_by_identity(ids[0]), 1);
        assert_eq!(bus.count_for(ids[0]), 0);
        assert_eq!(bus.len(), 1);

        bus.notify(&(), &"a".into(), |_| Some(json!(2)));
        bus.notify(&(), &SubscriptionKey::Any, |_| None);
        assert_eq!(*log.borrow(), vec!["keep=2"]);
    }

    #[test]
    fn removal_during_notification_skips_removed_entries() {
        let bus: Rc<SubscriptionBus<()>> = Rc::new(SubscriptionBus::new());
        let log: Log = Rc::default();
        let ids = nodes(1);
        let victim = ids[0];

        let remover = {
            let bus = Rc::downgrade(&bus);
            move |_: &(), _: Option<&Value>| {
                if let Some(bus) = bus.upgrade() {
                    bus.unsubscribe_by_identity(victim);
                }
            }
        };
        bus.subscribe(SubscriptionKey::Any, Classification::Watcher, None, remover);
        let doomed = recorder(&log, "victim");
        bus.subscribe(SubscriptionKey::Any, Classification::Directive, Some(victim), doomed);

        bus.notify(&(), &SubscriptionKey::Any, |_| None);
        assert!(log.borrow().is_empty());
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn subscriptions_added_during_notification_wait_for_next_round() {
        let bus: Rc<SubscriptionBus<()>> = Rc::new(SubscriptionBus::new());
        let log: Log = Rc::default();

        let adder = {
            let bus = Rc::downgrade(&bus);
            let log = log.clone();
            move |_: &(), _: Option<&Value>| {
                if let Some(bus) = bus.upgrade() {
                    let late = recorder(&log, "late");
                    bus.subscribe(SubscriptionKey::Any, Classification::Watcher, None, late);
                }
            }
        };
        bus.subscribe(SubscriptionKey::Any, Classification::Watcher, None, adder);

        bus.notify(&(), &SubscriptionKey::Any, |_| None);
        assert!(log.borrow().is_empty());

        bus.notify(&(), &SubscriptionKey::Any, |_| None);
        assert_eq!(*log.borrow(), vec!["late"]);
    }

    #[test]
    fn clear_deactivates_everything() {
        let bus = SubscriptionBus::new();
        let log: Log = Rc::default();
        let sub = bus.subscribe("a".into(), Classification::Watcher, None, recorder(&log, "a"));

        bus.clear();
        assert!(bus.is_empty());
        assert!(!sub.is_active());
        bus.notify(&(), &"a".into(), |_| Some(json!(0)));
        assert!(log.borrow().is_empty());
    }
}
