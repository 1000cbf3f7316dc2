//! Binding Engine
//!
//! The engine ties the pieces together for one root element:
//!
//! 1. A mutation observer is attached to the root, so DOM changes made by
//!    directives during the next steps are not missed.
//! 2. Watchers from the configuration are subscribed.
//! 3. Directives are dispatched on every element below the root.
//! 4. Every text node below the root is interpolated.
//!
//! After that, state writes go through [`Engine::state`] and propagate
//! synchronously, and [`Engine::process_mutations`] re-synchronizes
//! bindings with whatever happened to the document since the last call.
//!
//! # Bookkeeping
//!
//! The engine remembers which nodes currently carry bindings. Dispatch and
//! interpolation claim a node before binding it and skip nodes that are
//! already claimed; purging a detached node releases it. This is what
//! keeps repeated mutation records for the same node from stacking
//! duplicate subscriptions.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::bridge::{apply_batch, MutationBridge};
use crate::config::{Action, EngineConfig};
use crate::diagnostics::{Reporter, TracingReporter};
use crate::directive::{dispatch_element, AttributeGrammar, DirectiveRegistry, PrefixGrammar};
use crate::dom::{NodeId, SharedDocument};
use crate::error::{EngineError, Result};
use crate::interpolation::{interpolate_subtree, FormatterTable};
use crate::reactive::{
    Classification, State, StateProxy, SubscriptionBus, SubscriptionId, SubscriptionKey,
};

/// Where an engine is mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root {
    Element(NodeId),
    /// First element matching a selector. Only compounds of `tag`, `#id`
    /// and `.class` are understood (see
    /// [`Document::query_selector`](crate::dom::Document::query_selector));
    /// anything else fails construction with its own message.
    Selector(String),
}

impl From<NodeId> for Root {
    fn from(node: NodeId) -> Self {
        Self::Element(node)
    }
}

impl From<&str> for Root {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for Root {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

/// How [`Engine::on`] installs a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Invoke the callback once with the current value before returning.
    pub immediate: bool,
    pub classification: Classification,
    /// Node the subscription is collected with.
    pub identity: Option<NodeId>,
}

impl SubscribeOptions {
    /// A plain watcher: not immediate, not tied to a node.
    pub fn watcher() -> Self {
        Self {
            immediate: false,
            classification: Classification::Watcher,
            identity: None,
        }
    }

    /// A directive update hook owned by `element`.
    pub fn directive(element: NodeId) -> Self {
        Self {
            immediate: false,
            classification: Classification::Directive,
            identity: Some(element),
        }
    }

    /// An interpolation binding owned by text node `node`; fires at once.
    pub fn interpolation(node: NodeId) -> Self {
        Self {
            immediate: true,
            classification: Classification::Interpolation,
            identity: Some(node),
        }
    }

    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self::watcher()
    }
}

struct Inner {
    document: SharedDocument,
    root: NodeId,
    state: State,
    bus: SubscriptionBus<Engine>,
    actions: IndexMap<String, Action>,
    formatters: FormatterTable,
    registry: Arc<DirectiveRegistry>,
    reporter: Rc<dyn Reporter>,
    grammar: Box<dyn AttributeGrammar>,
    bound: RefCell<HashSet<NodeId>>,
    bridge: MutationBridge,
}

/// A reactive binding engine mounted on one element.
///
/// Cloning an engine yields another handle to the same instance.
#[derive(Clone)]
pub struct Engine {
    inner: Rc<Inner>,
}

impl Engine {
    /// Mount an engine on `root` inside `document`.
    ///
    /// Fails with [`EngineError::Construction`] when the state is not an
    /// object or the root does not resolve to an element, and with
    /// [`EngineError::UnknownProperty`] when a watcher names an undeclared
    /// key. Errors in markup do not fail construction; they go to the
    /// configured reporter.
    pub fn new(
        document: SharedDocument,
        root: impl Into<Root>,
        config: EngineConfig,
    ) -> Result<Self> {
        let EngineConfig {
            state,
            state_error,
            actions,
            watchers,
            formatters,
            registry,
            reporter,
            grammar,
        } = config;

        if let Some(message) = state_error {
            return Err(EngineError::Construction(message));
        }
        let root = resolve_root(&document, root.into())?;
        let observer = document.borrow_mut().observe(root);

        let engine = Engine {
            inner: Rc::new(Inner {
                document,
                root,
                state: State::new(state),
                bus: SubscriptionBus::new(),
                actions,
                formatters,
                registry: registry.unwrap_or_else(DirectiveRegistry::global),
                reporter: reporter.unwrap_or_else(|| Rc::new(TracingReporter) as Rc<dyn Reporter>),
                grammar: grammar.unwrap_or_else(|| {
                    Box::new(PrefixGrammar::default()) as Box<dyn AttributeGrammar>
                }),
                bound: RefCell::new(HashSet::new()),
                bridge: MutationBridge::new(observer),
            }),
        };

        for (key, callback) in watchers {
            engine.on(
                key,
                move |engine: &Engine, value: Option<&Value>| callback(engine, value),
                SubscribeOptions::watcher(),
            )?;
        }

        let elements: Vec<NodeId> = {
            let document = engine.document().borrow();
            let elements = document
                .descendants(root)
                .into_iter()
                .filter(|id| document.is_element(*id))
                .collect();
            elements
        };
        for element in elements {
            dispatch_element(&engine, element);
        }
        interpolate_subtree(&engine, root);

        debug!(
            root = root.raw(),
            subscriptions = engine.subscription_count(),
            "engine mounted"
        );
        Ok(engine)
    }

    /// The reactive state. Writes through the returned proxy notify
    /// subscribers before they return.
    pub fn state(&self) -> StateProxy<'_, Engine> {
        StateProxy::new(&self.inner.state, &self.inner.bus, self)
    }

    /// Subscribe `callback` to `key`.
    ///
    /// Keyed subscriptions must name a declared property. With
    /// `options.immediate`, the callback runs once with the current value
    /// before this returns.
    pub fn on<F>(
        &self,
        key: SubscriptionKey,
        callback: F,
        options: SubscribeOptions,
    ) -> Result<SubscriptionId>
    where
        F: Fn(&Engine, Option<&Value>) + 'static,
    {
        if let SubscriptionKey::Property(property) = &key {
            if !self.inner.state.contains(property) {
                return Err(EngineError::UnknownProperty(property.clone()));
            }
        }

        let subscription = self.inner.bus.subscribe(
            key,
            options.classification,
            options.identity,
            callback,
        );

        if options.immediate {
            let value = match subscription.key() {
                SubscriptionKey::Any => None,
                SubscriptionKey::Property(property) => Some(self.inner.state.read(property)?),
            };
            subscription.invoke(self, value.as_ref());
        }
        Ok(subscription.id())
    }

    /// Watch `key` (the empty string watches every change).
    pub fn watch<F>(&self, key: &str, callback: F) -> Result<SubscriptionId>
    where
        F: Fn(&Engine, Option<&Value>) + 'static,
    {
        self.on(SubscriptionKey::from(key), callback, SubscribeOptions::watcher())
    }

    /// Run the action registered as `name`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let action = self
            .inner
            .actions
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownAction(name.to_owned()))?;
        action(self, args)
    }

    /// Deliver pending mutation records and re-synchronize bindings.
    /// Returns the number of records processed.
    pub fn process_mutations(&self) -> usize {
        let batch = self.inner.bridge.take_batch();
        apply_batch(self, &batch);
        batch.len()
    }

    /// Tear the engine down: drop every subscription and stop observing.
    pub fn dispose(&self) {
        self.inner.bus.clear();
        self.inner.bridge.disconnect();
        self.inner.bound.borrow_mut().clear();
        debug!(root = self.inner.root.raw(), "engine disposed");
    }

    pub fn document(&self) -> &SharedDocument {
        &self.inner.document
    }

    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        &self.inner.registry
    }

    pub fn formatters(&self) -> &FormatterTable {
        &self.inner.formatters
    }

    pub fn grammar(&self) -> &dyn AttributeGrammar {
        self.inner.grammar.as_ref()
    }

    /// Send a binding error to the configured reporter.
    pub fn report(&self, error: &EngineError, node: Option<NodeId>) {
        self.inner.reporter.report(error, node);
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.bus.len()
    }

    /// Number of live subscriptions owned by `node`.
    pub fn subscriptions_for(&self, node: NodeId) -> usize {
        self.inner.bus.count_for(node)
    }

    /// Whether `node` currently carries bindings installed by this engine.
    pub fn is_bound(&self, node: NodeId) -> bool {
        self.inner.bound.borrow().contains(&node)
    }

    pub(crate) fn bus(&self) -> &SubscriptionBus<Engine> {
        &self.inner.bus
    }

    /// Mark `node` as bound. False if it already was.
    pub(crate) fn claim(&self, node: NodeId) -> bool {
        self.inner.bound.borrow_mut().insert(node)
    }

    pub(crate) fn forget(&self, node: NodeId) {
        self.inner.bound.borrow_mut().remove(&node);
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.inner.root)
            .field("state", &self.inner.state.snapshot())
            .field("subscriptions", &self.inner.bus.len())
            .field("bound", &self.inner.bound.borrow().len())
            .finish()
    }
}

fn resolve_root(document: &SharedDocument, root: Root) -> Result<NodeId> {
    let document = document.borrow();
    match root {
        Root::Element(node) if document.is_element(node) => Ok(node),
        Root::Element(node) => Err(EngineError::Construction(format!(
            "node {} is not an element",
            node.raw()
        ))),
        Root::Selector(selector) => document
            .try_query_selector(&selector)
            .map_err(|err| EngineError::Construction(err.to_string()))?
            .ok_or_else(|| {
                EngineError::Construction(format!("no element matches \"{selector}\""))
            }),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
