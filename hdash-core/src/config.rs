//! Engine configuration.
//!
//! Everything an engine is built from besides the document and the root:
//! initial state, actions, watchers, formatters, and the pluggable
//! collaborators (directive registry, diagnostic reporter, attribute
//! grammar).

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::Reporter;
use crate::directive::{AttributeGrammar, DirectiveRegistry};
use crate::engine::Engine;
use crate::error::Result;
use crate::interpolation::{Formatter, FormatterTable};
use crate::reactive::{Callback, SubscriptionKey};

/// A named operation invoked through [`Engine::call`].
pub type Action = Rc<dyn Fn(&Engine, &[Value]) -> Result<Value>>;

/// Builder for [`Engine::new`].
#[derive(Default)]
pub struct EngineConfig {
    pub(crate) state: IndexMap<String, Value>,
    pub(crate) state_error: Option<String>,
    pub(crate) actions: IndexMap<String, Action>,
    pub(crate) watchers: Vec<(SubscriptionKey, Callback<Engine>)>,
    pub(crate) formatters: FormatterTable,
    pub(crate) registry: Option<Arc<DirectiveRegistry>>,
    pub(crate) reporter: Option<Rc<dyn Reporter>>,
    pub(crate) grammar: Option<Box<dyn AttributeGrammar>>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the state from anything that serializes to a JSON object.
    /// Its keys become the engine's fixed key set. Anything else makes
    /// [`Engine::new`] fail with a construction error.
    pub fn state<T: Serialize>(mut self, state: &T) -> Self {
        match serde_json::to_value(state) {
            Ok(Value::Object(map)) => {
                self.state.extend(map);
            }
            Ok(other) => {
                self.state_error = Some(format!("state must be an object, got {other}"));
            }
            Err(err) => {
                self.state_error = Some(format!("state does not serialize: {err}"));
            }
        }
        self
    }

    /// Declare one state key.
    pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }

    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Engine, &[Value]) -> Result<Value> + 'static,
    {
        self.actions.insert(name.into(), Rc::new(action));
        self
    }

    /// Subscribe `callback` to `key` for the engine's whole lifetime. The
    /// empty key watches every change.
    pub fn watcher<F>(mut self, key: impl Into<SubscriptionKey>, callback: F) -> Self
    where
        F: Fn(&Engine, Option<&Value>) + 'static,
    {
        let callback: Callback<Engine> = Rc::new(callback);
        self.watchers.push((key.into(), callback));
        self
    }

    pub fn formatter<F>(mut self, name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(Value) -> Value + 'static,
    {
        let formatter: Formatter = Rc::new(formatter);
        self.formatters.insert(name.into(), formatter);
        self
    }

    /// Resolve directives in `registry` instead of the process-wide one.
    pub fn registry(mut self, registry: Arc<DirectiveRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Send diagnostics to `reporter` instead of `tracing`.
    pub fn reporter<R: Reporter + 'static>(mut self, reporter: R) -> Self {
        self.reporter = Some(Rc::new(reporter));
        self
    }

    /// Decode directive attributes with `grammar` instead of the `h-` prefix
    /// grammar.
    pub fn grammar<G: AttributeGrammar + 'static>(mut self, grammar: G) -> Self {
        self.grammar = Some(Box::new(grammar));
        self
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("state", &self.state)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("watchers", &self.watchers.len())
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .field("custom_registry", &self.registry.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Counter {
        count: u32,
        label: &'static str,
    }

    #[test]
    fn state_from_serializable_struct_keeps_field_order() {
        let config = EngineConfig::new().state(&Counter { count: 1, label: "n" });
        assert!(config.state_error.is_none());
        assert_eq!(config.state.keys().collect::<Vec<_>>(), vec!["count", "label"]);
        assert_eq!(config.state["count"], json!(1));
    }

    #[test]
    fn non_object_state_is_recorded_as_error() {
        let config = EngineConfig::new().state(&vec![1, 2]);
        assert!(config.state_error.is_some());
    }

    #[test]
    fn builder_collects_tables() {
        let config = EngineConfig::new()
            .value("a", 1)
            .action("noop", |_, _| Ok(Value::Null))
            .watcher("a", |_, _| {})
            .formatter("id", |v| v);
        assert_eq!(config.state.len(), 1);
        assert!(config.actions.contains_key("noop"));
        assert_eq!(config.watchers.len(), 1);
        assert!(config.formatters.contains_key("id"));
    }
}
