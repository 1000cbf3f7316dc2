//! Hdash Core
//!
//! This crate provides the core runtime for the Hdash reactive DOM-binding
//! engine. It attaches attribute-driven behaviors ("directives") and
//! `{ expression }` text interpolation to an existing document subtree and
//! keeps them synchronized with a mutable state object.
//!
//! It implements:
//!
//! - A closed, reactive state store and its subscription bus
//! - A directive registry and dispatcher with argument-policy checks
//! - Text interpolation with formatter pipelines
//! - Mutation-driven incremental re-binding and garbage collection
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: State store, state proxy, subscriptions and the bus
//! - `dom`: The in-memory host document and its mutation observer
//! - `directive`: Attribute grammar, registry, dispatcher, builtins
//! - `interpolation`: Marker templates and formatter pipelines
//! - `engine`: Construction, subscriptions, actions, teardown
//!
//! # Example
//!
//! ```rust
//! use hdash_core::dom::{shared, Document};
//! use hdash_core::{Engine, EngineConfig};
//!
//! let mut document = Document::new();
//! let app = document.create_element("div");
//! document.set_attribute(app, "id", "app").unwrap();
//! let greeting = document.create_text("Hello, { name }!");
//! document.append_child(document.root(), app).unwrap();
//! document.append_child(app, greeting).unwrap();
//!
//! let document = shared(document);
//! let engine = Engine::new(
//!     document.clone(),
//!     "#app",
//!     EngineConfig::new().value("name", "Ada"),
//! )
//! .unwrap();
//! assert_eq!(document.borrow().text(greeting), Some("Hello, Ada!"));
//!
//! engine.state().set("name", "Grace").unwrap();
//! assert_eq!(document.borrow().text(greeting), Some("Hello, Grace!"));
//! ```

pub mod config;
pub mod diagnostics;
pub mod directive;
pub mod dom;
pub mod engine;
pub mod error;
pub mod interpolation;
pub mod parser;
pub mod reactive;

mod bridge;

pub use config::{Action, EngineConfig};
pub use diagnostics::{CollectingReporter, Diagnostic, Reporter, TracingReporter};
pub use directive::{
    register, ArgumentPolicy, Behavior, DirectiveDescriptor, DirectiveRegistry, Invocation,
    Modifiers,
};
pub use engine::{Engine, Root, SubscribeOptions};
pub use error::{ArgumentMismatch, EngineError, Result};
pub use reactive::{Classification, SubscriptionKey};
