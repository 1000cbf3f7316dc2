//! Interpolation
//!
//! Text nodes containing `{ expression }` markers are bound to state. Each
//! distinct expression in a node becomes one keyed subscription on its
//! property, installed with immediate firing so the node renders before
//! any write happens. All subscriptions of a node share one [`Template`]
//! holding the node's original text; every firing re-renders from that
//! template and writes the node only when the text actually changed.
//!
//! Errors (unknown property, unknown formatter) cancel only the offending
//! expression; its marker stays verbatim and the other expressions of the
//! node are still bound.

mod pipeline;
mod template;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

pub use pipeline::{render_value, Expression, Formatter, FormatterTable, Pipeline};
pub use template::Template;

use crate::dom::NodeId;
use crate::engine::{Engine, SubscribeOptions};
use crate::error::{EngineError, Result};
use crate::reactive::SubscriptionKey;

/// Bind every text node inside `node` (or `node` itself, for a text node).
pub(crate) fn interpolate_subtree(engine: &Engine, node: NodeId) {
    let text_nodes = engine.document().borrow().text_nodes(node);
    for text_node in text_nodes {
        interpolate_node(engine, text_node);
    }
}

/// Bind the markers of one text node, once.
pub(crate) fn interpolate_node(engine: &Engine, node: NodeId) {
    let (text, owner) = {
        let document = engine.document().borrow();
        match document.text(node) {
            Some(text) => (text.to_owned(), document.parent(node)),
            None => return,
        }
    };

    let template = Template::parse(&text);
    if !template.has_markers() || !engine.claim(node) {
        return;
    }

    let expressions = template.expressions();
    debug!(node = node.raw(), count = expressions.len(), "interpolate");

    let template = Rc::new(RefCell::new(template));
    for source in expressions {
        if let Err(err) = bind_expression(engine, node, &template, source) {
            engine.report(&err, owner.or(Some(node)));
        }
    }
}

fn bind_expression(
    engine: &Engine,
    node: NodeId,
    template: &Rc<RefCell<Template>>,
    source: String,
) -> Result<()> {
    let Expression { property, pipeline } = Expression::parse(&source, engine.formatters())?;
    let template = Rc::clone(template);

    engine.on(
        SubscriptionKey::Property(property),
        move |engine: &Engine, value: Option<&Value>| {
            let value = value.cloned().unwrap_or(Value::Null);
            let rendered = render_value(&pipeline.apply(value));
            let text = template.borrow_mut().patch(&source, rendered);

            let result = {
                let mut document = engine.document().borrow_mut();
                if document.text(node) == Some(text.as_str()) {
                    Ok(())
                } else {
                    document.set_text(node, &text)
                }
            };
            if let Err(err) = result {
                engine.report(&EngineError::from(err), Some(node));
            }
        },
        SubscribeOptions::interpolation(node),
    )?;
    Ok(())
}
