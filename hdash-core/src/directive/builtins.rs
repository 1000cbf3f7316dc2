//! Builtin directives.
//!
//! - `h-text="prop"` keeps an element's text content equal to `prop`.
//! - `h-attr:name="expr"` keeps attribute `name` equal to `expr`, where
//!   `expr` is either a literal (`'x'`, `42`, `true`) or a state property.
//!   `false` and `null` remove the attribute; `true` sets it empty.
//!
//! Both are lifecycle directives built on the public registry contract.

use serde_json::Value;

use super::registry::{ArgumentPolicy, DirectiveDescriptor, DirectiveRegistry};
use super::Invocation;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::interpolation::render_value;
use crate::parser::parse_literal;

pub(crate) fn register_all(registry: &DirectiveRegistry) {
    registry.register(
        "text",
        DirectiveDescriptor::lifecycle(ArgumentPolicy::None, render_text, render_text),
    );
    registry.register(
        "attr",
        DirectiveDescriptor::lifecycle(ArgumentPolicy::Required, sync_attribute, sync_attribute),
    );
}

fn render_text(engine: &Engine, invocation: &Invocation) -> Result<()> {
    let value = engine.state().get(invocation.value.trim())?;
    let text = render_value(&value);

    let mut document = engine.document().borrow_mut();
    if document.text_content(invocation.element) != text {
        document.set_text_content(invocation.element, &text)?;
    }
    Ok(())
}

fn sync_attribute(engine: &Engine, invocation: &Invocation) -> Result<()> {
    let name = invocation
        .argument
        .as_deref()
        .ok_or_else(|| EngineError::directive("attr", "missing attribute name"))?;
    let expression = invocation.value.trim();
    let value = match parse_literal(expression) {
        Some(literal) => literal,
        None => engine.state().get(expression)?,
    };

    let mut document = engine.document().borrow_mut();
    match value {
        Value::Null | Value::Bool(false) => {
            document.remove_attribute(invocation.element, name)?;
        }
        value => {
            let rendered = match value {
                Value::Bool(true) => String::new(),
                other => render_value(&other),
            };
            if document.attribute(invocation.element, name) != Some(rendered.as_str()) {
                document.set_attribute(invocation.element, name, &rendered)?;
            }
        }
    }
    Ok(())
}
