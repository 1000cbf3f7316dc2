//! Directive Dispatcher
//!
//! Binds the directives found on one element:
//!
//! 1. decode each attribute through the engine's grammar,
//! 2. resolve the name in the registry,
//! 3. check the argument against the directive's policy,
//! 4. read the raw attribute value,
//! 5. run the behavior. A lifecycle directive also gets a wildcard
//!    subscription, tagged with the element, that re-runs `updated` after
//!    every state change.
//!
//! A failure in one attribute is reported and the remaining attributes are
//! still dispatched.

use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use super::attribute::DirectiveAttribute;
use super::registry::{ArgumentPolicy, Behavior};
use super::Invocation;
use crate::dom::NodeId;
use crate::engine::{Engine, SubscribeOptions};
use crate::error::{ArgumentMismatch, EngineError, Result};
use crate::reactive::SubscriptionKey;

/// Dispatch every directive on `element`, once.
///
/// Elements that were already dispatched and have not been purged since
/// are skipped, so repeated calls never stack subscriptions.
pub(crate) fn dispatch_element(engine: &Engine, element: NodeId) {
    if !engine.claim(element) {
        return;
    }

    let attributes = engine.document().borrow().attributes(element);
    for (attribute, _) in attributes {
        let directive = match engine.grammar().parse(&attribute) {
            None => continue,
            Some(Ok(directive)) => directive,
            Some(Err(err)) => {
                engine.report(&err, Some(element));
                continue;
            }
        };
        if let Err(err) = dispatch_directive(engine, element, directive) {
            engine.report(&err, Some(element));
        }
    }
}

fn dispatch_directive(
    engine: &Engine,
    element: NodeId,
    directive: DirectiveAttribute,
) -> Result<()> {
    let descriptor = engine
        .registry()
        .get(&directive.name)
        .ok_or_else(|| EngineError::DirectiveNotFound(directive.name.clone()))?;

    check_argument(&directive, descriptor.argument_policy)?;

    let attribute = engine.grammar().attribute_name(&directive);
    let value = engine
        .document()
        .borrow()
        .attribute(element, &attribute)
        .unwrap_or_default()
        .to_owned();

    let invocation = Invocation {
        element,
        name: directive.name,
        value,
        modifiers: directive.modifiers,
        argument: directive.argument,
    };
    debug!(directive = %invocation.name, element = element.raw(), "dispatch");

    match &descriptor.behavior {
        Behavior::Immediate(callback) => callback(engine, &invocation),
        Behavior::Lifecycle { ready, updated } => {
            ready(engine, &invocation)?;

            let updated = Arc::clone(updated);
            let invocation = Rc::new(invocation);
            engine.on(
                SubscriptionKey::Any,
                move |engine: &Engine, _| {
                    if let Err(err) = updated(engine, &invocation) {
                        engine.report(&err, Some(invocation.element));
                    }
                },
                SubscribeOptions::directive(element),
            )?;
            Ok(())
        }
    }
}

fn check_argument(directive: &DirectiveAttribute, policy: ArgumentPolicy) -> Result<()> {
    let reason = match (policy, &directive.argument) {
        (ArgumentPolicy::None, Some(argument)) => ArgumentMismatch::Unexpected(argument.clone()),
        (ArgumentPolicy::Required, None) => ArgumentMismatch::Missing,
        _ => return Ok(()),
    };
    Err(EngineError::ArgumentPolicy {
        name: directive.name.clone(),
        reason,
    })
}
