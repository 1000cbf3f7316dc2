//! Formatter pipelines.
//!
//! An interpolation expression is `property | formatterA | formatterB`.
//! The formatters are looked up in the host's table and composed left to
//! right; no formatters means the value passes through unchanged.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::{EngineError, Result};

/// A host-supplied value transform.
pub type Formatter = Rc<dyn Fn(Value) -> Value>;

/// Formatter name to formatter.
pub type FormatterTable = IndexMap<String, Formatter>;

/// Composed formatters for one expression.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: SmallVec<[Formatter; 2]>,
}

impl Pipeline {
    pub fn apply(&self, value: Value) -> Value {
        self.stages.iter().fold(value, |value, stage| stage(value))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("stages", &self.stages.len()).finish()
    }
}

/// A parsed `property | formatter...` expression.
#[derive(Debug, Clone)]
pub struct Expression {
    pub property: String,
    pub pipeline: Pipeline,
}

impl Expression {
    /// Split `source` on `|` and resolve every formatter name in `table`.
    pub fn parse(source: &str, table: &FormatterTable) -> Result<Self> {
        let mut parts = source.split('|').map(str::trim);
        let property = parts.next().unwrap_or_default();
        if property.is_empty() {
            return Err(EngineError::UnknownProperty(property.to_owned()));
        }

        let stages = parts
            .map(|name| {
                table
                    .get(name)
                    .cloned()
                    .ok_or_else(|| EngineError::FormatterNotFound(name.to_owned()))
            })
            .collect::<Result<SmallVec<[Formatter; 2]>>>()?;

        Ok(Self {
            property: property.to_owned(),
            pipeline: Pipeline { stages },
        })
    }
}

/// Text form of a value: strings verbatim, `null` as nothing, everything
/// else as JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
