//! Text templates.
//!
//! A template is the original text of a node split into literal runs and
//! `{ expression }` markers. Rendering always starts from these immutable
//! segments, substituting the latest rendered value of each expression, so
//! several expressions sharing one text node never overwrite each other.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Marker { raw: String, expression: String },
}

/// Parsed text of one node plus the current rendering of each expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    rendered: IndexMap<String, String>,
}

impl Template {
    /// Split `text` into literals and markers. A marker is `{`, a non-blank
    /// body without braces, and `}`; its expression is the trimmed body.
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find(['{', '}']) {
                Some(close)
                    if after.as_bytes()[close] == b'}' && !after[..close].trim().is_empty() =>
                {
                    literal.push_str(&rest[..open]);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Marker {
                        raw: rest[open..open + close + 2].to_owned(),
                        expression: after[..close].trim().to_owned(),
                    });
                    rest = &after[close + 1..];
                }
                _ => {
                    literal.push_str(&rest[..=open]);
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            segments,
            rendered: IndexMap::new(),
        }
    }

    /// Whether `text` holds at least one marker.
    pub fn contains_marker(text: &str) -> bool {
        Self::parse(text).has_markers()
    }

    pub fn has_markers(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Marker { .. }))
    }

    /// Distinct expressions in first-appearance order.
    pub fn expressions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for segment in &self.segments {
            if let Segment::Marker { expression, .. } = segment {
                if !out.contains(expression) {
                    out.push(expression.clone());
                }
            }
        }
        out
    }

    /// Record the rendering of `expression` and return the full text.
    pub fn patch(&mut self, expression: &str, rendered: String) -> String {
        self.rendered.insert(expression.to_owned(), rendered);
        self.render()
    }

    /// The original text with every rendered expression substituted.
    /// Markers whose expression has not rendered yet stay verbatim.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Marker { raw, expression } => match self.rendered.get(expression) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(raw),
                },
            }
        }
        out
    }
}
