use ordered_float::OrderedFloat;
use regex::Regex;
use serde_json::Value;

use crate::error::SchemaError;
use crate::node::{self, NodeKind, TreeNode};

/// Runtime kind a type constraint can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Integer,   // a number without a fractional part
    Number,    // any number, integral or not
    String,
    Array,
    Object,
}

impl Kind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "null" => Kind::Null,
            "boolean" => Kind::Boolean,
            "integer" => Kind::Integer,
            "number" => Kind::Number,
            "string" => Kind::String,
            "array" => Kind::Array,
            "object" => Kind::Object,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    pub fn admits<N: TreeNode>(self, node: &N) -> bool {
        match (self, node.kind()) {
            (Kind::Null, NodeKind::Null)
            | (Kind::Boolean, NodeKind::Boolean)
            | (Kind::Number, NodeKind::Number)
            | (Kind::String, NodeKind::String)
            | (Kind::Array, NodeKind::Array)
            | (Kind::Object, NodeKind::Object) => true,
            (Kind::Integer, NodeKind::Number) => node.is_integer(),
            _ => false,
        }
    }
}

/// Full-match regular expression. The source is kept for display and
/// equality; the compiled form is anchored at both ends.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source, regex })
    }

    /// Pattern matching exactly `literal`, e.g. a `type` discriminator.
    pub fn exact(literal: &str) -> Self {
        let source = format!("^{}$", regex::escape(literal));
        let regex = Regex::new(&source).expect("escaped literal is a valid regex");
        Self { source, regex }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Leaf constraint: kind, string pattern, enumeration, numeric bounds.
/// Every field is optional; an all-`None` constraint accepts anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeConstraint {
    pub kind: Option<Kind>,
    pub pattern: Option<Pattern>,               // strings only
    pub choices: Option<Vec<Value>>,            // `enum`
    pub minimum: Option<OrderedFloat<f64>>,     // inclusive, numbers only
    pub maximum: Option<OrderedFloat<f64>>,     // inclusive, numbers only
}

impl TypeConstraint {
    pub fn of(kind: Kind) -> Self {
        Self { kind: Some(kind), ..Self::default() }
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn choices(mut self, choices: impl IntoIterator<Item = Value>) -> Self {
        self.choices = Some(choices.into_iter().collect());
        self
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(OrderedFloat(minimum));
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(OrderedFloat(maximum));
        self
    }

    pub fn check_bounds(&self, at: &str) -> Result<(), SchemaError> {
        match (self.minimum, self.maximum) {
            (Some(min), Some(max)) if min > max => Err(SchemaError::InvertedBounds {
                at: at.to_string(),
                low: "minimum",
                low_value: min.to_string(),
                high: "maximum",
                high_value: max.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn admits<N: TreeNode>(&self, node: &N) -> bool {
        if let Some(kind) = self.kind {
            if !kind.admits(node) {
                return false;
            }
        }
        if let Some(pattern) = &self.pattern {
            match node.as_str() {
                Some(text) if pattern.is_match(text) => {}
                _ => return false,
            }
        }
        if let Some(choices) = &self.choices {
            if !choices.iter().any(|lit| node::equals_literal(node, lit)) {
                return false;
            }
        }
        if self.minimum.is_some() || self.maximum.is_some() {
            let Some(n) = node.as_f64() else { return false };
            let n = OrderedFloat(n);
            if self.minimum.is_some_and(|min| n < min) || self.maximum.is_some_and(|max| n > max) {
                return false;
            }
        }
        true
    }
}
