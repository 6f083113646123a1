//! The read-only view of a tree the matcher needs.
//!
//! Any tree that can say what kind a value is, list an object's fields and
//! an array's elements, and hand out scalar payloads can be matched.
//! `serde_json::Value` is the common case and is implemented here.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

pub trait TreeNode: Sized {
    fn kind(&self) -> NodeKind;

    /// Value of field `name` if this is an object carrying it.
    fn field(&self, name: &str) -> Option<&Self>;

    /// Fields in document order; empty unless this is an object.
    fn fields(&self) -> impl Iterator<Item = (&str, &Self)>;

    /// Elements; empty unless this is an array.
    fn elements(&self) -> &[Self];

    fn as_str(&self) -> Option<&str>;
    fn as_f64(&self) -> Option<f64>;
    fn as_bool(&self) -> Option<bool>;

    /// Number without a fractional part.
    fn is_integer(&self) -> bool;

    /// The `type` discriminator, if any.
    fn type_tag(&self) -> Option<&str> {
        self.field("type")?.as_str()
    }
}

impl TreeNode for Value {
    fn kind(&self) -> NodeKind {
        match self {
            Value::Null => NodeKind::Null,
            Value::Bool(_) => NodeKind::Boolean,
            Value::Number(_) => NodeKind::Number,
            Value::String(_) => NodeKind::String,
            Value::Array(_) => NodeKind::Array,
            Value::Object(_) => NodeKind::Object,
        }
    }

    fn field(&self, name: &str) -> Option<&Self> {
        self.as_object()?.get(name)
    }

    fn fields(&self) -> impl Iterator<Item = (&str, &Self)> {
        self.as_object()
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    fn elements(&self) -> &[Self] {
        match self {
            Value::Array(xs) => xs,
            _ => &[],
        }
    }

    fn as_str(&self) -> Option<&str> {
        Value::as_str(self)
    }

    fn as_f64(&self) -> Option<f64> {
        Value::as_f64(self)
    }

    fn as_bool(&self) -> Option<bool> {
        Value::as_bool(self)
    }

    fn is_integer(&self) -> bool {
        match self {
            Value::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        }
    }
}

/// Structural equality between a tree value and a JSON literal (`enum`).
/// Numbers compare by value, so `1` equals `1.0`.
pub fn equals_literal<N: TreeNode>(node: &N, literal: &Value) -> bool {
    match (node.kind(), literal) {
        (NodeKind::Null, Value::Null) => true,
        (NodeKind::Boolean, Value::Bool(b)) => node.as_bool() == Some(*b),
        (NodeKind::Number, Value::Number(n)) => node.as_f64().is_some() && node.as_f64() == n.as_f64(),
        (NodeKind::String, Value::String(s)) => node.as_str() == Some(s.as_str()),
        (NodeKind::Array, Value::Array(xs)) => {
            let elems = node.elements();
            elems.len() == xs.len() && elems.iter().zip(xs).all(|(e, x)| equals_literal(e, x))
        }
        (NodeKind::Object, Value::Object(map)) => {
            node.fields().count() == map.len()
                && map.iter().all(|(k, v)| node.field(k).is_some_and(|f| equals_literal(f, v)))
        }
        _ => false,
    }
}
