//! Strongly-typed schema model. Catalog JSON never reaches the matcher;
//! it is lowered into these types first (see `lower`).
//!
//! A schema is a closed sum of kinds. Named schemas refer to each other
//! only through [`Schema::Ref`], which the registry resolves lazily at match
//! time, so recursive node types never get inlined.
pub mod kind;
pub mod shape;

pub use kind::{Kind, Pattern, TypeConstraint};
pub use shape::{ArrayShape, ObjectShape};

use crate::error::SchemaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Any,                     // `{}`: accepts every node
    Ref(String),             // resolved through the registry
    Type(TypeConstraint),
    Object(ObjectShape),
    Array(ArrayShape),
    AllOf(Vec<Schema>),      // every part must accept
    AnyOf(Vec<Schema>),      // at least one part must accept
}

impl Schema {
    pub fn reference(name: impl Into<String>) -> Self {
        Schema::Ref(name.into())
    }

    pub fn of_kind(kind: Kind) -> Self {
        Schema::Type(TypeConstraint::of(kind))
    }

    pub fn null() -> Self {
        Self::of_kind(Kind::Null)
    }

    pub fn all_of(parts: impl IntoIterator<Item = Schema>) -> Self {
        Schema::AllOf(parts.into_iter().collect())
    }

    pub fn any_of(parts: impl IntoIterator<Item = Schema>) -> Self {
        Schema::AnyOf(parts.into_iter().collect())
    }

    /// `self` or `null`.
    pub fn nullable(self) -> Self {
        Schema::AnyOf(vec![self, Schema::null()])
    }

    /// Reject structures the catalog form could never produce: empty
    /// `AllOf`/`AnyOf` and inverted length or numeric bounds, at any depth.
    /// References are not followed.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validate_at("#")
    }

    fn validate_at(&self, at: &str) -> Result<(), SchemaError> {
        match self {
            Schema::Any | Schema::Ref(_) => Ok(()),
            Schema::Type(constraint) => constraint.check_bounds(at),
            Schema::Object(shape) => shape
                .properties
                .iter()
                .try_for_each(|(name, sub)| sub.validate_at(&format!("{at}/properties/{name}"))),
            Schema::Array(shape) => {
                shape.check_bounds(at)?;
                match &shape.items {
                    Some(item) => item.validate_at(&format!("{at}/items")),
                    None => Ok(()),
                }
            }
            Schema::AllOf(parts) => validate_list(parts, "allOf", at),
            Schema::AnyOf(parts) => validate_list(parts, "anyOf", at),
        }
    }

    /// Every name referenced anywhere inside this schema, in encounter order.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'s>(&'s self, out: &mut Vec<&'s str>) {
        match self {
            Schema::Any | Schema::Type(_) => {}
            Schema::Ref(name) => out.push(name),
            Schema::Object(shape) => {
                for sub in shape.properties.values() {
                    sub.collect_references(out);
                }
            }
            Schema::Array(shape) => {
                if let Some(item) = &shape.items {
                    item.collect_references(out);
                }
            }
            Schema::AllOf(parts) | Schema::AnyOf(parts) => {
                for part in parts {
                    part.collect_references(out);
                }
            }
        }
    }
}

fn validate_list(parts: &[Schema], keyword: &'static str, at: &str) -> Result<(), SchemaError> {
    if parts.is_empty() {
        return Err(SchemaError::EmptyComposition { at: at.to_string(), keyword });
    }
    parts
        .iter()
        .enumerate()
        .try_for_each(|(i, part)| part.validate_at(&format!("{at}/{keyword}/{i}")))
}

impl From<TypeConstraint> for Schema {
    fn from(value: TypeConstraint) -> Self { Schema::Type(value) }
}

impl From<ObjectShape> for Schema {
    fn from(value: ObjectShape) -> Self { Schema::Object(value) }
}

impl From<ArrayShape> for Schema {
    fn from(value: ArrayShape) -> Self { Schema::Array(value) }
}

/// A schema as stored in the registry: the schema plus its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDef {
    pub id: Option<String>,  // defaulted to the registration name
    pub schema: Schema,
}

impl SchemaDef {
    pub fn new(schema: Schema) -> Self {
        Self { id: None, schema }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl From<Schema> for SchemaDef {
    fn from(schema: Schema) -> Self { Self::new(schema) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_collected_through_every_combinator() {
        let schema = Schema::all_of([
            Schema::reference("Node"),
            ObjectShape::new()
                .property("callee", Schema::reference("Expression"))
                .property("arguments", ArrayShape::new().items(Schema::reference("Expression")).into())
                .property("id", Schema::reference("Identifier").nullable())
                .into(),
        ]);
        assert_eq!(
            schema.references(),
            vec!["Node", "Expression", "Expression", "Identifier"]
        );
    }

    #[test]
    fn nullable_wraps_in_union_with_null() {
        let s = Schema::reference("Identifier").nullable();
        match s {
            Schema::AnyOf(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[1], Schema::null());
            }
            other => panic!("expected a union, got {other:?}"),
        }
    }

    #[test]
    fn validate_reports_nested_empty_compositions() {
        let schema = Schema::all_of([
            Schema::reference("Node"),
            ObjectShape::new().property("body", Schema::any_of([])).into(),
        ]);
        assert_eq!(
            schema.validate(),
            Err(SchemaError::EmptyComposition { at: "#/allOf/1/properties/body".into(), keyword: "anyOf" })
        );
        assert!(matches!(
            Schema::AllOf(vec![]).validate(),
            Err(SchemaError::EmptyComposition { keyword: "allOf", .. })
        ));
    }

    #[test]
    fn validate_reports_inverted_bounds_inside_items() {
        let schema: Schema = ArrayShape::new()
            .items(ArrayShape::new().min_items(3).max_items(2).into())
            .into();
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::InvertedBounds { ref at, low: "minItems", .. }) if at == "#/items"
        ));
        assert_eq!(Schema::reference("Missing").validate(), Ok(()));
        assert_eq!(Schema::Any.validate(), Ok(()));
    }
}
