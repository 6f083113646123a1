use indexmap::IndexMap;
use super::Schema;
use crate::error::SchemaError;

/// Object shape: per-field schemas plus the names that must be present.
/// Fields absent from `properties` are not constrained (open world).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    pub properties: IndexMap<String, Schema>,   // catalog order
    pub required: Vec<String>,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn require(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Shorthand for a required field with a schema.
    pub fn required_property(self, name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        self.property(name.clone(), schema).require(name)
    }
}

/// Array shape: element schema applied to every member, plus size bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayShape {
    pub items: Option<Box<Schema>>,   // None: any element
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl ArrayShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(mut self, schema: Schema) -> Self {
        self.items = Some(Box::new(schema));
        self
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn admits_len(&self, len: usize) -> bool {
        self.min_items.is_none_or(|min| len >= min) && self.max_items.is_none_or(|max| len <= max)
    }

    pub fn check_bounds(&self, at: &str) -> Result<(), SchemaError> {
        match (self.min_items, self.max_items) {
            (Some(min), Some(max)) if min > max => Err(SchemaError::InvertedBounds {
                at: at.to_string(),
                low: "minItems",
                low_value: min.to_string(),
                high: "maxItems",
                high_value: max.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
