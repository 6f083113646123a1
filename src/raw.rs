//! Declarative catalog format: the JSON-Schema keyword subset, as written.
//! Unknown keywords (`description`, `$schema`, ...) are ignored.
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::schema::Kind;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSchema {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "$ref")]
    pub reference: Option<String>,
    #[serde(default, rename = "type")]
    pub type_: Option<RawType>,

    // strings / scalars
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default, rename = "enum")]
    pub enum_: Option<Vec<Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,

    // objects
    #[serde(default)]
    pub properties: Option<IndexMap<String, RawSchema>>,
    #[serde(default)]
    pub required: Option<Vec<String>>,

    // arrays
    #[serde(default)]
    pub items: Option<Box<RawSchema>>,
    #[serde(default, rename = "minItems")]
    pub min_items: Option<u64>,
    #[serde(default, rename = "maxItems")]
    pub max_items: Option<u64>,

    // composition
    #[serde(default, rename = "allOf")]
    pub all_of: Option<Vec<RawSchema>>,
    #[serde(default, rename = "anyOf")]
    pub any_of: Option<Vec<RawSchema>>,
}

/// `"type": "string"` or `"type": ["string", "null"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawType {
    One(String),
    Many(Vec<String>),
}

impl RawSchema {
    /// Keywords present that only make sense for one kind, with that kind.
    pub fn shape_keywords(&self) -> Vec<(&'static str, Kind)> {
        [
            (self.properties.is_some(), "properties", Kind::Object),
            (self.required.is_some(), "required", Kind::Object),
            (self.items.is_some(), "items", Kind::Array),
            (self.min_items.is_some(), "minItems", Kind::Array),
            (self.max_items.is_some(), "maxItems", Kind::Array),
            (self.pattern.is_some(), "pattern", Kind::String),
            (self.minimum.is_some(), "minimum", Kind::Number),
            (self.maximum.is_some(), "maximum", Kind::Number),
        ]
        .into_iter()
        .filter_map(|(present, keyword, kind)| present.then_some((keyword, kind)))
        .collect()
    }
}
