//! Catalog documents: a JSON object mapping schema names to definitions.
//!
//! The built-in catalog describes the ECMAScript AST as emitted by
//! esprima-style parsers (SpiderMonkey Parser API): `Program`, statements,
//! declarations, expressions, patterns, clauses, `Identifier`, `Literal`,
//! the operator enumerations and the E4X XML extension. Node types form an
//! inheritance lattice through `allOf` + `$ref`.
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::CatalogError;
use crate::lower;
use crate::path_de;
use crate::raw::RawSchema;
use crate::schema::SchemaDef;

pub const ESTREE_JSON: &str = include_str!("../catalog/estree.json");

pub fn parse_catalog(src: &str) -> Result<Value, CatalogError> {
    path_de::from_str_with_path::<Value>(src)
        .map_err(|e| CatalogError::Parse { path: e.path, message: e.message })
}

/// Lower every entry; stops at the first malformed one.
pub fn lower_catalog(catalog: &Value) -> Result<Vec<(String, SchemaDef)>, CatalogError> {
    if !catalog.is_object() {
        return Err(CatalogError::NotAnObject(json_kind(catalog)));
    }
    let entries = path_de::from_value_with_path::<IndexMap<String, RawSchema>>(catalog)
        .map_err(|e| CatalogError::Parse { path: e.path, message: e.message })?;
    entries
        .into_iter()
        .map(|(name, raw)| match lower::lower_def(&raw) {
            Ok(def) => Ok((name, def)),
            Err(source) => Err(CatalogError::Entry { name, source }),
        })
        .collect()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::schema::Schema;
    use serde_json::json;

    #[test]
    fn builtin_catalog_loads_completely() {
        let reg = Registry::estree().unwrap();
        assert_eq!(reg.len(), 83);
        for name in ["Node", "Program", "Statement", "Expression", "Identifier", "Literal", "XMLName"] {
            assert!(reg.contains(name), "missing {name}");
        }
        assert!(reg.dangling_references().is_empty(), "{:?}", reg.dangling_references());
    }

    #[test]
    fn builtin_aliases_resolve_to_node() {
        let reg = Registry::estree().unwrap();
        for alias in ["Statement", "Pattern", "Declaration"] {
            assert_eq!(reg.resolve(alias).unwrap().id(), Some("Node"), "{alias}");
        }
        assert!(matches!(reg.lookup("Statement").unwrap().schema, Schema::Ref(_)));
    }

    #[test]
    fn every_builtin_identity_is_its_name() {
        let reg = Registry::estree().unwrap();
        for (name, def) in reg.iter() {
            assert_eq!(def.id(), Some(name));
        }
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(matches!(lower_catalog(&json!([1, 2])), Err(CatalogError::NotAnObject("array"))));
        assert!(matches!(parse_catalog("{"), Err(CatalogError::Parse { .. })));
        assert!(matches!(
            lower_catalog(&json!({ "Node": 3 })),
            Err(CatalogError::Parse { ref path, .. }) if path == "Node"
        ));
    }
}
