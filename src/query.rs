//! Public entry point: `test(node, schema)` and friends.
//!
//! Configuration problems (unknown schema name, malformed inline schema)
//! come back as `Err`, so a typo is never mistaken for "does not match".
use std::borrow::Cow;

use rayon::prelude::*;
use serde_json::Value;

use crate::catalog::json_kind;
use crate::error::{CatalogError, MatchError, SchemaError};
use crate::lower;
use crate::matcher::{Matcher, DEFAULT_MAX_DEPTH};
use crate::node::TreeNode;
use crate::registry::Registry;
use crate::schema::{Schema, SchemaDef};
use crate::traverse;

/// Schema argument of a query: a registered name, a typed inline schema, or
/// raw JSON (a string is a name, an object is an inline definition).
#[derive(Debug, Clone, Copy)]
pub enum SchemaArg<'a> {
    Name(&'a str),
    Inline(&'a Schema),
    Json(&'a Value),
}

impl<'a> From<&'a str> for SchemaArg<'a> {
    fn from(value: &'a str) -> Self { SchemaArg::Name(value) }
}

impl<'a> From<&'a String> for SchemaArg<'a> {
    fn from(value: &'a String) -> Self { SchemaArg::Name(value) }
}

impl<'a> From<&'a Schema> for SchemaArg<'a> {
    fn from(value: &'a Schema) -> Self { SchemaArg::Inline(value) }
}

impl<'a> From<&'a Value> for SchemaArg<'a> {
    fn from(value: &'a Value) -> Self { SchemaArg::Json(value) }
}

#[derive(Debug, Clone)]
pub struct AstMatch {
    registry: Registry,
    max_depth: usize,
}

impl Default for AstMatch {
    fn default() -> Self {
        Self::new(Registry::new())
    }
}

impl AstMatch {
    pub fn new(registry: Registry) -> Self {
        Self { registry, max_depth: DEFAULT_MAX_DEPTH }
    }

    /// Preloaded with the built-in ECMAScript node catalog.
    pub fn estree() -> Result<Self, CatalogError> {
        Ok(Self::new(Registry::estree()?))
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn register(&mut self, name: impl Into<String>, def: impl Into<SchemaDef>) -> Result<bool, SchemaError> {
        self.registry.register(name, def)
    }

    pub fn import_catalog(&mut self, catalog: &Value) -> Result<usize, CatalogError> {
        self.registry.import_catalog(catalog)
    }

    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&self.registry).with_max_depth(self.max_depth)
    }

    /// Turn a schema argument into a concrete schema, surfacing
    /// configuration errors. A top-level reference must resolve, and a
    /// typed inline schema must pass [`Schema::validate`].
    pub fn prepare<'a>(&'a self, schema: impl Into<SchemaArg<'a>>) -> Result<Cow<'a, Schema>, MatchError> {
        match schema.into() {
            SchemaArg::Name(name) => Ok(Cow::Borrowed(&self.registry.resolve(name)?.schema)),
            SchemaArg::Inline(Schema::Ref(name)) => Ok(Cow::Borrowed(&self.registry.resolve(name)?.schema)),
            SchemaArg::Inline(schema) => {
                schema.validate()?;
                Ok(Cow::Borrowed(schema))
            }
            SchemaArg::Json(Value::String(name)) => Ok(Cow::Borrowed(&self.registry.resolve(name)?.schema)),
            SchemaArg::Json(value @ Value::Object(_)) => {
                let def = lower::lower_value(value)?;
                match def.schema {
                    Schema::Ref(name) => Ok(Cow::Borrowed(&self.registry.resolve(&name)?.schema)),
                    schema => Ok(Cow::Owned(schema)),
                }
            }
            SchemaArg::Json(other) => Err(MatchError::NotASchema(json_kind(other))),
        }
    }

    pub fn test<'a, N: TreeNode>(&'a self, node: &N, schema: impl Into<SchemaArg<'a>>) -> Result<bool, MatchError> {
        let schema = self.prepare(schema)?;
        Ok(self.matcher().matches(node, &schema))
    }

    /// Number of AST nodes under `root` (root included) matching `schema`.
    pub fn count<'a, N>(&'a self, root: &N, schema: impl Into<SchemaArg<'a>>) -> Result<usize, MatchError>
    where
        N: TreeNode + Sync,
    {
        let schema = self.prepare(schema)?;
        let matcher = self.matcher();
        let nodes = traverse::nodes(root);
        Ok(nodes.par_iter().filter(|node| matcher.matches(**node, &schema)).count())
    }

    /// Matching AST nodes under `root`, in pre-order.
    pub fn find<'a, 'n, N>(&'a self, root: &'n N, schema: impl Into<SchemaArg<'a>>) -> Result<Vec<&'n N>, MatchError>
    where
        N: TreeNode + Sync,
    {
        let schema = self.prepare(schema)?;
        let matcher = self.matcher();
        let nodes = traverse::nodes(root);
        Ok(nodes.into_par_iter().filter(|node| matcher.matches(*node, &schema)).collect())
    }
}
