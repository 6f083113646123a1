//! Name → schema definition store.
//!
//! Populated once at start (usually from a catalog) and read concurrently
//! afterwards. Mutation needs `&mut`, so a registry shared between threads
//! is frozen by construction.
use indexmap::IndexMap;
use serde_json::Value;

use crate::catalog;
use crate::error::{CatalogError, ResolveError, SchemaError};
use crate::lower;
use crate::resolve::Resolver;
use crate::schema::{Schema, SchemaDef};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, SchemaDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in ECMAScript node catalog.
    pub fn estree() -> Result<Self, CatalogError> {
        let mut registry = Self::new();
        registry.import_str(catalog::ESTREE_JSON)?;
        Ok(registry)
    }

    /// Insert or overwrite `name`. A definition without an identity takes
    /// `name` as its identity. Returns whether the stored mapping changed.
    /// Structurally invalid schemas (see [`Schema::validate`]) are refused.
    pub fn register(&mut self, name: impl Into<String>, def: impl Into<SchemaDef>) -> Result<bool, SchemaError> {
        let def = def.into();
        def.schema.validate()?;
        Ok(self.insert(name.into(), def))
    }

    /// Register a definition written in catalog JSON.
    pub fn register_json(&mut self, name: impl Into<String>, definition: &Value) -> Result<bool, SchemaError> {
        let def = lower::lower_value(definition)?;
        Ok(self.insert(name.into(), def))
    }

    fn insert(&mut self, name: String, mut def: SchemaDef) -> bool {
        if def.id.is_none() {
            def.id = Some(name.clone());
        }
        if self.entries.get(&name) == Some(&def) {
            return false;
        }
        if self.entries.insert(name.clone(), def).is_some() {
            tracing::debug!(schema = %name, "overwrote registered schema");
        }
        true
    }

    /// Bulk import of a catalog object (`{ name: definition, ... }`).
    /// All entries are lowered before any is registered, so a malformed
    /// entry leaves the registry untouched.
    pub fn import_catalog(&mut self, catalog: &Value) -> Result<usize, CatalogError> {
        let defs = catalog::lower_catalog(catalog)?;
        let count = defs.len();
        for (name, def) in defs {
            self.insert(name, def);
        }
        tracing::debug!(count, total = self.entries.len(), "imported schema catalog");
        Ok(count)
    }

    /// [`Registry::import_catalog`] from JSON text.
    pub fn import_str(&mut self, src: &str) -> Result<usize, CatalogError> {
        let catalog = catalog::parse_catalog(src)?;
        self.import_catalog(&catalog)
    }

    pub fn lookup(&self, name: &str) -> Option<&SchemaDef> {
        self.entries.get(name)
    }

    /// Look `name` up and chase bare reference aliases to a concrete definition.
    pub fn resolve(&self, name: &str) -> Result<&SchemaDef, ResolveError> {
        Resolver::new(self).resolve(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaDef)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a registry from typed schemas, refusing the first invalid one.
    pub fn from_schemas(schemas: impl IntoIterator<Item = (String, Schema)>) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for (name, schema) in schemas {
            registry.register(name, schema)?;
        }
        Ok(registry)
    }

    /// `(owner, missing)` for every reference that names no registered schema.
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(owner, def)| {
                def.schema
                    .references()
                    .into_iter()
                    .filter(|name| !self.contains(name))
                    .map(move |name| (owner.as_str(), name))
            })
            .collect()
    }
}
