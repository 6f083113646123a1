//! Reference resolution.
//!
//! A name may be bound to another bare reference (`Statement` is just
//! `$ref: Node` in the ECMAScript catalog). The resolver follows such alias
//! chains and stops when a name comes back around. Recursion through
//! `allOf`/`anyOf`/fields is not its concern; the matcher handles that.
use crate::error::ResolveError;
use crate::registry::Registry;
use crate::schema::{Schema, SchemaDef};

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, name: &str) -> Result<&'r SchemaDef, ResolveError> {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = name;
        loop {
            if chain.contains(&current) {
                chain.push(current);
                return Err(ResolveError::Cycle(chain.into_iter().map(String::from).collect()));
            }
            chain.push(current);
            let def = self
                .registry
                .lookup(current)
                .ok_or_else(|| ResolveError::NotFound(current.to_string()))?;
            match &def.schema {
                Schema::Ref(next) => current = next.as_str(),
                _ => return Ok(def),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Kind;

    fn registry() -> Registry {
        Registry::from_schemas([
            ("Node".to_string(), Schema::of_kind(Kind::Object)),
            ("Statement".to_string(), Schema::reference("Node")),
            ("Declaration".to_string(), Schema::reference("Statement")),
            ("Ping".to_string(), Schema::reference("Pong")),
            ("Pong".to_string(), Schema::reference("Ping")),
            ("Dangling".to_string(), Schema::reference("Nowhere")),
        ])
        .unwrap()
    }

    #[test]
    fn alias_chains_are_followed() {
        let reg = registry();
        let def = Resolver::new(&reg).resolve("Declaration").unwrap();
        assert_eq!(def.id(), Some("Node"));
        assert_eq!(def.schema, Schema::of_kind(Kind::Object));
    }

    #[test]
    fn alias_cycles_are_reported() {
        let reg = registry();
        assert_eq!(
            Resolver::new(&reg).resolve("Ping"),
            Err(ResolveError::Cycle(vec!["Ping".into(), "Pong".into(), "Ping".into()]))
        );
    }

    #[test]
    fn missing_targets_are_not_found() {
        let reg = registry();
        let resolver = Resolver::new(&reg);
        assert_eq!(resolver.resolve("Nope"), Err(ResolveError::NotFound("Nope".into())));
        assert_eq!(resolver.resolve("Dangling"), Err(ResolveError::NotFound("Nowhere".into())));
    }
}
