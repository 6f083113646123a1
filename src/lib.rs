//! Structural matching of AST nodes against composable, named schemas.
//!
//! Load a catalog of node-type schemas into a [`Registry`], then ask
//! whether a node conforms to a schema given by name or inline:
//!
//! ```
//! use ast_match::AstMatch;
//! use serde_json::json;
//!
//! let am = AstMatch::estree().unwrap();
//! let node = json!({ "type": "Identifier", "name": "f" });
//! assert_eq!(am.test(&node, "Identifier"), Ok(true));
//! assert_eq!(am.test(&node, "Literal"), Ok(false));
//! ```
//!
//! Pipeline: catalog JSON → [`raw::RawSchema`] → [`lower`] → [`Schema`]
//! stored in the [`Registry`]; [`Matcher`] walks node and schema together,
//! resolving `$ref`s lazily through the registry.
pub mod catalog;
pub mod error;
pub mod lower;
pub mod matcher;
pub mod node;
pub mod path_de;
pub mod query;
pub mod raw;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod traverse;

pub use error::{CatalogError, MatchError, ResolveError, SchemaError};
pub use matcher::Matcher;
pub use node::{NodeKind, TreeNode};
pub use query::{AstMatch, SchemaArg};
pub use registry::Registry;
pub use resolve::Resolver;
pub use schema::{ArrayShape, Kind, ObjectShape, Pattern, Schema, SchemaDef, TypeConstraint};
