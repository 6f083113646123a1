//! Error types.
//!
//! A node that does not conform to a schema is *not* an error; it is a plain
//! `false`. Everything here describes a schema or catalog that cannot be
//! used at all.

use thiserror::Error;

/// A schema definition that cannot be lowered into the typed model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("{at}: unknown type `{name}`")]
    UnknownType { at: String, name: String },

    #[error("{at}: invalid pattern `{pattern}`: {message}")]
    InvalidPattern { at: String, pattern: String, message: String },

    #[error("{at}: `{keyword}` needs at least one sub-schema")]
    EmptyComposition { at: String, keyword: &'static str },

    #[error("{at}: keywords ask for both {first} and {second}")]
    ConflictingKinds { at: String, first: &'static str, second: &'static str },

    #[error("{at}: `{low}` ({low_value}) exceeds `{high}` ({high_value})")]
    InvertedBounds {
        at: String,
        low: &'static str,
        low_value: String,
        high: &'static str,
        high_value: String,
    },

    #[error("{at}: {message}")]
    Shape { at: String, message: String },
}

/// A reference that does not lead to a usable definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("schema `{0}` is not registered")]
    NotFound(String),

    #[error("reference cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// A catalog document that cannot be imported.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog is not valid JSON at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("catalog must be a JSON object of name -> schema, found {0}")]
    NotAnObject(&'static str),

    #[error("catalog entry `{name}`: {source}")]
    Entry {
        name: String,
        #[source]
        source: SchemaError,
    },
}

/// Configuration error surfaced by the query API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("malformed inline schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("expected a schema name or schema object, found {0}")]
    NotASchema(&'static str),
}
