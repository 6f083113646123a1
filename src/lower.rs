//! Lower the declarative catalog form (`RawSchema`) into the typed model.
//!
//! Keyword groups map onto schema kinds:
//! - `properties`/`required` → object shape
//! - `items`/`minItems`/`maxItems` → array shape
//! - `type`, `pattern`, `enum`, `minimum`/`maximum` → type constraint
//! - `$ref`, `allOf`, `anyOf` → reference and composition
//!
//! A definition that carries several groups becomes an intersection of
//! them. Shape keywords imply their kind, and keywords that demand two
//! different kinds are rejected. In particular a bare `pattern` implies a
//! string, so `{"pattern": "^f$"}` does not accept the number `1`.
//!
//! A `type` list is a union with one arm per listed kind. Shape keywords
//! only constrain the arm of the kind they imply:
//! `{"type": ["object", "null"], "properties": {..}}` is an object shape or
//! `null`.
use serde_json::Value;

use crate::error::SchemaError;
use crate::path_de;
use crate::raw::{RawSchema, RawType};
use crate::schema::{ArrayShape, Kind, ObjectShape, Pattern, Schema, SchemaDef, TypeConstraint};

pub fn lower(raw: &RawSchema) -> Result<Schema, SchemaError> {
    lower_at(raw, "#")
}

pub fn lower_def(raw: &RawSchema) -> Result<SchemaDef, SchemaError> {
    Ok(SchemaDef { id: raw.id.clone(), schema: lower(raw)? })
}

/// Inline schema given as JSON (e.g. on a query).
pub fn lower_value(value: &Value) -> Result<SchemaDef, SchemaError> {
    let raw = path_de::from_value_with_path::<RawSchema>(value)
        .map_err(|e| SchemaError::Shape { at: e.path, message: e.message })?;
    lower_def(&raw)
}

fn lower_at(raw: &RawSchema, at: &str) -> Result<Schema, SchemaError> {
    let mut parts: Vec<Schema> = Vec::new();

    if let Some(name) = &raw.reference {
        parts.push(Schema::Ref(name.clone()));
    }

    let demanded = demanded_kind(raw, at)?;
    match &raw.type_ {
        Some(RawType::Many(names)) => parts.push(lower_type_list(raw, names, demanded, at)?),
        Some(RawType::One(name)) => {
            let kind = declared_kind(parse_kind(name, at)?, demanded, at)?;
            parts.push(lower_kind(raw, Some(kind), at)?);
        }
        None => parts.push(lower_kind(raw, demanded, at)?),
    }

    if let Some(subs) = &raw.all_of {
        parts.push(collapse_all(lower_list(subs, "allOf", at)?));
    }
    if let Some(subs) = &raw.any_of {
        parts.push(collapse_any(lower_list(subs, "anyOf", at)?));
    }

    Ok(collapse_all(parts))
}

// Shape and leaf constraint of `raw` for one effective kind.
fn lower_kind(raw: &RawSchema, kind: Option<Kind>, at: &str) -> Result<Schema, SchemaError> {
    let mut parts: Vec<Schema> = Vec::new();
    match kind {
        Some(Kind::Object) => parts.push(lower_object(raw, at)?),
        Some(Kind::Array) => parts.push(lower_array(raw, at)?),
        _ => {}
    }
    let scalar_kind = kind.filter(|k| !matches!(k, Kind::Object | Kind::Array));
    let has_scalar_keywords = raw.pattern.is_some()
        || raw.enum_.is_some()
        || raw.minimum.is_some()
        || raw.maximum.is_some();
    if scalar_kind.is_some() || has_scalar_keywords {
        parts.push(Schema::Type(lower_type(raw, scalar_kind, at)?));
    }
    Ok(collapse_all(parts))
}

fn lower_type_list(
    raw: &RawSchema,
    names: &[String],
    demanded: Option<Kind>,
    at: &str,
) -> Result<Schema, SchemaError> {
    if names.is_empty() {
        return Err(SchemaError::EmptyComposition { at: at.to_string(), keyword: "type" });
    }
    let arms = names
        .iter()
        .map(|name| {
            let kind = parse_kind(name, at)?;
            match demanded {
                Some(demanded) if !satisfies(kind, demanded) => {
                    let mut bare = TypeConstraint::of(kind);
                    if let Some(choices) = &raw.enum_ {
                        bare = bare.choices(choices.iter().cloned());
                    }
                    Ok(Schema::Type(bare))
                }
                _ => lower_kind(raw, Some(kind), at),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collapse_any(arms))
}

fn parse_kind(name: &str, at: &str) -> Result<Kind, SchemaError> {
    Kind::from_name(name).ok_or_else(|| SchemaError::UnknownType {
        at: at.to_string(),
        name: name.to_string(),
    })
}

// The single kind the shape keywords of `raw` ask for, if any.
fn demanded_kind(raw: &RawSchema, at: &str) -> Result<Option<Kind>, SchemaError> {
    let mut demanded: Option<Kind> = None;
    for (_, kind) in raw.shape_keywords() {
        match demanded {
            None => demanded = Some(kind),
            Some(first) if first == kind => {}
            Some(first) => {
                return Err(SchemaError::ConflictingKinds {
                    at: at.to_string(),
                    first: first.name(),
                    second: kind.name(),
                });
            }
        }
    }
    Ok(demanded)
}

fn declared_kind(declared: Kind, demanded: Option<Kind>, at: &str) -> Result<Kind, SchemaError> {
    match demanded {
        Some(demanded) if !satisfies(declared, demanded) => Err(SchemaError::ConflictingKinds {
            at: at.to_string(),
            first: declared.name(),
            second: demanded.name(),
        }),
        _ => Ok(declared),
    }
}

// `integer` is a number, so number bounds apply to it.
fn satisfies(kind: Kind, demanded: Kind) -> bool {
    kind == demanded || (kind == Kind::Integer && demanded == Kind::Number)
}

fn lower_object(raw: &RawSchema, at: &str) -> Result<Schema, SchemaError> {
    let mut shape = ObjectShape::new();
    if let Some(props) = &raw.properties {
        for (name, sub) in props {
            let sub = lower_at(sub, &format!("{at}/properties/{name}"))?;
            shape = shape.property(name.clone(), sub);
        }
    }
    for name in raw.required.iter().flatten() {
        shape = shape.require(name.clone());
    }
    Ok(Schema::Object(shape))
}

fn lower_array(raw: &RawSchema, at: &str) -> Result<Schema, SchemaError> {
    let mut shape = ArrayShape::new();
    if let Some(item) = &raw.items {
        shape = shape.items(lower_at(item, &format!("{at}/items"))?);
    }
    shape.min_items = raw.min_items.map(saturate);
    shape.max_items = raw.max_items.map(saturate);
    shape.check_bounds(at)?;
    Ok(Schema::Array(shape))
}

fn lower_type(raw: &RawSchema, kind: Option<Kind>, at: &str) -> Result<TypeConstraint, SchemaError> {
    let mut out = TypeConstraint { kind, ..TypeConstraint::default() };
    if let Some(source) = &raw.pattern {
        let pattern = Pattern::new(source.clone()).map_err(|e| SchemaError::InvalidPattern {
            at: at.to_string(),
            pattern: source.clone(),
            message: e.to_string(),
        })?;
        out = out.pattern(pattern);
    }
    if let Some(choices) = &raw.enum_ {
        out = out.choices(choices.iter().cloned());
    }
    if let Some(min) = raw.minimum {
        out = out.minimum(min);
    }
    if let Some(max) = raw.maximum {
        out = out.maximum(max);
    }
    out.check_bounds(at)?;
    Ok(out)
}

fn lower_list(subs: &[RawSchema], keyword: &'static str, at: &str) -> Result<Vec<Schema>, SchemaError> {
    if subs.is_empty() {
        return Err(SchemaError::EmptyComposition { at: at.to_string(), keyword });
    }
    subs.iter()
        .enumerate()
        .map(|(i, sub)| lower_at(sub, &format!("{at}/{keyword}/{i}")))
        .collect()
}

fn saturate(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

// Collapse intersections: flatten nested `allOf`, drop `Any`, unwrap singletons.
pub(crate) fn collapse_all(parts: Vec<Schema>) -> Schema {
    let mut flat = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            Schema::Any => {}
            Schema::AllOf(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    match flat.len() {
        0 => Schema::Any,
        1 => flat.remove(0),
        _ => Schema::AllOf(flat),
    }
}

// Collapse unions: flatten nested `anyOf`, `Any` absorbs, unwrap singletons.
pub(crate) fn collapse_any(parts: Vec<Schema>) -> Schema {
    let mut flat = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            Schema::Any => return Schema::Any,
            Schema::AnyOf(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    match flat.len() {
        1 => flat.remove(0),
        _ => Schema::AnyOf(flat),
    }
}
