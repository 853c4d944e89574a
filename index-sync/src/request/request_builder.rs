//! Turns index declarations into store-facing requests.
//!
//! Every function here is pure: it reads a declaration and the entity or
//! property it belongs to and returns the documents the store expects. Logging
//! and submission are left to the engine.

use crate::common::{
    Document, IndexDirection, Value, GEO_2D_INDEX, OPTION_DROP_DUPS, OPTION_MAX, OPTION_MIN,
    OPTION_NAME, OPTION_SPARSE, OPTION_UNIQUE,
};
use crate::errors::{ErrorKind, IndexSyncError, IndexSyncResult};
use crate::model::{
    CompoundIndexDeclaration, EntityDescriptor, GeoIndexDeclaration, IndexDeclaration,
    PropertyDescriptor, SimpleIndexDeclaration,
};
use crate::request::{GeoIndexRequest, IndexRequest, NamingAdvisory};
use itertools::Itertools;

/// Returns the declaration's collection override, or the entity's collection.
pub fn resolve_collection<D: IndexDeclaration>(declaration: &D, entity: &EntityDescriptor) -> String {
    declaration
        .declared_collection()
        .unwrap_or_else(|| entity.collection())
        .to_string()
}

/// Returns the explicit index name, or the property's field name.
pub fn resolve_simple_name(declaration: &SimpleIndexDeclaration, property: &PropertyDescriptor) -> String {
    declaration
        .declared_name()
        .unwrap_or_else(|| property.field_name())
        .to_string()
}

/// Returns the explicit index name, or the store's default name for `keys`.
pub fn resolve_compound_name(declaration: &CompoundIndexDeclaration, keys: &Document) -> String {
    match declaration.declared_name() {
        Some(name) => name.to_string(),
        None => default_index_name(keys),
    }
}

/// Returns the explicit index name, or the property's own name.
///
/// Only the key uses the mapped field name; an unnamed geo index is named
/// after the property.
pub fn resolve_geo_name(declaration: &GeoIndexDeclaration, property: &PropertyDescriptor) -> String {
    declaration
        .declared_name()
        .unwrap_or_else(|| property.name())
        .to_string()
}

/// Checks a simple index for the unique, non-sparse, renamed combination.
///
/// Such an index makes the store reject a document that lacks the field once
/// another document already holds `null` for it. The index is still created;
/// the advisory only tells the caller that `sparse` should probably be set.
pub fn naming_advisory(
    entity: &EntityDescriptor,
    declaration: &SimpleIndexDeclaration,
    property: &PropertyDescriptor,
) -> Option<NamingAdvisory> {
    let name = declaration.declared_name()?;
    if name != property.name() && declaration.is_unique() && !declaration.is_sparse() {
        Some(NamingAdvisory::new(entity.type_id(), property.name(), name))
    } else {
        None
    }
}

/// Builds `{<field_name>: 1}` or `{<field_name>: -1}`.
pub fn build_simple_key_document(field_name: &str, direction: IndexDirection) -> Document {
    let mut keys = Document::with_capacity(1);
    keys.put(field_name, direction.key_value());
    keys
}

/// Parses a raw compound key definition into a key document.
///
/// A document definition (`{"a": 1, "b": -1}`) is passed through as parsed,
/// keeping its key order. A list of field names (`["a", "b"]`) gets
/// `direction` for every field. Bare keys and single quoted strings are
/// accepted alongside strict JSON. Anything else, including an empty
/// definition, is a [ErrorKind::ParseError].
pub fn build_compound_key_document(definition: &str, direction: IndexDirection) -> IndexSyncResult<Document> {
    let parsed = parse_definition(definition)?;

    let mut keys = Document::new();
    match parsed {
        serde_json::Value::Object(map) => {
            for (field, value) in map {
                keys.put(field, Value::from_json(value)?);
            }
        }
        serde_json::Value::Array(fields) => {
            for field in fields {
                match field {
                    serde_json::Value::String(field) => keys.put(field, direction.key_value()),
                    other => {
                        return Err(IndexSyncError::new(
                            &format!("Key definition {} lists a non-string field {}", definition, other),
                            ErrorKind::ParseError,
                        ))
                    }
                }
            }
        }
        _ => {
            return Err(IndexSyncError::new(
                &format!("Key definition {} is not a document", definition),
                ErrorKind::ParseError,
            ))
        }
    }

    if keys.is_empty() {
        return Err(IndexSyncError::new(
            &format!("Key definition {} names no fields", definition),
            ErrorKind::ParseError,
        ));
    }
    Ok(keys)
}

/// Builds the options document: exactly `name`, `dropDups`, `sparse`, `unique`.
pub fn build_options_document(name: &str, unique: bool, sparse: bool, drop_duplicates: bool) -> Document {
    let mut options = Document::with_capacity(4);
    options.put(OPTION_NAME, name);
    options.put(OPTION_DROP_DUPS, drop_duplicates);
    options.put(OPTION_SPARSE, sparse);
    options.put(OPTION_UNIQUE, unique);
    options
}

/// Builds the combined 2D geospatial request for a property.
pub fn build_geo_request(declaration: &GeoIndexDeclaration, property: &PropertyDescriptor) -> GeoIndexRequest {
    let mut keys = Document::with_capacity(1);
    keys.put(property.field_name(), GEO_2D_INDEX);

    let mut options = Document::with_capacity(3);
    options.put(OPTION_NAME, resolve_geo_name(declaration, property));
    options.put(OPTION_MIN, declaration.min());
    options.put(OPTION_MAX, declaration.max());

    GeoIndexRequest::new(keys, options)
}

/// Builds the full request for a simple index declared on `property`.
pub fn build_simple_request(
    entity: &EntityDescriptor,
    property: &PropertyDescriptor,
    declaration: &SimpleIndexDeclaration,
) -> IndexRequest {
    let name = resolve_simple_name(declaration, property);
    let keys = build_simple_key_document(property.field_name(), declaration.direction());
    let options = build_options_document(
        &name,
        declaration.is_unique(),
        declaration.is_sparse(),
        declaration.is_drop_duplicates(),
    );
    IndexRequest::new(&resolve_collection(declaration, entity), keys, options)
}

/// Builds the full request for a compound index declared on `entity`.
pub fn build_compound_request(
    entity: &EntityDescriptor,
    declaration: &CompoundIndexDeclaration,
) -> IndexSyncResult<IndexRequest> {
    let keys = build_compound_key_document(declaration.definition(), declaration.direction())?;
    let name = resolve_compound_name(declaration, &keys);
    let options = build_options_document(
        &name,
        declaration.is_unique(),
        declaration.is_sparse(),
        declaration.is_drop_duplicates(),
    );
    Ok(IndexRequest::new(&resolve_collection(declaration, entity), keys, options))
}

fn parse_definition(definition: &str) -> IndexSyncResult<serde_json::Value> {
    match serde_json::from_str(definition) {
        Ok(parsed) => Ok(parsed),
        // hand-written mappings often leave keys bare or single quoted
        Err(err) => serde_json::from_str(&relax_definition(definition)).map_err(|_| err.into()),
    }
}

/// Rewrites relaxed key syntax into strict JSON.
///
/// Single quoted strings become double quoted and bare object keys
/// (`{lastName: 1}`) get quoted. Both quote styles may be mixed in one
/// definition. Everything else is copied unchanged, so input that is broken
/// in some other way stays broken.
fn relax_definition(definition: &str) -> String {
    let chars: Vec<char> = definition.chars().collect();
    let mut out = String::with_capacity(definition.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '"' => {
                out.push('"');
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        out.push(chars[i]);
                        i += 1;
                    }
                    out.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() {
                    out.push('"');
                    i += 1;
                }
            }
            '\'' => {
                out.push('"');
                i += 1;
                while i < chars.len() && chars[i] != '\'' {
                    match chars[i] {
                        '\\' if i + 1 < chars.len() => {
                            if chars[i + 1] != '\'' {
                                out.push('\\');
                            }
                            out.push(chars[i + 1]);
                            i += 2;
                        }
                        '"' => {
                            out.push_str("\\\"");
                            i += 1;
                        }
                        other => {
                            out.push(other);
                            i += 1;
                        }
                    }
                }
                // an unterminated string is left unterminated
                if i < chars.len() {
                    out.push('"');
                    i += 1;
                }
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len() && is_bare_key_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();

                let mut next = i;
                while next < chars.len() && chars[next].is_whitespace() {
                    next += 1;
                }
                if next < chars.len() && chars[next] == ':' {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else {
                    out.push_str(&word);
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    out
}

fn is_bare_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
}

/// `<field>_<value>` pairs joined by `_`, the store's own naming convention.
fn default_index_name(keys: &Document) -> String {
    keys.iter()
        .map(|(field, value)| match value {
            Value::String(text) => format!("{}_{}", field, text),
            other => format!("{}_{}", field, other),
        })
        .join("_")
}
