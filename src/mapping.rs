//! YAML mappings
//!
//! A mapping file lists fields in record order under `fields`:
//!
//! ```yaml
//! fields:
//!   id:
//!     type: uint
//!   name:
//!     type: localized_string
//!   spells:
//!     type: foreign_key
//!     count: 3
//! ```
//!
//! Keys other than `type` are integer parameters. Keys no kind knows about
//! are ignored.

use crate::config::ReaderOptions;
use crate::error::{DbcError, Result, SchemaError};
use crate::field::{FieldParams, REGISTRY};
use crate::schema::{FieldDeclaration, Schema};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct MappingDocument {
    #[serde(default)]
    fields: Option<Mapping>,
}

/// Parse mapping text into ordered field declarations
pub fn parse_declarations(yaml: &str) -> Result<Vec<FieldDeclaration>> {
    let document: MappingDocument =
        serde_yaml::from_str(yaml).map_err(|e| DbcError::Mapping(e.to_string()))?;

    let Some(fields) = document.fields else {
        return Ok(Vec::new());
    };

    fields
        .into_iter()
        .map(|(key, value)| declaration(key, value))
        .collect()
}

fn declaration(key: Value, value: Value) -> Result<FieldDeclaration> {
    let name = match key {
        Value::String(name) => name,
        other => {
            return Err(DbcError::Mapping(format!(
                "field name must be a string, got {:?}",
                other
            )))
        }
    };

    let entries = match value {
        Value::Mapping(entries) => entries,
        Value::Null => Mapping::new(),
        _ => {
            return Err(DbcError::Mapping(format!(
                "definition of field '{}' must be a mapping",
                name
            )))
        }
    };

    let mut kind = None;
    let mut params = FieldParams::new();

    for (key, value) in entries {
        let Value::String(key) = key else {
            continue;
        };

        if key == "type" {
            match value {
                Value::String(tag) => kind = Some(tag),
                _ => {
                    return Err(DbcError::Mapping(format!(
                        "type of field '{}' must be a string",
                        name
                    )))
                }
            }
            continue;
        }

        if !is_known_parameter(&key) {
            debug!(field = %name, parameter = %key, "Ignoring unknown mapping parameter");
            continue;
        }

        let number = value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| SchemaError::InvalidParameter {
                field: name.clone(),
                parameter: key.clone(),
                reason: format!("expected a non-negative integer, got {:?}", value),
            })?;
        params.insert(key, number);
    }

    Ok(FieldDeclaration { name, kind, params })
}

fn is_known_parameter(key: &str) -> bool {
    REGISTRY.iter().any(|d| {
        d.required.contains(&key) || d.optional.iter().any(|o| o.name == key)
    })
}

/// Build a schema from mapping text
pub fn schema_from_yaml(yaml: &str, options: &ReaderOptions) -> Result<Schema> {
    let declarations = parse_declarations(yaml)?;
    Ok(Schema::with_options(declarations, options)?)
}

/// Load a schema from a mapping file
pub fn load_schema<P: AsRef<Path>>(path: P, options: &ReaderOptions) -> Result<Schema> {
    let text = std::fs::read_to_string(path)?;
    schema_from_yaml(&text, options)
}
