//! Validation for mapping field names
//!
//! Declared names become record keys and XML element names, so they are
//! restricted to plain identifiers.

use crate::error::SchemaError;
use regex::Regex;
use std::sync::OnceLock;

/// Pattern for valid field names
const FIELD_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// Maximum field name length
const MAX_FIELD_NAME_LENGTH: usize = 128;

fn field_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FIELD_NAME_PATTERN).unwrap())
}

/// Validate a declared field name
///
/// # Examples
///
/// ```
/// use dbc_rs::core::validation::validate_field_name;
///
/// assert!(validate_field_name("AreaID").is_ok());
/// assert!(validate_field_name("name_flags").is_ok());
/// assert!(validate_field_name("2nd").is_err());
/// assert!(validate_field_name("area id").is_err());
/// ```
pub fn validate_field_name(name: &str) -> Result<(), SchemaError> {
    if name.is_empty() || name.len() > MAX_FIELD_NAME_LENGTH {
        return Err(SchemaError::InvalidFieldName(name.to_string()));
    }

    if !field_name_regex().is_match(name) {
        return Err(SchemaError::InvalidFieldName(name.to_string()));
    }

    Ok(())
}
