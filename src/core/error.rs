use thiserror::Error;

/// Malformed field declarations. Raised while building a [`Schema`](crate::core::schema::Schema);
/// no partial schema is ever produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Field '{field}' is missing a type")]
    MissingType { field: String },

    #[error("Unknown field kind '{kind}' for field '{field}'")]
    UnknownKind { field: String, kind: String },

    #[error("Field '{field}' ({kind}) is missing required parameter '{parameter}'")]
    MissingParameter {
        field: String,
        kind: &'static str,
        parameter: &'static str,
    },

    #[error("Invalid parameter '{parameter}' for field '{field}': {reason}")]
    InvalidParameter {
        field: String,
        parameter: String,
        reason: String,
    },

    #[error("Invalid field name '{0}' (letters, digits and underscores only, not starting with a digit)")]
    InvalidFieldName(String),

    #[error("Field '{0}' is declared more than once")]
    DuplicateField(String),
}

#[derive(Error, Debug)]
pub enum DbcError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("bad magic: expected {expected:?}, found {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    #[error("truncated file: {section} needs {expected} bytes, only {actual} available")]
    Truncated {
        section: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("Schema mismatch: file declares {what} {declared}, mapping computes {computed}")]
    SchemaMismatch {
        what: &'static str,
        declared: u64,
        computed: u64,
    },

    #[error("string field requires a string pool, but the file has none")]
    StringPoolRequired,

    #[error("Record index {index} out of range (record count {count})")]
    IndexOutOfRange { index: i64, count: u32 },

    #[error("String offset {offset} out of range (pool size {pool_size})")]
    StringOffsetOutOfRange { offset: u32, pool_size: u32 },

    #[error("String at offset {offset} is not valid UTF-8")]
    InvalidText { offset: u32 },

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbcError>;
