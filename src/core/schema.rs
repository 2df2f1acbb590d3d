//! Record schema (mapping)
//!
//! An ordered list of [`FieldSpec`]s. Declaration order is the byte order of
//! a record, so the schema never reorders its fields.

use crate::config::ReaderOptions;
use crate::error::SchemaError;
use crate::field::{FieldKind, FieldParams, FieldSpec};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// One entry of a mapping as handed over by a loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDeclaration {
    pub name: String,
    /// Kind tag; `None` when the source omitted it
    pub kind: Option<String>,
    pub params: FieldParams,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        FieldDeclaration {
            name: name.into(),
            kind: Some(kind.into()),
            params: FieldParams::new(),
        }
    }

    /// Add an integer parameter
    pub fn param(mut self, key: impl Into<String>, value: u32) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// Ordered, validated collection of fields
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    columns: Arc<[String]>,
    total_record_size: usize,
    has_strings: bool,
}

impl Schema {
    /// Build a schema with default [`ReaderOptions`]
    pub fn new<I>(declarations: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = FieldDeclaration>,
    {
        Self::with_options(declarations, &ReaderOptions::default())
    }

    /// Build a schema, resolving option-dependent defaults from `options`
    pub fn with_options<I>(declarations: I, options: &ReaderOptions) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = FieldDeclaration>,
    {
        let fields = declarations
            .into_iter()
            .map(|decl| {
                let tag = decl.kind.as_deref().ok_or_else(|| SchemaError::MissingType {
                    field: decl.name.clone(),
                })?;
                FieldSpec::build(&decl.name, tag, &decl.params, options)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_fields(fields)
    }

    /// Assemble a schema from already-built fields
    pub fn from_fields(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let mut columns = Vec::new();
        let mut total_record_size = 0;
        let mut has_strings = false;

        for field in &fields {
            columns.extend(field.column_names());
            total_record_size += field.byte_width();
            has_strings |= field.kind().is_string();
        }

        // a repeated declaration, or an expansion colliding with a declared
        // name (`flag` x2 next to `flag_2`), yields the same column twice
        {
            let mut seen = HashSet::with_capacity(columns.len());
            for column in &columns {
                if !seen.insert(column.as_str()) {
                    return Err(SchemaError::DuplicateField(column.clone()));
                }
            }
        }
        let columns: Arc<[String]> = columns.into();

        debug!(
            fields = fields.len(),
            columns = columns.len(),
            record_size = total_record_size,
            has_strings,
            "Built schema"
        );

        Ok(Schema {
            fields,
            columns,
            total_record_size,
            has_strings,
        })
    }

    /// Declared fields in byte order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Logical column names, in record order
    pub fn field_names(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn shared_columns(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }

    /// Sum of every field's expanded column count
    pub fn total_column_count(&self) -> usize {
        self.columns.len()
    }

    /// Bytes per record described by this schema
    pub fn total_record_size(&self) -> usize {
        self.total_record_size
    }

    /// True when any field is a `string` or `localized_string`
    pub fn has_strings(&self) -> bool {
        self.has_strings
    }

    /// Kind of a declared field
    pub fn field_type(&self, name: &str) -> Option<FieldKind> {
        self.field(name).map(|f| f.kind())
    }

    /// Declared field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }
}
