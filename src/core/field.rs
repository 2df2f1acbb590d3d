//! Field kinds and typed field descriptors
//!
//! A mapping entry names a kind by its tag (`uint`, `localized_string`, ...)
//! and may carry integer parameters. Each kind is described once in
//! [`REGISTRY`], which lists the parameters it requires and the defaults of
//! the ones it accepts optionally. [`FieldSpec::build`] is the only place
//! that consults the table, so parameter rules can be tested without
//! decoding anything.

use crate::config::ReaderOptions;
use crate::error::SchemaError;
use crate::validation::validate_field_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Integer parameters attached to a field declaration (`count`, `locale_count`)
pub type FieldParams = BTreeMap<String, u32>;

/// Width of one int/uint/float/string/foreign-key slot
pub const SLOT_WIDTH: usize = 4;

/// The closed set of field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    SignedInt,
    UnsignedInt,
    SignedByte,
    UnsignedByte,
    Float,
    String,
    LocalizedString,
    ForeignKey,
}

/// Where an optional parameter takes its value from when omitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    Value(u32),
    /// `ReaderOptions::locale_count`
    LocaleCount,
}

/// An optional parameter and its default
#[derive(Debug, Clone, Copy)]
pub struct OptionalParam {
    pub name: &'static str,
    pub default: ParamDefault,
}

/// Registry entry for one kind
#[derive(Debug, Clone, Copy)]
pub struct KindDescriptor {
    pub kind: FieldKind,
    pub tag: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [OptionalParam],
}

const COUNT: OptionalParam = OptionalParam {
    name: "count",
    default: ParamDefault::Value(1),
};

const LOCALE_COUNT: OptionalParam = OptionalParam {
    name: "locale_count",
    default: ParamDefault::LocaleCount,
};

pub static REGISTRY: [KindDescriptor; 8] = [
    KindDescriptor {
        kind: FieldKind::SignedInt,
        tag: "int",
        required: &[],
        optional: &[COUNT],
    },
    KindDescriptor {
        kind: FieldKind::UnsignedInt,
        tag: "uint",
        required: &[],
        optional: &[COUNT],
    },
    KindDescriptor {
        kind: FieldKind::SignedByte,
        tag: "char",
        required: &[],
        optional: &[COUNT],
    },
    KindDescriptor {
        kind: FieldKind::UnsignedByte,
        tag: "uchar",
        required: &[],
        optional: &[COUNT],
    },
    KindDescriptor {
        kind: FieldKind::Float,
        tag: "float",
        required: &[],
        optional: &[COUNT],
    },
    KindDescriptor {
        kind: FieldKind::String,
        tag: "string",
        required: &[],
        optional: &[COUNT],
    },
    KindDescriptor {
        kind: FieldKind::LocalizedString,
        tag: "localized_string",
        required: &[],
        optional: &[COUNT, LOCALE_COUNT],
    },
    KindDescriptor {
        kind: FieldKind::ForeignKey,
        tag: "foreign_key",
        required: &["count"],
        optional: &[],
    },
];

impl FieldKind {
    /// Look up a kind by its mapping tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        REGISTRY.iter().find(|d| d.tag == tag).map(|d| d.kind)
    }

    /// Registry entry for this kind
    pub fn descriptor(&self) -> &'static KindDescriptor {
        match self {
            FieldKind::SignedInt => &REGISTRY[0],
            FieldKind::UnsignedInt => &REGISTRY[1],
            FieldKind::SignedByte => &REGISTRY[2],
            FieldKind::UnsignedByte => &REGISTRY[3],
            FieldKind::Float => &REGISTRY[4],
            FieldKind::String => &REGISTRY[5],
            FieldKind::LocalizedString => &REGISTRY[6],
            FieldKind::ForeignKey => &REGISTRY[7],
        }
    }

    /// Mapping tag (`int`, `uchar`, `foreign_key`, ...)
    pub fn tag(&self) -> &'static str {
        self.descriptor().tag
    }

    /// Width of one value slot of this kind
    pub fn slot_width(&self) -> usize {
        match self {
            FieldKind::SignedByte | FieldKind::UnsignedByte => 1,
            FieldKind::SignedInt
            | FieldKind::UnsignedInt
            | FieldKind::Float
            | FieldKind::String
            | FieldKind::LocalizedString
            | FieldKind::ForeignKey => SLOT_WIDTH,
        }
    }

    /// True for kinds whose values are string-pool offsets
    pub fn is_string(&self) -> bool {
        matches!(self, FieldKind::String | FieldKind::LocalizedString)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One typed field of a schema
///
/// Immutable once built: widths and counts are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    count: u32,
    locale_count: u32,
}

impl FieldSpec {
    /// Build a field from its kind tag and parameters
    ///
    /// # Errors
    ///
    /// - `UnknownKind` if `tag` is not in the registry
    /// - `MissingParameter` if a required parameter is absent
    /// - `InvalidParameter` if `count` or `locale_count` is zero
    /// - `InvalidFieldName` if `name` is not an identifier
    pub fn build(
        name: &str,
        tag: &str,
        params: &FieldParams,
        options: &ReaderOptions,
    ) -> Result<Self, SchemaError> {
        validate_field_name(name)?;

        let kind = FieldKind::from_tag(tag).ok_or_else(|| SchemaError::UnknownKind {
            field: name.to_string(),
            kind: tag.to_string(),
        })?;
        let descriptor = kind.descriptor();

        for parameter in descriptor.required {
            if !params.contains_key(*parameter) {
                return Err(SchemaError::MissingParameter {
                    field: name.to_string(),
                    kind: descriptor.tag,
                    parameter: *parameter,
                });
            }
        }

        let resolve = |param: &str| -> Result<u32, SchemaError> {
            let value = match params.get(param) {
                Some(v) => *v,
                None => descriptor
                    .optional
                    .iter()
                    .find(|o| o.name == param)
                    .map(|o| match o.default {
                        ParamDefault::Value(v) => v,
                        ParamDefault::LocaleCount => options.locale_count,
                    })
                    .unwrap_or(1),
            };
            if value == 0 {
                return Err(SchemaError::InvalidParameter {
                    field: name.to_string(),
                    parameter: param.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            Ok(value)
        };

        let count = resolve("count")?;
        let locale_count = if kind == FieldKind::LocalizedString {
            resolve("locale_count")?
        } else {
            0
        };

        Ok(FieldSpec {
            name: name.to_string(),
            kind,
            count,
            locale_count,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Repeat count (always at least 1)
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Locale slots per occurrence; 0 for kinds other than `localized_string`
    pub fn locale_count(&self) -> u32 {
        self.locale_count
    }

    /// Raw value slots in one occurrence (locales plus flags for localized strings)
    pub fn slots_per_occurrence(&self) -> usize {
        match self.kind {
            FieldKind::LocalizedString => self.locale_count as usize + 1,
            _ => 1,
        }
    }

    /// Bytes taken by one occurrence
    pub fn occurrence_width(&self) -> usize {
        self.kind.slot_width() * self.slots_per_occurrence()
    }

    /// Bytes taken by the whole field in a record
    pub fn byte_width(&self) -> usize {
        self.occurrence_width() * self.count as usize
    }

    /// Logical columns this field expands into
    pub fn column_count(&self) -> usize {
        self.slots_per_occurrence() * self.count as usize
    }

    /// Logical column names, in byte order
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.column_count());
        for occurrence in 1..=self.count {
            let base = if self.count > 1 {
                format!("{}_{}", self.name, occurrence)
            } else {
                self.name.clone()
            };

            match self.kind {
                FieldKind::LocalizedString => {
                    for locale in 1..=self.locale_count {
                        names.push(format!("{}_{}", base, locale));
                    }
                    names.push(format!("{}_flags", base));
                }
                _ => names.push(base),
            }
        }
        names
    }
}
