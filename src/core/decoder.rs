//! Schema-driven record decoding
//!
//! Walks the schema's fields in declaration order with a running byte
//! cursor and turns one record's raw bytes into typed values. Content
//! problems never abort a record: the affected column gets a substitute
//! value and a [`DecodeError`] is reported alongside the record.

use crate::error::DbcError;
use crate::field::FieldKind;
use crate::record::{Record, Value};
use crate::schema::Schema;
use crate::string_pool::StringPool;
use serde::Serialize;
use std::sync::Arc;

/// Kind of a non-fatal decode problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorKind {
    /// String offset at or past the end of the pool
    BadStringOffset,
    /// Pool entry is not valid UTF-8
    InvalidText,
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DecodeErrorKind::BadStringOffset => "bad string offset",
            DecodeErrorKind::InvalidText => "invalid text",
        })
    }
}

/// A per-record, per-column content problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeError {
    pub record: u32,
    pub field: String,
    pub kind: DecodeErrorKind,
    pub hint: String,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} ({}/{}): {}",
            self.record, self.kind, self.field, self.hint
        )
    }
}

/// Decodes raw records of one file
pub struct RecordDecoder<'a> {
    schema: &'a Schema,
    pool: &'a StringPool,
}

impl<'a> RecordDecoder<'a> {
    pub fn new(schema: &'a Schema, pool: &'a StringPool) -> Self {
        RecordDecoder { schema, pool }
    }

    /// Decode record `index` from its raw bytes
    ///
    /// `raw` must be exactly `schema.total_record_size()` bytes; the store
    /// guarantees this before any record is decoded.
    pub fn decode(&self, index: u32, raw: &[u8]) -> (Record, Vec<DecodeError>) {
        debug_assert_eq!(raw.len(), self.schema.total_record_size());

        let columns = self.schema.shared_columns();
        let mut values = Vec::with_capacity(columns.len());
        let mut errors = Vec::new();
        let mut cursor = 0usize;

        for field in self.schema.fields() {
            for _ in 0..field.count() {
                match field.kind() {
                    FieldKind::SignedInt | FieldKind::ForeignKey => {
                        values.push(Value::Int(i32::from_le_bytes(slot(raw, cursor))));
                        cursor += 4;
                    }
                    FieldKind::UnsignedInt => {
                        values.push(Value::UInt(u32::from_le_bytes(slot(raw, cursor))));
                        cursor += 4;
                    }
                    FieldKind::SignedByte => {
                        values.push(Value::Int(raw[cursor] as i8 as i32));
                        cursor += 1;
                    }
                    FieldKind::UnsignedByte => {
                        values.push(Value::UInt(raw[cursor] as u32));
                        cursor += 1;
                    }
                    FieldKind::Float => {
                        values.push(Value::Float(f32::from_le_bytes(slot(raw, cursor))));
                        cursor += 4;
                    }
                    FieldKind::String => {
                        let offset = u32::from_le_bytes(slot(raw, cursor));
                        let text = self.text(index, &columns[values.len()], offset, &mut errors);
                        values.push(Value::Text(text));
                        cursor += 4;
                    }
                    FieldKind::LocalizedString => {
                        for _ in 0..field.locale_count() {
                            let offset = u32::from_le_bytes(slot(raw, cursor));
                            let text =
                                self.text(index, &columns[values.len()], offset, &mut errors);
                            values.push(Value::Text(text));
                            cursor += 4;
                        }
                        values.push(Value::UInt(u32::from_le_bytes(slot(raw, cursor))));
                        cursor += 4;
                    }
                }
            }
        }

        (Record::new(index, columns, values), errors)
    }

    /// Resolve a string column, substituting on failure
    fn text(
        &self,
        index: u32,
        column: &str,
        offset: u32,
        errors: &mut Vec<DecodeError>,
    ) -> Arc<str> {
        match self.pool.resolve(offset) {
            Ok(text) => text,
            Err(DbcError::InvalidText { .. }) => {
                errors.push(DecodeError {
                    record: index,
                    field: column.to_string(),
                    kind: DecodeErrorKind::InvalidText,
                    hint: format!("string at offset {} is not valid UTF-8", offset),
                });
                self.pool
                    .resolve_lossy(offset)
                    .map(|s| Arc::from(s.as_ref()))
                    .unwrap_or_else(|_| Arc::from(""))
            }
            Err(_) => {
                errors.push(DecodeError {
                    record: index,
                    field: column.to_string(),
                    kind: DecodeErrorKind::BadStringOffset,
                    hint: format!(
                        "offset {} is outside the string pool ({} bytes)",
                        offset,
                        self.pool.len()
                    ),
                });
                Arc::from("")
            }
        }
    }
}

fn slot(raw: &[u8], at: usize) -> [u8; 4] {
    [raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReaderOptions;
    use crate::schema::FieldDeclaration;

    fn le(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_numeric_kinds() {
        let schema = Schema::new(vec![
            FieldDeclaration::new("a", "int"),
            FieldDeclaration::new("b", "uint"),
            FieldDeclaration::new("c", "char"),
            FieldDeclaration::new("d", "uchar"),
            FieldDeclaration::new("e", "float"),
        ])
        .unwrap();
        let pool = StringPool::from_bytes(Vec::new(), 0);

        let mut raw = Vec::new();
        raw.extend_from_slice(&(-5i32).to_le_bytes());
        raw.extend_from_slice(&0xFFFF_FFFEu32.to_le_bytes());
        raw.push(0xFF);
        raw.push(0xFF);
        raw.extend_from_slice(&2.5f32.to_le_bytes());

        let (record, errors) = RecordDecoder::new(&schema, &pool).decode(3, &raw);
        assert!(errors.is_empty());
        assert_eq!(record.index(), 3);
        assert_eq!(
            record.values(),
            &[
                Value::Int(-5),
                Value::UInt(0xFFFF_FFFE),
                Value::Int(-1),
                Value::UInt(255),
                Value::Float(2.5),
            ]
        );
    }

    #[test]
    fn test_foreign_key_columns() {
        let schema =
            Schema::new(vec![FieldDeclaration::new("ref", "foreign_key").param("count", 3)]).unwrap();
        let pool = StringPool::from_bytes(Vec::new(), 0);

        let raw: Vec<u8> = [7i32, -1, 42].iter().flat_map(|v| v.to_le_bytes()).collect();
        let (record, errors) = RecordDecoder::new(&schema, &pool).decode(0, &raw);

        assert!(errors.is_empty());
        assert_eq!(record.get("ref_1"), Some(&Value::Int(7)));
        assert_eq!(record.get("ref_2"), Some(&Value::Int(-1)));
        assert_eq!(record.get("ref_3"), Some(&Value::Int(42)));
    }

    #[test]
    fn test_strings_and_bad_offset() {
        let schema = Schema::new(vec![
            FieldDeclaration::new("id", "uint"),
            FieldDeclaration::new("name", "string"),
            FieldDeclaration::new("alt", "string"),
        ])
        .unwrap();
        let pool = StringPool::from_bytes(b"\0Westfall\0".to_vec(), 8);

        let raw = le(&[40, 1, 500]);
        let (record, errors) = RecordDecoder::new(&schema, &pool).decode(9, &raw);

        assert_eq!(record.get("name").and_then(Value::as_str), Some("Westfall"));
        assert_eq!(record.get("alt").and_then(Value::as_str), Some(""));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].record, 9);
        assert_eq!(errors[0].field, "alt");
        assert_eq!(errors[0].kind, DecodeErrorKind::BadStringOffset);
        assert_eq!(
            errors[0].to_string(),
            "#9 (bad string offset/alt): offset 500 is outside the string pool (10 bytes)"
        );
    }

    #[test]
    fn test_invalid_text_is_lossy() {
        let schema = Schema::new(vec![FieldDeclaration::new("name", "string")]).unwrap();
        let pool = StringPool::from_bytes(b"\0a\xffb\0".to_vec(), 8);

        let (record, errors) = RecordDecoder::new(&schema, &pool).decode(0, &le(&[1]));
        assert_eq!(record.get("name").and_then(Value::as_str), Some("a\u{fffd}b"));
        assert_eq!(errors[0].kind, DecodeErrorKind::InvalidText);
    }

    #[test]
    fn test_localized_string_layout() {
        let options = ReaderOptions {
            locale_count: 3,
            ..ReaderOptions::default()
        };
        let schema = Schema::with_options(
            vec![
                FieldDeclaration::new("name", "localized_string"),
                FieldDeclaration::new("after", "uint"),
            ],
            &options,
        )
        .unwrap();
        let pool = StringPool::from_bytes(b"\0Hello\0Bonjour\0".to_vec(), 8);

        let raw = le(&[1, 0, 7, 0xFF, 99]);
        let (record, errors) = RecordDecoder::new(&schema, &pool).decode(0, &raw);

        assert!(errors.is_empty());
        assert_eq!(record.get("name_1").and_then(Value::as_str), Some("Hello"));
        assert_eq!(record.get("name_2").and_then(Value::as_str), Some(""));
        assert_eq!(record.get("name_3").and_then(Value::as_str), Some("Bonjour"));
        assert_eq!(record.get("name_flags"), Some(&Value::UInt(0xFF)));
        assert_eq!(record.get("after"), Some(&Value::UInt(99)));
    }

    #[test]
    fn test_repeated_localized_string_layout() {
        let schema = Schema::new(vec![
            FieldDeclaration::new("title", "localized_string")
                .param("count", 2)
                .param("locale_count", 2),
            FieldDeclaration::new("after", "uint"),
        ])
        .unwrap();
        assert_eq!(schema.total_record_size(), 28);
        let pool = StringPool::from_bytes(b"\0Hello\0Bonjour\0".to_vec(), 8);

        let raw = le(&[1, 7, 0x11, 7, 0, 0x22, 5]);
        let (record, errors) = RecordDecoder::new(&schema, &pool).decode(0, &raw);

        assert!(errors.is_empty());
        assert_eq!(
            record.columns(),
            &[
                "title_1_1",
                "title_1_2",
                "title_1_flags",
                "title_2_1",
                "title_2_2",
                "title_2_flags",
                "after"
            ]
        );
        assert_eq!(record.get("title_1_1").and_then(Value::as_str), Some("Hello"));
        assert_eq!(record.get("title_1_2").and_then(Value::as_str), Some("Bonjour"));
        assert_eq!(record.get("title_1_flags"), Some(&Value::UInt(0x11)));
        assert_eq!(record.get("title_2_1").and_then(Value::as_str), Some("Bonjour"));
        assert_eq!(record.get("title_2_2").and_then(Value::as_str), Some(""));
        assert_eq!(record.get("title_2_flags"), Some(&Value::UInt(0x22)));
        assert_eq!(record.get("after"), Some(&Value::UInt(5)));
    }

    #[test]
    fn test_decode_is_repeatable() {
        let schema = Schema::new(vec![
            FieldDeclaration::new("id", "uint"),
            FieldDeclaration::new("name", "string"),
        ])
        .unwrap();
        let pool = StringPool::from_bytes(b"\0x\0".to_vec(), 8);
        let decoder = RecordDecoder::new(&schema, &pool);

        let raw = le(&[1, 1]);
        assert_eq!(decoder.decode(0, &raw), decoder.decode(0, &raw));
    }
}
