//! Shared fixtures: assemble DBC file images in memory

#![allow(dead_code)]

use dbc_rs::{FieldDeclaration, Schema};

/// Builds a DBC file image field by field
#[derive(Default)]
pub struct DbcBuilder {
    magic: Option<[u8; 4]>,
    field_count: Option<u32>,
    record_size: u32,
    records: Vec<Vec<u8>>,
    pool: Vec<u8>,
}

impl DbcBuilder {
    pub fn new(record_size: u32) -> Self {
        DbcBuilder {
            record_size,
            pool: vec![0],
            ..Default::default()
        }
    }

    pub fn magic(mut self, magic: &[u8; 4]) -> Self {
        self.magic = Some(*magic);
        self
    }

    pub fn field_count(mut self, count: u32) -> Self {
        self.field_count = Some(count);
        self
    }

    /// Replace the string pool (the default is a single zero byte)
    pub fn pool(mut self, pool: &[u8]) -> Self {
        self.pool = pool.to_vec();
        self
    }

    /// Append a string to the pool, returning its offset
    pub fn string(&mut self, text: &str) -> u32 {
        let offset = self.pool.len() as u32;
        self.pool.extend_from_slice(text.as_bytes());
        self.pool.push(0);
        offset
    }

    pub fn record(mut self, bytes: Vec<u8>) -> Self {
        self.records.push(bytes);
        self
    }

    pub fn push_record(&mut self, bytes: Vec<u8>) {
        self.records.push(bytes);
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = self.magic.unwrap_or(*b"WDBC").to_vec();
        let field_count = self.field_count.unwrap_or(self.record_size / 4);
        for v in [
            self.records.len() as u32,
            field_count,
            self.record_size,
            self.pool.len() as u32,
        ] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        for record in &self.records {
            bytes.extend_from_slice(record);
        }
        bytes.extend_from_slice(&self.pool);
        bytes
    }
}

/// Little-endian encoding of a row of 4-byte slots
pub struct Row(Vec<u8>);

impl Row {
    pub fn new() -> Self {
        Row(Vec::new())
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn bytes(self) -> Vec<u8> {
        self.0
    }
}

/// `{id: uint, name: string, amount: float}`
pub fn item_schema() -> Schema {
    Schema::new(vec![
        FieldDeclaration::new("id", "uint"),
        FieldDeclaration::new("name", "string"),
        FieldDeclaration::new("amount", "float"),
    ])
    .unwrap()
}
