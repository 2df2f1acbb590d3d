//! # dbc-rs - Schema-driven DBC reader
//!
//! `dbc-rs` reads DBC client database tables: a 20-byte header, a flat array
//! of fixed-size records and a trailing string pool. Records carry no type
//! information of their own, so every file is read through a [`Schema`]
//! (a "mapping") that names each field and its kind.
//!
//! - **Typed fields**: int, uint, char, uchar, float, string,
//!   localized_string, foreign_key, each with an optional repeat count
//! - **Structural checks up front**: bad magic, truncation and record-size
//!   mismatches are rejected before any record is decoded
//! - **Non-fatal content errors**: bad string offsets become empty strings
//!   plus a logged [`DecodeError`], so one corrupt row never stops a scan
//! - **Seekable cursor** alongside a regular double-ended iterator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dbc_rs::{mapping, DbcFile, ReaderOptions, Result};
//!
//! # fn main() -> Result<()> {
//! let options = ReaderOptions::default();
//! let schema = mapping::load_schema("maps/AreaPOI.yaml", &options)?;
//! let dbc = DbcFile::open("AreaPOI.dbc", schema)?;
//!
//! let mut cursor = dbc.cursor();
//! while cursor.valid() {
//!     let record = cursor.current()?;
//!     println!("{:?}", record.get("id"));
//!     cursor.next();
//! }
//!
//! for error in dbc.errors() {
//!     eprintln!("{}", error);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Building a schema in code
//!
//! ```rust
//! use dbc_rs::{FieldDeclaration, Schema};
//!
//! let schema = Schema::new(vec![
//!     FieldDeclaration::new("id", "uint"),
//!     FieldDeclaration::new("name", "string"),
//!     FieldDeclaration::new("spells", "foreign_key").param("count", 3),
//! ])
//! .unwrap();
//!
//! assert_eq!(schema.total_record_size(), 20);
//! assert_eq!(schema.total_column_count(), 5);
//! ```

pub mod core;
pub mod export;
pub mod mapping;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use crate::core::{
    config, cursor, decoder, error, field, header, io, record, schema, store, string_pool,
    validation,
};

pub use crate::core::{
    ClientVersion, DbcError, DbcHeader, DecodeError, DecodeErrorKind, FieldDeclaration, FieldKind,
    FieldSpec, ReaderOptions, Record, RecordCursor, RecordStore, Records, Result, Schema,
    SchemaError, StringPool, Value,
};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An opened DBC file: its store plus where it came from
///
/// # Examples
///
/// ```rust,no_run
/// use dbc_rs::{DbcFile, FieldDeclaration, Schema};
///
/// # fn main() -> dbc_rs::Result<()> {
/// let schema = Schema::new(vec![FieldDeclaration::new("id", "uint")])?;
/// let dbc = DbcFile::open("Faction.dbc", schema)?;
/// assert_eq!(dbc.name(), "Faction");
/// println!("{} records", dbc.store().record_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DbcFile {
    name: String,
    path: PathBuf,
    store: RecordStore,
}

impl DbcFile {
    /// Open a file with default options
    pub fn open<P: AsRef<Path>>(path: P, schema: impl Into<Arc<Schema>>) -> Result<Self> {
        Self::open_with_options(path, schema, &ReaderOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        schema: impl Into<Arc<Schema>>,
        options: &ReaderOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let store = RecordStore::open_with_options(path, schema, options)?;
        Ok(Self::from_store(path, store))
    }

    /// Wrap an already-built store
    pub fn from_store<P: AsRef<Path>>(path: P, store: RecordStore) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        DbcFile { name, path, store }
    }

    /// File name without extension (e.g. "AreaPOI")
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn into_store(self) -> RecordStore {
        self.store
    }

    pub fn cursor(&self) -> RecordCursor<'_> {
        self.store.cursor()
    }

    /// Decode errors logged so far
    pub fn errors(&self) -> Vec<DecodeError> {
        self.store.errors()
    }
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
