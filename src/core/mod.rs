//! DBC decoding engine
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Header (20 bytes)                        │
//! │  - Magic: "WDBC"                         │
//! │  - record_count, field_count,            │
//! │    record_size, string_pool_size (u32 LE)│
//! ├──────────────────────────────────────────┤
//! │ Records                                  │
//! │  - record_count × record_size bytes      │
//! │  - decoded through a Schema              │
//! ├──────────────────────────────────────────┤
//! │ String pool                              │
//! │  - null-terminated text, offset-addressed│
//! └──────────────────────────────────────────┘
//! ```
//!
//! - [`field`] / [`schema`] - typed field descriptors and the ordered mapping
//! - [`header`] - fixed header parsing
//! - [`string_pool`] - offset → text resolution with memoization
//! - [`decoder`] - bytes + schema → [`Record`]
//! - [`store`] - file image, structural validation, decode by index
//! - [`cursor`] - seekable cursor and iterator over a store

pub mod config;
pub mod cursor;
pub mod decoder;
pub mod error;
pub mod field;
pub mod header;
pub mod io;
pub mod record;
pub mod schema;
pub mod store;
pub mod string_pool;
pub mod validation;

pub use config::{ClientVersion, ReaderOptions};
pub use cursor::{RecordCursor, Records};
pub use decoder::{DecodeError, DecodeErrorKind, RecordDecoder};
pub use error::{DbcError, Result, SchemaError};
pub use field::{FieldKind, FieldParams, FieldSpec};
pub use header::{DbcHeader, HEADER_SIZE, MAGIC};
pub use io::ByteSource;
pub use record::{Record, Value};
pub use schema::{FieldDeclaration, Schema};
pub use store::RecordStore;
pub use string_pool::StringPool;
