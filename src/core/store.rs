//! Record store
//!
//! Owns one file image and splits it into header, record region and string
//! pool. Every structural check happens in the constructor; afterwards the
//! store is read-only and any record can be decoded by index, repeatedly and
//! from any number of threads.

use crate::config::ReaderOptions;
use crate::cursor::{RecordCursor, Records};
use crate::decoder::{DecodeError, RecordDecoder};
use crate::error::{DbcError, Result};
use crate::header::{DbcHeader, HEADER_SIZE};
use crate::io::ByteSource;
use crate::record::Record;
use crate::schema::Schema;
use crate::string_pool::StringPool;
use parking_lot::Mutex;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

pub struct RecordStore {
    header: DbcHeader,
    source: Arc<ByteSource>,
    records: Range<usize>,
    schema: Arc<Schema>,
    pool: StringPool,
    errors: Mutex<Vec<DecodeError>>,
}

impl RecordStore {
    /// Memory-map and open a file
    pub fn open<P: AsRef<Path>>(path: P, schema: impl Into<Arc<Schema>>) -> Result<Self> {
        Self::open_with_options(path, schema, &ReaderOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        schema: impl Into<Arc<Schema>>,
        options: &ReaderOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let store = Self::from_source(ByteSource::open(path)?, schema, options)?;

        info!(
            path = %path.display(),
            records = store.record_count(),
            record_size = store.record_size(),
            "Opened DBC file"
        );

        Ok(store)
    }

    /// Open an in-memory file image
    pub fn from_bytes(bytes: Vec<u8>, schema: impl Into<Arc<Schema>>) -> Result<Self> {
        Self::from_source(ByteSource::from(bytes), schema, &ReaderOptions::default())
    }

    /// Validate `source` against `schema` and build the store
    ///
    /// # Errors
    ///
    /// - `InvalidMagic` if the file does not start with `WDBC`
    /// - `Truncated` if the file is shorter than its header declares
    /// - `SchemaMismatch` if the declared record size differs from the schema's
    /// - `StringPoolRequired` if the schema has string fields but the pool is empty
    pub fn from_source(
        source: ByteSource,
        schema: impl Into<Arc<Schema>>,
        options: &ReaderOptions,
    ) -> Result<Self> {
        let schema = schema.into();
        let header = DbcHeader::from_bytes(&source)?;

        let available = (source.len() - HEADER_SIZE) as u64;
        let records_len = header.records_len();
        if available < records_len {
            return Err(DbcError::Truncated {
                section: "records",
                expected: records_len,
                actual: available,
            });
        }

        let pool_len = header.string_pool_size as u64;
        if available - records_len < pool_len {
            return Err(DbcError::Truncated {
                section: "string pool",
                expected: pool_len,
                actual: available - records_len,
            });
        }

        if header.record_size as usize != schema.total_record_size() {
            return Err(DbcError::SchemaMismatch {
                what: "record size",
                declared: header.record_size as u64,
                computed: schema.total_record_size() as u64,
            });
        }

        if schema.has_strings() && header.string_pool_size == 0 {
            return Err(DbcError::StringPoolRequired);
        }

        if header.field_count as usize != schema.total_column_count() {
            if options.strict_field_count {
                return Err(DbcError::SchemaMismatch {
                    what: "field count",
                    declared: header.field_count as u64,
                    computed: schema.total_column_count() as u64,
                });
            }
            warn!(
                declared = header.field_count,
                computed = schema.total_column_count(),
                "Header field count differs from mapping column count"
            );
        }

        let records = HEADER_SIZE..HEADER_SIZE + records_len as usize;
        let pool_range = records.end..records.end + pool_len as usize;
        if (pool_range.end as u64) < source.len() as u64 {
            debug!(
                trailing = source.len() - pool_range.end,
                "Ignoring bytes after string pool"
            );
        }

        let source = Arc::new(source);
        let pool = StringPool::new(Arc::clone(&source), pool_range, options.string_cache_capacity);

        Ok(RecordStore {
            header,
            source,
            records,
            schema,
            pool,
            errors: Mutex::new(Vec::new()),
        })
    }

    pub fn header(&self) -> &DbcHeader {
        &self.header
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn string_pool(&self) -> &StringPool {
        &self.pool
    }

    pub fn record_count(&self) -> u32 {
        self.header.record_count
    }

    pub fn record_size(&self) -> u32 {
        self.header.record_size
    }

    /// Logical columns per record, from the schema (not the header's raw count)
    pub fn field_count(&self) -> usize {
        self.schema.total_column_count()
    }

    pub fn has_strings(&self) -> bool {
        self.schema.has_strings()
    }

    pub fn is_empty(&self) -> bool {
        self.header.record_count == 0
    }

    /// Raw bytes of record `index`
    pub fn record_bytes(&self, index: u32) -> Result<&[u8]> {
        if index >= self.header.record_count {
            return Err(DbcError::IndexOutOfRange {
                index: index as i64,
                count: self.header.record_count,
            });
        }

        let size = self.header.record_size as usize;
        let start = self.records.start + index as usize * size;
        Ok(&self.source[start..start + size])
    }

    /// Decode record `index`, returning its content problems alongside it
    ///
    /// Problems are also appended to the store's error log.
    pub fn decode(&self, index: u32) -> Result<(Record, Vec<DecodeError>)> {
        let raw = self.record_bytes(index)?;
        let (record, errors) = RecordDecoder::new(&self.schema, &self.pool).decode(index, raw);

        if !errors.is_empty() {
            trace!(record = index, errors = errors.len(), "Decoded record with errors");
            self.errors.lock().extend(errors.iter().cloned());
        }

        Ok((record, errors))
    }

    /// Decode record `index`
    pub fn record(&self, index: u32) -> Result<Record> {
        self.decode(index).map(|(record, _)| record)
    }

    /// Seekable cursor positioned at the first record
    pub fn cursor(&self) -> RecordCursor<'_> {
        RecordCursor::new(self)
    }

    /// Iterator over all records in order
    pub fn iter(&self) -> Records<'_> {
        Records::new(self)
    }

    /// Decode errors logged by every decode so far
    pub fn errors(&self) -> Vec<DecodeError> {
        self.errors.lock().clone()
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().len()
    }

    /// Drain the error log
    pub fn take_errors(&self) -> Vec<DecodeError> {
        std::mem::take(&mut *self.errors.lock())
    }

    pub fn clear_errors(&self) {
        self.errors.lock().clear();
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = Result<Record>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Records<'a> {
        self.iter()
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("header", &self.header)
            .field("source", &self.source)
            .field("pool", &self.pool)
            .finish()
    }
}
