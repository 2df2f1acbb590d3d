//! Trailing string pool
//!
//! Record fields reference text by byte offset into the pool. An entry runs
//! from its offset up to the next zero byte (or the end of the pool). Offset
//! 0 is reserved for the empty string.
//!
//! The pool never changes after load, so resolved strings are memoized per
//! offset in a bounded LRU cache.

use crate::error::{DbcError, Result};
use crate::io::ByteSource;
use lru::LruCache;
use parking_lot::Mutex;
use std::borrow::Cow;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;

pub struct StringPool {
    source: Arc<ByteSource>,
    range: Range<usize>,
    cache: Option<Mutex<LruCache<u32, Arc<str>>>>,
}

impl StringPool {
    /// Pool over `range` of a shared file image
    pub fn new(source: Arc<ByteSource>, range: Range<usize>, cache_capacity: usize) -> Self {
        debug_assert!(range.end <= source.len());
        StringPool {
            source,
            range,
            cache: NonZeroUsize::new(cache_capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// Pool over a standalone buffer
    pub fn from_bytes(bytes: Vec<u8>, cache_capacity: usize) -> Self {
        let range = 0..bytes.len();
        Self::new(Arc::new(ByteSource::from(bytes)), range, cache_capacity)
    }

    /// Raw pool bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.source[self.range.clone()]
    }

    /// Pool size in bytes
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Bytes of the entry at `offset`, without its terminator
    pub fn bytes_at(&self, offset: u32) -> Result<&[u8]> {
        let bytes = self.as_bytes();
        let start = offset as usize;
        if start >= bytes.len() {
            return Err(DbcError::StringOffsetOutOfRange {
                offset,
                pool_size: bytes.len() as u32,
            });
        }

        let tail = &bytes[start..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Ok(&tail[..end])
    }

    /// Resolve an offset to its text
    ///
    /// # Errors
    ///
    /// - `StringOffsetOutOfRange` if `offset` is at or past the end of the pool
    /// - `InvalidText` if the entry is not valid UTF-8
    pub fn resolve(&self, offset: u32) -> Result<Arc<str>> {
        if offset == 0 {
            return Ok(Arc::from(""));
        }

        if let Some(cache) = &self.cache {
            if let Some(text) = cache.lock().get(&offset) {
                return Ok(Arc::clone(text));
            }
        }

        let bytes = self.bytes_at(offset)?;
        let text: Arc<str> = std::str::from_utf8(bytes)
            .map_err(|_| DbcError::InvalidText { offset })?
            .into();

        if let Some(cache) = &self.cache {
            cache.lock().put(offset, Arc::clone(&text));
        }

        Ok(text)
    }

    /// Resolve an offset, replacing invalid UTF-8 sequences
    pub fn resolve_lossy(&self, offset: u32) -> Result<Cow<'_, str>> {
        if offset == 0 {
            return Ok(Cow::Borrowed(""));
        }
        Ok(String::from_utf8_lossy(self.bytes_at(offset)?))
    }

    /// Entries in pool order as `(offset, text)`
    pub fn iter(&self) -> StringPoolIter<'_> {
        StringPoolIter {
            bytes: self.as_bytes(),
            offset: 0,
        }
    }

    /// Number of null-terminated entries in the pool
    pub fn string_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of memoized entries
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.lock().len())
    }
}

impl std::fmt::Debug for StringPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringPool")
            .field("len", &self.len())
            .field("cached", &self.cached_len())
            .finish()
    }
}

pub struct StringPoolIter<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for StringPoolIter<'a> {
    type Item = (u32, Cow<'a, str>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let start = self.offset;
        let tail = &self.bytes[start..];
        let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        self.offset = start + len + 1;

        Some((start as u32, String::from_utf8_lossy(&tail[..len])))
    }
}
