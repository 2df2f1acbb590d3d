//! Record traversal
//!
//! [`RecordCursor`] is an external, seekable cursor: it can step both ways
//! and be moved anywhere, including out of range, and callers ask
//! [`RecordCursor::valid`] before reading. It owns only a position; the
//! store stays shared and immutable. [`Records`] is the plain Rust iterator
//! over the same store.

use crate::decoder::DecodeError;
use crate::error::{DbcError, Result};
use crate::record::Record;
use crate::store::RecordStore;
use std::iter::FusedIterator;

/// Bidirectional, seekable cursor over a store's records
///
/// Records are decoded on each [`current`](Self::current) call; nothing is
/// cached by the cursor.
#[derive(Debug, Clone)]
pub struct RecordCursor<'a> {
    store: &'a RecordStore,
    position: i64,
}

#[allow(clippy::should_implement_trait)]
impl<'a> RecordCursor<'a> {
    /// Cursor at position 0
    pub fn new(store: &'a RecordStore) -> Self {
        RecordCursor { store, position: 0 }
    }

    /// Move back to the first record
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Step forward one record; stops at `i64::MAX`
    pub fn next(&mut self) {
        self.position = self.position.saturating_add(1);
    }

    /// Step back one record; may leave the valid range, stops at `i64::MIN`
    pub fn prev(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Jump to `position` without clamping
    pub fn seek(&mut self, position: i64) {
        self.position = position;
    }

    /// Current position, valid or not
    pub fn key(&self) -> i64 {
        self.position
    }

    /// True while the position addresses a record
    pub fn valid(&self) -> bool {
        self.position >= 0 && self.position < self.store.record_count() as i64
    }

    /// Decode the record at the current position
    pub fn current(&self) -> Result<Record> {
        self.decode().map(|(record, _)| record)
    }

    /// Decode the record at the current position along with its content problems
    pub fn decode(&self) -> Result<(Record, Vec<DecodeError>)> {
        if !self.valid() {
            return Err(DbcError::IndexOutOfRange {
                index: self.position,
                count: self.store.record_count(),
            });
        }
        self.store.decode(self.position as u32)
    }

    pub fn store(&self) -> &'a RecordStore {
        self.store
    }
}

/// Iterator over a store's records, from both ends
#[derive(Debug, Clone)]
pub struct Records<'a> {
    store: &'a RecordStore,
    front: u32,
    back: u32,
}

impl<'a> Records<'a> {
    pub(crate) fn new(store: &'a RecordStore) -> Self {
        Records {
            store,
            front: 0,
            back: store.record_count(),
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let index = self.front;
        self.front += 1;
        Some(self.store.record(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.back - self.front) as usize;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let remaining = (self.back - self.front) as usize;
        self.front += n.min(remaining) as u32;
        self.next()
    }
}

impl<'a> DoubleEndedIterator for Records<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.store.record(self.back))
    }
}

impl<'a> ExactSizeIterator for Records<'a> {}

impl<'a> FusedIterator for Records<'a> {}
