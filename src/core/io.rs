//! Byte sources for DBC files
//!
//! A store owns the complete file image. Files opened from disk are memory
//! mapped read-only; buffers handed in by callers are kept as-is.

use crate::error::Result;
use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

/// Immutable file image
pub enum ByteSource {
    /// Buffer supplied by the caller
    Owned(Vec<u8>),
    /// Read-only memory map of a file
    Mapped(Mmap),
}

impl ByteSource {
    /// Memory-map a file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;

        // empty files cannot be mapped on every platform
        if file.metadata()?.len() == 0 {
            return Ok(ByteSource::Owned(Vec::new()));
        }

        // SAFETY: The file is opened read-only and the map is never written to
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(ByteSource::Mapped(mmap))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            ByteSource::Owned(bytes) => bytes.as_slice(),
            ByteSource::Mapped(mmap) => &mmap[..],
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, ByteSource::Mapped(_))
    }
}

impl Deref for ByteSource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(bytes: Vec<u8>) -> Self {
        ByteSource::Owned(bytes)
    }
}

impl std::fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_mapped() { "Mapped" } else { "Owned" };
        f.debug_struct("ByteSource")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}
