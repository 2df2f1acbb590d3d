use crate::error::{DbcError, Result};

pub const MAGIC: [u8; 4] = *b"WDBC";
pub const HEADER_SIZE: usize = 20;

/// DBC file header
///
/// The first 20 bytes of every file: a 4-byte magic tag followed by four
/// little-endian `u32` values describing the record region and string pool.
///
/// ```text
/// offset  0: magic             "WDBC"
/// offset  4: record_count      u32 LE
/// offset  8: field_count       u32 LE (informational)
/// offset 12: record_size       u32 LE
/// offset 16: string_pool_size  u32 LE
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbcHeader {
    /// Magic tag: "WDBC"
    pub magic: [u8; 4],

    /// Number of fixed-size records
    pub record_count: u32,

    /// Raw field-entry count as written by the producer
    pub field_count: u32,

    /// Bytes per record
    pub record_size: u32,

    /// Bytes in the trailing string pool
    pub string_pool_size: u32,
}

impl DbcHeader {
    /// Parse and validate the header from the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(DbcError::Truncated {
                section: "header",
                expected: HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);

        let header = DbcHeader {
            magic,
            record_count: read_u32(bytes, 4),
            field_count: read_u32(bytes, 8),
            record_size: read_u32(bytes, 12),
            string_pool_size: read_u32(bytes, 16),
        };

        header.validate()?;

        Ok(header)
    }

    /// Check the magic tag
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(DbcError::InvalidMagic {
                expected: MAGIC,
                actual: self.magic,
            });
        }
        Ok(())
    }

    /// Size of the record region in bytes
    pub fn records_len(&self) -> u64 {
        self.record_count as u64 * self.record_size as u64
    }

    /// Total file size implied by the header
    pub fn expected_file_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.records_len() + self.string_pool_size as u64
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
