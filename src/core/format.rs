//! Array payload format constants.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic    [u8; 4]   "CZAR"
//! version  u8        1
//! dtype    u8        Dtype tag
//! rank     u8        1..=MAX_RANK
//! sizes    [u64; rank]  outer to inner
//! data     dtype.num_bytes() * product(sizes), row-major
//! ```

/// Magic bytes at the start of every array payload.
pub const ARRAY_MAGIC: &[u8; 4] = b"CZAR";

/// Current payload format version.
pub const CURRENT_VERSION: u8 = 1;

/// Offset of the version byte.
pub const VERSION_OFFSET: usize = 4;

/// Offset of the dtype tag.
pub const DTYPE_OFFSET: usize = 5;

/// Offset of the rank byte.
pub const RANK_OFFSET: usize = 6;

/// Size of the fixed part of the header (before the dimension sizes).
pub const FIXED_HEADER_SIZE: usize = 7;

/// Size of one dimension size field.
pub const DIM_FIELD_SIZE: usize = 8;

/// Highest rank accepted by the decoder.
pub const MAX_RANK: usize = 32;

/// Total header size for a given rank.
#[inline]
pub const fn header_size(rank: usize) -> usize {
    FIXED_HEADER_SIZE + rank * DIM_FIELD_SIZE
}

/// Check for the array payload magic.
#[inline]
pub fn has_magic(data: &[u8]) -> bool {
    data.len() >= ARRAY_MAGIC.len() && &data[..ARRAY_MAGIC.len()] == ARRAY_MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic() {
        assert_eq!(ARRAY_MAGIC.len(), VERSION_OFFSET);
        assert!(has_magic(b"CZAR\x01"));
        assert!(!has_magic(b"CZA"));
        assert!(!has_magic(b"\x93NUMPY"));
    }

    #[test]
    fn test_header_size() {
        assert_eq!(header_size(1), 15);
        assert_eq!(header_size(2), 23);
    }
}
