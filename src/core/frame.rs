//! Frame codec: gzip wrapping of array payloads.
//!
//! Frames use a fixed gzip header (no file name, mtime 0) so the same
//! payload always produces the same frame.

use std::io::{Read, Write};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};

use crate::util::{Error, Result};

/// gzip member magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Default compression level (gzip maximum).
pub const DEFAULT_LEVEL: u32 = 9;

/// Compress `data` into a gzip frame.
///
/// # Arguments
/// * `data` - Array payload bytes
/// * `level` - Compression level (0-9, clamped)
pub fn frame(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder: GzEncoder<Vec<u8>> = GzBuilder::new()
        .mtime(0)
        .write(Vec::with_capacity(data.len() / 2 + 32), Compression::new(level.min(9)));
    encoder.write_all(data).map_err(Error::CompressionFailure)?;
    let framed = encoder.finish().map_err(Error::CompressionFailure)?;

    tracing::trace!(raw = data.len(), framed = framed.len(), "framed payload");
    Ok(framed)
}

/// Inflate a gzip frame.
///
/// Fails with [`Error::CorruptFrame`] on a missing gzip header, a truncated
/// stream or a checksum mismatch.
pub fn unframe(data: &[u8]) -> Result<Vec<u8>> {
    if !is_framed(data) {
        return Err(Error::CorruptFrame("missing gzip header".into()));
    }

    let mut decoder = GzDecoder::new(data);
    let mut inflated = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| Error::CorruptFrame(e.to_string()))?;
    Ok(inflated)
}

/// Check if data starts with the gzip magic bytes.
pub fn is_framed(data: &[u8]) -> bool {
    data.len() >= GZIP_MAGIC.len() && data[..2] == GZIP_MAGIC
}
