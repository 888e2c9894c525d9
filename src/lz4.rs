//! LZ4 block (de)compression, used for both payloads and compressed
//! directories. This wraps [`lz4_flex`]'s block API, which is the LZ4
//! *block* format (no frame container) the archives actually use.

use crate::error::{Error, Result};

/// Decompresses `compressed` into exactly `expected_size` bytes.
///
/// The archive format never stores the decompressed size inside the block
/// itself, so callers must supply it from the directory entry.
pub fn decode(compressed: &[u8], expected_size: usize, what: &str) -> Result<Vec<u8>> {
    lz4_flex::block::decompress(compressed, expected_size)
        .map_err(|e| Error::CompressionFailed(what.to_owned(), e.to_string()))
}

/// Compresses `data` with a single LZ4 block.
#[must_use]
pub fn encode(data: &[u8]) -> Vec<u8> {
    lz4_flex::block::compress(data)
}
