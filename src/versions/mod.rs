//! Per-version binary codecs (C5, C6).
//!
//! Versions are a closed set of variants selected by [`read_directory`]; a
//! new on-disk version is a new submodule plus one arm in the dispatch
//! table below, not a trait object or open hierarchy.

mod v10;
mod v13;
mod v18;
mod v9;

pub use v10::WriterV10;
pub use v13::WriterV13;
pub use v18::WriterV18;

use std::io::{Read, Seek};
use std::path::Path;

use crate::entry::{FileEntry, FLAG_LZ4};
use crate::error::{Error, Result};
use crate::lz4;

/// A parsed archive directory, independent of which version produced it.
#[derive(Debug, Clone)]
pub struct Directory {
    pub version: u32,
    /// Header-level flags, preserved for round-trip; semantics opaque.
    pub flags: u32,
    pub files: Vec<FileEntry>,
}

/// Dispatches to the reader for `version` and parses the full directory.
///
/// This is the one place that maps an on-disk version number to a reader;
/// see the table in §6 of the format notes in `DESIGN.md`.
pub fn read_directory<R: Read + Seek>(
    version: u32,
    reader: &mut R,
    path: &Path,
) -> Result<Directory> {
    match version {
        7 | 9 => v9::read(reader),
        10 => v10::read(reader),
        13 => v13::read(reader),
        15 | 16 | 18 => {
            if version == 15 || version == 16 {
                tracing::warn!(
                    version,
                    path = %path.display(),
                    "V15/V16 archives are untested; attempting to parse with the V18 entry layout shape"
                );
            }
            v18::read(reader, version)
        }
        other => Err(Error::UnsupportedVersion(other)),
    }
}

/// Encodes one payload per the shared V13/V18 rule: empty files and
/// `compress == false` are stored raw with `uncompressed_size = 0, flags =
/// 0`; non-empty, `compress == true` files are LZ4-block-compressed with
/// the true decompressed size and the LZ4 flag bit set.
pub(crate) fn encode_payload(bytes: &[u8], compress: bool) -> (Vec<u8>, u32, u8) {
    if bytes.is_empty() || !compress {
        return (bytes.to_vec(), 0, 0);
    }
    let compressed = lz4::encode(bytes);
    let uncompressed_size = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    (compressed, uncompressed_size, FLAG_LZ4)
}
