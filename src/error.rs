//! Error types for the LSPK archive library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a recognisable LSPK archive")]
    InvalidSignature,

    #[error(
        "{} is continuation part {part_number} of {}; open the main archive instead",
        path.display(), parent_path.display()
    )]
    IsContinuation {
        path: std::path::PathBuf,
        parent_path: std::path::PathBuf,
        part_number: u32,
    },

    #[error("unsupported archive version: {0}")]
    UnsupportedVersion(u32),

    #[error("truncated header: expected {expected} bytes, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    #[error("truncated directory entry at index {index}")]
    TruncatedEntry { index: usize },

    #[error("LZ4 decode failed for {0}: {1}")]
    CompressionFailed(String, String),

    #[error("no entry named {0:?} in archive")]
    FileNotFound(String),

    #[error("name {0:?} is {1} bytes, longer than the 255-byte on-disk limit")]
    NameTooLong(String, usize),

    #[error("part {part} of archive {} is missing", base.display())]
    MissingPart { base: std::path::PathBuf, part: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
