//! The caller-facing staging list a [`Writer`](crate::versions) consumes
//! on `save`.

use crate::binary::NAME_FIELD_LEN;
use crate::error::{Error, Result};

/// One file queued for writing, not yet serialised.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub compress: bool,
}

impl PendingFile {
    /// Rejects names that would not fit the on-disk name field before
    /// queueing anything, so a too-long name never reaches `save()` after
    /// other payloads have already been written.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, compress: bool) -> Result<Self> {
        let name = name.into();
        let len = name.len();
        if len >= NAME_FIELD_LEN {
            return Err(Error::NameTooLong(name, len));
        }
        Ok(Self {
            name,
            bytes,
            compress,
        })
    }
}
