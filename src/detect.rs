//! Version detection and multi-part continuation resolution (C4).
//!
//! `detect` classifies a byte stream as a valid archive of some version, a
//! continuation part of another archive, or invalid, using at most a
//! handful of fixed-offset reads -- never a scan proportional to file size.

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::versions;

/// Where the `LSPK` signature was found, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureLocation {
    /// Header-based formats (V10, V15, V16, V18): signature at offset 0.
    Start,
    /// Footer-based formats (V13): signature at the very end of the file.
    End,
    /// Legacy formats (V7, V9) that carry no signature at all.
    None,
}

/// Outcome of probing a byte stream for an LSPK archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionResult {
    /// A directly-readable archive of the given version.
    Valid {
        version: u32,
        signature_location: SignatureLocation,
    },
    /// A part file that only makes sense opened through its parent.
    Continuation {
        parent_path: PathBuf,
        part_number: u32,
    },
    /// Neither of the above.
    Invalid,
}

static CONTINUATION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+)_(\d+)\.pak$").expect("static pattern is valid"));

const MAGIC: &[u8; 4] = b"LSPK";

/// Probes `stream` for a recognisable LSPK archive, consulting `path_hint`
/// only to resolve multi-part continuations (step 4 of the algorithm
/// below). Performs O(1) I/O beyond the one directory read needed to
/// confirm a continuation.
///
/// Probe order, exactly as specified:
/// 1. Footer signature (V13) -- last 4 bytes == `LSPK`.
/// 2. Header signature (V10/V15/V16/V18) -- first 4 bytes == `LSPK`.
/// 3. Legacy version word (V7/V9) -- first 4 bytes == 7 or 9.
/// 4. Continuation naming convention, verified against the parent's directory.
/// 5. Otherwise invalid.
pub fn detect<S: Read + Seek>(stream: &mut S, path_hint: Option<&Path>) -> Result<DetectionResult> {
    let len = stream.seek(SeekFrom::End(0))?;

    if len >= 8 {
        stream.seek(SeekFrom::End(-8))?;
        let mut tail = [0u8; 8];
        stream.read_exact(&mut tail)?;
        if &tail[4..8] == MAGIC {
            let header_size = u32::from_le_bytes(tail[0..4].try_into().unwrap());
            let footer_start = len.saturating_sub(u64::from(header_size));
            stream.seek(SeekFrom::Start(footer_start))?;
            let mut version_bytes = [0u8; 4];
            stream.read_exact(&mut version_bytes)?;
            let version = u32::from_le_bytes(version_bytes);
            return Ok(DetectionResult::Valid {
                version,
                signature_location: SignatureLocation::End,
            });
        }
    }

    if len >= 8 {
        stream.seek(SeekFrom::Start(0))?;
        let mut head = [0u8; 8];
        stream.read_exact(&mut head)?;
        if &head[0..4] == MAGIC {
            let version = u32::from_le_bytes(head[4..8].try_into().unwrap());
            return Ok(DetectionResult::Valid {
                version,
                signature_location: SignatureLocation::Start,
            });
        }
    }

    if len >= 4 {
        stream.seek(SeekFrom::Start(0))?;
        let mut word = [0u8; 4];
        stream.read_exact(&mut word)?;
        let value = u32::from_le_bytes(word);
        if value == 7 || value == 9 {
            return Ok(DetectionResult::Valid {
                version: value,
                signature_location: SignatureLocation::None,
            });
        }
    }

    if let Some(path) = path_hint {
        if let Some(result) = detect_continuation(path)? {
            return Ok(result);
        }
    }

    Ok(DetectionResult::Invalid)
}

fn detect_continuation(path: &Path) -> Result<Option<DetectionResult>> {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let Some(captures) = CONTINUATION_NAME.captures(file_name) else {
        return Ok(None);
    };
    let stem = &captures[1];
    let Ok(part_number) = captures[2].parse::<u32>() else {
        return Ok(None);
    };

    let parent_path = path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{stem}.pak"));

    let Ok(mut parent_file) = std::fs::File::open(&parent_path) else {
        return Ok(None);
    };

    let parent_detection = detect(&mut parent_file, Some(&parent_path))?;
    let DetectionResult::Valid { version, .. } = parent_detection else {
        return Ok(None);
    };

    let directory = versions::read_directory(version, &mut parent_file, &parent_path)?;
    let has_part = directory
        .files
        .iter()
        .any(|entry| entry.archive_part == part_number);

    if has_part {
        Ok(Some(DetectionResult::Continuation {
            parent_path,
            part_number,
        }))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn rejects_arbitrary_binary() {
        let mut data = Cursor::new(vec![0xAAu8; 64]);
        assert_eq!(detect(&mut data, None).unwrap(), DetectionResult::Invalid);
    }

    #[test]
    fn detects_legacy_version_word() {
        let mut bytes = 9u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 64]);
        let mut data = Cursor::new(bytes);
        assert_eq!(
            detect(&mut data, None).unwrap(),
            DetectionResult::Valid {
                version: 9,
                signature_location: SignatureLocation::None,
            }
        );
    }

    #[test]
    fn detects_header_signature() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&18u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 32]);
        let mut data = Cursor::new(bytes);
        assert_eq!(
            detect(&mut data, None).unwrap(),
            DetectionResult::Valid {
                version: 18,
                signature_location: SignatureLocation::Start,
            }
        );
    }

    #[test]
    fn detects_footer_signature() {
        let mut bytes = vec![0u8; 13];
        let header_start = bytes.len() as u32;
        bytes.extend_from_slice(&13u32.to_le_bytes()); // version, at footer_start
        bytes.extend_from_slice(&[0u8; 28]); // rest of the 32-byte header
        let header_size = bytes.len() as u32 - header_start;
        bytes.extend_from_slice(&header_size.to_le_bytes());
        bytes.extend_from_slice(MAGIC);
        let mut data = Cursor::new(bytes);
        assert_eq!(
            detect(&mut data, None).unwrap(),
            DetectionResult::Valid {
                version: 13,
                signature_location: SignatureLocation::End,
            }
        );
    }
}
