//! The package facade (C7): holds a parsed directory, resolves
//! continuation-part paths, and performs random-access single-file
//! extraction.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::detect::{detect, DetectionResult};
use crate::entry::FileEntry;
use crate::error::{Error, Result};
use crate::lz4;
use crate::versions;

/// A parsed archive directory. Owns the directory, not the file contents:
/// [`Package::extract`] re-opens the relevant part file on every call, so a
/// `Package` can be shared across threads for read-only inspection.
#[derive(Debug, Clone)]
pub struct Package {
    pub version: u32,
    pub files: Vec<FileEntry>,
    pub path: PathBuf,
    pub flags: u32,
}

impl Package {
    /// Opens `path`, detects its version, and parses its directory.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;

        match detect(&mut file, Some(path))? {
            DetectionResult::Valid { version, .. } => {
                let directory = versions::read_directory(version, &mut file, path)?;
                Ok(Self {
                    version: directory.version,
                    files: directory.files,
                    path: path.to_path_buf(),
                    flags: directory.flags,
                })
            }
            DetectionResult::Continuation {
                parent_path,
                part_number,
            } => Err(Error::IsContinuation {
                path: path.to_path_buf(),
                parent_path,
                part_number,
            }),
            DetectionResult::Invalid => Err(Error::InvalidSignature),
        }
    }

    /// Looks up a directory entry by its archive-relative name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FileEntry> {
        self.files.iter().find(|entry| entry.name == name)
    }

    /// Extracts the named entry's payload.
    pub fn extract(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .find(name)
            .ok_or_else(|| Error::FileNotFound(name.to_owned()))?;
        self.extract_entry(entry)
    }

    /// Extracts a specific entry's payload, decompressing it if needed.
    ///
    /// Zero-size entries short-circuit before touching the LZ4 codec, so
    /// empty files never even open their part's data section.
    pub fn extract_entry(&self, entry: &FileEntry) -> Result<Vec<u8>> {
        if entry.size_on_disk == 0 {
            return Ok(Vec::new());
        }

        let part_path = self.part_path(entry.archive_part)?;
        let mut part_file = File::open(&part_path)?;
        part_file.seek(SeekFrom::Start(entry.offset))?;

        let mut raw = vec![0u8; entry.size_on_disk as usize];
        part_file.read_exact(&mut raw)?;

        if entry.is_compressed() {
            lz4::decode(&raw, entry.decoded_len() as usize, &entry.name)
        } else {
            Ok(raw)
        }
    }

    /// Extracts every entry into `dir`, recreating the archive's relative
    /// directory structure.
    pub fn extract_all(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        for entry in &self.files {
            let data = self.extract_entry(entry)?;
            let out_path = dir.join(&entry.name);
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(out_path, data)?;
        }
        Ok(())
    }

    /// Resolves the on-disk path of the part file holding `archive_part`.
    ///
    /// Part 0 is always `self.path` itself; part K>0 is the sibling
    /// `<stem>_<K>.<ext>` next to it.
    fn part_path(&self, archive_part: u32) -> Result<PathBuf> {
        if archive_part == 0 {
            return Ok(self.path.clone());
        }

        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self.path.extension().map(|e| e.to_string_lossy().into_owned());
        let file_name = match ext {
            Some(ext) => format!("{stem}_{archive_part}.{ext}"),
            None => format!("{stem}_{archive_part}"),
        };
        let candidate = self
            .path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(file_name);

        if candidate.exists() {
            Ok(candidate)
        } else {
            Err(Error::MissingPart {
                base: self.path.clone(),
                part: archive_part,
            })
        }
    }
}
