//! V10 reader and writer. Directory offsets are relative to `data_offset`;
//! files are always stored uncompressed.

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::Directory;
use crate::binary::{read_name_field, read_u16, read_u32, read_u8, write_name_field, write_u16,
    write_u32, write_u8};
use crate::entry::FileEntry;
use crate::error::Result;
use crate::pending::PendingFile;

const NAME_LEN: usize = 256;
pub(crate) const ENTRY_LEN: usize = NAME_LEN + 4 * 4 + 4 + 4;
const HEADER_LEN: u32 = 20;

pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Directory> {
    reader.seek(SeekFrom::Start(4))?; // past "LSPK"

    let version = read_u32(reader)?;
    let data_offset = u64::from(read_u32(reader)?);
    let _file_list_size = read_u32(reader)?;
    let _num_parts = read_u16(reader)?;
    let flags = read_u8(reader)?;
    let _priority = read_u8(reader)?;
    let num_files = read_u32(reader)?;

    reader.seek(SeekFrom::Start(4 + u64::from(HEADER_LEN)))?;

    let mut files = Vec::with_capacity(num_files as usize);
    for _ in 0..num_files {
        let name = read_name_field(reader, NAME_LEN)?;
        let relative_offset = u64::from(read_u32(reader)?);
        let size_on_disk = u64::from(read_u32(reader)?);
        let uncompressed_size = u64::from(read_u32(reader)?);
        let archive_part = read_u32(reader)?;
        let entry_flags = read_u32(reader)?;
        let _crc = read_u32(reader)?;

        files.push(FileEntry {
            name,
            offset: data_offset + relative_offset,
            size_on_disk,
            uncompressed_size,
            archive_part,
            flags: Some(entry_flags as u8),
        });
    }

    Ok(Directory {
        version,
        flags: u32::from(flags),
        files,
    })
}

/// Stream-oriented writer for the V10 layout. Every payload is stored
/// uncompressed; the `compress` flag from [`PendingFile`] is accepted by
/// [`WriterV10::add_file`]'s signature-compatible callers but ignored, to
/// match the rest of this crate's staging API.
pub struct WriterV10 {
    path: PathBuf,
    files: Vec<PendingFile>,
}

impl WriterV10 {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            files: Vec::new(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        self.files.push(PendingFile::new(name, bytes, false)?);
        Ok(())
    }

    pub fn add_file_from_path(&mut self, name: impl Into<String>, fs_path: &Path) -> Result<()> {
        let bytes = fs::read(fs_path)?;
        self.add_file(name, bytes)
    }

    pub fn save(self) -> Result<()> {
        let mut out = fs::File::create(&self.path)?;

        let num_files = u32::try_from(self.files.len()).unwrap_or(u32::MAX);
        let data_offset = 4 + HEADER_LEN + num_files * ENTRY_LEN as u32;

        out.write_all(b"LSPK")?;
        write_u32(&mut out, 10)?; // version
        write_u32(&mut out, data_offset)?;
        let file_list_size = num_files * ENTRY_LEN as u32;
        write_u32(&mut out, file_list_size)?;
        write_u16(&mut out, 1)?; // num_parts
        write_u8(&mut out, 0)?; // flags
        write_u8(&mut out, 0)?; // priority
        write_u32(&mut out, num_files)?;

        let mut running_offset = 0u32;
        let mut directory_entries = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let size = u32::try_from(file.bytes.len()).unwrap_or(u32::MAX);
            directory_entries.push((file.name.clone(), running_offset, size));
            running_offset += size;
        }

        for (name, offset, size) in &directory_entries {
            write_name_field(&mut out, name, NAME_LEN)?;
            write_u32(&mut out, *offset)?;
            write_u32(&mut out, *size)?;
            write_u32(&mut out, 0)?; // uncompressed_size sentinel: stored
            write_u32(&mut out, 0)?; // archive_part
            write_u32(&mut out, 0)?; // flags
            write_u32(&mut out, 0)?; // crc, unvalidated
        }

        for file in &self.files {
            out.write_all(&file.bytes)?;
        }

        Ok(())
    }
}
