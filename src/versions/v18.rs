//! V18-family reader (V15, V16, V18) and the V18 writer.
//!
//! V15 and V16 share this header shape but use a wider, 296-byte entry
//! record; no known production archive uses them, so that branch is
//! exercised only by the dispatcher's untested-format warning.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::Directory;
use crate::binary::{join_offset_48, read_name_field, read_u16, read_u32, read_u8, read_u64,
    split_offset_48, write_name_field, write_u16, write_u32, write_u8};
use crate::entry::FileEntry;
use crate::error::Result;
use crate::lz4;
use crate::pending::PendingFile;

const NAME_LEN: usize = 256;
const HEADER_LEN: u64 = 36;
const V18_ENTRY_LEN: usize = NAME_LEN + 4 + 2 + 1 + 1 + 4 + 4;
const V15_V16_ENTRY_LEN: usize = NAME_LEN + 8 + 8 + 8 + 4 + 4 + 4 + 4;

pub fn read<R: Read + Seek>(reader: &mut R, version: u32) -> Result<Directory> {
    reader.seek(SeekFrom::Start(4))?; // past "LSPK"

    let file_version = read_u32(reader)?;
    let file_list_offset = read_u64(reader)?;
    let _file_list_size = read_u32(reader)?;
    let flags = read_u8(reader)?;
    let _priority = read_u8(reader)?;
    let mut _md5 = [0u8; 16];
    reader.read_exact(&mut _md5)?;
    let _num_parts = read_u16(reader)?;

    reader.seek(SeekFrom::Start(file_list_offset))?;
    let num_files = read_u32(reader)?;
    let compressed_size = read_u32(reader)?;
    let mut compressed = vec![0u8; compressed_size as usize];
    reader.read_exact(&mut compressed)?;

    let entry_len = if version == 18 {
        V18_ENTRY_LEN
    } else {
        V15_V16_ENTRY_LEN
    };
    let table = lz4::decode(&compressed, num_files as usize * entry_len, "directory")?;

    let mut files = Vec::with_capacity(num_files as usize);
    for i in 0..num_files as usize {
        let bytes = &table[i * entry_len..(i + 1) * entry_len];
        files.push(if version == 18 {
            parse_v18_entry(bytes)?
        } else {
            parse_v15_v16_entry(bytes)?
        });
    }

    Ok(Directory {
        version: file_version,
        flags: u32::from(flags),
        files,
    })
}

fn parse_v18_entry(bytes: &[u8]) -> Result<FileEntry> {
    let mut cursor = bytes;
    let name = read_name_field(&mut cursor, NAME_LEN)?;
    let offset_lo = read_u32(&mut cursor)?;
    let offset_hi = read_u16(&mut cursor)?;
    let archive_part = u32::from(read_u8(&mut cursor)?);
    let flags = read_u8(&mut cursor)?;
    let size_on_disk = u64::from(read_u32(&mut cursor)?);
    let uncompressed_size = u64::from(read_u32(&mut cursor)?);

    Ok(FileEntry {
        name,
        offset: join_offset_48(offset_lo, offset_hi),
        size_on_disk,
        uncompressed_size,
        archive_part,
        flags: Some(flags),
    })
}

fn parse_v15_v16_entry(bytes: &[u8]) -> Result<FileEntry> {
    let mut cursor = bytes;
    let name = read_name_field(&mut cursor, NAME_LEN)?;
    let offset = read_u64(&mut cursor)?;
    let size_on_disk = read_u64(&mut cursor)?;
    let uncompressed_size = read_u64(&mut cursor)?;
    let archive_part = read_u32(&mut cursor)?;
    let flags = read_u32(&mut cursor)?;
    let _crc = read_u32(&mut cursor)?;
    let _unknown = read_u32(&mut cursor)?;

    Ok(FileEntry {
        name,
        offset,
        size_on_disk,
        uncompressed_size,
        archive_part,
        flags: Some(flags as u8),
    })
}

struct WrittenEntry {
    name: String,
    offset: u64,
    size_on_disk: u32,
    uncompressed_size: u32,
    flags: u8,
}

/// Single-part V18 writer.
pub struct WriterV18 {
    path: PathBuf,
    files: Vec<PendingFile>,
}

impl WriterV18 {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            files: Vec::new(),
        }
    }

    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
        compress: bool,
    ) -> Result<()> {
        self.files.push(PendingFile::new(name, bytes, compress)?);
        Ok(())
    }

    pub fn add_file_from_path(
        &mut self,
        name: impl Into<String>,
        fs_path: &Path,
        compress: bool,
    ) -> Result<()> {
        let bytes = fs::read(fs_path)?;
        self.add_file(name, bytes, compress)
    }

    pub fn save(self) -> Result<()> {
        let mut out = File::create(&self.path)?;

        out.write_all(b"LSPK")?;
        out.write_all(&[0u8; HEADER_LEN as usize])?; // placeholder header

        let mut entries = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let (payload, uncompressed_size, flags) =
                super::encode_payload(&file.bytes, file.compress);
            let offset = out.stream_position()?;
            out.write_all(&payload)?;
            entries.push(WrittenEntry {
                name: file.name.clone(),
                offset,
                size_on_disk: u32::try_from(payload.len()).unwrap_or(u32::MAX),
                uncompressed_size,
                flags,
            });
        }

        let file_list_offset = out.stream_position()?;

        let mut table = Vec::with_capacity(entries.len() * V18_ENTRY_LEN);
        for entry in &entries {
            write_name_field(&mut table, &entry.name, NAME_LEN)?;
            let (lo, hi) = split_offset_48(entry.offset);
            write_u32(&mut table, lo)?;
            write_u16(&mut table, hi)?;
            write_u8(&mut table, 0)?; // archive_part: always main part
            write_u8(&mut table, entry.flags)?;
            write_u32(&mut table, entry.size_on_disk)?;
            write_u32(&mut table, entry.uncompressed_size)?;
        }

        let compressed_table = lz4::encode(&table);
        let num_files = u32::try_from(entries.len()).unwrap_or(u32::MAX);
        write_u32(&mut out, num_files)?;
        let compressed_size = u32::try_from(compressed_table.len()).unwrap_or(u32::MAX);
        write_u32(&mut out, compressed_size)?;
        out.write_all(&compressed_table)?;

        out.seek(SeekFrom::Start(4))?;
        write_u32(&mut out, 18)?; // version
        crate::binary::write_u64(&mut out, file_list_offset)?;
        write_u32(&mut out, 8 + compressed_size)?; // file_list_size
        write_u8(&mut out, 0)?; // flags
        write_u8(&mut out, 0)?; // priority
        out.write_all(&[0u8; 16])?; // md5, unvalidated
        write_u16(&mut out, 1)?; // num_parts

        Ok(())
    }
}
