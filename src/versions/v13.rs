//! V13 reader and writer. V13 is footer-based: the signature sits at the
//! very end of the file and the directory is LZ4-compressed. This is also
//! the only version this crate writes multi-part archives for.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::v10::ENTRY_LEN;
use super::Directory;
use crate::binary::{read_name_field, read_u16, read_u32, read_u8, write_name_field, write_u16,
    write_u32, write_u8};
use crate::entry::FileEntry;
use crate::error::{Error, Result};
use crate::lz4;
use crate::pending::PendingFile;

const NAME_LEN: usize = 256;
const HEADER_LEN: u64 = 32;
const HEADER_SIZE_WITH_FOOTER: u32 = HEADER_LEN as u32 + 8;

pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Directory> {
    reader.seek(SeekFrom::End(-8))?;
    let header_size = read_u32(reader)?;
    let _magic = read_u32(reader)?; // "LSPK", already confirmed by detect()

    let len = reader.seek(SeekFrom::End(0))?;
    let header_start = len.saturating_sub(u64::from(header_size));
    reader.seek(SeekFrom::Start(header_start))?;

    let version = read_u32(reader)?;
    let file_list_offset = u64::from(read_u32(reader)?);
    let file_list_size = read_u32(reader)?;
    let _num_parts = read_u16(reader)?;
    let flags = read_u8(reader)?;
    let _priority = read_u8(reader)?;
    let mut md5 = [0u8; 16];
    reader.read_exact(&mut md5)?;

    reader.seek(SeekFrom::Start(file_list_offset))?;
    let num_files = read_u32(reader)?;
    let compressed_len = file_list_size
        .checked_sub(4)
        .ok_or(Error::TruncatedHeader {
            expected: 4,
            actual: file_list_size as usize,
        })? as usize;
    let mut compressed_table = vec![0u8; compressed_len];
    reader.read_exact(&mut compressed_table)?;

    let table_len = num_files as usize * ENTRY_LEN;
    let table = lz4::decode(&compressed_table, table_len, "directory")?;

    let mut files = Vec::with_capacity(num_files as usize);
    for i in 0..num_files as usize {
        let entry_bytes = &table[i * ENTRY_LEN..(i + 1) * ENTRY_LEN];
        files.push(parse_entry(entry_bytes)?);
    }

    Ok(Directory {
        version,
        flags: u32::from(flags),
        files,
    })
}

fn parse_entry(bytes: &[u8]) -> Result<FileEntry> {
    let mut cursor = bytes;
    let name = read_name_field(&mut cursor, NAME_LEN)?;
    let offset = u64::from(read_u32(&mut cursor)?);
    let size_on_disk = u64::from(read_u32(&mut cursor)?);
    let uncompressed_size = u64::from(read_u32(&mut cursor)?);
    let archive_part = read_u32(&mut cursor)?;
    let flags = read_u32(&mut cursor)?;
    let _crc = read_u32(&mut cursor)?;

    Ok(FileEntry {
        name,
        offset,
        size_on_disk,
        uncompressed_size,
        archive_part,
        flags: Some(flags as u8),
    })
}

fn part_path(base: &Path, part: u32) -> PathBuf {
    if part == 0 {
        return base.to_path_buf();
    }
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    let ext = base.extension().map(|e| e.to_string_lossy().to_string());
    let file_name = match ext {
        Some(ext) => format!("{stem}_{part}.{ext}"),
        None => format!("{stem}_{part}"),
    };
    base.parent()
        .unwrap_or_else(|| Path::new(""))
        .join(file_name)
}

struct WrittenEntry {
    name: String,
    offset: u64,
    size_on_disk: u32,
    uncompressed_size: u32,
    archive_part: u32,
    flags: u8,
}

/// Writer for the V13 layout, with optional multi-part splitting.
///
/// When `max_part_size` is `None` this behaves as a plain single-file
/// writer. When set, a payload never spans two parts: the rollover check
/// is skipped whenever the current part is still empty, so a single
/// oversized payload still gets its own part rather than being rejected.
/// This also means the very first payload of the whole archive is never
/// rolled, even if it alone exceeds `max_part_size` -- preserved exactly
/// as the original tooling behaves.
pub struct WriterV13 {
    path: PathBuf,
    files: Vec<PendingFile>,
    max_part_size: Option<u64>,
}

impl WriterV13 {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, max_part_size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            files: Vec::new(),
            max_part_size,
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
        let mut main_file = File::create(&self.path)?;

        let mut current_index = 0u32;
        let mut current_size = 0u64;
        let mut current_part: Option<File> = None;
        let mut entries = Vec::with_capacity(self.files.len());

        for file in &self.files {
            let (payload, uncompressed_size, flags) =
                super::encode_payload(&file.bytes, file.compress);
            let payload_len = u64::try_from(payload.len()).unwrap_or(u64::MAX);

            if let Some(max) = self.max_part_size {
                if current_size != 0 && current_size + payload_len > max {
                    current_index += 1;
                    current_size = 0;
                    current_part = Some(File::create(part_path(&self.path, current_index))?);
                }
            }

            let offset = current_size;
            if current_index == 0 {
                main_file.write_all(&payload)?;
            } else {
                current_part
                    .as_mut()
                    .expect("part file opened above")
                    .write_all(&payload)?;
            }
            current_size += payload_len;

            entries.push(WrittenEntry {
                name: file.name.clone(),
                offset,
                size_on_disk: u32::try_from(payload.len()).unwrap_or(u32::MAX),
                uncompressed_size,
                archive_part: current_index,
                flags,
            });
        }
        drop(current_part);

        let file_list_offset = main_file.stream_position()?;

        let mut table = Vec::with_capacity(entries.len() * ENTRY_LEN);
        for entry in &entries {
            write_name_field(&mut table, &entry.name, NAME_LEN)?;
            write_u32(&mut table, u32::try_from(entry.offset).unwrap_or(u32::MAX))?;
            write_u32(&mut table, entry.size_on_disk)?;
            write_u32(&mut table, entry.uncompressed_size)?;
            write_u32(&mut table, entry.archive_part)?;
            write_u32(&mut table, u32::from(entry.flags))?;
            write_u32(&mut table, 0)?; // crc, unvalidated
        }

        let compressed_table = lz4::encode(&table);
        let num_files = u32::try_from(entries.len()).unwrap_or(u32::MAX);
        write_u32(&mut main_file, num_files)?;
        main_file.write_all(&compressed_table)?;

        write_u32(&mut main_file, 13)?; // version
        write_u32(
            &mut main_file,
            u32::try_from(file_list_offset).unwrap_or(u32::MAX),
        )?;
        let file_list_size = 4 + u32::try_from(compressed_table.len()).unwrap_or(u32::MAX);
        write_u32(&mut main_file, file_list_size)?;
        write_u16(&mut main_file, 1)?; // num_parts -- at least the main part
        write_u8(&mut main_file, 0)?; // flags
        write_u8(&mut main_file, 0)?; // priority
        main_file.write_all(&[0u8; 16])?; // md5, unvalidated

        write_u32(&mut main_file, HEADER_SIZE_WITH_FOOTER)?;
        main_file.write_all(b"LSPK")?;

        Ok(())
    }
}
