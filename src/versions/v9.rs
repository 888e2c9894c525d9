//! V7/V9 reader: the oldest supported layout, signatureless and with an
//! uncompressed directory immediately following a fixed 21-byte header.
//!
//! The V7 and V9 archives observed in the wild share this layout; no
//! structural difference has been documented between them, but the header
//! field widths assumed here (`u32` offsets) are unverified for V7. Treat
//! V7 support as provisional.

use std::io::{Read, Seek, SeekFrom};

use super::Directory;
use crate::binary::{read_name_field, read_u32, read_u8};
use crate::entry::FileEntry;
use crate::error::Result;

const HEADER_LEN: usize = 21;
const ENTRY_LEN: usize = 272;
const NAME_LEN: usize = 256;

pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Directory> {
    reader.seek(SeekFrom::Start(0))?;
    let version = read_u32(reader)?;
    let _data_offset = read_u32(reader)?;
    let _num_parts = read_u32(reader)?;
    let _file_list_size = read_u32(reader)?;
    let _little_endian = read_u8(reader)?;
    let num_files = read_u32(reader)?;
    debug_assert_eq!(HEADER_LEN, 4 + 4 + 4 + 4 + 1 + 4);

    let mut files = Vec::with_capacity(num_files as usize);
    for _ in 0..num_files {
        let name = read_name_field(reader, NAME_LEN)?;
        let offset = u64::from(read_u32(reader)?);
        let size_on_disk = u64::from(read_u32(reader)?);
        let uncompressed_size = u64::from(read_u32(reader)?);
        let archive_part = read_u32(reader)?;
        debug_assert_eq!(ENTRY_LEN, NAME_LEN + 4 * 4);

        files.push(FileEntry {
            name,
            offset,
            size_on_disk,
            uncompressed_size,
            archive_part,
            flags: None,
        });
    }

    Ok(Directory {
        version,
        flags: 0,
        files,
    })
}
