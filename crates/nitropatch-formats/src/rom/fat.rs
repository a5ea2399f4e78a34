//! File allocation table (FAT).
//!
//! A flat array of `(start, end)` little-endian byte ranges; a file's
//! numeric id is its row index. The rebuild engine rewrites offsets but
//! never changes the row count.

use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

use super::error::{RomError, RomResult};

/// Bytes per allocation row.
pub const FAT_ENTRY_SIZE: usize = 8;

/// One allocation row: the absolute byte range of a file in the ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct FatEntry {
    /// Absolute start offset
    pub start: u32,
    /// Absolute end offset, exclusive
    pub end: u32,
}

impl FatEntry {
    /// File size in bytes.
    pub const fn size(&self) -> u32 {
        self.end - self.start
    }
}

/// Reads the allocation table at `addr` from raw ROM bytes.
pub fn read_fat(rom: &[u8], addr: u32, size: u32) -> RomResult<Vec<FatEntry>> {
    let start = addr as usize;
    let end = start.saturating_add(size as usize);
    let raw = rom.get(start..end).ok_or(RomError::TableOutOfBounds {
        addr,
        size,
        rom_len: rom.len(),
    })?;

    let count = raw.len() / FAT_ENTRY_SIZE;
    let mut cursor = Cursor::new(raw);
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(FatEntry::read(&mut cursor)?);
    }
    Ok(entries)
}

/// Serializes allocation rows back to their on-disk form.
pub fn encode_fat(entries: &[FatEntry]) -> Vec<u8> {
    let mut out = Vec::with_capacity(entries.len() * FAT_ENTRY_SIZE);
    for entry in entries {
        out.extend_from_slice(&entry.start.to_le_bytes());
        out.extend_from_slice(&entry.end.to_le_bytes());
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_entries() {
        let mut rom = vec![0u8; 32];
        rom[16..20].copy_from_slice(&100u32.to_le_bytes());
        rom[20..24].copy_from_slice(&250u32.to_le_bytes());
        rom[24..28].copy_from_slice(&252u32.to_le_bytes());
        rom[28..32].copy_from_slice(&300u32.to_le_bytes());

        let fat = read_fat(&rom, 16, 16).unwrap();
        assert_eq!(fat.len(), 2);
        assert_eq!(fat[0], FatEntry { start: 100, end: 250 });
        assert_eq!(fat[0].size(), 150);
        assert_eq!(fat[1], FatEntry { start: 252, end: 300 });
    }

    #[test]
    fn test_table_outside_rom() {
        let err = read_fat(&[0u8; 16], 8, 16).unwrap_err();
        assert!(matches!(err, RomError::TableOutOfBounds { .. }));
    }

    #[test]
    fn test_encode_round_trip() {
        let entries = vec![
            FatEntry { start: 0, end: 0x80 },
            FatEntry { start: 0x80, end: 0x1234 },
        ];
        let raw = encode_fat(&entries);
        let mut rom = vec![0u8; 8];
        rom.extend_from_slice(&raw);
        assert_eq!(read_fat(&rom, 8, raw.len() as u32).unwrap(), entries);
    }
}
