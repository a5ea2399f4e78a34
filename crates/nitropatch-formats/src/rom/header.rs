//! The fixed 512-byte cartridge header.
//!
//! Every field sits at a hard-coded offset; reserved regions and the
//! boot logo are carried byte-for-byte so an untouched header re-emits
//! exactly. The firmware checks a CRC-16 over bytes `[0, 350)` against
//! the value stored at offset 350.

use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

use super::error::{RomError, RomResult};
use crate::NitroFormat;
use crate::crc16::crc16;

/// Header length in bytes.
pub const HEADER_LEN: usize = 512;
/// The header CRC covers bytes `[0, CHECKSUM_SPAN)`.
pub const CHECKSUM_SPAN: usize = 350;

/// One execute-region descriptor (ARM9 or ARM7 binary placement).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct ExecRegion {
    /// Offset of the binary inside the ROM
    pub rom_addr: u32,
    /// Execution entry point
    pub entry_addr: u32,
    /// RAM load address
    pub ram_addr: u32,
    /// Binary size in bytes
    pub size: u32,
}

/// The cartridge header at ROM offset 0.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct NdsHeader {
    /// Game title, NUL-padded ASCII
    pub game_title: [u8; 12],
    /// Four-character game code
    pub game_code: [u8; 4],
    /// Maker code
    pub maker_code: [u8; 2],
    /// Unit code
    pub unit_code: u8,
    /// Encryption seed select
    pub device_type: u8,
    /// Device capacity exponent
    pub device_capacity: u8,
    /// Reserved, preserved byte-for-byte
    pub reserved1: [u8; 9],
    /// ROM revision
    pub rom_version: u8,
    /// Autostart flags
    pub flags: u8,
    /// ARM9 execute region
    pub arm9: ExecRegion,
    /// ARM7 execute region
    pub arm7: ExecRegion,
    /// Filename table (FNT) offset
    pub fnt_addr: u32,
    /// Filename table size
    pub fnt_size: u32,
    /// File allocation table (FAT) offset
    pub fat_addr: u32,
    /// File allocation table size
    pub fat_size: u32,
    /// ARM9 overlay table offset
    pub arm9_overlay_addr: u32,
    /// ARM9 overlay table size
    pub arm9_overlay_size: u32,
    /// ARM7 overlay table offset
    pub arm7_overlay_addr: u32,
    /// ARM7 overlay table size
    pub arm7_overlay_size: u32,
    /// Port settings for normal commands
    pub normal_command_settings: u32,
    /// Port settings for KEY1 commands
    pub key1_command_settings: u32,
    /// Icon/title block offset
    pub icon_title_addr: u32,
    /// Secure area CRC-16
    pub secure_area_crc16: u16,
    /// Secure area loading timeout
    pub secure_area_delay: u16,
    /// ARM9 autoload list RAM address
    pub arm9_autoload_addr: u32,
    /// ARM7 autoload list RAM address
    pub arm7_autoload_addr: u32,
    /// Secure area disable value
    pub secure_area_disable: u64,
    /// Total used ROM size; must equal the file length after a rebuild
    pub rom_size: u32,
    /// Header size (0x4000 on retail carts)
    pub header_size: u32,
    /// Reserved, preserved byte-for-byte
    pub reserved2: [u8; 56],
    /// Boot logo bitmap
    pub nintendo_logo: [u8; 156],
    /// Boot logo CRC-16
    pub logo_crc16: u16,
    /// CRC-16 over header bytes `[0, 350)`
    pub header_crc16: u16,
    /// Debug ROM offset
    pub debug_rom_addr: u32,
    /// Debug binary size
    pub debug_size: u32,
    /// Debug RAM address
    pub debug_ram_addr: u32,
    /// Reserved, preserved byte-for-byte
    pub reserved3: [u8; 4],
    /// Reserved, preserved byte-for-byte
    pub reserved4: [u8; 144],
}

impl Default for NdsHeader {
    fn default() -> Self {
        Self {
            game_title: [0; 12],
            game_code: [0; 4],
            maker_code: [0; 2],
            unit_code: 0,
            device_type: 0,
            device_capacity: 0,
            reserved1: [0; 9],
            rom_version: 0,
            flags: 0,
            arm9: ExecRegion::default(),
            arm7: ExecRegion::default(),
            fnt_addr: 0,
            fnt_size: 0,
            fat_addr: 0,
            fat_size: 0,
            arm9_overlay_addr: 0,
            arm9_overlay_size: 0,
            arm7_overlay_addr: 0,
            arm7_overlay_size: 0,
            normal_command_settings: 0,
            key1_command_settings: 0,
            icon_title_addr: 0,
            secure_area_crc16: 0,
            secure_area_delay: 0,
            arm9_autoload_addr: 0,
            arm7_autoload_addr: 0,
            secure_area_disable: 0,
            rom_size: 0,
            header_size: 0,
            reserved2: [0; 56],
            nintendo_logo: [0; 156],
            logo_crc16: 0,
            header_crc16: 0,
            debug_rom_addr: 0,
            debug_size: 0,
            debug_ram_addr: 0,
            reserved3: [0; 4],
            reserved4: [0; 144],
        }
    }
}

impl NdsHeader {
    /// Parses the first 512 bytes of a ROM image.
    pub fn parse(data: &[u8]) -> RomResult<Self> {
        if data.len() < HEADER_LEN {
            return Err(RomError::HeaderTooShort(data.len()));
        }
        let mut cursor = Cursor::new(&data[..HEADER_LEN]);
        Ok(Self::read(&mut cursor)?)
    }

    /// Re-emits the exact 512 header bytes.
    pub fn to_bytes(&self) -> RomResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(HEADER_LEN));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Recomputes `header_crc16` over bytes `[0, 350)`.
    pub fn update_checksum(&mut self) -> RomResult<()> {
        let bytes = self.to_bytes()?;
        self.header_crc16 = crc16(&bytes[..CHECKSUM_SPAN]);
        Ok(())
    }

    /// Game title with NUL padding stripped.
    pub fn game_title(&self) -> String {
        String::from_utf8_lossy(&self.game_title)
            .trim_matches('\0')
            .to_string()
    }

    /// Four-character game code.
    pub fn game_code(&self) -> String {
        String::from_utf8_lossy(&self.game_code)
            .trim_matches('\0')
            .to_string()
    }

    /// Number of rows in the allocation table.
    pub fn fat_entry_count(&self) -> usize {
        self.fat_size as usize / super::fat::FAT_ENTRY_SIZE
    }
}

impl NitroFormat for NdsHeader {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::parse(data)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.to_bytes()?)
    }
}
