//! Cartridge ROM on-disk structures: header, allocation table, filename
//! table.
//!
//! These parsers operate over raw ROM bytes; they never own file handles.
//! The storage crate layers sessions and rebuilds on top.

mod error;
mod fat;
mod fnt;
mod header;

pub use error::{RomError, RomResult};
pub use fat::{FAT_ENTRY_SIZE, FatEntry, encode_fat, read_fat};
pub use fnt::{DirectoryIndex, ROOT_DIR_ID, build_directory_index};
pub use header::{CHECKSUM_SPAN, ExecRegion, HEADER_LEN, NdsHeader};
