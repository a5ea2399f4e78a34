//! ROM table error types

use thiserror::Error;

/// Errors raised while parsing ROM-level structures.
#[derive(Debug, Error)]
pub enum RomError {
    /// Fewer than 512 header bytes were supplied.
    #[error("header data too short: {0} < 512 bytes")]
    HeaderTooShort(usize),

    /// A table address/size pair points outside the ROM image.
    #[error("table at {addr:#010X}+{size:#X} outside ROM of {rom_len} bytes")]
    TableOutOfBounds {
        /// Table base address
        addr: u32,
        /// Table size in bytes
        size: u32,
        /// Actual ROM length
        rom_len: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for ROM table operations
pub type RomResult<T> = Result<T, RomError>;
