//! NARC error types

use thiserror::Error;

/// Errors raised while parsing a NARC container.
#[derive(Debug, Error)]
pub enum NarcError {
    /// A section carried the wrong magic bytes.
    #[error("bad {section} magic: got {found:02X?}")]
    BadMagic {
        /// Which section was being validated
        section: &'static str,
        /// The four bytes actually present
        found: [u8; 4],
    },

    /// The blob ended before a section did.
    #[error("{section} section truncated: needs {needed} bytes, {available} available")]
    Truncated {
        /// Which section was being read
        section: &'static str,
        /// Bytes the section required
        needed: usize,
        /// Bytes actually present
        available: usize,
    },

    /// An allocation entry points outside the data pool.
    #[error("allocation entry {index} ({start:#X}..{end:#X}) outside data pool of {pool_len} bytes")]
    EntryOutOfBounds {
        /// Index of the offending entry
        index: usize,
        /// Entry start offset, relative to the pool
        start: u32,
        /// Entry end offset, relative to the pool
        end: u32,
        /// Data pool length
        pool_len: usize,
    },
}

/// Result type for NARC operations
pub type NarcResult<T> = Result<T, NarcError>;
