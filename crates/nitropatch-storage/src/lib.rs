//! ROM modification session for DS cartridge images.
//!
//! This crate provides the stateful layer over `nitropatch-formats`: a
//! [`RomSession`] that parses a ROM's header and tables on open, a
//! [`ModificationTracker`] accumulating pending path → replacement-bytes
//! records, and a rebuild engine that writes a byte-valid patched ROM.
//!
//! # Save pipeline
//!
//! A save is a strictly ordered sequence over a fresh copy of the source
//! image (the original file is never mutated):
//!
//! 1. resolve registered paths against the ROM's directory index
//! 2. copy the original ROM to the output path
//! 3. per modification: overwrite in place when the replacement fits, or
//!    relocate to the 4-aligned end of file when it grew
//! 4. rewrite the allocation table (same row count, new offsets)
//! 5. update `rom_size` and the header CRC-16
//!
//! Unresolvable paths are reported in the [`SaveOutcome`], never fatal as
//! long as at least one modification applied.
//!
//! # Example
//!
//! ```rust,ignore
//! use nitropatch_storage::{ModKind, RomSession};
//!
//! let mut session = RomSession::open("game.nds")?;
//! session.register_modification("data/maps/m01.dat", new_bytes, ModKind::MapModification);
//! let outcome = session.save("game.patched.nds", None);
//! println!("{}", outcome.message);
//! # Ok::<(), nitropatch_storage::StorageError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]

use std::path::PathBuf;
use thiserror::Error;

// Pending modification records
pub mod tracker;

// Path → allocation-index resolution
pub mod resolve;

// Loaded-ROM session
pub mod session;

// Save pipeline
pub mod rebuild;

pub use rebuild::SaveOutcome;
pub use session::{RomInfo, RomSession};
pub use tracker::{ModKind, ModificationRecord, ModificationSummary, ModificationTracker};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during session and rebuild operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source ROM file does not exist.
    #[error("source ROM not found: {}", .0.display())]
    SourceRomMissing(PathBuf),

    /// ROM header or table parsing failed.
    #[error("ROM format error: {0}")]
    Rom(#[from] nitropatch_formats::rom::RomError),

    /// No registered modification could be matched to an allocation entry.
    #[error("none of the registered modifications matched allocation-table entries")]
    NothingToSave,
}
