//! On-disk format parsers and builders for DS cartridge ROM images.
//!
//! This crate provides symmetric (parser and builder) implementations for
//! the byte-exact formats a cartridge ROM is assembled from:
//!
//! - **LZ10**: the LZ77-family compressed block format used for packed
//!   game assets, with a greedy hash-chained encoder
//! - **NARC**: the generic archive container packing an ordered list of
//!   byte blobs behind an allocation sub-table
//! - **ROM tables**: the fixed 512-byte cartridge header, the flat file
//!   allocation table (FAT), and the recursive filename table (FNT)
//! - **CRC-16**: the header checksum the firmware verifies at boot
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: every format that is written back supports
//!   both parsing and building
//! - **Round-Trip Guarantee**: `decompress(compress(b)) == b` and
//!   `parse(build(files)) == files`, byte for byte
//! - **No panics on malformed input**: truncated sections and out-of-range
//!   back-references surface as errors or stop decoding, never a fault

#![warn(missing_docs)]
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From

pub mod crc16;
pub mod lz10;
pub mod narc;
pub mod rom;

pub use lz10::{compress, decompress};
pub use narc::{build as build_archive, parse as parse_archive};

/// Common format trait for types with a byte-exact parse/build pair.
pub trait NitroFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err("Round-trip verification failed".into());
        }
        Ok(())
    }
}
