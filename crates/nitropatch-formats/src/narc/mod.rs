//! NARC archive container codec.
//!
//! A NARC packs an ordered list of byte blobs into one blob: a 16-byte
//! header, an allocation sub-table (`BTAF`) of `(start, end)` ranges
//! relative to the data pool, a filename sub-table (`BTNF`, minimal and
//! unused here), and the data pool itself (`GMIF`). Blobs are 4-byte
//! aligned inside the pool; the recorded end offsets are the pre-padding
//! content ends, so [`parse`] ∘ [`build`] is the identity on file lists.

mod error;

pub use error::{NarcError, NarcResult};

/// Container magic.
pub const NARC_MAGIC: &[u8; 4] = b"NARC";
const BTAF_MAGIC: &[u8; 4] = b"BTAF";
const BTNF_MAGIC: &[u8; 4] = b"BTNF";
const GMIF_MAGIC: &[u8; 4] = b"GMIF";

/// Fixed container header size.
const HEADER_SIZE: usize = 16;
/// Minimal filename sub-table: magic, size, 8 reserved bytes.
const BTNF_SIZE: usize = 16;

const fn align4(n: usize) -> usize {
    (n + 3) & !3
}

fn expect_magic(blob: &[u8], off: usize, magic: &'static [u8; 4], section: &'static str) -> NarcResult<()> {
    let Some(bytes) = blob.get(off..off + 4) else {
        return Err(NarcError::Truncated {
            section,
            needed: off + 4,
            available: blob.len(),
        });
    };
    if bytes != magic {
        return Err(NarcError::BadMagic {
            section,
            found: [bytes[0], bytes[1], bytes[2], bytes[3]],
        });
    }
    Ok(())
}

fn read_u32(blob: &[u8], off: usize, section: &'static str) -> NarcResult<u32> {
    blob.get(off..off + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(NarcError::Truncated {
            section,
            needed: off + 4,
            available: blob.len(),
        })
}

/// Splits a NARC container into its member blobs, in table order.
pub fn parse(blob: &[u8]) -> NarcResult<Vec<Vec<u8>>> {
    expect_magic(blob, 0, NARC_MAGIC, "NARC")?;

    let btaf_off = HEADER_SIZE;
    expect_magic(blob, btaf_off, BTAF_MAGIC, "BTAF")?;
    let btaf_size = read_u32(blob, btaf_off + 4, "BTAF")? as usize;
    let count = read_u32(blob, btaf_off + 8, "BTAF")? as usize;
    // A lying count fails on the first out-of-range entry read; cap the
    // reservation so it cannot force a huge allocation first.
    let mut entries = Vec::with_capacity(count.min(blob.len() / 8));
    for i in 0..count {
        let entry_off = btaf_off + 12 + i * 8;
        let start = read_u32(blob, entry_off, "BTAF")?;
        let end = read_u32(blob, entry_off + 4, "BTAF")?;
        entries.push((start, end));
    }

    let btnf_off = btaf_off + btaf_size;
    expect_magic(blob, btnf_off, BTNF_MAGIC, "BTNF")?;
    let btnf_size = read_u32(blob, btnf_off + 4, "BTNF")? as usize;

    let gmif_off = btnf_off + btnf_size;
    expect_magic(blob, gmif_off, GMIF_MAGIC, "GMIF")?;
    let _gmif_size = read_u32(blob, gmif_off + 4, "GMIF")?;
    let pool = &blob[gmif_off + 8..];

    let mut files = Vec::with_capacity(count);
    for (index, &(start, end)) in entries.iter().enumerate() {
        let range = start as usize..end as usize;
        if range.start > range.end || range.end > pool.len() {
            return Err(NarcError::EntryOutOfBounds {
                index,
                start,
                end,
                pool_len: pool.len(),
            });
        }
        files.push(pool[range].to_vec());
    }
    Ok(files)
}

/// Packs `files` into a NARC container.
///
/// Infallible by construction: any list of blobs, including the empty
/// list and zero-length blobs, produces a well-formed container that
/// [`parse`] splits back into the same list.
pub fn build<T: AsRef<[u8]>>(files: &[T]) -> Vec<u8> {
    let mut pool: Vec<u8> = Vec::new();
    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let bytes = file.as_ref();
        let start = pool.len() as u32;
        pool.extend_from_slice(bytes);
        // End offsets record the content length; the pad bytes that follow
        // belong to the pool, not the file.
        let end = pool.len() as u32;
        pool.resize(align4(pool.len()), 0);
        entries.push((start, end));
    }

    let btaf_size = align4(12 + entries.len() * 8);
    let gmif_size = 8 + pool.len();
    let total = HEADER_SIZE + btaf_size + BTNF_SIZE + gmif_size;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(NARC_MAGIC);
    out.extend_from_slice(&[0xFE, 0xFF]); // byte-order mark
    out.extend_from_slice(&[0x00, 0x01]); // version
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(HEADER_SIZE as u16).to_le_bytes());
    out.extend_from_slice(&3u16.to_le_bytes()); // section count

    out.extend_from_slice(BTAF_MAGIC);
    out.extend_from_slice(&(btaf_size as u32).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for (start, end) in entries {
        out.extend_from_slice(&start.to_le_bytes());
        out.extend_from_slice(&end.to_le_bytes());
    }
    out.resize(HEADER_SIZE + btaf_size, 0);

    out.extend_from_slice(BTNF_MAGIC);
    out.extend_from_slice(&(BTNF_SIZE as u32).to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);

    out.extend_from_slice(GMIF_MAGIC);
    out.extend_from_slice(&(gmif_size as u32).to_le_bytes());
    out.extend_from_slice(&pool);

    debug_assert_eq!(out.len(), total);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_basic() {
        let files: Vec<Vec<u8>> = vec![b"first".to_vec(), b"second file".to_vec(), b"x".to_vec()];
        assert_eq!(parse(&build(&files)).unwrap(), files);
    }

    #[test]
    fn test_round_trip_empty_list() {
        let files: Vec<Vec<u8>> = Vec::new();
        assert_eq!(parse(&build(&files)).unwrap(), files);
    }

    #[test]
    fn test_round_trip_zero_length_blobs() {
        let files: Vec<Vec<u8>> = vec![Vec::new(), b"middle".to_vec(), Vec::new()];
        assert_eq!(parse(&build(&files)).unwrap(), files);
    }

    #[test]
    fn test_round_trip_unaligned_lengths() {
        let files: Vec<Vec<u8>> = (1..=9).map(|n| vec![n as u8; n]).collect();
        assert_eq!(parse(&build(&files)).unwrap(), files);
    }

    #[test]
    fn test_header_layout() {
        let blob = build(&[b"data".as_slice()]);
        assert_eq!(&blob[..4], NARC_MAGIC);
        assert_eq!(&blob[4..6], &[0xFE, 0xFF]);
        assert_eq!(&blob[6..8], &[0x00, 0x01]);
        let total = u32::from_le_bytes([blob[8], blob[9], blob[10], blob[11]]);
        assert_eq!(total as usize, blob.len());
        assert_eq!(u16::from_le_bytes([blob[12], blob[13]]), 16);
        assert_eq!(u16::from_le_bytes([blob[14], blob[15]]), 3);
    }

    #[test]
    fn test_pool_entries_are_aligned() {
        let blob = build(&[b"abc".as_slice(), b"defg".as_slice()]);
        let files = parse(&blob).unwrap();
        assert_eq!(files, vec![b"abc".to_vec(), b"defg".to_vec()]);
        // Second entry starts on the next 4-byte boundary.
        let start = u32::from_le_bytes([blob[36], blob[37], blob[38], blob[39]]);
        assert_eq!(start, 4);
    }

    #[test]
    fn test_bad_container_magic() {
        let err = parse(b"NOPE............").unwrap_err();
        assert!(matches!(err, NarcError::BadMagic { section: "NARC", .. }));
    }

    #[test]
    fn test_missing_allocation_table() {
        let mut blob = build(&[b"x".as_slice()]);
        blob[16..20].copy_from_slice(b"FATB");
        let err = parse(&blob).unwrap_err();
        assert!(matches!(err, NarcError::BadMagic { section: "BTAF", .. }));
    }

    #[test]
    fn test_truncated_blob() {
        let blob = build(&[b"payload".as_slice()]);
        let err = parse(&blob[..20]).unwrap_err();
        assert!(matches!(err, NarcError::Truncated { .. }));
    }

    #[test]
    fn test_entry_outside_pool() {
        let mut blob = build(&[b"tiny".as_slice()]);
        // Inflate the first entry's end offset past the pool.
        blob[32..36].copy_from_slice(&0xFFFF_u32.to_le_bytes());
        let err = parse(&blob).unwrap_err();
        assert!(matches!(err, NarcError::EntryOutOfBounds { index: 0, .. }));
    }
}
