//! LZ10 compressed block codec.
//!
//! An LZ77-family format: a tag byte (`0x10`), a 24-bit little-endian
//! decompressed length, then groups of eight operations prefixed by a
//! control byte. Each control bit (MSB first) selects either a literal
//! byte or a two-byte back-reference with a 4-bit length code
//! (lengths 3..=18) and a 12-bit displacement (distances 1..=4096).
//!
//! Decoding is deliberately forgiving: input that does not carry the tag
//! byte passes through unchanged (callers feed it arbitrary ROM blobs),
//! and malformed back-references stop the copy instead of faulting.

mod compress;

pub use compress::compress;

/// Tag byte marking an LZ10-compressed block.
pub const LZ10_TAG: u8 = 0x10;

/// Largest encodable back-reference distance (12-bit displacement + 1).
pub(crate) const MAX_DISTANCE: usize = 4096;
/// Longest encodable match (4-bit length code + 3).
pub(crate) const MAX_MATCH: usize = 18;
/// Shortest match worth a back-reference.
pub(crate) const MIN_MATCH: usize = 3;

/// Decompresses an LZ10 block.
///
/// Input that is empty or does not start with [`LZ10_TAG`] is returned
/// unchanged. Output is truncated to exactly the declared length; a
/// back-reference reaching before the start of the output is skipped and
/// truncated input simply stops decoding early.
pub fn decompress(data: &[u8]) -> Vec<u8> {
    if data.len() < 4 || data[0] != LZ10_TAG {
        return data.to_vec();
    }

    let dst_size =
        usize::from(data[1]) | usize::from(data[2]) << 8 | usize::from(data[3]) << 16;
    let mut out = Vec::with_capacity(dst_size);
    let mut src = 4usize;

    while out.len() < dst_size && src < data.len() {
        let flags = data[src];
        src += 1;
        for bit in 0..8 {
            if out.len() >= dst_size || src >= data.len() {
                break;
            }
            if flags & (0x80 >> bit) == 0 {
                out.push(data[src]);
                src += 1;
            } else {
                if src + 1 >= data.len() {
                    break;
                }
                let b1 = usize::from(data[src]);
                let b2 = usize::from(data[src + 1]);
                src += 2;
                let disp = (b1 & 0x0F) << 8 | b2;
                let length = (b1 >> 4) + MIN_MATCH;
                // A distance reaching before the output start is malformed;
                // skip the reference rather than fault.
                let Some(mut from) = out.len().checked_sub(disp + 1) else {
                    continue;
                };
                // Byte-by-byte so short distances repeat bytes this copy
                // itself just produced.
                for _ in 0..length {
                    if from >= out.len() {
                        break;
                    }
                    let byte = out[from];
                    out.push(byte);
                    from += 1;
                }
            }
        }
    }

    out.truncate(dst_size);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_passthrough_untagged() {
        let data = b"plain bytes, no tag";
        assert_eq!(decompress(data), data);
    }

    #[test]
    fn test_passthrough_empty() {
        assert_eq!(decompress(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_known_stream() {
        // Two literals, then a distance-1 length-4 reference repeating 'b'.
        let stream = [LZ10_TAG, 6, 0, 0, 0b0010_0000, b'a', b'b', 0x10, 0x00];
        assert_eq!(decompress(&stream), b"abbbbb");
    }

    #[test]
    fn test_overlapping_run() {
        let data = vec![0x42u8; 1000];
        assert_eq!(decompress(&compress(&data)), data);
    }

    #[test]
    fn test_malformed_reference_does_not_panic() {
        // First op is a back-reference before any output exists.
        let stream = [LZ10_TAG, 8, 0, 0, 0b1000_0000, 0x0F, 0xFF, b'x'];
        let out = decompress(&stream);
        // The bad reference is skipped; the trailing literal survives.
        assert_eq!(out, b"x");
    }

    #[test]
    fn test_truncated_input_stops_cleanly() {
        let mut stream = compress(b"the quick brown fox jumps over the lazy dog");
        stream.truncate(stream.len() / 2);
        let out = decompress(&stream);
        assert!(out.len() <= 43);
    }

    #[test]
    fn test_declared_length_truncates_output() {
        // Declared length shorter than what the ops would produce.
        let stream = [LZ10_TAG, 2, 0, 0, 0x00, b'a', b'b', b'c', b'd'];
        assert_eq!(decompress(&stream), b"ab");
    }

    #[test]
    fn test_round_trip_empty() {
        assert_eq!(decompress(&compress(&[])), Vec::<u8>::new());
        assert_eq!(compress(&[]), vec![LZ10_TAG, 0, 0, 0]);
    }

    #[test]
    fn test_round_trip_incompressible() {
        let data: Vec<u8> = (0..=255u8).collect();
        assert_eq!(decompress(&compress(&data)), data);
    }

    #[test]
    fn test_round_trip_tile_like_data() {
        // Repetitive 8x8-tile-sized patterns, the common case in ROM assets.
        let mut data = Vec::new();
        for tile in 0..64u8 {
            data.extend(std::iter::repeat_n(tile, 32));
            data.extend_from_slice(&[0, 1, 2, 3, 0, 1, 2, 3]);
        }
        let packed = compress(&data);
        assert!(packed.len() < data.len());
        assert_eq!(decompress(&packed), data);
    }

    #[test]
    fn test_compress_is_deterministic() {
        let data = b"abcabcabcabc repeated content abcabcabc".repeat(20);
        assert_eq!(compress(&data), compress(&data));
    }

    proptest! {
        #[test]
        fn prop_round_trip(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            prop_assert_eq!(decompress(&compress(&data)), data);
        }

        #[test]
        fn prop_round_trip_low_entropy(data in proptest::collection::vec(0u8..4, 0..8192)) {
            prop_assert_eq!(decompress(&compress(&data)), data);
        }

        #[test]
        fn prop_decompress_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = decompress(&data);
        }
    }
}
