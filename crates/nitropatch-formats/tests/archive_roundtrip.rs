//! Cross-format round trips the way collaborators use the codecs:
//! compressed blobs packed into archives and recovered byte-exact.

#![allow(clippy::unwrap_used)]

use nitropatch_formats::{build_archive, compress, decompress, parse_archive};
use pretty_assertions::assert_eq;

fn tileset_like_blob(seed: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(seed) & 0x3F).collect()
}

#[test]
fn archive_of_compressed_members_round_trips() {
    let originals: Vec<Vec<u8>> = vec![
        tileset_like_blob(3, 1021),
        tileset_like_blob(7, 64),
        Vec::new(),
        tileset_like_blob(11, 4099),
    ];

    let members: Vec<Vec<u8>> = originals.iter().map(|b| compress(b)).collect();
    let archive = build_archive(&members);
    let recovered = parse_archive(&archive).unwrap();

    assert_eq!(recovered, members);
    let unpacked: Vec<Vec<u8>> = recovered.iter().map(|b| decompress(b)).collect();
    assert_eq!(unpacked, originals);
}

#[test]
fn nested_archives_round_trip() {
    let inner = build_archive(&[b"layer0".as_slice(), b"layer1".as_slice()]);
    let outer = build_archive(&[inner.clone(), b"palette".to_vec()]);

    let members = parse_archive(&outer).unwrap();
    assert_eq!(members[0], inner);
    assert_eq!(
        parse_archive(&members[0]).unwrap(),
        vec![b"layer0".to_vec(), b"layer1".to_vec()]
    );
}

#[test]
fn uncompressed_member_passes_through_decompress() {
    // Callers probe archive members with decompress; raw records without
    // the tag byte must come back unchanged.
    let raw = tileset_like_blob(5, 200);
    let archive = build_archive(&[raw.clone()]);
    let members = parse_archive(&archive).unwrap();
    assert_eq!(decompress(&members[0]), raw);
}
