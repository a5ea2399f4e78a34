//! Filename table (FNT) directory walk.
//!
//! The FNT encodes a directory tree: one 8-byte record per directory
//! (offset to its entry list, relative to the table base, plus the id of
//! its first file), then variable-length entry lists. Walking the tree
//! depth-first yields a map from `/`-joined relative paths to numeric
//! file ids, the same ids that index the allocation table.
//!
//! Paths are lowercased on insert; lookups must lowercase too.

use std::collections::BTreeMap;

/// Directory id of the tree root.
pub const ROOT_DIR_ID: u16 = 0xF000;

/// Control-byte bit flagging a subdirectory entry.
const SUBDIR_FLAG: u8 = 0x80;

/// Directory nesting bound; real carts stay in single digits.
const MAX_DEPTH: usize = 64;

/// Lowercased relative path → numeric file id.
pub type DirectoryIndex = BTreeMap<String, u16>;

/// Builds the path → file-id index by walking directory records from the
/// root. Truncated or garbage records end the affected directory cleanly;
/// the walk over identical bytes is deterministic.
pub fn build_directory_index(rom: &[u8], fnt_addr: u32, fnt_size: u32) -> DirectoryIndex {
    let mut index = DirectoryIndex::new();
    walk_dir(
        rom,
        fnt_addr as usize,
        fnt_size as usize,
        ROOT_DIR_ID,
        "",
        0,
        &mut index,
    );
    index
}

fn walk_dir(
    rom: &[u8],
    fnt_base: usize,
    fnt_size: usize,
    dir_id: u16,
    parent: &str,
    depth: usize,
    index: &mut DirectoryIndex,
) {
    if depth > MAX_DEPTH {
        return;
    }
    let dir_off = fnt_base + usize::from(dir_id & 0x0FFF) * 8;
    let Some(record) = rom.get(dir_off..dir_off + 8) else {
        return;
    };
    let entries_rel = u32::from_le_bytes([record[0], record[1], record[2], record[3]]) as usize;
    let first_file_id = u16::from_le_bytes([record[4], record[5]]);

    let mut pos = fnt_base + entries_rel;
    let fnt_end = (fnt_base + fnt_size).min(rom.len());
    // Running file-id counter, seeded from this directory's record.
    let mut file_id = first_file_id;

    while pos < fnt_end {
        let control = rom[pos];
        pos += 1;
        if control == 0 {
            break;
        }
        let name_len = usize::from(control & 0x7F);
        let Some(name_bytes) = rom.get(pos..pos + name_len) else {
            break;
        };
        pos += name_len;
        let name = String::from_utf8_lossy(name_bytes).to_lowercase();
        let path = if parent.is_empty() {
            name
        } else {
            format!("{parent}/{name}")
        };

        if control & SUBDIR_FLAG != 0 {
            let Some(id_bytes) = rom.get(pos..pos + 2) else {
                break;
            };
            let child_id = u16::from_le_bytes([id_bytes[0], id_bytes[1]]);
            pos += 2;
            walk_dir(rom, fnt_base, fnt_size, child_id, &path, depth + 1, index);
        } else {
            index.insert(path, file_id);
            file_id += 1;
        }
    }
}
