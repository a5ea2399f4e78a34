//! Maps registered file paths onto allocation-table indices.
//!
//! Registered paths are absolute filesystem paths; the directory index
//! speaks ROM-relative paths. Resolution first tries the path relative to
//! the conventional extraction directory next to the ROM, then falls back
//! to progressively shorter path suffixes. The suffix fallback is a
//! heuristic inherited from the original tooling: two same-named files in
//! different directories can mis-resolve, so every suffix hit is logged.

use nitropatch_formats::rom::DirectoryIndex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extraction directory conventionally created next to the ROM:
/// `<dir>/<stem>_extracted`.
pub fn extraction_root(rom_path: &Path) -> PathBuf {
    let stem = rom_path
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    rom_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{stem}_extracted"))
}

/// Resolves `file_path` to an allocation-table index, or `None` when no
/// index entry matches. Never fatal; the caller surfaces misses in the
/// save summary.
pub fn resolve_fat_index(
    index: &DirectoryIndex,
    rom_path: &Path,
    file_path: &Path,
) -> Option<u16> {
    let abs = normalize(file_path);

    // Exact match against the path relative to the extraction root.
    let root = normalize(&extraction_root(rom_path));
    if let Some(rel) = abs.strip_prefix(&root) {
        let rel = rel.trim_start_matches('/');
        if let Some(&id) = index.get(rel) {
            debug!("exact match: '{rel}' -> FAT#{id}");
            return Some(id);
        }
    }

    // Progressively shorter suffixes: drop leading components until one
    // matches the index.
    let parts: Vec<&str> = abs.split('/').filter(|p| !p.is_empty()).collect();
    for start in 0..parts.len() {
        let candidate = parts[start..].join("/");
        if let Some(&id) = index.get(&candidate) {
            debug!("suffix match: '{candidate}' -> FAT#{id}");
            return Some(id);
        }
    }

    warn!("no allocation entry for {}", file_path.display());
    None
}

/// Absolute path with forward slashes, lowercased to match the index.
fn normalize(path: &Path) -> String {
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    abs.to_string_lossy().replace('\\', "/").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> DirectoryIndex {
        let mut index = DirectoryIndex::new();
        index.insert("data/a.bin".to_string(), 0);
        index.insert("data/maps/m01.dat".to_string(), 3);
        index
    }

    #[test]
    fn test_extraction_root_naming() {
        assert_eq!(
            extraction_root(Path::new("/roms/game.nds")),
            PathBuf::from("/roms/game_extracted")
        );
    }

    #[test]
    fn test_exact_match_under_extraction_root() {
        let index = sample_index();
        let id = resolve_fat_index(
            &index,
            Path::new("/roms/game.nds"),
            Path::new("/roms/game_extracted/data/a.bin"),
        );
        assert_eq!(id, Some(0));
    }

    #[test]
    fn test_suffix_match_outside_root() {
        let index = sample_index();
        let id = resolve_fat_index(
            &index,
            Path::new("/roms/game.nds"),
            Path::new("/somewhere/else/data/maps/m01.dat"),
        );
        assert_eq!(id, Some(3));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let index = sample_index();
        let id = resolve_fat_index(
            &index,
            Path::new("/roms/game.nds"),
            Path::new("/Work/DATA/A.BIN"),
        );
        assert_eq!(id, Some(0));
    }

    #[test]
    fn test_unknown_path_is_none() {
        let index = sample_index();
        let id = resolve_fat_index(
            &index,
            Path::new("/roms/game.nds"),
            Path::new("/work/data/missing.bin"),
        );
        assert_eq!(id, None);
    }
}
