//! One loaded ROM and its pending modifications.
//!
//! [`RomSession::open`] performs the whole load sequence up front: header
//! parse, filename-table walk, allocation-table read. An open session is
//! therefore always ready to accept modifications, and `save` may be
//! called any number of times.

use crate::rebuild::{self, SaveOutcome};
use crate::resolve;
use crate::tracker::{ModKind, ModificationSummary, ModificationTracker};
use crate::{Result, StorageError};
use memmap2::Mmap;
use nitropatch_formats::rom::{
    DirectoryIndex, FatEntry, NdsHeader, build_directory_index, read_fat,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Basic facts about the loaded ROM.
#[derive(Debug, Clone)]
pub struct RomInfo {
    /// Game title from the header
    pub title: String,
    /// Four-character game code
    pub game_code: String,
    /// Declared ROM size in bytes
    pub rom_size: u32,
    /// Allocation-table row count
    pub fat_entries: usize,
    /// Paths indexed from the filename table
    pub indexed_paths: usize,
}

/// A loaded ROM image plus its pending modification set.
#[derive(Debug)]
pub struct RomSession {
    rom_path: PathBuf,
    header: NdsHeader,
    index: DirectoryIndex,
    fat: Vec<FatEntry>,
    tracker: ModificationTracker,
}

impl RomSession {
    /// Opens a ROM: parses the header, walks the filename table into the
    /// directory index, and loads the allocation table.
    pub fn open(rom_path: impl AsRef<Path>) -> Result<Self> {
        let rom_path = rom_path.as_ref().to_path_buf();
        if !rom_path.is_file() {
            return Err(StorageError::SourceRomMissing(rom_path));
        }

        let file = File::open(&rom_path)?;
        // SAFETY: the mapping is read-only and dropped before open returns;
        // concurrent external writes to a ROM being opened are outside the
        // supported model.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };

        let header = NdsHeader::parse(&mmap)?;
        let index = build_directory_index(&mmap, header.fnt_addr, header.fnt_size);
        let fat = read_fat(&mmap, header.fat_addr, header.fat_size)?;

        info!(
            "opened '{}' ({}): {} bytes, {} FAT rows, {} indexed paths",
            header.game_title(),
            header.game_code(),
            header.rom_size,
            fat.len(),
            index.len()
        );

        Ok(Self {
            rom_path,
            header,
            index,
            fat,
            tracker: ModificationTracker::new(),
        })
    }

    /// Basic facts about the loaded ROM.
    pub fn info(&self) -> RomInfo {
        RomInfo {
            title: self.header.game_title(),
            game_code: self.header.game_code(),
            rom_size: self.header.rom_size,
            fat_entries: self.fat.len(),
            indexed_paths: self.index.len(),
        }
    }

    /// Registers a replacement for the file at `path`. Returns `false`
    /// for empty payloads.
    pub fn register_modification(
        &mut self,
        path: impl Into<PathBuf>,
        data: Vec<u8>,
        kind: ModKind,
    ) -> bool {
        self.tracker.register(path, data, kind)
    }

    /// Reads a file from disk and registers its contents.
    pub fn register_file_on_disk(&mut self, path: impl AsRef<Path>, kind: ModKind) -> Result<bool> {
        self.tracker.register_from_disk(path, kind)
    }

    /// Registers a map's paired `.dat` and `.tex` replacement files.
    pub fn register_map_pair(&mut self, dat: &Path, tex: &Path) -> Result<bool> {
        let ok_dat = self.tracker.register_from_disk(dat, ModKind::MapModification)?;
        let ok_tex = self.tracker.register_from_disk(tex, ModKind::MapModification)?;
        Ok(ok_dat && ok_tex)
    }

    /// Whether any modifications are pending.
    pub fn has_modifications(&self) -> bool {
        !self.tracker.is_empty()
    }

    /// Number of pending modifications.
    pub fn modification_count(&self) -> usize {
        self.tracker.count()
    }

    /// Aggregate view of the pending set.
    pub fn summary(&self) -> ModificationSummary {
        self.tracker.summary()
    }

    /// Drops all pending modifications.
    pub fn clear_modifications(&mut self) {
        self.tracker.clear();
    }

    /// The pending modification set.
    pub fn tracker(&self) -> &ModificationTracker {
        &self.tracker
    }

    /// Mutable access to the pending modification set.
    pub fn tracker_mut(&mut self) -> &mut ModificationTracker {
        &mut self.tracker
    }

    /// Builds a patched ROM at `output`. The source ROM is never mutated;
    /// `progress` (if given) receives a line per pipeline step and must
    /// not block or mutate the session.
    pub fn save(&mut self, output: impl AsRef<Path>, progress: Option<&dyn Fn(&str)>) -> SaveOutcome {
        rebuild::save_rom(self, output.as_ref(), progress)
    }

    /// Resolves every unresolved record against the directory index.
    /// Unmatched records keep `fat_index == None`.
    pub(crate) fn resolve_all(&mut self) {
        let Self {
            rom_path,
            index,
            tracker,
            ..
        } = self;
        for record in tracker.records_mut() {
            if record.fat_index.is_none() {
                record.fat_index =
                    resolve::resolve_fat_index(index, rom_path, &record.path).map(usize::from);
            }
        }
    }

    pub(crate) fn rom_path(&self) -> &Path {
        &self.rom_path
    }

    pub(crate) fn header(&self) -> &NdsHeader {
        &self.header
    }

    pub(crate) fn fat(&self) -> &[FatEntry] {
        &self.fat
    }
}
