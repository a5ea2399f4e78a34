//! In-memory set of pending file replacements.
//!
//! Records are keyed by absolute path; re-registering a path replaces the
//! record in place, keeping its original position so saves apply in first
//! registration order. Records are consumed (not removed) by the rebuild
//! engine and cleared explicitly by the caller.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Classification label for a pending modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModKind {
    /// Map layer swapped with another layer
    LayerSwap,
    /// Tileset imported from an external file
    ImportTileset,
    /// Tileset graphics transferred from a PNG
    PngTransfer,
    /// Edited map record
    MapModification,
    /// Raw replacement with no further classification
    Direct,
    /// Caller-defined label
    Other(String),
}

impl ModKind {
    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Self::LayerSwap => "Layer Swap",
            Self::ImportTileset => "Import Tileset",
            Self::PngTransfer => "PNG Transfer",
            Self::MapModification => "Map Modification",
            Self::Direct => "Direct Replace",
            Self::Other(name) => name,
        }
    }
}

impl Default for ModKind {
    fn default() -> Self {
        Self::Direct
    }
}

/// One pending path → replacement-bytes record.
#[derive(Debug, Clone)]
pub struct ModificationRecord {
    /// Path the replacement was registered under
    pub path: PathBuf,
    /// Replacement bytes
    pub data: Vec<u8>,
    /// Classification label
    pub kind: ModKind,
    /// When the record was (last) registered
    pub registered_at: DateTime<Local>,
    /// Allocation-table index, `None` until resolved at save time
    pub fat_index: Option<usize>,
}

impl ModificationRecord {
    /// Replacement size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Whether the path has been matched to an allocation entry.
    pub const fn resolved(&self) -> bool {
        self.fat_index.is_some()
    }
}

/// Per-record line in a [`ModificationSummary`].
#[derive(Debug, Clone)]
pub struct SummaryEntry {
    /// File name component of the registered path
    pub name: String,
    /// Human label of the record's kind
    pub label: String,
    /// Replacement size in bytes
    pub size: usize,
    /// Resolved allocation index, if any
    pub fat_index: Option<usize>,
}

/// Aggregate view of pending modifications, for save reports and UIs.
#[derive(Debug, Clone, Default)]
pub struct ModificationSummary {
    /// Number of pending records
    pub total_count: usize,
    /// Sum of replacement sizes
    pub total_bytes: usize,
    /// Record counts per kind label, in first-seen order
    pub by_kind: Vec<(String, usize)>,
    /// One entry per record, in registration order
    pub entries: Vec<SummaryEntry>,
}

/// Upsert set of pending modifications, ordered by first registration.
#[derive(Debug, Default)]
pub struct ModificationTracker {
    records: Vec<(String, ModificationRecord)>,
}

impl ModificationTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a replacement for `path`. Empty payloads are rejected;
    /// the last registration for a path wins.
    pub fn register(&mut self, path: impl Into<PathBuf>, data: Vec<u8>, kind: ModKind) -> bool {
        let path = path.into();
        if data.is_empty() {
            warn!("empty replacement for {}, skipping", path.display());
            return false;
        }
        let key = path_key(&path);
        let record = ModificationRecord {
            path,
            data,
            kind,
            registered_at: Local::now(),
            fat_index: None,
        };
        if let Some(slot) = self.records.iter_mut().find(|(k, _)| *k == key) {
            debug!("updated modification: {} ({} bytes)", slot.1.path.display(), record.size());
            slot.1 = record;
        } else {
            debug!("added modification: {} ({} bytes)", record.path.display(), record.size());
            self.records.push((key, record));
        }
        true
    }

    /// Reads `path` from disk and registers its contents.
    pub fn register_from_disk(&mut self, path: impl AsRef<Path>, kind: ModKind) -> crate::Result<bool> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(self.register(path, data, kind))
    }

    /// Drops the record registered for `path`, if any.
    pub fn remove(&mut self, path: &Path) -> bool {
        let key = path_key(path);
        let before = self.records.len();
        self.records.retain(|(k, _)| *k != key);
        before != self.records.len()
    }

    /// Drops all records.
    pub fn clear(&mut self) {
        self.records.clear();
        debug!("cleared all modifications");
    }

    /// Number of pending records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are pending.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of pending records with the given kind.
    pub fn count_by_kind(&self, kind: &ModKind) -> usize {
        self.records.iter().filter(|(_, r)| r.kind == *kind).count()
    }

    /// Records in registration order.
    pub fn records(&self) -> impl Iterator<Item = &ModificationRecord> {
        self.records.iter().map(|(_, r)| r)
    }

    /// Mutable records in registration order (used for resolution).
    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut ModificationRecord> {
        self.records.iter_mut().map(|(_, r)| r)
    }

    /// Aggregate view of the pending set.
    pub fn summary(&self) -> ModificationSummary {
        let mut summary = ModificationSummary {
            total_count: self.records.len(),
            ..ModificationSummary::default()
        };
        for (_, record) in &self.records {
            summary.total_bytes += record.size();
            let label = record.kind.label().to_string();
            match summary.by_kind.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => summary.by_kind.push((label.clone(), 1)),
            }
            summary.entries.push(SummaryEntry {
                name: record
                    .path
                    .file_name()
                    .map_or_else(|| record.path.display().to_string(), |n| n.to_string_lossy().into_owned()),
                label,
                size: record.size(),
                fat_index: record.fat_index,
            });
        }
        summary
    }
}

/// Canonical upsert key: absolute path with uniform separators.
fn path_key(path: &Path) -> String {
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    abs.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_payload() {
        let mut tracker = ModificationTracker::new();
        assert!(!tracker.register("/tmp/a.bin", Vec::new(), ModKind::Direct));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_last_registration_wins_in_place() {
        let mut tracker = ModificationTracker::new();
        tracker.register("/tmp/a.bin", vec![1], ModKind::Direct);
        tracker.register("/tmp/b.bin", vec![2], ModKind::Direct);
        tracker.register("/tmp/a.bin", vec![3, 3], ModKind::LayerSwap);

        assert_eq!(tracker.count(), 2);
        let records: Vec<_> = tracker.records().collect();
        // Re-registration keeps the original position.
        assert_eq!(records[0].data, vec![3, 3]);
        assert_eq!(records[0].kind, ModKind::LayerSwap);
        assert_eq!(records[1].data, vec![2]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut tracker = ModificationTracker::new();
        tracker.register("/tmp/a.bin", vec![1], ModKind::Direct);
        tracker.register("/tmp/b.bin", vec![2], ModKind::Direct);
        assert!(tracker.remove(Path::new("/tmp/a.bin")));
        assert!(!tracker.remove(Path::new("/tmp/a.bin")));
        assert_eq!(tracker.count(), 1);
        tracker.clear();
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_summary_counts_by_kind() {
        let mut tracker = ModificationTracker::new();
        tracker.register("/tmp/a.bin", vec![1; 10], ModKind::LayerSwap);
        tracker.register("/tmp/b.bin", vec![2; 20], ModKind::LayerSwap);
        tracker.register("/tmp/c.bin", vec![3; 5], ModKind::Direct);

        let summary = tracker.summary();
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.total_bytes, 35);
        assert_eq!(
            summary.by_kind,
            vec![("Layer Swap".to_string(), 2), ("Direct Replace".to_string(), 1)]
        );
        assert_eq!(summary.entries[0].name, "a.bin");
        assert_eq!(tracker.count_by_kind(&ModKind::LayerSwap), 2);
    }
}
