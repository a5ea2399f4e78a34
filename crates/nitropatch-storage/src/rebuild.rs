//! The save pipeline: turns the session's pending modifications into a
//! byte-valid patched ROM image.
//!
//! Order is fixed: copy the original, patch file data, rewrite the
//! allocation table, update the header. Replacements that fit their
//! original allocation are overwritten in place (the freed tail stays as
//! padding); replacements that grew are appended at the next 4-aligned
//! end-of-file offset. The allocation table never changes cardinality.
//!
//! There is no atomic commit: writes go directly into the destination
//! file, so an interrupted save leaves a half-patched output. The source
//! ROM itself is never touched.

use crate::session::RomSession;
use crate::{Result, StorageError};
use nitropatch_formats::rom::{FatEntry, encode_fat};
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Byte used to fill alignment gaps before appended data.
const FILLER: u8 = 0xFF;

const fn align4(value: u64) -> u64 {
    (value + 3) & !3
}

/// Result of a save attempt.
///
/// Failures carry a human-readable `message` rather than panicking, so a
/// frontend can present them verbatim. Unresolved paths are listed but do
/// not fail the save as long as at least one modification applied.
#[derive(Debug)]
pub struct SaveOutcome {
    /// Whether a patched ROM was written
    pub success: bool,
    /// Human-readable report
    pub message: String,
    /// Modifications actually written
    pub applied: usize,
    /// Paths that could not be matched to allocation entries
    pub unresolved: Vec<PathBuf>,
}

impl SaveOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            applied: 0,
            unresolved: Vec::new(),
        }
    }
}

fn report(progress: Option<&dyn Fn(&str)>, message: &str) {
    if let Some(callback) = progress {
        callback(message);
    }
    debug!("progress: {message}");
}

pub(crate) fn save_rom(
    session: &mut RomSession,
    output: &Path,
    progress: Option<&dyn Fn(&str)>,
) -> SaveOutcome {
    match try_save(session, output, progress) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!("save failed: {err}");
            SaveOutcome::failure(format!("ROM build failed: {err}"))
        }
    }
}

fn try_save(
    session: &mut RomSession,
    output: &Path,
    progress: Option<&dyn Fn(&str)>,
) -> Result<SaveOutcome> {
    if session.tracker().is_empty() {
        return Ok(SaveOutcome::failure(
            "No modifications are registered to save.",
        ));
    }
    if !session.rom_path().is_file() {
        return Err(StorageError::SourceRomMissing(session.rom_path().to_path_buf()));
    }

    info!(
        "ROM build start: {} -> {} ({} modification(s))",
        session.rom_path().display(),
        output.display(),
        session.modification_count()
    );

    report(progress, "Resolving modification paths…");
    session.resolve_all();

    let fat_len = session.fat().len();
    let unresolved: Vec<PathBuf> = session
        .tracker()
        .records()
        .filter(|r| !r.fat_index.is_some_and(|idx| idx < fat_len))
        .map(|r| r.path.clone())
        .collect();
    let resolvable = session.modification_count() - unresolved.len();
    if !unresolved.is_empty() {
        warn!("{} modification(s) unresolved", unresolved.len());
    }
    if resolvable == 0 {
        return Err(StorageError::NothingToSave);
    }

    report(progress, "Copying original ROM…");
    fs::copy(session.rom_path(), output)?;

    let mut fat = session.fat().to_vec();

    report(progress, &format!("Applying {resolvable} modification(s)…"));
    let applied = apply_modifications(session, output, &mut fat, progress)?;

    report(progress, "Writing updated allocation table…");
    write_fat(session, output, &fat)?;

    report(progress, "Updating ROM header…");
    let final_size = update_header(session, output)?;

    let mut lines = vec![
        "ROM saved successfully!".to_string(),
        String::new(),
        format!("Modifications applied : {applied}"),
        format!("Final ROM size        : {final_size} bytes"),
    ];
    if !unresolved.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "NOTE: {} modification(s) could not be matched to allocation entries and were skipped:",
            unresolved.len()
        ));
        for path in &unresolved {
            lines.push(format!("  - {}", path.display()));
        }
    }
    let message = lines.join("\n");
    info!("ROM build complete: {applied} applied, {} unresolved", unresolved.len());

    Ok(SaveOutcome {
        success: true,
        message,
        applied,
        unresolved,
    })
}

/// Writes each resolved replacement into the output file, in registration
/// order, updating the working allocation table as it goes.
fn apply_modifications(
    session: &RomSession,
    output: &Path,
    fat: &mut [FatEntry],
    progress: Option<&dyn Fn(&str)>,
) -> Result<usize> {
    let mut file = OpenOptions::new().read(true).write(true).open(output)?;
    let mut eof = file.seek(SeekFrom::End(0))?;
    let mut applied = 0usize;
    let total = session.modification_count();

    for (i, record) in session.tracker().records().enumerate() {
        let Some(idx) = record.fat_index else {
            continue;
        };
        if idx >= fat.len() {
            warn!(
                "allocation index {idx} out of range for {}, skipping",
                record.path.display()
            );
            continue;
        }
        if i % 5 == 0 {
            report(
                progress,
                &format!("Writing modification {}/{total}…", i + 1),
            );
        }

        let entry = fat[idx];
        let new_size = record.data.len() as u32;
        debug!(
            "FAT#{idx} {} {} -> {} bytes",
            record.path.display(),
            entry.size(),
            new_size
        );

        if new_size <= entry.size() {
            // Fits: overwrite in place, shrink the entry. The freed tail
            // stays as padding.
            file.seek(SeekFrom::Start(u64::from(entry.start)))?;
            file.write_all(&record.data)?;
            fat[idx] = FatEntry {
                start: entry.start,
                end: entry.start + new_size,
            };
            debug!("in-place @ {:#010X}", entry.start);
        } else {
            // Grew: relocate to the next 4-aligned offset at or past the
            // current end of file.
            let aligned = align4(eof);
            if aligned > eof {
                file.seek(SeekFrom::Start(eof))?;
                file.write_all(&vec![FILLER; (aligned - eof) as usize])?;
            }
            file.seek(SeekFrom::Start(aligned))?;
            file.write_all(&record.data)?;
            fat[idx] = FatEntry {
                start: aligned as u32,
                end: aligned as u32 + new_size,
            };
            eof = aligned + u64::from(new_size);
            debug!("relocated @ {aligned:#010X}");
        }
        applied += 1;
    }

    file.flush()?;
    Ok(applied)
}

/// Rewrites the allocation table at its original offset. Row count is
/// unchanged by construction; only offsets moved.
fn write_fat(session: &RomSession, output: &Path, fat: &[FatEntry]) -> Result<()> {
    let mut file = OpenOptions::new().write(true).open(output)?;
    file.seek(SeekFrom::Start(u64::from(session.header().fat_addr)))?;
    file.write_all(&encode_fat(fat))?;
    debug!("allocation table written: {} rows", fat.len());
    Ok(())
}

/// Sets `rom_size` to the final file length, recomputes the header
/// checksum, and writes the header back at offset 0. Returns the final
/// file size.
fn update_header(session: &RomSession, output: &Path) -> Result<u64> {
    let final_size = fs::metadata(output)?.len();
    let mut header = session.header().clone();
    header.rom_size = final_size as u32;
    header.update_checksum()?;

    let mut file = OpenOptions::new().write(true).open(output)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&header.to_bytes()?)?;
    debug!(
        "header updated: size={final_size}, crc={:#06X}",
        header.header_crc16
    );
    Ok(final_size)
}
