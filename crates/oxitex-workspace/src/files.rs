//! LaTeX file classification, listing, and cleanup.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

/// Suffixes of files a LaTeX project is edited through.
pub const SOURCE_SUFFIXES: &[&str] = &[".tex", ".bib", ".cls", ".sty", ".bst"];

/// Suffixes of byproducts the toolchain scatters next to the source.
///
/// Multi-dot entries match by filename tail, so `paper.synctex.gz` and
/// `paper.run.xml` land here instead of slipping through on their last
/// extension alone.
pub const AUXILIARY_SUFFIXES: &[&str] = &[
    ".aux",
    ".log",
    ".bbl",
    ".blg",
    ".toc",
    ".lof",
    ".lot",
    ".idx",
    ".ind",
    ".out",
    ".nav",
    ".snm",
    ".vrb",
    ".fls",
    ".fdb_latexmk",
    ".synctex.gz",
    ".bcf",
    ".run.xml",
];

/// Suffixes of typeset artifacts.
pub const OUTPUT_SUFFIXES: &[&str] = &[".pdf", ".dvi", ".ps"];

/// Category a file falls into when listing or cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Auxiliary,
    Output,
}

/// Classifies `name` by suffix, case-insensitively.
///
/// Returns `None` for suffixes outside the three tables and for bare
/// dotfiles like `.aux`, which have no stem to belong to.
pub fn classify(name: &str) -> Option<FileKind> {
    let lower = name.to_lowercase();
    let tail_matches = |suffixes: &[&str]| {
        suffixes
            .iter()
            .any(|suffix| lower.len() > suffix.len() && lower.ends_with(suffix))
    };
    if tail_matches(SOURCE_SUFFIXES) {
        Some(FileKind::Source)
    } else if tail_matches(AUXILIARY_SUFFIXES) {
        Some(FileKind::Auxiliary)
    } else if tail_matches(OUTPUT_SUFFIXES) {
        Some(FileKind::Output)
    } else {
        None
    }
}

/// One file in a [`DirectoryListing`].
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
    /// Last modification time, RFC 3339 in UTC. Absent when the
    /// filesystem cannot report one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// Files directly under one directory, bucketed by [`FileKind`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryListing {
    pub source_files: Vec<FileEntry>,
    pub output_files: Vec<FileEntry>,
    pub auxiliary_files: Vec<FileEntry>,
}

/// Lists LaTeX-related files directly under `dir` (non-recursive).
///
/// Auxiliary files are skipped unless `include_auxiliary` is set; files
/// with unknown suffixes never appear at all. Buckets come back sorted by
/// name so listings are stable across platforms.
pub fn list_directory(dir: &Path, include_auxiliary: bool) -> io::Result<DirectoryListing> {
    let mut listing = DirectoryListing::default();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(kind) = classify(&name) else {
            continue;
        };
        let bucket = match kind {
            FileKind::Source => &mut listing.source_files,
            FileKind::Output => &mut listing.output_files,
            FileKind::Auxiliary if include_auxiliary => &mut listing.auxiliary_files,
            FileKind::Auxiliary => continue,
        };
        let modified = metadata
            .modified()
            .ok()
            .map(|time| DateTime::<Utc>::from(time).to_rfc3339());
        bucket.push(FileEntry {
            path: entry.path().display().to_string(),
            name,
            size: metadata.len(),
            modified,
        });
    }
    for bucket in [
        &mut listing.source_files,
        &mut listing.output_files,
        &mut listing.auxiliary_files,
    ] {
        bucket.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(listing)
}

/// What a cleanup pass removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub removed_files: Vec<String>,
    pub total_files: usize,
    pub total_size: u64,
}

/// Deletes toolchain byproducts directly under `dir`.
///
/// Auxiliary files always go; typeset outputs go too when `keep_pdf` is
/// false. Source files are never touched.
pub fn clean_directory(dir: &Path, keep_pdf: bool) -> io::Result<CleanupReport> {
    let mut report = CleanupReport::default();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let doomed = match classify(&name) {
            Some(FileKind::Auxiliary) => true,
            Some(FileKind::Output) => !keep_pdf,
            _ => false,
        };
        if !doomed {
            continue;
        }
        std::fs::remove_file(entry.path())?;
        report.total_size += metadata.len();
        report.removed_files.push(name);
    }
    report.removed_files.sort();
    report.total_files = report.removed_files.len();
    info!(
        "cleaned {} files under {}",
        report.total_files,
        dir.display()
    );
    Ok(report)
}
