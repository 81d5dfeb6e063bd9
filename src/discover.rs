//! Locating result directories and the report files inside them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PlotError, Result};
use crate::record::{ParsedRecord, is_report_name};

/// Entries of `dir` sorted by file name.
fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .and_then(|rd| rd.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| PlotError::io(format!("failed to read directory {}", dir.display()), e))?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn report_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in sorted_entries(dir)? {
        let path = entry.path();
        if path.is_file() && entry.file_name().to_str().is_some_and(is_report_name) {
            files.push(path);
        }
    }
    Ok(files)
}

/// Returns true if `dir` directly contains at least one report file.
pub fn has_processable_files(dir: &Path) -> Result<bool> {
    Ok(!report_files(dir)?.is_empty())
}

/// Collect the directories below `dir` that hold report files.
///
/// Only subdirectories are considered, never `dir` itself. A subdirectory
/// with report files is kept and not descended into; otherwise its own
/// children are searched. Children are visited in name order and symlinks
/// are not followed.
pub fn find_result_dirs(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in sorted_entries(dir)? {
        let file_type = entry
            .file_type()
            .map_err(|e| PlotError::io(format!("failed to stat {}", entry.path().display()), e))?;
        if !file_type.is_dir() {
            continue;
        }
        let child = entry.path();
        if has_processable_files(&child)? {
            debug!(dir = %child.display(), "found results");
            found.push(child);
        } else {
            find_result_dirs(&child, found)?;
        }
    }
    Ok(())
}

/// Validate the positional directories and expand them into the list of
/// directories to read.
///
/// Every directory must exist. Without `recursive`, each must hold report
/// files itself; with it, only its subdirectories are searched.
pub fn result_dirs(dirs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for dir in dirs {
        let path = std::path::absolute(dir)
            .map_err(|e| PlotError::io(format!("failed to resolve {}", dir.display()), e))?;
        if !path.exists() {
            return Err(PlotError::DirectoryNotFound(dir.clone()));
        }
        if recursive {
            find_result_dirs(&path, &mut found)?;
        } else if has_processable_files(&path)? {
            found.push(path);
        } else {
            return Err(PlotError::NoProcessableFiles(path));
        }
    }
    Ok(found)
}

/// Parse every report file in `dirs`, in directory then file-name order.
/// Files that do not follow the report grammar are skipped.
pub fn discover_records(dirs: &[PathBuf]) -> Result<Vec<ParsedRecord>> {
    let mut records = Vec::new();
    for dir in dirs {
        for path in report_files(dir)? {
            records.push(ParsedRecord::from_path(path)?);
        }
    }
    debug!(count = records.len(), "discovered report files");
    Ok(records)
}
