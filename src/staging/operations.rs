//! Filesystem helpers for staging operations.
//!
//! All helpers take a [`SafeStagingPath`]; none of them accept a raw path.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use tempfile::Builder;
use tracing::debug;

use super::error::{Error, Result};
use super::types::StagedFile;
use crate::security::{IgnorePatterns, SafeStagingPath, ValidationError, sanitize_filename};

/// Prefix of in-flight upload files. The leading dot makes the name one the
/// sanitizer rejects, so listings never report it.
pub(crate) const UPLOAD_TEMP_PREFIX: &str = ".snap-upload-";

/// Recursively lists regular files under a project directory.
///
/// Symlinks are skipped, never followed. Entries that vanish or cannot be
/// stat'ed mid-scan are skipped, as are files whose relative name could not
/// have been uploaded (in-flight or abandoned upload temp files, hidden or
/// malformed names). Returns an empty list when the directory does not exist
/// yet.
pub(crate) fn list_files(project_dir: &SafeStagingPath) -> Result<Vec<StagedFile>> {
    let base = project_dir.as_path();
    let mut files = Vec::new();

    if !base.is_dir() {
        return Ok(files);
    }

    let any_name = IgnorePatterns::empty();
    scan_directory(base, base, &any_name, &mut files)?;
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn scan_directory(
    base_dir: &Path,
    dir: &Path,
    ignore: &IgnorePatterns,
    files: &mut Vec<StagedFile>,
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io("read staging directory", e))?;

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();

        if file_type.is_dir() {
            scan_directory(base_dir, &path, ignore, files)?;
        } else if file_type.is_file() {
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            let Ok(relative) = path.strip_prefix(base_dir) else {
                continue;
            };
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with(UPLOAD_TEMP_PREFIX)
            {
                continue;
            }

            let name = relative.to_string_lossy().replace('\\', "/");
            if sanitize_filename(&name, ignore).is_err() {
                debug!(file = %name, "Skipping unlisted staging entry");
                continue;
            }

            files.push(StagedFile {
                name,
                size: meta.len(),
                modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }
    }

    Ok(())
}

/// Creates the parent directories of `target`.
pub(crate) fn create_parent_dirs(target: &SafeStagingPath) -> Result<()> {
    let parent = target
        .as_path()
        .parent()
        .ok_or(ValidationError::Unresolvable)?;
    fs::create_dir_all(parent).map_err(|e| Error::io("create staging directories", e))
}

/// Writes `data` to `target` through a temporary file in the same directory.
///
/// Readers see either the previous content or the complete new content,
/// never a partial write.
pub(crate) fn write_atomic(target: &SafeStagingPath, data: &[u8]) -> Result<()> {
    let parent = target
        .as_path()
        .parent()
        .ok_or(ValidationError::Unresolvable)?;

    let mut tmp = Builder::new()
        .prefix(UPLOAD_TEMP_PREFIX)
        .tempfile_in(parent)
        .map_err(|e| Error::io("create temp file", e))?;
    tmp.write_all(data)
        .map_err(|e| Error::io("write file", e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::io("sync file", e))?;
    tmp.persist(target.as_path())
        .map_err(|e| Error::io("write file", e.error))?;

    Ok(())
}

/// Removes a project directory and everything under it.
///
/// Returns false when there was nothing to remove.
pub(crate) fn remove_project_dir(project_dir: &SafeStagingPath) -> Result<bool> {
    match fs::remove_dir_all(project_dir.as_path()) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io("remove staging directory", e)),
    }
}
