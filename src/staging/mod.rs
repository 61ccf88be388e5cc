//! Per-project staging area.
//!
//! Callers upload files into `StagingRoot/<project_id>/` before analysis,
//! list them, and clear or delete the directory afterwards. Files have no
//! index: the directory listing is the source of truth.
//!
//! Security features:
//! - Every operation validates its project id, and uploads their filename,
//!   before touching the filesystem
//! - Every syscall target is a [`SafeStagingPath`] produced by the guard
//! - Uploads re-run the guard after creating parent directories and are
//!   written through a temporary file plus rename
//!
//! # Async Usage
//!
//! All operations are blocking. From async contexts use the `*_async`
//! variants, which run on tokio's blocking pool.
//!
//! [`SafeStagingPath`]: crate::security::SafeStagingPath

mod async_ops;
mod encoding;
mod error;
mod operations;
mod types;

use std::fs;

use anyhow::Context;
use tracing::info;

use crate::audit::{AuditEvent, log_audit_event};
use crate::config::StagingConfig;
use crate::constants::STAGING_DISPLAY_PREFIX;
use crate::security::{StagingGuard, validate_project_id};

pub use encoding::ContentEncoding;
pub use error::{Error, Result};
pub use types::{ClearReport, DeleteReport, StagedFile, StagingInfo, UploadReceipt};

/// Staging operations over a [`StagingGuard`].
///
/// # Thread Safety
///
/// `StagingArea` is `Clone` and can be shared across threads. It holds no
/// locks; uploads rely on rename for atomicity.
#[derive(Debug, Clone)]
pub struct StagingArea {
    guard: StagingGuard,
    max_file_bytes: u64,
}

impl StagingArea {
    /// Creates a staging area over an existing guard.
    pub fn new(guard: StagingGuard, max_file_bytes: u64) -> Self {
        Self {
            guard,
            max_file_bytes,
        }
    }

    /// Creates the staging root if needed and builds the guard from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An ignore pattern is not a valid glob
    /// - The staging root cannot be created
    pub fn open(config: &StagingConfig) -> anyhow::Result<Self> {
        let ignore = config.ignore_patterns()?;

        fs::create_dir_all(&config.root).with_context(|| {
            format!(
                "Failed to create staging directory: {}",
                config.root.display()
            )
        })?;

        info!(
            root = %config.root.display(),
            ignore_patterns = ignore.len(),
            max_file_bytes = config.max_file_bytes,
            "Staging area ready"
        );

        Ok(Self::new(
            StagingGuard::new(&config.root, ignore),
            config.max_file_bytes,
        ))
    }

    #[must_use]
    pub fn guard(&self) -> &StagingGuard {
        &self.guard
    }

    #[must_use]
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Stores one file in a project's staging directory.
    ///
    /// # Arguments
    /// * `project_id` - Untrusted project identifier
    /// * `filename` - Untrusted relative filename (e.g. `src/utils.py`)
    /// * `content` - File content, raw text or base64
    /// * `encoding` - `utf-8` or `base64`
    ///
    /// # Errors
    ///
    /// - Guard rejections (format or security)
    /// - Unknown encoding, malformed base64, or content over the size limit
    /// - IO errors while writing
    pub fn upload(
        &self,
        project_id: &str,
        filename: &str,
        content: &str,
        encoding: &str,
    ) -> Result<UploadReceipt> {
        self.upload_inner(project_id, filename, content, encoding)
            .inspect_err(|e| e.log("upload_to_staging"))
    }

    fn upload_inner(
        &self,
        project_id: &str,
        filename: &str,
        content: &str,
        encoding: &str,
    ) -> Result<UploadReceipt> {
        let project = validate_project_id(project_id)?;
        let filename = self.guard.sanitize_filename(filename)?;
        let target = self.guard.resolve(&project, &filename)?;

        let encoding: ContentEncoding = encoding.parse()?;
        let data = encoding.decode(content)?;

        let size = data.len() as u64;
        if size > self.max_file_bytes {
            return Err(Error::FileTooLarge {
                size,
                max: self.max_file_bytes,
            });
        }

        operations::create_parent_dirs(&target)?;

        // Directories now exist; resolve again so a symlink swapped in since
        // the first check is caught before the write.
        let target = self.guard.resolve(&project, &filename)?;
        operations::write_atomic(&target, &data)?;

        log_audit_event(AuditEvent::FileStaged {
            project_id: project.to_string(),
            filename: filename.to_string(),
            encoding: encoding.as_str(),
            size,
        });

        Ok(UploadReceipt {
            status: "uploaded",
            path: format!("{STAGING_DISPLAY_PREFIX}/{project}/{filename}"),
            project_id: project,
            filename,
            size,
        })
    }

    /// Lists the files in a project's staging directory.
    ///
    /// # Errors
    ///
    /// Returns guard rejections, or an IO error if the directory cannot be read.
    pub fn info(&self, project_id: &str) -> Result<StagingInfo> {
        self.info_inner(project_id)
            .inspect_err(|e| e.log("get_staging_info"))
    }

    fn info_inner(&self, project_id: &str) -> Result<StagingInfo> {
        let project = validate_project_id(project_id)?;
        let dir = self.guard.resolve_project_dir(&project)?;

        let files = operations::list_files(&dir)?;
        let total_size_bytes = files.iter().map(|f| f.size).sum();

        Ok(StagingInfo {
            status: "success",
            staging_path: format!("{STAGING_DISPLAY_PREFIX}/{project}"),
            project_id: project,
            file_count: files.len(),
            total_size_bytes,
            files,
        })
    }

    /// Lists a project's staged files, failing when there are none.
    ///
    /// Called before analysing a staged project, which needs at least one
    /// file to work on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStaging`] (a tool error) when nothing is staged,
    /// otherwise the same errors as [`info`](Self::info).
    pub fn ensure_not_empty(&self, project_id: &str) -> Result<StagingInfo> {
        self.info_inner(project_id)
            .and_then(|info| {
                if info.files.is_empty() {
                    Err(Error::EmptyStaging {
                        project_id: info.project_id.to_string(),
                    })
                } else {
                    Ok(info)
                }
            })
            .inspect_err(|e| e.log("process_local_project"))
    }

    /// Removes every file from a project's staging directory.
    ///
    /// # Errors
    ///
    /// Returns guard rejections, or an IO error if removal fails.
    pub fn clear(&self, project_id: &str) -> Result<ClearReport> {
        self.clear_inner(project_id)
            .inspect_err(|e| e.log("clear_staging"))
    }

    fn clear_inner(&self, project_id: &str) -> Result<ClearReport> {
        let project = validate_project_id(project_id)?;
        let dir = self.guard.resolve_project_dir(&project)?;

        let files_deleted = operations::list_files(&dir)?.len();
        operations::remove_project_dir(&dir)?;

        log_audit_event(AuditEvent::StagingCleared {
            project_id: project.to_string(),
            files_deleted,
        });

        Ok(ClearReport {
            status: "cleared",
            project_id: project,
            files_deleted,
        })
    }

    /// Deletes a project's staging directory as part of project deletion.
    ///
    /// # Errors
    ///
    /// Returns guard rejections, or an IO error if removal fails.
    pub fn delete(&self, project_id: &str) -> Result<DeleteReport> {
        self.delete_inner(project_id)
            .inspect_err(|e| e.log("delete_project"))
    }

    fn delete_inner(&self, project_id: &str) -> Result<DeleteReport> {
        let project = validate_project_id(project_id)?;
        let dir = self.guard.resolve_project_dir(&project)?;

        let removed = operations::remove_project_dir(&dir)?;

        log_audit_event(AuditEvent::ProjectStagingDeleted {
            project_id: project.to_string(),
            removed,
        });

        Ok(DeleteReport {
            status: "deleted",
            project_id: project,
            removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::IgnorePatterns;
    use tempfile::{TempDir, tempdir};

    fn area() -> (TempDir, StagingArea) {
        let root = tempdir().unwrap();
        let guard = StagingGuard::new(root.path(), IgnorePatterns::default());
        (root, StagingArea::new(guard, 1024))
    }

    #[test]
    fn test_upload_writes_file() {
        let (root, area) = area();
        let receipt = area.upload("proj", "src/main.py", "print(1)", "utf-8").unwrap();

        assert_eq!(receipt.status, "uploaded");
        assert_eq!(receipt.path, "staging/proj/src/main.py");
        assert_eq!(receipt.size, 8);
        assert_eq!(
            fs::read_to_string(root.path().join("proj/src/main.py")).unwrap(),
            "print(1)"
        );
    }

    #[test]
    fn test_upload_base64() {
        let (root, area) = area();
        area.upload("proj", "logo.png", "iVBORw==", "base64").unwrap();
        assert_eq!(
            fs::read(root.path().join("proj/logo.png")).unwrap(),
            vec![0x89, 0x50, 0x4e, 0x47]
        );
    }

    #[test]
    fn test_upload_overwrites() {
        let (root, area) = area();
        area.upload("proj", "a.txt", "first", "utf-8").unwrap();
        area.upload("proj", "a.txt", "second", "utf-8").unwrap();
        assert_eq!(
            fs::read_to_string(root.path().join("proj/a.txt")).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_upload_size_limit() {
        let (root, area) = area();
        let err = area
            .upload("proj", "big.txt", &"x".repeat(1025), "utf-8")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::FileTooLarge {
                size: 1025,
                max: 1024
            }
        ));
        assert!(!root.path().join("proj").exists());

        assert!(area.upload("proj", "ok.txt", &"x".repeat(1024), "utf-8").is_ok());
    }

    #[test]
    fn test_upload_rejections_touch_nothing() {
        let (root, area) = area();

        let err = area.upload("proj", "../escape.txt", "x", "utf-8").unwrap_err();
        assert_eq!(err.code(), "security_error");

        let err = area.upload("proj", "main.py", "x", "latin-1").unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding { .. }));

        let err = area.upload("proj", "main.py", "%%%", "base64").unwrap_err();
        assert_eq!(err.code(), "validation_error");

        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_info_lists_files() {
        let (_root, area) = area();
        area.upload("proj", "main.py", "abc", "utf-8").unwrap();
        area.upload("proj", "src/utils.py", "abcdef", "utf-8").unwrap();

        let info = area.info("proj").unwrap();
        assert_eq!(info.staging_path, "staging/proj");
        assert_eq!(info.file_count, 2);
        assert_eq!(info.total_size_bytes, 9);
        let names: Vec<_> = info.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["main.py", "src/utils.py"]);
        assert!(info.files[0].modified_at.is_some());
    }

    #[test]
    fn test_upload_leaves_no_temp_file() {
        let (root, area) = area();
        area.upload("proj", "main.py", "x", "utf-8").unwrap();
        area.upload("proj", "main.py", "y", "utf-8").unwrap();

        let entries: Vec<_> = fs::read_dir(root.path().join("proj"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, ["main.py"]);
    }

    #[test]
    fn test_info_skips_temp_and_unlisted_files() {
        let (root, area) = area();
        area.upload("proj", "main.py", "x", "utf-8").unwrap();

        let proj = root.path().join("proj");
        fs::create_dir_all(proj.join("src")).unwrap();
        fs::write(proj.join(".tmpAbC123"), "partial").unwrap();
        fs::write(
            proj.join(format!("{}Xy12ab", operations::UPLOAD_TEMP_PREFIX)),
            "partial",
        )
        .unwrap();
        fs::write(
            proj.join("src").join(format!("{}Zz99", operations::UPLOAD_TEMP_PREFIX)),
            "partial",
        )
        .unwrap();

        let info = area.info("proj").unwrap();
        let names: Vec<_> = info.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["main.py"]);
        assert_eq!(info.total_size_bytes, 1);

        // Clear counts only listed files but still removes everything
        assert_eq!(area.clear("proj").unwrap().files_deleted, 1);
        assert!(!proj.exists());
    }

    #[test]
    fn test_ensure_not_empty() {
        let (_root, area) = area();

        let err = area.ensure_not_empty("proj").unwrap_err();
        assert!(matches!(err, Error::EmptyStaging { .. }));
        assert_eq!(err.code(), "tool_error");
        assert_eq!(
            err.to_string(),
            "No files in staging area for proj. Upload files first"
        );

        area.upload("proj", "main.py", "x", "utf-8").unwrap();
        assert_eq!(area.ensure_not_empty("proj").unwrap().file_count, 1);

        area.clear("proj").unwrap();
        assert!(area.ensure_not_empty("proj").is_err());
        assert_eq!(
            area.ensure_not_empty("ab").unwrap_err().code(),
            "validation_error"
        );
    }

    #[test]
    fn test_info_missing_project_is_empty() {
        let (root, area) = area();
        let info = area.info("nothing-here").unwrap();
        assert_eq!(info.file_count, 0);
        assert!(!root.path().join("nothing-here").exists());
    }

    #[test]
    fn test_clear_and_delete() {
        let (root, area) = area();
        area.upload("proj", "a.py", "1", "utf-8").unwrap();
        area.upload("proj", "pkg/b.py", "2", "utf-8").unwrap();

        let report = area.clear("proj").unwrap();
        assert_eq!(report.files_deleted, 2);
        assert!(!root.path().join("proj").exists());

        area.upload("proj", "a.py", "1", "utf-8").unwrap();
        assert!(area.delete("proj").unwrap().removed);
        assert!(!area.delete("proj").unwrap().removed);
    }

    #[test]
    fn test_invalid_project_id_everywhere() {
        let (_root, area) = area();
        assert_eq!(area.info("ab").unwrap_err().code(), "validation_error");
        assert_eq!(area.clear("-abc").unwrap_err().code(), "validation_error");
        assert_eq!(area.delete("NUL").unwrap_err().code(), "validation_error");
    }

    #[cfg(unix)]
    #[test]
    fn test_info_skips_symlinks() {
        use std::os::unix::fs::symlink;

        let (root, area) = area();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();

        area.upload("proj", "main.py", "x", "utf-8").unwrap();
        symlink(
            outside.path().join("secret.txt"),
            root.path().join("proj/link.txt"),
        )
        .unwrap();
        symlink(outside.path(), root.path().join("proj/linkdir")).unwrap();

        let info = area.info("proj").unwrap();
        assert_eq!(info.file_count, 1);
        assert_eq!(info.files[0].name, "main.py");
    }

    #[cfg(unix)]
    #[test]
    fn test_clear_does_not_follow_symlinks() {
        use std::os::unix::fs::symlink;

        let (root, area) = area();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("keep.txt"), "keep").unwrap();

        area.upload("proj", "main.py", "x", "utf-8").unwrap();
        symlink(outside.path(), root.path().join("proj/linkdir")).unwrap();

        area.clear("proj").unwrap();
        assert!(outside.path().join("keep.txt").exists());
    }
}
