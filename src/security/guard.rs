//! Staging path resolution with containment and symlink checks.
//!
//! [`StagingGuard`] is the last line of defense: it only accepts values that
//! already passed the identifier validators and the filename sanitizer, and
//! still proves on the filesystem that the result stays inside the
//! project's staging directory.
//!
//! # Security Model
//!
//! Symlinks can be used to escape a staging directory:
//! 1. Attacker gets a symlink placed inside a project tree
//! 2. Symlink points to another tenant's directory or outside the root
//! 3. A later write or listing follows it
//!
//! Resolution canonicalizes the candidate (following every link) and
//! requires the result to sit under the canonical project directory. A
//! second pass walks the unresolved candidate up to the staging root and
//! rejects any entry that is itself a symlink, which also catches links
//! that point back inside the same project.
//!
//! The guard performs no writes. It does not make a later write atomic with
//! the check; see `staging::StagingArea::upload` for how writers close that
//! gap.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::error;

use super::error::ValidationError;
use super::filename::{RelativeFilename, sanitize_filename};
use super::identifiers::{ProjectId, validate_project_id};
use super::ignore::IgnorePatterns;

/// A path proven to be the project staging directory or a descendant of it.
///
/// This is the only kind of path staging code hands to a read, write, list,
/// or remove syscall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeStagingPath {
    path: PathBuf,
}

impl SafeStagingPath {
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for SafeStagingPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug)]
struct GuardConfig {
    root: PathBuf,
    ignore: IgnorePatterns,
}

/// Resolves staging paths for validated project ids and filenames.
///
/// Configuration is fixed at construction. `StagingGuard` is `Clone` and
/// cheap to share across threads.
#[derive(Debug, Clone)]
pub struct StagingGuard {
    config: Arc<GuardConfig>,
}

impl StagingGuard {
    /// Creates a guard over `root` using `ignore` for filename checks.
    ///
    /// `root` should be absolute and is never derived from request input.
    pub fn new(root: impl Into<PathBuf>, ignore: IgnorePatterns) -> Self {
        Self {
            config: Arc::new(GuardConfig {
                root: root.into(),
                ignore,
            }),
        }
    }

    /// The staging root, as configured.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    #[must_use]
    pub fn ignore_patterns(&self) -> &IgnorePatterns {
        &self.config.ignore
    }

    /// Sanitizes `raw` against this guard's ignore patterns.
    ///
    /// # Errors
    ///
    /// See [`sanitize_filename`].
    pub fn sanitize_filename(&self, raw: &str) -> Result<RelativeFilename, ValidationError> {
        sanitize_filename(raw, &self.config.ignore)
    }

    /// Unresolved `root/project`. No I/O.
    #[must_use]
    pub fn project_dir(&self, project: &ProjectId) -> PathBuf {
        self.config.root.join(project.as_str())
    }

    /// Resolves `root/project/filename` to a [`SafeStagingPath`].
    ///
    /// 1. Joins root, project id, and filename (string join only)
    /// 2. Canonicalizes the candidate, following all symlinks
    /// 3. Canonicalizes the project directory independently
    /// 4. Requires the candidate to equal or descend from the project directory
    /// 5. Rejects the candidate if it or any ancestor below the root is a symlink
    ///
    /// Paths that do not exist yet resolve through their deepest existing
    /// ancestor.
    ///
    /// # Errors
    ///
    /// Returns a security-kind [`ValidationError`]:
    /// - [`Unresolvable`](ValidationError::Unresolvable) - any filesystem error during resolution
    /// - [`PathTraversal`](ValidationError::PathTraversal) - resolved outside the project directory
    /// - [`SymlinkInPath`](ValidationError::SymlinkInPath) - symlinked entry on the way to the root
    pub fn resolve(
        &self,
        project: &ProjectId,
        filename: &RelativeFilename,
    ) -> Result<SafeStagingPath, ValidationError> {
        let project_dir = self.project_dir(project);
        let candidate = filename
            .components()
            .fold(project_dir.clone(), |path, part| path.join(part));

        self.check(project, &project_dir, &candidate, filename.as_str())
    }

    /// Resolves the project staging directory itself.
    ///
    /// The directory does not need to exist.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_project_dir(
        &self,
        project: &ProjectId,
    ) -> Result<SafeStagingPath, ValidationError> {
        let project_dir = self.project_dir(project);
        self.check(project, &project_dir, &project_dir, "")
    }

    /// Runs the full pipeline on raw input: project id, filename, resolution.
    ///
    /// # Errors
    ///
    /// Returns the first failure from [`validate_project_id`],
    /// [`sanitize_filename`], or [`resolve`](Self::resolve).
    pub fn safe_path(
        &self,
        raw_project_id: &str,
        raw_filename: &str,
    ) -> Result<SafeStagingPath, ValidationError> {
        let project = validate_project_id(raw_project_id)?;
        let filename = self.sanitize_filename(raw_filename)?;
        self.resolve(&project, &filename)
    }

    fn check(
        &self,
        project: &ProjectId,
        project_dir: &Path,
        candidate: &Path,
        label: &str,
    ) -> Result<SafeStagingPath, ValidationError> {
        let resolved = resolve_lenient(candidate).map_err(|e| {
            error!(
                security_event = "staging_resolution_failed",
                project_id = %project,
                filename = %label,
                error_kind = ?e.kind(),
                "Could not resolve staging path"
            );
            ValidationError::Unresolvable
        })?;

        let resolved_project_dir = resolve_lenient(project_dir).map_err(|e| {
            error!(
                security_event = "staging_resolution_failed",
                project_id = %project,
                error_kind = ?e.kind(),
                "Could not resolve project staging directory"
            );
            ValidationError::Unresolvable
        })?;

        if !resolved.starts_with(&resolved_project_dir) {
            error!(
                security_event = "path_traversal_attempt",
                project_id = %project,
                filename = %label,
                reason = "escapes_project_dir",
                "Blocked staging path resolving outside the project directory"
            );
            return Err(ValidationError::PathTraversal {
                filename: label.to_string(),
            });
        }

        self.reject_symlinked_ancestors(project, candidate)?;

        Ok(SafeStagingPath { path: resolved })
    }

    /// Walks from `candidate` up to the staging root, rejecting symlinks.
    ///
    /// Missing entries are not symlinks; this pass never fails on I/O.
    fn reject_symlinked_ancestors(
        &self,
        project: &ProjectId,
        candidate: &Path,
    ) -> Result<(), ValidationError> {
        let root = self.config.root.as_path();

        for current in candidate.ancestors().take_while(|p| *p != root) {
            let is_symlink = fs::symlink_metadata(current)
                .map(|meta| meta.file_type().is_symlink())
                .unwrap_or(false);

            if is_symlink {
                let component = current
                    .strip_prefix(root)
                    .unwrap_or(current)
                    .to_string_lossy()
                    .replace('\\', "/");
                error!(
                    security_event = "symlink_escape_attempt",
                    project_id = %project,
                    component = %component,
                    reason = "symlink_in_path",
                    "Blocked staging path through a symlink"
                );
                return Err(ValidationError::SymlinkInPath { component });
            }
        }

        Ok(())
    }
}

/// Canonicalizes `path`, tolerating a missing tail.
///
/// The deepest ancestor that exists (as any entry, including a symlink) is
/// canonicalized and the missing components are appended unchanged. A
/// dangling symlink fails canonicalization and is reported as an error.
fn resolve_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path;
    let mut missing: Vec<&OsStr> = Vec::new();

    loop {
        match fs::symlink_metadata(existing) {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let (Some(name), Some(parent)) = (existing.file_name(), existing.parent()) else {
                    return Err(e);
                };
                missing.push(name);
                existing = parent;
            },
            Err(e) => return Err(e),
        }
    }

    let mut resolved = existing.canonicalize()?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}
