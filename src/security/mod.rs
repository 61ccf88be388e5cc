//! Staging path security guard.
//!
//! This module is the only place untrusted strings become filesystem paths.
//! Every staging operation passes its input through three stages, in order,
//! before any syscall touches the staging tree:
//!
//! 1. [`identifiers`] - project id (and the non-path identifiers: vendor id,
//!    repository URL, snapshot type)
//! 2. [`filename`] - filename normalization, using the [`ignore`] patterns
//! 3. [`guard`] - resolution, containment, and symlink checks
//!
//! Each stage only accepts the newtype produced by the previous one, so the
//! order cannot be skipped.
//!
//! # Examples
//!
//! ```
//! use snap_staging::security::{IgnorePatterns, StagingGuard};
//!
//! let root = tempfile::tempdir().unwrap();
//! let guard = StagingGuard::new(root.path(), IgnorePatterns::default());
//!
//! let path = guard.safe_path("my-project", "src/main.py").unwrap();
//! assert!(path.as_path().ends_with("my-project/src/main.py"));
//!
//! let err = guard.safe_path("my-project", "../other/main.py").unwrap_err();
//! assert!(err.is_security());
//! ```

mod error;
pub mod filename;
pub mod guard;
pub mod identifiers;
pub mod ignore;
mod reserved;

pub use error::{ErrorKind, ValidationError};
pub use filename::{FORBIDDEN_PATTERNS, RelativeFilename, sanitize_filename};
pub use guard::{SafeStagingPath, StagingGuard};
pub use identifiers::{
    ProjectId, RepoUrl, SnapshotType, VendorId, validate_project_id, validate_repo_url,
    validate_snapshot_type, validate_vendor_id,
};
pub use ignore::{DEFAULT_IGNORE_PATTERNS, IgnorePatterns};
pub use reserved::{RESERVED_DEVICE_NAMES, has_reserved_stem, is_reserved_device_name};
