//! Error types for staging input validation.
//!
//! Every rejection carries an [`ErrorKind`]. Callers key log severity and
//! response detail off it: format errors are safe to echo back verbatim,
//! security errors name the violated rule and nothing about the filesystem.

use std::fmt;

use super::identifiers::snapshot_type_list;

/// Coarse classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Syntactically invalid input.
    Format,
    /// Plausible input that implies traversal, symlink escape, or an
    /// unexpected filesystem state.
    Security,
}

impl ErrorKind {
    /// Stable error code reported to callers.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Format => "validation_error",
            Self::Security => "security_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A rejected identifier, filename, or staging path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A required field was empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error(
        "Invalid project_id format: must be 3-64 alphanumeric characters, underscores, or hyphens. Got: {value:?}"
    )]
    ProjectIdFormat { value: String },

    #[error("project_id cannot start with '-' or '.'. Got: {value:?}")]
    ProjectIdLeadingChar { value: String },

    #[error("project_id cannot be a reserved name. Got: {value:?}")]
    ReservedProjectId { value: String },

    #[error("vendor_id must be 1-64 characters. Got {len}")]
    VendorIdLength { len: usize },

    #[error("repo_url must be an HTTPS GitHub URL (https://github.com/...)")]
    RepoUrlHost,

    #[error("repo_url must include owner and repo name")]
    RepoUrlSegments,

    #[error("branch cannot start with '-' or contain whitespace or control characters")]
    InvalidBranch,

    #[error("Invalid snapshot_type: {value:?}. Must be one of: {}", snapshot_type_list())]
    UnknownSnapshotType { value: String },

    #[error("filename cannot be empty after normalization")]
    EmptyFilename,

    /// Filename contains `..`, a null byte, or a shell/Windows metacharacter.
    #[error("Forbidden pattern in filename: {pattern:?}")]
    ForbiddenPattern { pattern: &'static str },

    #[error("Invalid filename format: {value:?}")]
    FilenameFormat { value: String },

    #[error("Empty path component in filename")]
    EmptyComponent,

    /// A path component is a reserved device name (CON, NUL, COM1, ...).
    #[error("Reserved name in path: {component:?}")]
    ReservedName { component: String },

    #[error("Hidden directory not allowed: {component:?}")]
    HiddenComponent { component: String },

    /// Filename matches a secret/credential ignore pattern.
    #[error("File matches ignore pattern (secrets/credentials): {value:?} matched {pattern:?}")]
    IgnoredPattern { value: String, pattern: String },

    /// Resolution failed (missing ancestor, permission denied, dangling link).
    #[error("Invalid path: could not be resolved")]
    Unresolvable,

    #[error("Path traversal detected: {filename:?} escapes staging directory")]
    PathTraversal { filename: String },

    /// `component` is relative to the staging root.
    #[error("Symlink detected in path: {component:?}")]
    SymlinkInPath { component: String },
}

impl ValidationError {
    /// Returns the kind of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ForbiddenPattern { .. }
            | Self::ReservedName { .. }
            | Self::Unresolvable
            | Self::PathTraversal { .. }
            | Self::SymlinkInPath { .. } => ErrorKind::Security,
            _ => ErrorKind::Format,
        }
    }

    /// Returns true for traversal, symlink, and device-name rejections.
    #[must_use]
    pub const fn is_security(&self) -> bool {
        matches!(self.kind(), ErrorKind::Security)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_variants_classified() {
        let security = [
            ValidationError::ForbiddenPattern { pattern: ".." },
            ValidationError::ReservedName {
                component: "con".into(),
            },
            ValidationError::Unresolvable,
            ValidationError::PathTraversal {
                filename: "x".into(),
            },
            ValidationError::SymlinkInPath {
                component: "p/x".into(),
            },
        ];
        for err in &security {
            assert_eq!(err.kind(), ErrorKind::Security, "{err}");
            assert!(err.is_security());
        }
    }

    #[test]
    fn test_format_variants_classified() {
        let format = [
            ValidationError::Required {
                field: "project_id",
            },
            ValidationError::EmptyFilename,
            ValidationError::HiddenComponent {
                component: ".git".into(),
            },
            ValidationError::IgnoredPattern {
                value: "id_rsa".into(),
                pattern: "id_rsa".into(),
            },
        ];
        for err in &format {
            assert_eq!(err.kind(), ErrorKind::Format, "{err}");
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorKind::Format.code(), "validation_error");
        assert_eq!(ErrorKind::Security.to_string(), "security_error");
    }

    #[test]
    fn test_unresolvable_message_has_no_path() {
        let msg = ValidationError::Unresolvable.to_string();
        assert!(!msg.contains('/'));
    }
}
