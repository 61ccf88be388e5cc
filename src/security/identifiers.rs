//! Identifier validators: project id, vendor id, repository URL, snapshot type.
//!
//! Each validator is total over string input and returns a newtype that can
//! only be obtained through it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use super::error::ValidationError;
use super::reserved::is_reserved_device_name;
use crate::constants::{
    GITHUB_URL_PREFIX, PROJECT_ID_MAX_LEN, PROJECT_ID_MIN_LEN, VENDOR_ID_MAX_LEN,
};

/// Validated tenant identifier. Doubles as the staging directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated audit label. Never used as a path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VendorId(String);

impl VendorId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated `https://github.com/<owner>/<repo>` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoUrl {
    url: String,
    owner: String,
    repo: String,
}

impl RepoUrl {
    /// The URL as supplied, trimmed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl fmt::Display for RepoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Analysis record categories the query collaborator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotType {
    FileMetadata,
    Imports,
    Exports,
    Functions,
    Classes,
    Connections,
    RepoMetadata,
    Security,
    Quality,
    DocMetadata,
    DocContent,
    DocAnalysis,
}

impl SnapshotType {
    pub const ALL: [Self; 12] = [
        Self::FileMetadata,
        Self::Imports,
        Self::Exports,
        Self::Functions,
        Self::Classes,
        Self::Connections,
        Self::RepoMetadata,
        Self::Security,
        Self::Quality,
        Self::DocMetadata,
        Self::DocContent,
        Self::DocAnalysis,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileMetadata => "file_metadata",
            Self::Imports => "imports",
            Self::Exports => "exports",
            Self::Functions => "functions",
            Self::Classes => "classes",
            Self::Connections => "connections",
            Self::RepoMetadata => "repo_metadata",
            Self::Security => "security",
            Self::Quality => "quality",
            Self::DocMetadata => "doc_metadata",
            Self::DocContent => "doc_content",
            Self::DocAnalysis => "doc_analysis",
        }
    }
}

impl fmt::Display for SnapshotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_snapshot_type(s)
    }
}

/// Sorted, comma-separated list of valid snapshot types.
pub(crate) fn snapshot_type_list() -> String {
    let mut names: Vec<&str> = SnapshotType::ALL.iter().map(|t| t.as_str()).collect();
    names.sort_unstable();
    names.join(", ")
}

fn is_project_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validate a project identifier.
///
/// Rules, checked after trimming:
/// - 3-64 characters from `[A-Za-z0-9_-]`
/// - must not start with `-` or `.`
/// - must not be a reserved device name (case-insensitive)
///
/// # Errors
///
/// Returns a format-kind [`ValidationError`] naming the violated rule.
///
/// # Examples
///
/// ```
/// use snap_staging::security::validate_project_id;
///
/// assert_eq!(validate_project_id(" abc ").unwrap().as_str(), "abc");
/// assert!(validate_project_id("ab").is_err());
/// assert!(validate_project_id("-abc").is_err());
/// assert!(validate_project_id("NUL").is_err());
/// ```
pub fn validate_project_id(raw: &str) -> Result<ProjectId, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "project_id",
        });
    }

    let value = raw.trim();

    if !(PROJECT_ID_MIN_LEN..=PROJECT_ID_MAX_LEN).contains(&value.len())
        || !value.chars().all(is_project_id_char)
    {
        return Err(ValidationError::ProjectIdFormat {
            value: value.to_string(),
        });
    }

    if value.starts_with(['-', '.']) {
        return Err(ValidationError::ProjectIdLeadingChar {
            value: value.to_string(),
        });
    }

    if is_reserved_device_name(value) {
        return Err(ValidationError::ReservedProjectId {
            value: value.to_string(),
        });
    }

    Ok(ProjectId(value.to_string()))
}

/// Validate a vendor identifier: 1-64 characters after trimming.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] for empty input and
/// [`ValidationError::VendorIdLength`] when the trimmed length is out of range.
pub fn validate_vendor_id(raw: &str) -> Result<VendorId, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Required { field: "vendor_id" });
    }

    let value = raw.trim();
    let len = value.chars().count();
    if !(1..=VENDOR_ID_MAX_LEN).contains(&len) {
        return Err(ValidationError::VendorIdLength { len });
    }

    Ok(VendorId(value.to_string()))
}

/// Validate a remote repository URL.
///
/// Only `https://github.com/<owner>/<repo>` is accepted; anything after the
/// repository segment (e.g. `/tree/main`) is kept as-is.
///
/// # Errors
///
/// Returns [`ValidationError::RepoUrlHost`] for any other scheme or host and
/// [`ValidationError::RepoUrlSegments`] when owner or repo is missing.
///
/// # Examples
///
/// ```
/// use snap_staging::security::validate_repo_url;
///
/// let url = validate_repo_url("https://github.com/o/r").unwrap();
/// assert_eq!((url.owner(), url.repo()), ("o", "r"));
///
/// assert!(validate_repo_url("http://github.com/o/r").is_err());
/// assert!(validate_repo_url("https://github.com/o").is_err());
/// ```
pub fn validate_repo_url(raw: &str) -> Result<RepoUrl, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Required { field: "repo_url" });
    }

    let url = raw.trim();

    let Some(rest) = url.strip_prefix(GITHUB_URL_PREFIX) else {
        warn!(
            security_event = "untrusted_repo_host",
            repo_url = %url,
            "Blocked repository URL outside the trusted host"
        );
        return Err(ValidationError::RepoUrlHost);
    };

    let mut segments = rest.trim_end_matches('/').split('/');
    let (Some(owner), Some(repo)) = (segments.next(), segments.next()) else {
        return Err(ValidationError::RepoUrlSegments);
    };
    if owner.is_empty() || repo.is_empty() {
        return Err(ValidationError::RepoUrlSegments);
    }

    Ok(RepoUrl {
        url: url.to_string(),
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Validate and normalize an analysis category (trimmed, lowercased).
///
/// # Errors
///
/// Returns [`ValidationError::UnknownSnapshotType`] listing the valid values.
///
/// # Examples
///
/// ```
/// use snap_staging::security::{SnapshotType, validate_snapshot_type};
///
/// assert_eq!(validate_snapshot_type("Security").unwrap(), SnapshotType::Security);
/// assert!(validate_snapshot_type("bogus").is_err());
/// ```
pub fn validate_snapshot_type(raw: &str) -> Result<SnapshotType, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "snapshot_type",
        });
    }

    let value = raw.trim().to_lowercase();

    SnapshotType::ALL
        .into_iter()
        .find(|t| t.as_str() == value)
        .ok_or(ValidationError::UnknownSnapshotType { value })
}
