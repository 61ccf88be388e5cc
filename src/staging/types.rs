//! Result types returned by staging operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::security::{ProjectId, RelativeFilename};

/// One file found in a project's staging directory.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StagedFile {
    /// Path relative to the project staging directory, `/`-separated.
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Listing of a project's staging directory.
#[derive(Debug, Clone, Serialize)]
pub struct StagingInfo {
    pub status: &'static str,
    pub project_id: ProjectId,
    /// Display location (`staging/<project>`); never the absolute path.
    pub staging_path: String,
    pub files: Vec<StagedFile>,
    pub file_count: usize,
    pub total_size_bytes: u64,
}

/// Confirmation of a completed upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub status: &'static str,
    pub project_id: ProjectId,
    pub filename: RelativeFilename,
    /// Display location (`staging/<project>/<filename>`).
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearReport {
    pub status: &'static str,
    pub project_id: ProjectId,
    pub files_deleted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteReport {
    pub status: &'static str,
    pub project_id: ProjectId,
    /// False when the project had no staging directory.
    pub removed: bool,
}
