//! Validated requests for the analysis collaborators.
//!
//! The repository fetcher and the snapshot query engine live outside this
//! crate. They only ever receive these values, never raw strings.

use serde::Serialize;

use crate::audit::{AuditEvent, log_audit_event};
use crate::security::{
    ProjectId, RepoUrl, SnapshotType, ValidationError, VendorId, validate_project_id,
    validate_repo_url, validate_snapshot_type, validate_vendor_id,
};

/// Clone-and-analyze request for a remote repository.
#[derive(Debug, Clone, Serialize)]
pub struct RepoFetchRequest {
    pub repo_url: RepoUrl,
    pub project_id: ProjectId,
    pub vendor_id: VendorId,
    /// `None` means the repository's default branch.
    pub branch: Option<String>,
}

impl RepoFetchRequest {
    /// Validates every field of a fetch request.
    ///
    /// A blank branch is treated as absent. A branch starting with `-` is
    /// rejected because the fetcher passes it to `git` as an argument.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`], checking URL, project id,
    /// vendor id, then branch.
    pub fn new(
        repo_url: &str,
        project_id: &str,
        vendor_id: &str,
        branch: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let repo_url = validate_repo_url(repo_url)?;
        let project_id = validate_project_id(project_id)?;
        let vendor_id = validate_vendor_id(vendor_id)?;
        let branch = branch.map(str::trim).filter(|b| !b.is_empty());

        if let Some(branch) = branch
            && (branch.starts_with('-')
                || branch.chars().any(|c| c.is_whitespace() || c.is_control()))
        {
            return Err(ValidationError::InvalidBranch);
        }

        Ok(Self {
            repo_url,
            project_id,
            vendor_id,
            branch: branch.map(str::to_string),
        })
    }

    /// Records the accepted fetch in the audit log, labelled by vendor.
    pub fn audit(&self) {
        log_audit_event(AuditEvent::RepoFetchAccepted {
            project_id: self.project_id.to_string(),
            vendor_id: self.vendor_id.to_string(),
            repo_url: self.repo_url.to_string(),
        });
    }
}

/// Analysis run or notebook request for an already staged project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRequest {
    pub project_id: ProjectId,
    pub vendor_id: VendorId,
}

impl ProjectRequest {
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] from the project or vendor id.
    pub fn new(project_id: &str, vendor_id: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            project_id: validate_project_id(project_id)?,
            vendor_id: validate_vendor_id(vendor_id)?,
        })
    }
}

/// Snapshot query filter.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotQuery {
    pub project_id: ProjectId,
    pub snapshot_type: Option<SnapshotType>,
    /// Matched against stored record paths; never resolved on disk.
    pub file_path: Option<String>,
}

impl SnapshotQuery {
    /// Blank optional filters are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an invalid project id or an unknown
    /// snapshot type.
    pub fn new(
        project_id: &str,
        snapshot_type: Option<&str>,
        file_path: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let project_id = validate_project_id(project_id)?;
        let snapshot_type = snapshot_type
            .filter(|t| !t.trim().is_empty())
            .map(validate_snapshot_type)
            .transpose()?;
        let file_path = file_path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            project_id,
            snapshot_type,
            file_path,
        })
    }
}
