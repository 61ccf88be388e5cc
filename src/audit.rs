//! Security audit logging for staging events.
//!
//! Provides structured audit logging for staging writes and removals, and for
//! requests rejected as security violations. Events go to the `audit`
//! tracing target so they can be routed separately.

use tracing::{info, warn};

/// Audit events emitted by staging operations and collaborator requests.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// File written to a project's staging directory
    FileStaged {
        project_id: String,
        filename: String,
        encoding: &'static str,
        size: u64,
    },
    /// Project staging directory emptied
    StagingCleared {
        project_id: String,
        files_deleted: usize,
    },
    /// Project staging directory removed on project deletion
    ProjectStagingDeleted { project_id: String, removed: bool },
    /// Remote repository fetch accepted for a vendor
    RepoFetchAccepted {
        project_id: String,
        vendor_id: String,
        repo_url: String,
    },
    /// Request rejected by the guard as a security violation
    RequestRejected {
        operation: &'static str,
        reason: String,
    },
}

/// Log a security audit event with structured fields.
pub fn log_audit_event(event: AuditEvent) {
    match event {
        AuditEvent::FileStaged {
            project_id,
            filename,
            encoding,
            size,
        } => {
            info!(
                target: "audit",
                event_type = "file_staged",
                %project_id,
                %filename,
                encoding,
                size,
                "File staged"
            );
        },
        AuditEvent::StagingCleared {
            project_id,
            files_deleted,
        } => {
            info!(
                target: "audit",
                event_type = "staging_cleared",
                %project_id,
                files_deleted,
                "Staging cleared"
            );
        },
        AuditEvent::ProjectStagingDeleted {
            project_id,
            removed,
        } => {
            info!(
                target: "audit",
                event_type = "project_staging_deleted",
                %project_id,
                removed,
                "Project staging deleted"
            );
        },
        AuditEvent::RepoFetchAccepted {
            project_id,
            vendor_id,
            repo_url,
        } => {
            info!(
                target: "audit",
                event_type = "repo_fetch_accepted",
                %project_id,
                %vendor_id,
                %repo_url,
                "Repository fetch accepted"
            );
        },
        AuditEvent::RequestRejected { operation, reason } => {
            warn!(
                target: "audit",
                event_type = "request_rejected",
                operation,
                %reason,
                "Staging request rejected"
            );
        },
    }
}
