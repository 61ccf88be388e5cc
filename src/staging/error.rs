//! Staging operation errors.
//!
//! Wraps guard rejections and adds the failures specific to staging
//! operations: upload content problems and the I/O of the actual write,
//! listing, and removal.

use serde_json::{Value, json};
use tracing::{error, warn};

use crate::audit::{AuditEvent, log_audit_event};
use crate::security::{ErrorKind, ValidationError};

/// Result type for staging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Staging operation errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Identifier, filename, or path rejected by the guard.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid encoding: {encoding}. Use 'utf-8' or 'base64'")]
    InvalidEncoding { encoding: String },

    #[error("Invalid base64 content: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("File too large: {size} bytes. Max: {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// Analysis requested for a project with nothing staged.
    #[error("No files in staging area for {project_id}. Upload files first")]
    EmptyStaging { project_id: String },

    /// IO error with context. The context never includes the staging root.
    #[error("Failed to {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Blocking task panicked or was cancelled.
    #[error("staging task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Guard classification, or `None` for operational failures.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Validation(e) => Some(e.kind()),
            Self::InvalidEncoding { .. } | Self::InvalidBase64(_) | Self::FileTooLarge { .. } => {
                Some(ErrorKind::Format)
            },
            Self::EmptyStaging { .. } | Self::Io { .. } | Self::Join(_) => None,
        }
    }

    /// Stable error code: `validation_error`, `security_error`, or `tool_error`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind().map_or("tool_error", ErrorKind::code)
    }

    #[must_use]
    pub fn is_security(&self) -> bool {
        self.kind() == Some(ErrorKind::Security)
    }

    /// Error body returned to callers.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": self.code(),
            "message": self.to_string(),
        })
    }

    /// Logs the failure of `operation` at a severity matching its kind.
    ///
    /// Security rejections are also written to the audit log.
    pub fn log(&self, operation: &'static str) {
        match self.kind() {
            Some(ErrorKind::Format) => {
                warn!(operation, error = %self, "Validation error");
            },
            Some(ErrorKind::Security) => {
                error!(operation, error = %self, "Security error");
                log_audit_event(AuditEvent::RequestRejected {
                    operation,
                    reason: self.to_string(),
                });
            },
            None => {
                error!(operation, error = %self, "Tool error");
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let format: Error = ValidationError::EmptyFilename.into();
        assert_eq!(format.code(), "validation_error");

        let security: Error = ValidationError::Unresolvable.into();
        assert_eq!(security.code(), "security_error");
        assert!(security.is_security());

        let tool = Error::io("write file", std::io::Error::other("disk full"));
        assert_eq!(tool.code(), "tool_error");
        assert_eq!(tool.kind(), None);

        let empty = Error::EmptyStaging {
            project_id: "proj".into(),
        };
        assert_eq!(empty.code(), "tool_error");

        let too_large = Error::FileTooLarge { size: 10, max: 5 };
        assert_eq!(too_large.code(), "validation_error");
    }

    #[test]
    fn test_to_json() {
        let err: Error = ValidationError::PathTraversal {
            filename: "x".into(),
        }
        .into();
        let body = err.to_json();
        assert_eq!(body["error"], "security_error");
        assert_eq!(
            body["message"],
            "Path traversal detected: \"x\" escapes staging directory"
        );
    }

    #[test]
    fn test_transparent_message() {
        let err: Error = ValidationError::RepoUrlHost.into();
        assert_eq!(err.to_string(), ValidationError::RepoUrlHost.to_string());
    }
}
