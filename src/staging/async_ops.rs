//! Async wrappers for staging operations.
//!
//! These methods wrap the synchronous operations in `spawn_blocking` to
//! avoid blocking the async runtime. Use these when calling from async
//! contexts (request handlers, etc.).

use super::StagingArea;
use super::error::Result;
use super::types::{ClearReport, DeleteReport, StagingInfo, UploadReceipt};

impl StagingArea {
    /// Async version of [`upload`](Self::upload).
    pub async fn upload_async(
        &self,
        project_id: String,
        filename: String,
        content: String,
        encoding: String,
    ) -> Result<UploadReceipt> {
        let area = self.clone();
        tokio::task::spawn_blocking(move || {
            area.upload(&project_id, &filename, &content, &encoding)
        })
        .await?
    }

    /// Async version of [`info`](Self::info).
    pub async fn info_async(&self, project_id: String) -> Result<StagingInfo> {
        let area = self.clone();
        tokio::task::spawn_blocking(move || area.info(&project_id)).await?
    }

    /// Async version of [`clear`](Self::clear).
    pub async fn clear_async(&self, project_id: String) -> Result<ClearReport> {
        let area = self.clone();
        tokio::task::spawn_blocking(move || area.clear(&project_id)).await?
    }

    /// Async version of [`delete`](Self::delete).
    pub async fn delete_async(&self, project_id: String) -> Result<DeleteReport> {
        let area = self.clone();
        tokio::task::spawn_blocking(move || area.delete(&project_id)).await?
    }
}
