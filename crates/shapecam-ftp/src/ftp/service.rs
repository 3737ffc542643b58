//! Shared entry point for callers that initialize and upload from
//! different tasks.
//!
//! Initialization holds the write lock for its whole duration, so an
//! upload never observes a half-built context. Uploads take a snapshot
//! of the current [`FtpUploader`] and release the lock before any I/O.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::types::{FtpConnectionConfig, UploadOutcome, UploadReport};
use crate::ftp::upload::FtpUploader;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

pub type FtpUploadServiceState = Arc<FtpUploadService>;

#[derive(Default)]
pub struct FtpUploadService {
    current: RwLock<Option<Arc<FtpUploader>>>,
}

impl FtpUploadService {
    pub fn new() -> FtpUploadServiceState {
        Arc::new(Self::default())
    }

    /// Validate the server and replace the whole context.
    ///
    /// On failure the previous context, if any, stays in place.
    pub async fn initialize(&self, config: &FtpConnectionConfig) -> FtpResult<()> {
        let mut slot = self.current.write().await;
        let uploader = FtpUploader::initialize(config).await?;
        *slot = Some(Arc::new(uploader));
        Ok(())
    }

    pub async fn current(&self) -> Option<Arc<FtpUploader>> {
        self.current.read().await.clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub async fn upload(&self, remote_path: &str, data: &[u8]) -> UploadOutcome {
        match self.current().await {
            Some(uploader) => uploader.upload(remote_path, data).await,
            None => {
                warn!(target: "ftp", "upload to {} requested before initialization", remote_path);
                UploadOutcome::ServerUnreachable
            }
        }
    }

    pub async fn try_upload(&self, remote_path: &str, data: &[u8]) -> FtpResult<UploadReport> {
        let uploader = self.current().await.ok_or_else(FtpError::not_initialized)?;
        uploader.try_upload(remote_path, data).await
    }
}
