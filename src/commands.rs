//! Host commands that drive the FTP subsystem.

use anyhow::{Context, Result};
use shapecam_ftp::{FtpConnectionConfig, FtpUploadService, UploadOutcome};
use std::path::Path;
use tracing::{error, info};

/// Initialize against the configured server and upload one file.
/// Returns the outcome with the number of bytes read from disk.
///
/// A failed initialization is reported through the same outcome as a
/// failed upload.
pub async fn upload_file(
    config: &FtpConnectionConfig,
    remote_path: &str,
    local_file: &Path,
) -> Result<(UploadOutcome, usize)> {
    let data = tokio::fs::read(local_file)
        .await
        .with_context(|| format!("Failed to read {}", local_file.display()))?;
    Ok((upload_bytes(config, remote_path, &data).await, data.len()))
}

pub async fn upload_bytes(
    config: &FtpConnectionConfig,
    remote_path: &str,
    data: &[u8],
) -> UploadOutcome {
    let service = FtpUploadService::new();
    if let Err(e) = service.initialize(config).await {
        error!(target: "shapecam", "FTP initialization failed: {}", e);
        return e.outcome();
    }
    service.upload(remote_path, data).await
}

/// Only resolve and probe the server.
pub async fn check(config: &FtpConnectionConfig) -> UploadOutcome {
    let service = FtpUploadService::new();
    match service.initialize(config).await {
        Ok(()) => {
            info!(target: "shapecam", "FTP server {}:{} is reachable", config.host, config.port);
            UploadOutcome::Success
        }
        Err(e) => {
            error!(target: "shapecam", "{}", e);
            e.outcome()
        }
    }
}
