//! Upload orchestrator: one STOR per call.
//!
//! Sequence: connect → greeting → USER → PASS → TYPE I → PASV →
//! data connect → STOR → payload → close data → completion reply →
//! QUIT/close control.
//!
//! Once the control connection is open it always receives QUIT before
//! being closed. The data connection, when opened, is closed before the
//! control connection.

use crate::ftp::cache::ConnectionInfo;
use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::passive;
use crate::ftp::protocol::ControlChannel;
use crate::ftp::transfer::DataChannel;
use crate::ftp::types::{FtpConnectionConfig, FtpResponse, UploadOutcome, UploadReport};
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Client context: the resolved control server plus credentials.
///
/// Built once by [`FtpUploader::initialize`]; uploads only read it, so
/// several may run at once on their own sockets.
#[derive(Debug, Clone)]
pub struct FtpUploader {
    info: ConnectionInfo,
}

impl FtpUploader {
    pub async fn initialize(config: &FtpConnectionConfig) -> FtpResult<Self> {
        Ok(Self::from_info(ConnectionInfo::initialize(config).await?))
    }

    pub fn from_info(info: ConnectionInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// Upload `data` to `remote_path` and collapse the result into an
    /// [`UploadOutcome`].
    pub async fn upload(&self, remote_path: &str, data: &[u8]) -> UploadOutcome {
        match self.try_upload(remote_path, data).await {
            Ok(report) => {
                info!(
                    target: "ftp",
                    "uploaded {} bytes to {} in {} ms",
                    report.bytes_sent, report.remote_path, report.elapsed_ms
                );
                UploadOutcome::Success
            }
            Err(e) => {
                error!(target: "ftp", "upload to {} failed: {}", remote_path, e);
                e.outcome()
            }
        }
    }

    /// Same as [`upload`](Self::upload) but keeps the error detail.
    pub async fn try_upload(&self, remote_path: &str, data: &[u8]) -> FtpResult<UploadReport> {
        if remote_path.is_empty() {
            return Err(FtpError::invalid_config("Remote path must not be empty"));
        }

        let upload_id = Uuid::new_v4().to_string();
        let span = info_span!("ftp_upload", upload_id = %upload_id, path = %remote_path);
        let started = Instant::now();

        let bytes_sent = async {
            let mut ctrl = ControlChannel::connect(&self.info).await?;
            let result = self.exchange(&mut ctrl, remote_path, data).await;
            ctrl.close(true).await;
            result
        }
        .instrument(span)
        .await?;

        Ok(UploadReport {
            upload_id,
            remote_path: remote_path.to_string(),
            bytes_sent,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Everything between opening and closing the control connection.
    async fn exchange(
        &self,
        ctrl: &mut ControlChannel,
        remote_path: &str,
        data: &[u8],
    ) -> FtpResult<u64> {
        let verbose = self.info.verbose;

        check_reply("greeting", ctrl.receive_response().await?)?;

        ctrl.send_command("USER", Some(&self.info.username), verbose).await?;
        check_reply("USER", ctrl.receive_response().await?)?;
        ctrl.send_command("PASS", Some(&self.info.password), verbose).await?;
        check_reply("PASS", ctrl.receive_response().await?)?;

        ctrl.send_command("TYPE", Some("I"), verbose).await?;
        check_reply("TYPE", ctrl.receive_response().await?)?;

        ctrl.send_command("PASV", None, verbose).await?;
        let reply = ctrl.expect_reply().await.map_err(|_| {
            error!(target: "ftp", "Didn't receive PASV IP/PORT");
            FtpError::marker_not_found("no reply to PASV")
        })?;
        let endpoint = passive::parse(&reply.text(), &self.info.host).map_err(|e| {
            error!(target: "ftp", "Failed to parse PASV IP/PORT: {}", e);
            e
        })?;

        let mut data_ch =
            DataChannel::open(&endpoint, Some(self.info.family), self.info.connect_timeout)
                .await?;
        let stored = self.store(ctrl, &mut data_ch, remote_path, data).await;
        data_ch.close().await;
        let bytes_sent = stored?;

        check_reply("STOR", ctrl.receive_response().await?)?;
        Ok(bytes_sent)
    }

    async fn store(
        &self,
        ctrl: &mut ControlChannel,
        data_ch: &mut DataChannel,
        remote_path: &str,
        data: &[u8],
    ) -> FtpResult<u64> {
        ctrl.send_command("STOR", Some(remote_path), self.info.verbose).await?;
        check_reply("STOR", ctrl.receive_response().await?)?;
        data_ch.send(data).await?;
        Ok(data_ch.bytes_sent())
    }
}

/// Reject a reply whose final code is 4xx/5xx. A missing reply passes.
fn check_reply(context: &str, resp: Option<FtpResponse>) -> FtpResult<Option<FtpResponse>> {
    match resp {
        Some(r) if r.is_failure() => Err(FtpError::command_rejected(
            r.code().unwrap_or_default(),
            format!("{} rejected: {}", context, r.text()),
        )),
        other => Ok(other),
    }
}
