//! Single-use passive data channel.
//!
//! Opened against the endpoint announced by `227`, carries the raw
//! payload, then is closed by the caller on every path.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::resolver;
use crate::ftp::types::{AddressFamily, PassiveEndpoint};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, error};

pub struct DataChannel {
    stream: TcpStream,
    endpoint: PassiveEndpoint,
    bytes_sent: u64,
}

impl DataChannel {
    /// Resolve the endpoint afresh and connect to the first candidate.
    pub async fn open(
        endpoint: &PassiveEndpoint,
        family: Option<AddressFamily>,
        connect_timeout: Option<Duration>,
    ) -> FtpResult<Self> {
        let (stream, resolved) =
            resolver::connect_first(&endpoint.ip, endpoint.port, family, connect_timeout)
                .await
                .map_err(|e| {
                    FtpError::data_channel(format!(
                        "PASV data connect to {}: {}",
                        endpoint, e.message
                    ))
                })?;
        debug!(target: "ftp", "data channel open to {}", resolved.addr);
        Ok(Self {
            stream,
            endpoint: endpoint.clone(),
            bytes_sent: 0,
        })
    }

    /// Write the whole payload; short writes are retried internally.
    pub async fn send(&mut self, data: &[u8]) -> FtpResult<()> {
        let mut result = self.stream.write_all(data).await;
        if result.is_ok() {
            result = self.stream.flush().await;
        }

        result.map_err(|e| {
            error!(target: "ftp", "Failed in sending data to {}", self.endpoint);
            FtpError::send_failed(format!("data channel {}: {}", self.endpoint, e))
        })?;
        self.bytes_sent += data.len() as u64;
        Ok(())
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Shut the connection down; the peer sees end-of-file.
    pub async fn close(mut self) {
        self.stream.shutdown().await.ok();
    }
}
