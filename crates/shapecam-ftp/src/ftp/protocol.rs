//! Control channel (RFC 959 §4) for a single upload.
//!
//! Handles:
//! - Opening a fresh connection to the cached control address
//! - Sending commands terminated with `\r\n`
//! - Bounded polling for replies (see [`ReplyPolicy`])
//! - QUIT-then-close teardown

use crate::ftp::cache::ConnectionInfo;
use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::resolver;
use crate::ftp::types::{FtpResponse, ReplyPolicy, PASSWORD_MASK};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Bytes read per poll attempt.
const REPLY_BUFFER: usize = 1024;

pub struct ControlChannel {
    stream: TcpStream,
    policy: ReplyPolicy,
    verbose: bool,
}

impl ControlChannel {
    /// Open a control connection to the cached address (no resolution).
    pub async fn connect(info: &ConnectionInfo) -> FtpResult<Self> {
        let stream = resolver::connect_one(info.addr, info.connect_timeout)
            .await
            .map_err(|e| {
                error!(target: "ftp", "Failed to connect to the FTP server at {}", info.addr);
                FtpError::connect_failed(format!("control connect to {}: {}", info.addr, e))
            })?;
        Ok(Self::from_stream(stream, info.reply_policy, info.verbose))
    }

    pub fn from_stream(stream: TcpStream, policy: ReplyPolicy, verbose: bool) -> Self {
        Self {
            stream,
            policy,
            verbose,
        }
    }

    /// Send `<verb> <argument>\r\n` (or `<verb>\r\n`).
    ///
    /// When `verbose` is set the line is logged, with any PASS argument
    /// masked.
    pub async fn send_command(
        &mut self,
        verb: &str,
        argument: Option<&str>,
        verbose: bool,
    ) -> FtpResult<()> {
        let line = format_command(verb, argument)?;

        self.stream.write_all(line.as_bytes()).await.map_err(|e| {
            error!(target: "ftp", "Failed to send a command");
            FtpError::send_failed(format!("{}: {}", verb, e))
        })?;

        if verbose {
            info!(target: "ftp", "FTP< {}", loggable_command(verb, argument));
        }
        Ok(())
    }

    /// Wait for the next reply chunk.
    ///
    /// `Ok(None)` means the polling window ran out (or the server hung
    /// up); it is logged and only becomes an error under a strict policy.
    pub async fn receive_response(&mut self) -> FtpResult<Option<FtpResponse>> {
        match self.poll_reply().await {
            Some(resp) => Ok(Some(resp)),
            None if self.policy.strict => Err(FtpError::response_timeout(format!(
                "no reply within {:?}",
                self.policy.window()
            ))),
            None => Ok(None),
        }
    }

    /// Like [`receive_response`](Self::receive_response) but an empty
    /// window is always an error.
    pub async fn expect_reply(&mut self) -> FtpResult<FtpResponse> {
        self.poll_reply().await.ok_or_else(|| {
            FtpError::response_timeout(format!("no reply within {:?}", self.policy.window()))
        })
    }

    async fn poll_reply(&mut self) -> Option<FtpResponse> {
        let mut buf = [0u8; REPLY_BUFFER];

        for _ in 0..self.policy.attempts {
            match timeout(self.policy.interval, self.stream.read(&mut buf)).await {
                Err(_) => continue,
                Ok(Ok(0)) => {
                    warn!(target: "ftp", "Control connection closed by server");
                    return None;
                }
                Ok(Ok(n)) => {
                    let chunk = String::from_utf8_lossy(&buf[..n]);
                    let resp = FtpResponse::from_chunk(&chunk);
                    if self.verbose {
                        info!(target: "ftp", "FTP> {}", resp.text());
                    } else {
                        debug!(target: "ftp", "FTP> {}", resp.text());
                    }
                    return Some(resp);
                }
                Ok(Err(e)) => {
                    warn!(target: "ftp", "Control channel read failed: {}", e);
                    return None;
                }
            }
        }

        warn!(
            target: "ftp",
            "Resource temporarily unavailable (no reply within {:?})",
            self.policy.window()
        );
        None
    }

    /// Send QUIT, optionally read the goodbye, then close the socket.
    ///
    /// Never fails; the socket is released whatever happened before.
    pub async fn close(mut self, drain: bool) {
        let verbose = self.verbose;
        if let Err(e) = self.send_command("QUIT", None, verbose).await {
            warn!(target: "ftp", "QUIT not delivered: {}", e);
        }
        if drain {
            let _ = self.poll_reply().await;
        }
        self.stream.shutdown().await.ok();
    }
}

/// Build the wire line for a command.
pub fn format_command(verb: &str, argument: Option<&str>) -> FtpResult<String> {
    if verb.is_empty() {
        error!(target: "ftp", "Command is not provided");
        return Err(FtpError::command_missing());
    }
    if let Some(arg) = argument {
        if arg.contains(|c| c == '\r' || c == '\n') {
            return Err(FtpError::invalid_config(format!(
                "{} argument contains a line break",
                verb
            )));
        }
    }
    Ok(match argument {
        Some(arg) => format!("{} {}\r\n", verb, arg),
        None => format!("{}\r\n", verb),
    })
}

/// Diagnostic form of a command line (no CRLF, PASS argument masked).
pub fn loggable_command(verb: &str, argument: Option<&str>) -> String {
    match argument {
        Some(_) if verb.eq_ignore_ascii_case("PASS") => format!("{} {}", verb, PASSWORD_MASK),
        Some(arg) => format!("{} {}", verb, arg),
        None => verb.to_string(),
    }
}
