//! Resolved control-server parameters, captured once at initialization.
//!
//! Uploads reconnect to `addr` directly instead of resolving the host
//! again. Host and credentials are owned copies of the caller's config.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::resolver;
use crate::ftp::types::{
    AddressFamily, FtpConnectionConfig, ReplyPolicy, ResolvedAddr, PASSWORD_MASK,
};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Clone)]
pub struct ConnectionInfo {
    pub family: AddressFamily,
    pub addr: SocketAddr,
    /// Control host exactly as configured (used by PASV reconstruction).
    pub host: String,
    pub username: String,
    pub password: String,
    pub connect_timeout: Option<Duration>,
    pub reply_policy: ReplyPolicy,
    pub verbose: bool,
}

impl ConnectionInfo {
    /// Resolve and test-connect the control server, then record the
    /// winning candidate.
    ///
    /// The validation connection is shut down without a QUIT; it never
    /// carried a protocol session.
    pub async fn initialize(config: &FtpConnectionConfig) -> FtpResult<Self> {
        if config.reply_poll_attempts == 0 {
            return Err(FtpError::invalid_config("replyPollAttempts must be at least 1"));
        }

        let (mut probe, resolved) = resolver::connect_first(
            &config.host,
            config.port,
            None,
            config.connect_timeout(),
        )
        .await?;
        probe.shutdown().await.ok();
        drop(probe);

        let info = Self::from_resolved(config, resolved);
        info!(target: "ftp", "FTP client initialized ({} -> {})", info.host, info.addr);
        Ok(info)
    }

    /// Build the cache entry from an already-validated candidate.
    pub fn from_resolved(config: &FtpConnectionConfig, resolved: ResolvedAddr) -> Self {
        Self {
            family: resolved.family,
            addr: resolved.addr,
            host: config.host.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            connect_timeout: config.connect_timeout(),
            reply_policy: config.reply_policy(),
            verbose: config.verbose,
        }
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("family", &self.family)
            .field("addr", &self.addr)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &PASSWORD_MASK)
            .field("connect_timeout", &self.connect_timeout)
            .field("reply_policy", &self.reply_policy)
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ftp::error::FtpErrorKind;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn config(host: &str, port: u16, user: &str, pass: &str) -> FtpConnectionConfig {
        FtpConnectionConfig {
            host: host.into(),
            port,
            username: user.into(),
            password: pass.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn initialize_records_resolved_candidate() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let info = ConnectionInfo::initialize(&config("127.0.0.1", addr.port(), "cam", "pw"))
            .await
            .unwrap();
        assert_eq!(info.addr, addr);
        assert_eq!(info.family, AddressFamily::Inet);
        assert_eq!(info.host, "127.0.0.1");
        assert_eq!(info.username, "cam");
    }

    #[tokio::test]
    async fn empty_host_is_a_resolution_failure() {
        let err = ConnectionInfo::initialize(&config("", 21, "u", "p")).await.unwrap_err();
        assert_eq!(err.kind, FtpErrorKind::ResolutionFailed);
        assert_eq!(err.outcome(), crate::ftp::types::UploadOutcome::ServerUnreachable);
    }

    #[tokio::test]
    async fn zero_poll_attempts_is_invalid() {
        let mut cfg = config("127.0.0.1", 21, "u", "p");
        cfg.reply_poll_attempts = 0;
        let err = ConnectionInfo::initialize(&cfg).await.unwrap_err();
        assert_eq!(err.kind, FtpErrorKind::InvalidConfig);
    }

    #[tokio::test]
    async fn validation_connection_carries_no_commands() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        ConnectionInfo::initialize(&config("127.0.0.1", port, "cam", "pw")).await.unwrap();

        let (mut validation, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        validation.read_to_end(&mut received).await.unwrap();
        assert!(received.is_empty(), "got {:?}", String::from_utf8_lossy(&received));
    }

    #[tokio::test]
    async fn initialize_fails_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = ConnectionInfo::initialize(&config("127.0.0.1", port, "u", "p"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FtpErrorKind::NoReachableCandidate);
    }

    #[test]
    fn debug_output_masks_password() {
        let resolved = ResolvedAddr::from("127.0.0.1:21".parse::<SocketAddr>().unwrap());
        let info = ConnectionInfo::from_resolved(&config("h", 21, "u", "hunter2"), resolved);
        let dbg = format!("{:?}", info);
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("********"));
    }
}
