//! Shared types for the FTP crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

// ─── Configuration ───────────────────────────────────────────────────

/// Stands in for a password in diagnostics, whatever its length.
pub const PASSWORD_MASK: &str = "********";

/// Configuration for the upload client's control server.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtpConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// TCP connect timeout in seconds (0 = platform default).
    #[serde(default)]
    pub connect_timeout_sec: u64,
    /// How many non-blocking reads to attempt while waiting for a reply.
    #[serde(default = "default_poll_attempts")]
    pub reply_poll_attempts: u32,
    /// Delay between two reply reads, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub reply_poll_interval_ms: u64,
    /// Treat an exhausted reply window as an error instead of a warning.
    #[serde(default)]
    pub strict_replies: bool,
    /// Log every command and reply exchanged on the control channel.
    #[serde(default = "default_true")]
    pub verbose: bool,
}

fn default_port() -> u16 {
    21
}
fn default_poll_attempts() -> u32 {
    50
}
fn default_poll_interval() -> u64 {
    100
}
fn default_true() -> bool {
    true
}

impl Default for FtpConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: "anonymous".into(),
            password: "anonymous@".into(),
            connect_timeout_sec: 0,
            reply_poll_attempts: default_poll_attempts(),
            reply_poll_interval_ms: default_poll_interval(),
            strict_replies: false,
            verbose: true,
        }
    }
}

impl fmt::Debug for FtpConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &PASSWORD_MASK)
            .field("connect_timeout_sec", &self.connect_timeout_sec)
            .field("reply_poll_attempts", &self.reply_poll_attempts)
            .field("reply_poll_interval_ms", &self.reply_poll_interval_ms)
            .field("strict_replies", &self.strict_replies)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl FtpConnectionConfig {
    /// `None` leaves the connect timeout to the operating system.
    pub fn connect_timeout(&self) -> Option<Duration> {
        match self.connect_timeout_sec {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn reply_policy(&self) -> ReplyPolicy {
        ReplyPolicy {
            attempts: self.reply_poll_attempts,
            interval: Duration::from_millis(self.reply_poll_interval_ms),
            strict: self.strict_replies,
        }
    }
}

/// Bounded polling used while waiting for a control-channel reply.
///
/// The full window is `attempts × interval`. With `strict` unset an
/// exhausted window is only logged and the exchange carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyPolicy {
    pub attempts: u32,
    pub interval: Duration,
    pub strict: bool,
}

impl Default for ReplyPolicy {
    fn default() -> Self {
        Self {
            attempts: default_poll_attempts(),
            interval: Duration::from_millis(default_poll_interval()),
            strict: false,
        }
    }
}

impl ReplyPolicy {
    /// A short window for tests and loopback servers.
    pub fn fast() -> Self {
        Self {
            attempts: 20,
            interval: Duration::from_millis(10),
            strict: false,
        }
    }

    pub fn window(&self) -> Duration {
        self.interval * self.attempts
    }
}

// ─── Addresses ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AddressFamily {
    Inet,
    Inet6,
}

impl AddressFamily {
    pub fn of(addr: &SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(_) => Self::Inet,
            SocketAddr::V6(_) => Self::Inet6,
        }
    }
}

/// A resolver candidate that accepted a TCP connection.
///
/// Socket type and protocol are always stream/TCP here, so only the
/// family and the raw address are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAddr {
    pub family: AddressFamily,
    pub addr: SocketAddr,
}

impl From<SocketAddr> for ResolvedAddr {
    fn from(addr: SocketAddr) -> Self {
        Self {
            family: AddressFamily::of(&addr),
            addr,
        }
    }
}

/// Data-connection endpoint announced by a `227` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassiveEndpoint {
    pub ip: String,
    pub port: u16,
}

impl PassiveEndpoint {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self { ip: ip.into(), port }
    }
}

impl fmt::Display for PassiveEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => write!(f, "[{}]:{}", self.ip, self.port),
            _ => write!(f, "{}:{}", self.ip, self.port),
        }
    }
}

// ─── FTP Response ────────────────────────────────────────────────────

/// Text received in one read from the control channel.
///
/// A lagging server may deliver several replies in one chunk, so this
/// keeps every line rather than a single reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtpResponse {
    pub lines: Vec<String>,
}

impl FtpResponse {
    pub fn from_chunk(chunk: &str) -> Self {
        Self {
            lines: chunk
                .split('\n')
                .map(|l| l.trim_end_matches('\r'))
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Full response text (all lines joined).
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Reply code of the last final line (`NNN text`), if any.
    ///
    /// Continuation lines of a multi-line reply (`NNN-text`) are skipped.
    pub fn code(&self) -> Option<u16> {
        self.lines.iter().rev().find_map(|l| {
            let b = l.as_bytes();
            if b.len() >= 3
                && b[..3].iter().all(u8::is_ascii_digit)
                && (b.len() == 3 || b[3] == b' ')
            {
                l[..3].parse().ok()
            } else {
                None
            }
        })
    }

    /// Whether the last final reply is a transient or permanent failure.
    pub fn is_failure(&self) -> bool {
        matches!(self.code(), Some(c) if c >= 400)
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────

/// Result of one upload as seen by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UploadOutcome {
    Success,
    /// The control connection could not be established.
    ServerUnreachable,
    /// Any command, parse, or send step failed after connecting.
    ProtocolFailure,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }
}

/// Details of a completed upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub upload_id: String,
    pub remote_path: String,
    pub bytes_sent: u64,
    pub elapsed_ms: u64,
}
