//! FTP-specific error type.

use crate::ftp::types::UploadOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorised FTP error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpError {
    pub kind: FtpErrorKind,
    pub message: String,
    /// FTP reply code that triggered the error, if any.
    pub code: Option<u16>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FtpErrorKind {
    /// Host/port could not be resolved to any address.
    ResolutionFailed,
    /// Resolution worked but no candidate accepted a TCP connection.
    NoReachableCandidate,
    /// The control connection to the cached address failed.
    ConnectFailed,
    /// The passive data endpoint could not be connected.
    DataChannelFailed,
    /// Upload requested before the client was initialized.
    NotInitialized,
    /// A command was issued with an empty verb.
    CommandMissing,
    /// Writing a command or the payload failed.
    SendFailed,
    /// Server answered a command with a 4xx/5xx reply.
    CommandRejected,
    /// The `227` reply does not match a known address encoding.
    UnrecognizedPassiveFormat,
    /// No `227 Entering Passive Mode (` reply was received.
    MarkerNotFound,
    /// No reply arrived within the polling window (strict mode only).
    ResponseTimeout,
    /// Config / parameter validation error.
    InvalidConfig,
}

pub type FtpResult<T> = Result<T, FtpError>;

// ── Construction helpers ─────────────────────────────────────────────

impl FtpError {
    pub fn new(kind: FtpErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn resolution_failed(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::ResolutionFailed, msg)
    }

    pub fn no_reachable_candidate(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::NoReachableCandidate, msg)
    }

    pub fn connect_failed(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::ConnectFailed, msg)
    }

    pub fn data_channel(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::DataChannelFailed, msg)
    }

    pub fn not_initialized() -> Self {
        Self::new(
            FtpErrorKind::NotInitialized,
            "FTP client has not been initialized",
        )
    }

    pub fn command_missing() -> Self {
        Self::new(FtpErrorKind::CommandMissing, "Command is not provided")
    }

    pub fn send_failed(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::SendFailed, msg)
    }

    pub fn command_rejected(code: u16, msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::CommandRejected, msg).with_code(code)
    }

    pub fn unrecognized_passive(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::UnrecognizedPassiveFormat, msg)
    }

    pub fn marker_not_found(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::MarkerNotFound, msg)
    }

    pub fn response_timeout(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::ResponseTimeout, msg)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::InvalidConfig, msg)
    }

    /// Whether the failure means the control server was never reached.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self.kind,
            FtpErrorKind::ResolutionFailed
                | FtpErrorKind::NoReachableCandidate
                | FtpErrorKind::ConnectFailed
                | FtpErrorKind::NotInitialized
        )
    }

    pub fn outcome(&self) -> UploadOutcome {
        if self.is_unreachable() {
            UploadOutcome::ServerUnreachable
        } else {
            UploadOutcome::ProtocolFailure
        }
    }
}

impl fmt::Display for FtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "[FTP {:?} {}] {}", self.kind, code, self.message)
        } else {
            write!(f, "[FTP {:?}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for FtpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_kinds_map_to_unreachable() {
        for err in [
            FtpError::resolution_failed("x"),
            FtpError::no_reachable_candidate("x"),
            FtpError::connect_failed("x"),
            FtpError::not_initialized(),
        ] {
            assert_eq!(err.outcome(), UploadOutcome::ServerUnreachable, "{}", err);
        }
    }

    #[test]
    fn in_protocol_kinds_map_to_protocol_failure() {
        for err in [
            FtpError::data_channel("x"),
            FtpError::command_missing(),
            FtpError::send_failed("x"),
            FtpError::command_rejected(550, "x"),
            FtpError::unrecognized_passive("x"),
            FtpError::marker_not_found("x"),
            FtpError::response_timeout("x"),
        ] {
            assert_eq!(err.outcome(), UploadOutcome::ProtocolFailure, "{}", err);
        }
    }

    #[test]
    fn display_includes_reply_code() {
        let err = FtpError::command_rejected(553, "Could not create file");
        assert_eq!(
            err.to_string(),
            "[FTP CommandRejected 553] Could not create file"
        );
        assert_eq!(
            FtpError::command_missing().to_string(),
            "[FTP CommandMissing] Command is not provided"
        );
    }
}
