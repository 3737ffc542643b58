//! # shapecam-ftp — one-shot passive-mode FTP uploads
//!
//! Pushes a single in-memory payload to a remote path over plain FTP
//! (RFC 959 subset: USER, PASS, TYPE I, PASV, STOR, QUIT).
//!
//! Architecture:
//! - `types` — config, reply policy, endpoints, outcome
//! - `error` — FTP-specific error type
//! - `resolver` — name resolution + first-reachable TCP connect
//! - `cache` — resolved control-server parameters and credentials
//! - `protocol` — control channel: CRLF commands, polling reply reads
//! - `passive` — 227 reply grammar (IPv4 tuple / IPv6 fragment)
//! - `transfer` — single-use data channel
//! - `upload` — the STOR orchestrator (`FtpUploader`)
//! - `service` — initialization barrier shared between callers

pub mod types;
pub mod error;
pub mod resolver;
pub mod cache;
pub mod protocol;
pub mod passive;
pub mod transfer;
pub mod upload;
pub mod service;

// Re-exports for lib.rs consumers
pub use types::*;
pub use error::{FtpError, FtpErrorKind, FtpResult};
pub use cache::ConnectionInfo;
pub use upload::FtpUploader;
pub use service::{FtpUploadService, FtpUploadServiceState};
