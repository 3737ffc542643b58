//! Parsing of `227 Entering Passive Mode (...)` replies.
//!
//! Servers disagree on what goes between the parentheses:
//! - `h1,h2,h3,h4,p1,p2` — the RFC 959 IPv4 tuple.
//! - `0,0,0,0,p1,p2` — vsftpd on IPv6 when the data address equals the
//!   control address.
//! - `4a8f,p1,p2` — ProFTPD on IPv6, sending only the last hextet of an
//!   address that otherwise matches the control address.
//!
//! The field is tokenized and classified into a [`PassiveReply`] first;
//! [`reconstruct`] then turns it into a connectable endpoint.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::types::PassiveEndpoint;
use lazy_static::lazy_static;
use regex::Regex;

pub const PASV_MARKER: &str = "227 Entering Passive Mode (";

/// Characters dropped from the control host before appending a fragment
/// (one hextet plus its colon).
const HEXTET_SUFFIX_LEN: usize = 5;

lazy_static! {
    static ref HEXTET: Regex = Regex::new(r"^[0-9A-Fa-f]{1,4}$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassiveReply {
    Ipv4Tuple { host: [u8; 4], p1: u8, p2: u8 },
    Ipv6Fragment { fragment: String, p1: u8, p2: u8 },
}

impl PassiveReply {
    pub fn port(&self) -> u16 {
        let (p1, p2) = match self {
            Self::Ipv4Tuple { p1, p2, .. } | Self::Ipv6Fragment { p1, p2, .. } => (*p1, *p2),
        };
        u16::from(p1) * 256 + u16::from(p2)
    }
}

/// Decode a passive reply into the endpoint to connect to.
pub fn parse(text: &str, control_host: &str) -> FtpResult<PassiveEndpoint> {
    let reply = classify(text)?;
    reconstruct(&reply, control_host)
}

/// Locate the marker and classify the parenthesized field.
pub fn classify(text: &str) -> FtpResult<PassiveReply> {
    let start = text
        .find(PASV_MARKER)
        .ok_or_else(|| FtpError::marker_not_found("Didn't receive PASV IP/PORT"))?;
    let rest = &text[start + PASV_MARKER.len()..];
    let field = rest
        .find(')')
        .map(|end| &rest[..end])
        .ok_or_else(|| FtpError::unrecognized_passive(format!("unterminated field: {}", rest)))?;

    let tokens: Vec<&str> = field.split(',').map(str::trim).collect();
    match tokens.as_slice() {
        [h1, h2, h3, h4, p1, p2] => Ok(PassiveReply::Ipv4Tuple {
            host: [octet(h1)?, octet(h2)?, octet(h3)?, octet(h4)?],
            p1: octet(p1)?,
            p2: octet(p2)?,
        }),
        [fragment, p1, p2] => {
            if !HEXTET.is_match(fragment) {
                return Err(FtpError::unrecognized_passive(format!(
                    "not an IPv6 hextet: '{}'",
                    fragment
                )));
            }
            Ok(PassiveReply::Ipv6Fragment {
                fragment: fragment.to_string(),
                p1: octet(p1)?,
                p2: octet(p2)?,
            })
        }
        _ => Err(FtpError::unrecognized_passive(format!(
            "{} comma(s) in '({})'",
            tokens.len() - 1,
            field
        ))),
    }
}

/// Turn a classified reply into an endpoint, filling in the control
/// host where the server left the address out.
pub fn reconstruct(reply: &PassiveReply, control_host: &str) -> FtpResult<PassiveEndpoint> {
    let ip = match reply {
        PassiveReply::Ipv4Tuple { host, .. } if host[0] == 0 => control_host.to_string(),
        PassiveReply::Ipv4Tuple { host, .. } => {
            format!("{}.{}.{}.{}", host[0], host[1], host[2], host[3])
        }
        PassiveReply::Ipv6Fragment { fragment, .. } => {
            // Assumes only the last hextet differs from the control address.
            let keep = control_host
                .len()
                .checked_sub(HEXTET_SUFFIX_LEN)
                .and_then(|n| control_host.get(..n))
                .ok_or_else(|| {
                    FtpError::unrecognized_passive(format!(
                        "control host '{}' too short for fragment '{}'",
                        control_host, fragment
                    ))
                })?;
            format!("{}:{}", keep, fragment)
        }
    };
    Ok(PassiveEndpoint::new(ip, reply.port()))
}

fn octet(token: &str) -> FtpResult<u8> {
    token
        .parse::<u8>()
        .map_err(|_| FtpError::unrecognized_passive(format!("bad number '{}'", token)))
}
