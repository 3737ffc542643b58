//! Name resolution and first-reachable TCP connect.
//!
//! Used for the one-time control-server validation and for every
//! passive data connection.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::types::{AddressFamily, ResolvedAddr};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error};

/// Resolve `host:port` and return the first candidate that accepts a
/// TCP connection, trying them in resolver order.
///
/// `prefer` drops candidates of the other family when at least one of
/// the preferred family exists.
pub async fn connect_first(
    host: &str,
    port: u16,
    prefer: Option<AddressFamily>,
    connect_timeout: Option<Duration>,
) -> FtpResult<(TcpStream, ResolvedAddr)> {
    let candidates = resolve(host, port, prefer).await?;

    for addr in &candidates {
        match connect_one(*addr, connect_timeout).await {
            Ok(stream) => {
                debug!(target: "ftp", "connected to {} ({})", addr, host);
                return Ok((stream, ResolvedAddr::from(*addr)));
            }
            Err(e) => debug!(target: "ftp", "candidate {} refused: {}", addr, e),
        }
    }

    error!(target: "ftp", "Failed to connect to {}:{}", host, port);
    Err(FtpError::no_reachable_candidate(format!(
        "none of {} candidate(s) for {}:{} accepted a connection",
        candidates.len(),
        host,
        port
    )))
}

/// Resolve `host:port` into an ordered candidate list.
pub async fn resolve(
    host: &str,
    port: u16,
    prefer: Option<AddressFamily>,
) -> FtpResult<Vec<SocketAddr>> {
    if host.is_empty() {
        return Err(FtpError::resolution_failed("Host must not be empty"));
    }

    let mut candidates: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|e| {
            error!(target: "ftp", "Could not resolve domain name or IP is invalid: {}", host);
            FtpError::resolution_failed(format!("resolving {}: {}", host, e))
        })?
        .collect();

    if candidates.is_empty() {
        return Err(FtpError::resolution_failed(format!(
            "{} resolved to no addresses",
            host
        )));
    }

    if let Some(family) = prefer {
        if candidates.iter().any(|a| AddressFamily::of(a) == family) {
            candidates.retain(|a| AddressFamily::of(a) == family);
        }
    }

    Ok(candidates)
}

/// Connect to one socket address, honouring the optional timeout.
pub async fn connect_one(
    addr: SocketAddr,
    connect_timeout: Option<Duration>,
) -> std::io::Result<TcpStream> {
    let stream = match connect_timeout {
        Some(dur) => timeout(dur, TcpStream::connect(addr))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"))??,
        None => TcpStream::connect(addr).await?,
    };
    stream.set_nodelay(true).ok();
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ftp::error::FtpErrorKind;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connects_to_listening_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let (_stream, resolved) = connect_first("127.0.0.1", port, None, None).await.unwrap();
        assert_eq!(resolved.family, AddressFamily::Inet);
        assert_eq!(resolved.addr.port(), port);
    }

    #[tokio::test]
    async fn closed_port_is_no_reachable_candidate() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = connect_first("127.0.0.1", port, None, Some(Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FtpErrorKind::NoReachableCandidate);
    }

    #[tokio::test]
    async fn unresolvable_host_is_resolution_failure() {
        let err = resolve("", 21, None).await.unwrap_err();
        assert_eq!(err.kind, FtpErrorKind::ResolutionFailed);

        let err = resolve("not an address", 21, None).await.unwrap_err();
        assert_eq!(err.kind, FtpErrorKind::ResolutionFailed);
    }

    #[tokio::test]
    async fn preferred_family_filters_only_when_present() {
        let v4 = resolve("127.0.0.1", 21, Some(AddressFamily::Inet6)).await.unwrap();
        assert_eq!(v4.len(), 1);
        assert!(v4[0].is_ipv4());

        let v6 = resolve("::1", 21, Some(AddressFamily::Inet6)).await.unwrap();
        assert!(v6.iter().all(|a| a.is_ipv6()));
    }
}
