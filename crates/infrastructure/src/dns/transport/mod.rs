//! Query transports
//!
//! Every transport sends one already-encoded query to one endpoint and
//! returns the raw bytes of the matching answer. Decoding and response-code
//! handling belong to the resolver.

pub mod network;
pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use net_dns_query_domain::{ResolverEndpoint, TransportError};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

pub use network::NetworkTransport;
pub use tcp::TcpTransport;
pub use udp::UdpTransport;

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub bytes: Bytes,

    pub protocol_used: &'static str,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Sends `message_bytes` to `endpoint` and waits at most `timeout` for
    /// an answer carrying the same transaction id.
    async fn send(
        &self,
        endpoint: &ResolverEndpoint,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;

    fn protocol_name(&self) -> &'static str;
}

pub(crate) fn map_io_error(
    server: SocketAddr,
    protocol: &'static str,
    timeout: Duration,
    error: io::Error,
) -> TransportError {
    match error.kind() {
        io::ErrorKind::ConnectionRefused => TransportError::ConnectionRefused { server, protocol },
        io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable => {
            TransportError::NetworkUnreachable {
                server,
                message: error.to_string(),
            }
        }
        io::ErrorKind::TimedOut => TransportError::Timeout {
            server,
            timeout_ms: timeout.as_millis() as u64,
        },
        _ => TransportError::Io {
            server,
            message: error.to_string(),
        },
    }
}

pub(crate) fn timeout_error(server: SocketAddr, timeout: Duration) -> TransportError {
    TransportError::Timeout {
        server,
        timeout_ms: timeout.as_millis() as u64,
    }
}
