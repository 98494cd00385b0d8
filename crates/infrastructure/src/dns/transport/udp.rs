//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). Answers larger than the receive
//! buffer come back truncated; `NetworkTransport` retries those over TCP.

use super::{map_io_error, timeout_error, DnsTransport, TransportResponse};
use crate::dns::wire::header::{is_response_to, peek_id};
use async_trait::async_trait;
use bytes::Bytes;
use net_dns_query_domain::{ResolverEndpoint, TransportError};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpTransport;

impl UdpTransport {
    pub fn new() -> Self {
        Self
    }

    async fn exchange(
        &self,
        server: SocketAddr,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, TransportError> {
        let expected_id = peek_id(message_bytes).ok_or_else(|| TransportError::Io {
            server,
            message: "query shorter than a transaction id".to_string(),
        })?;

        // Bind to ephemeral port of the server's family
        let bind_addr = if server.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let io_err = |e: std::io::Error| map_io_error(server, "UDP", timeout, e);

        let socket = UdpSocket::bind(bind_addr).await.map_err(io_err)?;
        // Connected sockets only deliver datagrams from the server address.
        socket.connect(server).await.map_err(io_err)?;

        let bytes_sent = socket.send(message_bytes).await.map_err(io_err)?;
        debug!(server = %server, id = expected_id, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let bytes_received = socket.recv(&mut recv_buf).await.map_err(io_err)?;
            let datagram = &recv_buf[..bytes_received];

            if !is_response_to(expected_id, datagram) {
                warn!(
                    server = %server,
                    expected_id,
                    received_id = ?peek_id(datagram),
                    bytes_received,
                    "Discarding UDP datagram that does not answer the query"
                );
                continue;
            }

            debug!(server = %server, id = expected_id, bytes_received, "UDP response received");
            return Ok(Bytes::copy_from_slice(datagram));
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        endpoint: &ResolverEndpoint,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(endpoint.addr, message_bytes, timeout))
            .await
            .map_err(|_| timeout_error(endpoint.addr, timeout))??;

        Ok(TransportResponse {
            bytes,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
