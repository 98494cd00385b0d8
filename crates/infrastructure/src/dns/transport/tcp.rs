//! TCP Transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Each message is prefixed with its length as a two-octet big-endian
//! integer. One connection per query; nothing is pooled.

use super::{map_io_error, timeout_error, DnsTransport, TransportResponse};
use crate::dns::wire::header::{is_response_to, peek_id};
use async_trait::async_trait;
use bytes::Bytes;
use net_dns_query_domain::{ResolverEndpoint, TransportError};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

/// DNS over TCP transport
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpTransport;

impl TcpTransport {
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
        let io_err = |e: io::Error| map_io_error(server, "TCP", timeout, e);

        let mut stream = TcpStream::connect(server).await.map_err(io_err)?;
        stream.set_nodelay(true).map_err(io_err)?;

        send_with_length_prefix(&mut stream, message_bytes)
            .await
            .map_err(io_err)?;
        debug!(server = %server, id = expected_id, message_len = message_bytes.len(), "TCP query sent");

        loop {
            let frame = read_with_length_prefix(&mut stream).await.map_err(io_err)?;
            if !is_response_to(expected_id, &frame) {
                warn!(
                    server = %server,
                    expected_id,
                    received_id = ?peek_id(&frame),
                    "Skipping TCP frame that does not answer the query"
                );
                continue;
            }

            debug!(server = %server, id = expected_id, response_len = frame.len(), "TCP response received");
            return Ok(Bytes::from(frame));
        }
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
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
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

pub(crate) async fn send_with_length_prefix<S>(stream: &mut S, message_bytes: &[u8]) -> io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    if message_bytes.len() > MAX_TCP_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Message too large: {} bytes (max {})",
                message_bytes.len(),
                MAX_TCP_MESSAGE_SIZE
            ),
        ));
    }

    let length_bytes = (message_bytes.len() as u16).to_be_bytes();
    stream.write_all(&length_bytes).await?;
    stream.write_all(message_bytes).await?;
    stream.flush().await
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;

    let response_len = usize::from(u16::from_be_bytes(len_buf));
    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await?;

    Ok(response)
}
