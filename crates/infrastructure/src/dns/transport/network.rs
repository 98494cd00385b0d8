use super::{timeout_error, DnsTransport, TcpTransport, TransportResponse, UdpTransport};
use crate::dns::wire::header::peek_truncated;
use async_trait::async_trait;
use net_dns_query_domain::{ResolverEndpoint, TransportError, TransportPreference};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// UDP first, TCP when the endpoint asks for it or an answer is truncated.
#[derive(Clone)]
pub struct NetworkTransport {
    udp: Arc<dyn DnsTransport>,
    tcp: Arc<dyn DnsTransport>,
}

impl NetworkTransport {
    pub fn new() -> Self {
        Self::with_transports(Arc::new(UdpTransport::new()), Arc::new(TcpTransport::new()))
    }

    pub fn with_transports(udp: Arc<dyn DnsTransport>, tcp: Arc<dyn DnsTransport>) -> Self {
        Self { udp, tcp }
    }
}

impl Default for NetworkTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsTransport for NetworkTransport {
    async fn send(
        &self,
        endpoint: &ResolverEndpoint,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        if endpoint.transport == TransportPreference::TcpOnly {
            return self.tcp.send(endpoint, message_bytes, timeout).await;
        }

        let start = Instant::now();
        let response = self.udp.send(endpoint, message_bytes, timeout).await?;
        if !peek_truncated(&response.bytes) {
            return Ok(response);
        }

        debug!(
            server = %endpoint.addr,
            "Response truncated (TC bit), retrying via TCP"
        );

        // The TCP follow-up shares the attempt's budget.
        let fallback = match timeout.checked_sub(start.elapsed()) {
            Some(remaining) if !remaining.is_zero() => {
                self.tcp.send(endpoint, message_bytes, remaining).await
            }
            _ => Err(timeout_error(endpoint.addr, timeout)),
        };

        fallback.map_err(|source| TransportError::TruncatedFallbackFailed {
            server: endpoint.addr,
            source: Box::new(source),
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP+TCP"
    }
}
