#![allow(dead_code)]
use async_trait::async_trait;
use bytes::Bytes;
use net_dns_query_domain::{ResolverEndpoint, ResourceRecord, ResponseCode, TransportError};
use net_dns_query_infrastructure::dns::transport::{DnsTransport, TransportResponse};
use net_dns_query_infrastructure::dns::wire::{decode, encode};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use super::builders::response_to;

/// What an endpoint does with the next query it receives.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer from the zone: every record owned by the question name, or
    /// NXDOMAIN if the zone has none.
    Zone,
    Records(Vec<ResourceRecord>),
    Code(ResponseCode),
    Timeout,
    /// Never answers and never reports a timeout of its own.
    Hang,
    TcpRefused,
    /// Answer with a flipped transaction id.
    WrongId,
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentQuery {
    pub server: SocketAddr,
    pub id: u16,
    pub name: String,
}

/// In-memory transport with per-endpoint scripted replies. Endpoints
/// without a script (or whose script ran out) answer from the zone.
#[derive(Default)]
pub struct MockTransport {
    zone: Vec<ResourceRecord>,
    scripts: Mutex<HashMap<SocketAddr, VecDeque<Reply>>>,
    sent: Mutex<Vec<SentQuery>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, records: Vec<ResourceRecord>) -> Self {
        self.zone.extend(records);
        self
    }

    pub fn script(self, server: SocketAddr, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(server, replies.into_iter().collect());
        self
    }

    pub fn sent(&self) -> Vec<SentQuery> {
        self.sent.lock().unwrap().clone()
    }

    fn next_reply(&self, server: SocketAddr) -> Reply {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(&server)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Reply::Zone)
    }
}

#[async_trait]
impl DnsTransport for MockTransport {
    async fn send(
        &self,
        endpoint: &ResolverEndpoint,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let server = endpoint.addr;
        let query = decode(message_bytes).expect("resolver sent an undecodable query");
        let question = query.questions[0].clone();
        self.sent.lock().unwrap().push(SentQuery {
            server,
            id: query.id(),
            name: question.name.as_str().to_string(),
        });

        let response = match self.next_reply(server) {
            Reply::Zone => {
                let answers: Vec<ResourceRecord> = self
                    .zone
                    .iter()
                    .filter(|r| r.name.eq_ignore_case(&question.name))
                    .cloned()
                    .collect();
                let code = if answers.is_empty() {
                    ResponseCode::NameError
                } else {
                    ResponseCode::NoError
                };
                encode(&response_to(&query, code, answers)).unwrap()
            }
            Reply::Records(answers) => encode(&response_to(&query, ResponseCode::NoError, answers)).unwrap(),
            Reply::Code(code) => encode(&response_to(&query, code, Vec::new())).unwrap(),
            Reply::Timeout => {
                return Err(TransportError::Timeout {
                    server,
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Reply::Hang => std::future::pending().await,
            Reply::TcpRefused => {
                return Err(TransportError::ConnectionRefused {
                    server,
                    protocol: "TCP",
                })
            }
            Reply::WrongId => {
                let mut response = response_to(&query, ResponseCode::NoError, Vec::new());
                response.header.id ^= 0xFFFF;
                encode(&response).unwrap()
            }
            Reply::Raw(bytes) => bytes,
        };

        Ok(TransportResponse {
            bytes: Bytes::from(response),
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "MOCK"
    }
}
