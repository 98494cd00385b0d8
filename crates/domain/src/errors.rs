use crate::dns_message::ResponseCode;
use crate::dns_name::DomainName;
use crate::dns_record::RecordType;
use crate::query_attempt::QueryAttempt;
use crate::resolver_endpoint::ResolverEndpoint;
use std::net::SocketAddr;
use thiserror::Error;

/// Invalid user input: names, endpoints, record types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid resolver endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Unknown record type: {0}")]
    InvalidRecordType(String),

    #[error("Unknown record class: {0}")]
    InvalidRecordClass(String),
}

/// Malformed wire data. Fatal for the message being decoded, nothing else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message of {len} bytes is shorter than the 12-byte header")]
    TooShort { len: usize },

    #[error("unexpected end of message at offset {offset}: {needed} more bytes needed")]
    UnexpectedEnd { offset: usize, needed: usize },

    #[error("{declared} declared section entries cannot fit in {remaining} remaining bytes")]
    SectionCountOverflow { declared: usize, remaining: usize },

    #[error("malformed name at offset {offset}: {reason}")]
    MalformedName { offset: usize, reason: &'static str },

    #[error("invalid {record_type} rdata at offset {offset}: {reason}")]
    InvalidRdata {
        record_type: RecordType,
        offset: usize,
        reason: &'static str,
    },
}

/// A message that cannot be represented on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{section} section holds {count} entries, limit is 65535")]
    TooManyEntries { section: &'static str, count: usize },

    #[error("RDATA of {name} is {len} bytes, limit is 65535")]
    RdataTooLong { name: DomainName, len: usize },
}

/// Network-layer failure of a single exchange with one endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport timeout after {timeout_ms}ms waiting for {server}")]
    Timeout { server: SocketAddr, timeout_ms: u64 },

    #[error("Transport connection refused by {server} over {protocol}")]
    ConnectionRefused {
        server: SocketAddr,
        protocol: &'static str,
    },

    #[error("Network unreachable for {server}: {message}")]
    NetworkUnreachable { server: SocketAddr, message: String },

    #[error("Truncated UDP response from {server}, TCP fallback failed: {source}")]
    TruncatedFallbackFailed {
        server: SocketAddr,
        source: Box<TransportError>,
    },

    #[error("I/O error talking to {server}: {message}")]
    Io { server: SocketAddr, message: String },
}

impl TransportError {
    /// True when the exchange ran out of time, including a TCP follow-up
    /// that did.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Timeout { .. } => true,
            TransportError::TruncatedFallbackFailed { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// True when a TCP connection attempt was refused, directly or as the
    /// follow-up of a truncated UDP answer.
    pub fn is_tcp_refusal(&self) -> bool {
        match self {
            TransportError::ConnectionRefused { protocol, .. } => *protocol == "TCP",
            TransportError::TruncatedFallbackFailed { source, .. } => source.is_tcp_refusal(),
            _ => false,
        }
    }
}

/// Why a single attempt against one endpoint did not produce a usable answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid DNS response: {0}")]
    Decode(#[from] DecodeError),

    #[error("Server answered {0}")]
    ServerResponse(ResponseCode),

    #[error("Response id {received:#06x} does not match query id {expected:#06x}")]
    SpuriousResponse { expected: u16, received: u16 },

    #[error("Endpoint {0} disabled after repeated TCP refusals")]
    EndpointDisabled(SocketAddr),
}

impl AttemptError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::Transport(e) if e.is_timeout())
    }
}

/// Final, post-retry failure of one `resolve` call.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("No resolver endpoints configured")]
    NoEndpoints,

    #[error(
        "Resolution of {name} failed after {} attempts; last endpoint {last_endpoint}: {last_error}",
        .attempts.len()
    )]
    Exhausted {
        name: DomainName,
        attempts: Vec<QueryAttempt>,
        last_endpoint: ResolverEndpoint,
        last_error: AttemptError,
    },

    #[error("CNAME chain starting at {name} exceeds {limit} hops")]
    ChainTooLong { name: DomainName, limit: usize },
}

impl ResolveError {
    pub fn attempts(&self) -> &[QueryAttempt] {
        match self {
            ResolveError::Exhausted { attempts, .. } => attempts,
            _ => &[],
        }
    }
}
