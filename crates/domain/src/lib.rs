//! net-dns-query domain layer
pub mod config;
pub mod dns_message;
pub mod dns_name;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod query_attempt;
pub mod resolver_endpoint;

pub use config::{CliOverrides, Config, ConfigError, LogFormat, LoggingConfig, ResolverConfig};
pub use dns_message::{Header, Message, Question, ResponseCode};
pub use dns_name::DomainName;
pub use dns_query::Query;
pub use dns_record::{RecordClass, RecordData, RecordType, ResourceRecord};
pub use errors::{
    AttemptError, DecodeError, DomainError, EncodeError, ResolveError, TransportError,
};
pub use query_attempt::{AttemptOutcome, QueryAttempt};
pub use resolver_endpoint::{ResolverEndpoint, TransportPreference, DEFAULT_DNS_PORT};
