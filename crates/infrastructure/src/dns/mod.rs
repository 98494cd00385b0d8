pub mod resolver;
pub mod transport;
pub mod wire;

pub use resolver::{DnsResolver, Resolution, ResolverOptions};
pub use transport::{DnsTransport, NetworkTransport, TransportResponse};
