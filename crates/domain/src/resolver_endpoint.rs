use crate::errors::DomainError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_DNS_PORT: u16 = 53;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportPreference {
    /// UDP first, TCP only when the answer comes back truncated.
    #[default]
    UdpWithTcpFallback,
    TcpOnly,
}

/// A DNS server to send queries to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolverEndpoint {
    pub addr: SocketAddr,
    pub transport: TransportPreference,
}

impl ResolverEndpoint {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self::udp(SocketAddr::new(ip, port))
    }

    pub fn udp(addr: SocketAddr) -> Self {
        Self {
            addr,
            transport: TransportPreference::UdpWithTcpFallback,
        }
    }

    pub fn tcp(addr: SocketAddr) -> Self {
        Self {
            addr,
            transport: TransportPreference::TcpOnly,
        }
    }

    pub fn with_transport(mut self, transport: TransportPreference) -> Self {
        self.transport = transport;
        self
    }

    /// Parses `IP`, `IP:PORT`, `[V6]:PORT`, optionally prefixed with
    /// `udp://` or `tcp://`. Addresses without a port get `default_port`.
    pub fn parse_with_port(s: &str, default_port: u16) -> Result<Self, DomainError> {
        let s = s.trim();
        let (rest, transport) = if let Some(rest) = s.strip_prefix("udp://") {
            (rest, TransportPreference::UdpWithTcpFallback)
        } else if let Some(rest) = s.strip_prefix("tcp://") {
            (rest, TransportPreference::TcpOnly)
        } else {
            (s, TransportPreference::UdpWithTcpFallback)
        };

        let addr = parse_socket_addr(rest, default_port).ok_or_else(|| {
            DomainError::InvalidEndpoint(format!(
                "'{}'. Expected: IP, IP:PORT, [IPv6]:PORT, udp://IP:PORT or tcp://IP:PORT",
                s
            ))
        })?;

        Ok(Self { addr, transport })
    }

    pub fn protocol_name(&self) -> &'static str {
        match self.transport {
            TransportPreference::UdpWithTcpFallback => "UDP",
            TransportPreference::TcpOnly => "TCP",
        }
    }
}

fn parse_socket_addr(s: &str, default_port: u16) -> Option<SocketAddr> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Some(addr);
    }
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Some(SocketAddr::new(ip, default_port));
    }
    let bracketed = s.strip_prefix('[').and_then(|r| r.strip_suffix(']'))?;
    bracketed
        .parse::<IpAddr>()
        .ok()
        .map(|ip| SocketAddr::new(ip, default_port))
}

impl FromStr for ResolverEndpoint {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_port(s, DEFAULT_DNS_PORT)
    }
}

impl fmt::Display for ResolverEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transport {
            TransportPreference::UdpWithTcpFallback => write!(f, "udp://{}", self.addr),
            TransportPreference::TcpOnly => write!(f, "tcp://{}", self.addr),
        }
    }
}
