use super::errors::ConfigError;
use crate::resolver_endpoint::{ResolverEndpoint, TransportPreference, DEFAULT_DNS_PORT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Endpoints tried in order every retry round. Empty means "use the
    /// system nameservers".
    #[serde(default)]
    pub servers: Vec<String>,

    /// Port for servers listed without one.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of passes over the server list.
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    #[serde(default)]
    pub tcp_only: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            max_chain_depth: default_max_chain_depth(),
            tcp_only: false,
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parses `servers` into endpoints, applying `port` and `tcp_only`.
    pub fn endpoints(&self) -> Result<Vec<ResolverEndpoint>, ConfigError> {
        self.servers
            .iter()
            .map(|server| {
                let endpoint = ResolverEndpoint::parse_with_port(server, self.port)
                    .map_err(|e| ConfigError::InvalidServer {
                        server: server.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(if self.tcp_only {
                    endpoint.with_transport(TransportPreference::TcpOnly)
                } else {
                    endpoint
                })
            })
            .collect()
    }
}

fn default_port() -> u16 {
    DEFAULT_DNS_PORT
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_retries() -> u32 {
    3
}

fn default_max_chain_depth() -> usize {
    8
}
