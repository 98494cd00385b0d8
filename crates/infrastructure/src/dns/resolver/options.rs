use net_dns_query_domain::{
    ConfigError, DomainName, QueryAttempt, ResolverConfig, ResolverEndpoint, ResourceRecord,
    ResponseCode,
};
use std::time::Duration;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 8;

/// Per-call resolver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Tried in this order every round.
    pub endpoints: Vec<ResolverEndpoint>,
    /// Number of rounds over all endpoints; at least one round always runs.
    pub retries: u32,
    /// Budget of a single attempt.
    pub timeout: Duration,
    /// CNAME hops allowed across all messages of one call.
    pub max_chain_depth: usize,
}

impl ResolverOptions {
    pub fn new(endpoints: Vec<ResolverEndpoint>) -> Self {
        Self {
            endpoints,
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoints: config.endpoints()?,
            retries: config.retries,
            timeout: config.timeout(),
            max_chain_depth: config.max_chain_depth,
        })
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_chain_depth(mut self, max_chain_depth: usize) -> Self {
        self.max_chain_depth = max_chain_depth;
        self
    }
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Successful outcome of one `resolve` call. An NXDOMAIN or NODATA answer
/// is a resolution with no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub records: Vec<ResourceRecord>,
    pub response_code: ResponseCode,
    /// Name the records belong to after following CNAMEs.
    pub canonical_name: DomainName,
    pub attempts: Vec<QueryAttempt>,
}

impl Resolution {
    pub fn is_name_error(&self) -> bool {
        self.response_code == ResponseCode::NameError
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
