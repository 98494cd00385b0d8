use crate::dns_message::ResponseCode;
use crate::errors::AttemptError;
use crate::resolver_endpoint::ResolverEndpoint;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Answered(ResponseCode),
    TimedOut,
    Errored(AttemptError),
}

/// One exchange with one endpoint. Kept for retry bookkeeping and
/// diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAttempt {
    pub endpoint: ResolverEndpoint,
    pub transport: &'static str,
    pub started_at: Instant,
    pub latency: Duration,
    pub outcome: AttemptOutcome,
}

impl QueryAttempt {
    pub fn is_timeout(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::TimedOut)
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency.as_millis() as u64
    }
}
