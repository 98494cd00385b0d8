use super::aggregate::aggregate;
use super::id_generator::{IdGenerator, RandomIdGenerator};
use super::options::{Resolution, ResolverOptions};
use super::schedule::{AttemptEvent, AttemptState, Cursor, Schedule, Transition};
use crate::dns::transport::{timeout_error, DnsTransport};
use crate::dns::wire::{decode, encode_query};
use net_dns_query_domain::{
    AttemptError, AttemptOutcome, DomainName, Message, Query, QueryAttempt, ResolveError,
    ResolverEndpoint, ResponseCode,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// TCP refusals in a row after which an endpoint is skipped.
const TCP_REFUSALS_BEFORE_DISABLE: u8 = 2;

/// Stub resolver: sends queries to the configured endpoints, retries per
/// the schedule and follows CNAME chains.
///
/// Holds no per-call state, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct DnsResolver {
    transport: Arc<dyn DnsTransport>,
    ids: Arc<dyn IdGenerator>,
}

/// Bookkeeping shared by every query of one `resolve` call.
struct Call<'a> {
    options: &'a ResolverOptions,
    schedule: Schedule,
    tcp_refusals: Vec<u8>,
    attempts: Vec<QueryAttempt>,
}

impl DnsResolver {
    pub fn new(transport: Arc<dyn DnsTransport>) -> Self {
        Self {
            transport,
            ids: Arc::new(RandomIdGenerator),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub async fn resolve(
        &self,
        query: &Query,
        options: &ResolverOptions,
    ) -> Result<Resolution, ResolveError> {
        if options.endpoints.is_empty() {
            return Err(ResolveError::NoEndpoints);
        }

        debug!(
            domain = %query.name(),
            record_type = %query.record_type(),
            endpoints = options.endpoints.len(),
            rounds = options.retries.max(1),
            "Resolving"
        );

        let mut call = Call {
            options,
            schedule: Schedule::new(options.endpoints.len(), options.retries),
            tcp_refusals: vec![0; options.endpoints.len()],
            attempts: Vec::new(),
        };

        let mut current = query.clone();
        let mut asked: HashSet<DomainName> = HashSet::from([current.name().to_lowercase()]);
        let mut total_hops = 0;

        loop {
            let message = self.exchange(&current, &mut call).await?;
            let aggregation = aggregate(&message, &current, options.max_chain_depth)?;

            total_hops += aggregation.hops;
            if total_hops > options.max_chain_depth {
                return Err(ResolveError::ChainTooLong {
                    name: query.name().clone(),
                    limit: options.max_chain_depth,
                });
            }

            if aggregation.needs_follow_up() && message.response_code() == ResponseCode::NoError {
                if !asked.insert(aggregation.final_name.to_lowercase()) {
                    return Err(ResolveError::ChainTooLong {
                        name: query.name().clone(),
                        limit: options.max_chain_depth,
                    });
                }
                debug!(
                    from = %current.name(),
                    to = %aggregation.final_name,
                    hops = total_hops,
                    "Following CNAME chain"
                );
                current = current.retarget(&aggregation.final_name);
                continue;
            }

            info!(
                domain = %query.name(),
                record_type = %query.record_type(),
                rcode = %message.response_code(),
                records = aggregation.records.len(),
                canonical = %aggregation.final_name,
                attempts = call.attempts.len(),
                "Resolution finished"
            );

            return Ok(Resolution {
                records: aggregation.records,
                response_code: message.response_code(),
                canonical_name: aggregation.final_name,
                attempts: call.attempts,
            });
        }
    }

    /// Runs the schedule for one question until an endpoint gives a final
    /// answer or every round is spent.
    async fn exchange(&self, query: &Query, call: &mut Call<'_>) -> Result<Message, ResolveError> {
        let options = call.options;
        let mut last: Option<(ResolverEndpoint, AttemptError)> = None;

        let Some(mut cursor) = call.schedule.first() else {
            return Err(self.exhausted(query, call, last));
        };
        let mut id = self.ids.next_id();
        let mut round = cursor.round;

        loop {
            if cursor.round != round {
                round = cursor.round;
                id = self.ids.next_id();
            }
            let endpoint = options.endpoints[cursor.endpoint];

            let state = self.attempt(query, id, &endpoint, cursor, call).await;
            if let Some(error) = state.error() {
                self.track_refusals(cursor.endpoint, &error, call);
                warn!(
                    server = %endpoint,
                    round = cursor.round,
                    error = %error,
                    "Attempt failed"
                );
                last = Some((endpoint, error));
            }

            match call.schedule.next(cursor, state) {
                Transition::Done(message) => return Ok(message),
                Transition::Attempt(next) => cursor = next,
                Transition::Exhausted => return Err(self.exhausted(query, call, last)),
            }
        }
    }

    async fn attempt(
        &self,
        query: &Query,
        id: u16,
        endpoint: &ResolverEndpoint,
        cursor: Cursor,
        call: &mut Call<'_>,
    ) -> AttemptState {
        let bytes = encode_query(query, id);
        let started_at = Instant::now();
        let state = AttemptState::Idle.on_event(AttemptEvent::Sent);

        debug!(
            server = %endpoint,
            id,
            round = cursor.round,
            domain = %query.name(),
            record_type = %query.record_type(),
            "Query sent"
        );

        let limit = call.options.timeout;
        let sent = timeout(limit, self.transport.send(endpoint, &bytes, limit))
            .await
            .unwrap_or_else(|_| Err(timeout_error(endpoint.addr, limit)));

        let mut transport = endpoint.protocol_name();
        let event = match sent {
            Ok(response) => {
                transport = response.protocol_used;
                match decode(&response.bytes) {
                    // Transports drop answers with a foreign id and keep
                    // waiting, so one reaching this point is a broken
                    // transport and fails the attempt.
                    Ok(message) if message.id() != id => {
                        AttemptEvent::Failed(AttemptError::SpuriousResponse {
                            expected: id,
                            received: message.id(),
                        })
                    }
                    Ok(message) => {
                        debug!(
                            server = %endpoint,
                            id,
                            protocol = transport,
                            rcode = %message.response_code(),
                            answers = message.answers.len(),
                            "Response received"
                        );
                        AttemptEvent::Received(message)
                    }
                    Err(e) => AttemptEvent::Failed(e.into()),
                }
            }
            Err(e) => AttemptEvent::Failed(e.into()),
        };

        let state = state.on_event(event);
        let outcome = match &state {
            AttemptState::Answered(message) => AttemptOutcome::Answered(message.response_code()),
            AttemptState::TimedOut(_) => AttemptOutcome::TimedOut,
            AttemptState::Errored(error) => AttemptOutcome::Errored(error.clone()),
            AttemptState::Idle | AttemptState::Sent => {
                AttemptOutcome::Errored(AttemptError::EndpointDisabled(endpoint.addr))
            }
        };
        call.attempts.push(QueryAttempt {
            endpoint: *endpoint,
            transport,
            started_at,
            latency: started_at.elapsed(),
            outcome,
        });

        state
    }

    fn track_refusals(&self, index: usize, error: &AttemptError, call: &mut Call<'_>) {
        let refused = matches!(error, AttemptError::Transport(e) if e.is_tcp_refusal());
        let Some(count) = call.tcp_refusals.get_mut(index) else {
            return;
        };
        if !refused {
            *count = 0;
            return;
        }

        *count += 1;
        let refusals = *count;
        if refusals >= TCP_REFUSALS_BEFORE_DISABLE {
            warn!(
                server = %call.options.endpoints[index],
                refusals,
                "TCP connection refused repeatedly, skipping endpoint"
            );
            call.schedule.disable(index);
        }
    }

    fn exhausted(
        &self,
        query: &Query,
        call: &mut Call<'_>,
        last: Option<(ResolverEndpoint, AttemptError)>,
    ) -> ResolveError {
        // Only reachable without an attempt when every endpoint was already
        // disabled by an earlier query of this call.
        let (last_endpoint, last_error) = last.unwrap_or_else(|| {
            let endpoint = call.options.endpoints[0];
            (endpoint, AttemptError::EndpointDisabled(endpoint.addr))
        });

        warn!(
            domain = %query.name(),
            attempts = call.attempts.len(),
            last_endpoint = %last_endpoint,
            error = %last_error,
            "All endpoints and rounds exhausted"
        );

        ResolveError::Exhausted {
            name: query.name().clone(),
            attempts: std::mem::take(&mut call.attempts),
            last_endpoint,
            last_error,
        }
    }
}
