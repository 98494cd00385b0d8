//! Retry schedule
//!
//! One attempt moves `Idle -> Sent -> {Answered | TimedOut | Errored}`
//! through [`AttemptState::on_event`]. Once an attempt is terminal,
//! [`Schedule::next`] decides what happens next: finish with the answer,
//! try the next endpoint of the round, start a new round, or give up.
//! Both functions are pure; the resolver only performs the I/O.

use net_dns_query_domain::{AttemptError, Message, TransportError};

/// Position in the schedule: which round, which endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub round: u32,
    pub endpoint: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    Sent,
    /// A final answer: NOERROR or NXDOMAIN.
    Answered(Message),
    TimedOut(TransportError),
    Errored(AttemptError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    Sent,
    Received(Message),
    Failed(AttemptError),
}

impl AttemptState {
    /// Applies one event. Events that make no sense in the current state
    /// leave it unchanged.
    pub fn on_event(self, event: AttemptEvent) -> AttemptState {
        match (self, event) {
            (AttemptState::Idle, AttemptEvent::Sent) => AttemptState::Sent,
            (AttemptState::Sent, AttemptEvent::Received(message)) => {
                let code = message.response_code();
                if code.is_authoritative_outcome() {
                    AttemptState::Answered(message)
                } else {
                    AttemptState::Errored(AttemptError::ServerResponse(code))
                }
            }
            (AttemptState::Sent, AttemptEvent::Failed(AttemptError::Transport(error)))
                if error.is_timeout() =>
            {
                AttemptState::TimedOut(error)
            }
            (AttemptState::Sent, AttemptEvent::Failed(error)) => AttemptState::Errored(error),
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AttemptState::Answered(_) | AttemptState::TimedOut(_) | AttemptState::Errored(_)
        )
    }

    /// The failure carried by a terminal non-answer state.
    pub fn error(&self) -> Option<AttemptError> {
        match self {
            AttemptState::TimedOut(error) => Some(AttemptError::Transport(error.clone())),
            AttemptState::Errored(error) => Some(error.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Done(Message),
    Attempt(Cursor),
    Exhausted,
}

/// Endpoint order and retry budget for one `resolve` call.
#[derive(Debug, Clone)]
pub struct Schedule {
    rounds: u32,
    disabled: Vec<bool>,
}

impl Schedule {
    /// `rounds` below one is treated as one.
    pub fn new(endpoint_count: usize, rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
            disabled: vec![false; endpoint_count],
        }
    }

    pub fn endpoint_count(&self) -> usize {
        self.disabled.len()
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Where a fresh query starts, or `None` if no endpoint is usable.
    pub fn first(&self) -> Option<Cursor> {
        self.enabled_from(0).map(|endpoint| Cursor { round: 0, endpoint })
    }

    /// Skips the endpoint for the rest of the call.
    pub fn disable(&mut self, endpoint: usize) {
        if let Some(slot) = self.disabled.get_mut(endpoint) {
            *slot = true;
        }
    }

    pub fn is_disabled(&self, endpoint: usize) -> bool {
        self.disabled.get(endpoint).copied().unwrap_or(true)
    }

    pub fn next(&self, cursor: Cursor, state: AttemptState) -> Transition {
        match state {
            AttemptState::Answered(message) => Transition::Done(message),
            AttemptState::Idle | AttemptState::Sent => Transition::Attempt(cursor),
            AttemptState::TimedOut(_) | AttemptState::Errored(_) => self.advance(cursor),
        }
    }

    fn advance(&self, cursor: Cursor) -> Transition {
        if let Some(endpoint) = self.enabled_from(cursor.endpoint + 1) {
            return Transition::Attempt(Cursor {
                round: cursor.round,
                endpoint,
            });
        }

        let round = cursor.round + 1;
        if round >= self.rounds {
            return Transition::Exhausted;
        }
        match self.enabled_from(0) {
            Some(endpoint) => Transition::Attempt(Cursor { round, endpoint }),
            None => Transition::Exhausted,
        }
    }

    fn enabled_from(&self, start: usize) -> Option<usize> {
        (start..self.disabled.len()).find(|&i| !self.disabled[i])
    }
}
