//! In-memory chain for tests and transcript replay.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use casino_core::{GameType, SessionId};
use tracing::debug;

use crate::traits::{CasinoChain, CommandSubmitter, SessionQuery, TransportError};
use crate::types::{AccountId, Modifier, OnChainSession, SessionStatus, TxHandle};

/// A transaction the mock accepted, in submission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Start {
        game: GameType,
        stake: u64,
        session_id: SessionId,
    },
    Command {
        session_id: SessionId,
        payload: Vec<u8>,
    },
    Modifier {
        modifier: Modifier,
        enabled: bool,
    },
}

#[derive(Default)]
struct MockState {
    sessions: HashMap<SessionId, OnChainSession>,
    balances: HashMap<AccountId, u64>,
    submissions: Vec<Submission>,
    submit_failures: VecDeque<TransportError>,
    query_failures: VecDeque<TransportError>,
    submit_latency: Duration,
    tx_counter: u64,
}

/// Simulates ledger submissions and queries without a network.
///
/// Submissions are recorded and acknowledged; nothing is pushed back. Tests
/// deliver the matching [`ChainSignal`](crate::ChainSignal)s themselves.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<MockState>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_balance(self, account: AccountId, balance: u64) -> Self {
        self.set_balance(account, balance);
        self
    }

    pub fn set_balance(&self, account: AccountId, balance: u64) {
        self.lock().balances.insert(account, balance);
    }

    /// Makes the next submission fail with `error`.
    pub fn fail_next_submit(&self, error: TransportError) {
        self.lock().submit_failures.push_back(error);
    }

    /// Holds every later submission for `latency` before answering.
    pub fn set_submit_latency(&self, latency: Duration) {
        self.lock().submit_latency = latency;
    }

    /// Makes the next direct query fail with `error`.
    pub fn fail_next_query(&self, error: TransportError) {
        self.lock().query_failures.push_back(error);
    }

    pub fn insert_session(&self, session: OnChainSession) {
        self.lock().sessions.insert(session.session_id, session);
    }

    pub fn set_session_state(&self, session_id: SessionId, state: Vec<u8>) {
        if let Some(session) = self.lock().sessions.get_mut(&session_id) {
            session.state = state;
        }
    }

    pub fn complete_session(&self, session_id: SessionId) {
        if let Some(session) = self.lock().sessions.get_mut(&session_id) {
            session.status = SessionStatus::Completed;
        }
    }

    pub fn remove_session(&self, session_id: SessionId) {
        self.lock().sessions.remove(&session_id);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }

    /// Command payloads sent to `session_id`, in order.
    pub fn commands_for(&self, session_id: SessionId) -> Vec<Vec<u8>> {
        self.lock()
            .submissions
            .iter()
            .filter_map(|submission| match submission {
                Submission::Command {
                    session_id: id,
                    payload,
                } if *id == session_id => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, submission: Submission) -> Result<TxHandle, TransportError> {
        let latency = self.lock().submit_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        if let Some(error) = state.submit_failures.pop_front() {
            debug!(?submission, %error, "mock submission failed");
            return Err(error);
        }
        if let Submission::Start {
            game, session_id, ..
        } = &submission
        {
            state.sessions.insert(
                *session_id,
                OnChainSession {
                    session_id: *session_id,
                    game_type: *game,
                    status: SessionStatus::Active,
                    state: Vec::new(),
                },
            );
        }
        state.tx_counter += 1;
        state.submissions.push(submission);
        Ok(TxHandle::from_bytes(state.tx_counter.to_be_bytes().to_vec()))
    }

    fn query_failure(&self) -> Option<TransportError> {
        self.lock().query_failures.pop_front()
    }
}

#[async_trait]
impl CommandSubmitter for MockChain {
    async fn submit_start(
        &self,
        game: GameType,
        stake: u64,
        session_id: SessionId,
    ) -> Result<TxHandle, TransportError> {
        self.record(Submission::Start {
            game,
            stake,
            session_id,
        })
        .await
    }

    async fn submit_command(
        &self,
        session_id: SessionId,
        payload: Vec<u8>,
    ) -> Result<TxHandle, TransportError> {
        self.record(Submission::Command {
            session_id,
            payload,
        })
        .await
    }

    async fn set_modifier(
        &self,
        modifier: Modifier,
        enabled: bool,
    ) -> Result<TxHandle, TransportError> {
        self.record(Submission::Modifier { modifier, enabled }).await
    }
}

#[async_trait]
impl SessionQuery for MockChain {
    async fn fetch_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<OnChainSession>, TransportError> {
        if let Some(error) = self.query_failure() {
            return Err(error);
        }
        Ok(self.lock().sessions.get(&session_id).cloned())
    }

    async fn fetch_balance(&self, account: &AccountId) -> Result<u64, TransportError> {
        if let Some(error) = self.query_failure() {
            return Err(error);
        }
        Ok(self.lock().balances.get(account).copied().unwrap_or(0))
    }
}

impl CasinoChain for MockChain {
    fn name(&self) -> &str {
        "mock"
    }

    fn network(&self) -> &str {
        "local"
    }
}
