//! Ledger transport traits.
//!
//! - [`CommandSubmitter`]: outbound transactions
//! - [`SessionQuery`]: direct reads
//! - [`CasinoChain`]: composite implemented by every backend

use async_trait::async_trait;
use casino_core::{CasinoError, ErrorSeverity, GameType, SessionId};

use crate::types::{AccountId, Modifier, OnChainSession, TxHandle};

/// Transport layer errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    #[error("transport closed")]
    Closed,
}

impl CasinoError for TransportError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            TransportError::Network(_) => ErrorSeverity::Recoverable,
            TransportError::Rejected(_)
            | TransportError::InsufficientBalance { .. }
            | TransportError::SessionNotFound(_) => ErrorSeverity::Validation,
            TransportError::Closed => ErrorSeverity::Internal,
        }
    }
}

/// Outbound transactions.
///
/// Each call resolves once the transport has acknowledged the submission;
/// the resulting state change arrives later as a push signal.
#[async_trait]
pub trait CommandSubmitter: Send + Sync {
    /// Opens `session_id` for `game` with the initial stake.
    async fn submit_start(
        &self,
        game: GameType,
        stake: u64,
        session_id: SessionId,
    ) -> Result<TxHandle, TransportError>;

    /// Sends one encoded action payload to an open session.
    async fn submit_command(
        &self,
        session_id: SessionId,
        payload: Vec<u8>,
    ) -> Result<TxHandle, TransportError>;

    /// Arms or disarms a session modifier for the next round.
    async fn set_modifier(
        &self,
        modifier: Modifier,
        enabled: bool,
    ) -> Result<TxHandle, TransportError>;
}

/// Direct reads of ledger state.
#[async_trait]
pub trait SessionQuery: Send + Sync {
    /// Looks up a session by id; `None` when the ledger has no such session.
    async fn fetch_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<OnChainSession>, TransportError>;

    async fn fetch_balance(&self, account: &AccountId) -> Result<u64, TransportError>;
}

/// Complete transport surface consumed by the runtime.
pub trait CasinoChain: CommandSubmitter + SessionQuery + Send + Sync {
    /// Backend name (e.g. "mock").
    fn name(&self) -> &str;

    /// Network name (e.g. "testnet", "local").
    fn network(&self) -> &str;
}
