//! Unified error types surfaced by the runtime API.
//!
//! Every variant renders as a short sentence fit for direct display in the
//! table's message log.
use casino_core::{CasinoError, EncodeError, ErrorSeverity, GameType, SessionId};
use client_blockchain_core::{Modifier, TransportError};
use thiserror::Error;
use tokio::sync::oneshot;

pub use crate::planner::PlanError;
pub use crate::session::RegistryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("reconciler command channel closed")]
    CommandChannelClosed,

    #[error("reconciler reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("reconciler join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a chain to be configured before building")]
    MissingChain,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("session {0} is not confirmed yet")]
    NotConfirmed(SessionId),

    #[error("still pending: {pending} move(s) awaiting confirmation")]
    StillPending { session_id: SessionId, pending: usize },

    #[error("{} needs a stake greater than zero", .0.title())]
    InvalidStake(GameType),

    #[error("nothing to submit")]
    EmptyBatch,

    #[error("{0} toggle already in flight")]
    ModifierPending(Modifier),

    #[error("no account configured")]
    NoAccount,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CasinoError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_)
            | RuntimeError::MissingChain => ErrorSeverity::Internal,
            RuntimeError::StillPending { .. } | RuntimeError::ModifierPending(_) => {
                ErrorSeverity::Recoverable
            }
            RuntimeError::Encode(error) => error.severity(),
            RuntimeError::Transport(error) => error.severity(),
            _ => ErrorSeverity::Validation,
        }
    }
}
