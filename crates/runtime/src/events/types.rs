//! Event types for different topics.

use casino_core::{GameType, SessionId, Stage};
use client_blockchain_core::{Modifier, TxHandle};
use serde::{Deserialize, Serialize};

/// Session lifecycle transitions, in the order the reconciler applies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Session id generated and start submitted.
    Begun {
        session_id: SessionId,
        game_type: GameType,
        stake: u64,
    },

    /// Ledger acknowledged the session (push signal or watchdog query).
    Confirmed {
        session_id: SessionId,
        stage: Option<Stage>,
    },

    /// Commands accepted by the transport.
    Submitted {
        session_id: SessionId,
        commands: usize,
        tx: Option<TxHandle>,
    },

    /// Transport rejected a submission; staged wagers and pending moves
    /// were rolled back.
    Reverted { session_id: SessionId, reason: String },

    /// A new state blob was applied.
    Advanced {
        session_id: SessionId,
        stage: Option<Stage>,
        pending_moves: usize,
    },

    /// Session settled; the matching entry is on the ledger topic.
    Completed { session_id: SessionId, net: i64 },

    /// Session dropped without settlement.
    Abandoned { session_id: SessionId, reason: String },

    BalanceChanged { balance: u64 },

    ModifierChanged {
        modifier: Modifier,
        enabled: bool,
        tentative: bool,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            SessionEvent::Begun { session_id, .. }
            | SessionEvent::Confirmed { session_id, .. }
            | SessionEvent::Submitted { session_id, .. }
            | SessionEvent::Reverted { session_id, .. }
            | SessionEvent::Advanced { session_id, .. }
            | SessionEvent::Completed { session_id, .. }
            | SessionEvent::Abandoned { session_id, .. } => Some(*session_id),
            SessionEvent::BalanceChanged { .. } | SessionEvent::ModifierChanged { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One display line for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}
