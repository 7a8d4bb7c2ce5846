//! Read-only projection handed to the UI.

use casino_core::{GameType, SessionId, Snapshot, Stage, Wager};
use client_blockchain_core::TxHandle;
use serde::{Deserialize, Serialize};

use super::registry::Phase;
use super::tentative::Tentative;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierView {
    pub enabled: bool,
    /// Toggle submitted but not yet acknowledged.
    pub tentative: bool,
}

impl From<&Tentative<bool>> for ModifierView {
    fn from(value: &Tentative<bool>) -> Self {
        Self {
            enabled: *value.value(),
            tentative: value.is_tentative(),
        }
    }
}

/// Everything the table renders, copied out of the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: Phase,
    pub session_id: Option<SessionId>,
    pub game_type: Option<GameType>,
    pub stake: u64,
    pub stage: Option<Stage>,
    pub snapshot: Option<Snapshot>,
    /// Confirmed wagers first, then staged ones.
    pub wagers: Vec<Wager>,
    pub pending_moves: usize,
    pub balance: Option<u64>,
    pub last_tx: Option<TxHandle>,
    pub shield: ModifierView,
    pub double: ModifierView,
    /// Craps roll totals since the last seven.
    pub roll_history: Vec<u8>,
    pub plan_queued: bool,
}

impl SessionView {
    /// Whether the UI should accept a new player command.
    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::InPlay
    }

    pub fn staged_count(&self) -> usize {
        self.wagers.iter().filter(|wager| wager.is_staged()).count()
    }
}
