//! The single "current session" slot.
//!
//! Only the reconciler holds a `&mut SessionRegistry`; everything else sees
//! [`SessionView`](super::SessionView) copies. Every mutating call names the
//! session it targets and fails on a mismatch, so a late signal for an
//! abandoned session can never touch its successor.

use std::collections::VecDeque;

use casino_core::{
    GameType, SessionId, Snapshot, Wager, WagerSpec, merge_wagers, settle_staged,
};
use client_blockchain_core::TxHandle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("session {0} is still active")]
    AlreadyActive(SessionId),

    #[error("no active session")]
    NoActiveSession,

    #[error("signal for session {found} does not match active session {active}")]
    SessionMismatch { active: SessionId, found: SessionId },
}

/// Reconciliation phase, derived from the registry contents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Phase {
    #[default]
    Idle,
    /// Start submitted; waiting for the ledger to acknowledge the session.
    AwaitingStart,
    InPlay,
    /// Commands submitted; waiting for their state signals.
    AwaitingCompletion,
}

/// Kind of command whose state signal is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InFlight {
    Advance,
    Other,
}

#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub id: SessionId,
    pub game_type: GameType,
    pub stake: u64,
    pub confirmed: bool,
    /// Last snapshot that decoded cleanly.
    pub snapshot: Option<Snapshot>,
    /// Balance captured when the session began.
    pub starting_balance: Option<u64>,
    /// Chips committed by accepted commands on top of the stake.
    pub wagered: u64,
    pub staged: Vec<Wager>,
    pub last_tx: Option<TxHandle>,
    in_flight: VecDeque<InFlight>,
}

impl ActiveSession {
    pub fn pending_moves(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a roll or deal is among the outstanding commands.
    pub(crate) fn awaits_advance(&self) -> bool {
        self.in_flight.contains(&InFlight::Advance)
    }

    /// Confirmed wagers followed by staged ones.
    pub fn wagers(&self) -> Vec<Wager> {
        let confirmed = self
            .snapshot
            .as_ref()
            .map(Snapshot::wagers)
            .unwrap_or_default();
        merge_wagers(&self.staged, &confirmed)
    }

    /// Stake plus every chip committed since.
    pub fn total_wagered(&self) -> u64 {
        self.stake.saturating_add(self.wagered)
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    active: Option<ActiveSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.active.as_ref().is_some_and(|session| session.id == id)
    }

    pub fn phase(&self) -> Phase {
        match &self.active {
            None => Phase::Idle,
            Some(session) if !session.confirmed => Phase::AwaitingStart,
            Some(session) if session.pending_moves() > 0 => Phase::AwaitingCompletion,
            Some(_) => Phase::InPlay,
        }
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut ActiveSession, RegistryError> {
        match self.active.as_mut() {
            Some(session) if session.id == id => Ok(session),
            Some(session) => Err(RegistryError::SessionMismatch {
                active: session.id,
                found: id,
            }),
            None => Err(RegistryError::NoActiveSession),
        }
    }

    /// Stores a provisional entry for a locally generated id.
    pub fn begin(
        &mut self,
        id: SessionId,
        game_type: GameType,
        stake: u64,
        starting_balance: Option<u64>,
    ) -> Result<(), RegistryError> {
        if let Some(session) = &self.active {
            return Err(RegistryError::AlreadyActive(session.id));
        }
        self.active = Some(ActiveSession {
            id,
            game_type,
            stake,
            confirmed: false,
            snapshot: None,
            starting_balance,
            wagered: 0,
            staged: Vec::new(),
            last_tx: None,
            in_flight: VecDeque::new(),
        });
        Ok(())
    }

    /// Marks the session confirmed with its initial snapshot, if any.
    ///
    /// Returns `false` if it was already confirmed.
    pub fn bind(
        &mut self,
        id: SessionId,
        snapshot: Option<Snapshot>,
    ) -> Result<bool, RegistryError> {
        let session = self.session_mut(id)?;
        if session.confirmed {
            return Ok(false);
        }
        session.confirmed = true;
        session.in_flight.clear();
        if snapshot.is_some() {
            session.snapshot = snapshot;
        }
        Ok(true)
    }

    /// Replaces the snapshot and settles staged wagers the ledger confirmed.
    ///
    /// Returns the snapshot it replaced.
    pub fn advance(
        &mut self,
        id: SessionId,
        snapshot: Snapshot,
    ) -> Result<Option<Snapshot>, RegistryError> {
        let session = self.session_mut(id)?;
        let previous_wagers = session
            .snapshot
            .as_ref()
            .map(Snapshot::wagers)
            .unwrap_or_default();
        session.staged = settle_staged(&session.staged, &previous_wagers, &snapshot.wagers());
        Ok(session.snapshot.replace(snapshot))
    }

    pub fn end(&mut self) -> Option<ActiveSession> {
        self.active.take()
    }

    pub fn stage(&mut self, id: SessionId, specs: &[WagerSpec]) -> Result<(), RegistryError> {
        let session = self.session_mut(id)?;
        session
            .staged
            .extend(specs.iter().copied().map(Wager::staged));
        Ok(())
    }

    /// Removes one staged copy of each spec.
    pub fn unstage(&mut self, id: SessionId, specs: &[WagerSpec]) -> Result<(), RegistryError> {
        let session = self.session_mut(id)?;
        for spec in specs {
            let staged = Wager::staged(*spec);
            if let Some(idx) = session
                .staged
                .iter()
                .rposition(|wager| wager.same_stake(&staged))
            {
                session.staged.remove(idx);
            }
        }
        Ok(())
    }

    pub fn discard_staged(&mut self, id: SessionId) -> Result<(), RegistryError> {
        self.session_mut(id)?.staged.clear();
        Ok(())
    }

    pub(crate) fn push_in_flight(
        &mut self,
        id: SessionId,
        moves: impl IntoIterator<Item = InFlight>,
    ) -> Result<usize, RegistryError> {
        let session = self.session_mut(id)?;
        session.in_flight.extend(moves);
        Ok(session.in_flight.len())
    }

    /// Retires the oldest outstanding move. `None` if none was outstanding.
    pub(crate) fn pop_in_flight(
        &mut self,
        id: SessionId,
    ) -> Result<Option<InFlight>, RegistryError> {
        Ok(self.session_mut(id)?.in_flight.pop_front())
    }

    pub fn clear_pending(&mut self, id: SessionId) -> Result<(), RegistryError> {
        self.session_mut(id)?.in_flight.clear();
        Ok(())
    }

    pub fn record_wagered(&mut self, id: SessionId, amount: u64) -> Result<(), RegistryError> {
        let session = self.session_mut(id)?;
        session.wagered = session.wagered.saturating_add(amount);
        Ok(())
    }

    pub fn record_tx(&mut self, id: SessionId, tx: TxHandle) -> Result<(), RegistryError> {
        self.session_mut(id)?.last_tx = Some(tx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use casino_core::games::RouletteState;

    use super::*;

    const ID: SessionId = SessionId(11);

    fn roulette(wagers: Vec<Wager>) -> Snapshot {
        Snapshot::Roulette(RouletteState {
            wagers,
            ..RouletteState::default()
        })
    }

    #[test]
    fn one_session_at_a_time() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.phase(), Phase::Idle);
        registry.begin(ID, GameType::Roulette, 10, Some(100)).unwrap();
        assert_eq!(registry.phase(), Phase::AwaitingStart);
        assert_eq!(
            registry.begin(SessionId(12), GameType::Craps, 10, None),
            Err(RegistryError::AlreadyActive(ID))
        );

        assert!(registry.bind(ID, None).unwrap());
        assert!(!registry.bind(ID, None).unwrap());
        assert_eq!(registry.phase(), Phase::InPlay);

        registry.push_in_flight(ID, [InFlight::Other, InFlight::Advance]).unwrap();
        assert_eq!(registry.phase(), Phase::AwaitingCompletion);
        assert_eq!(registry.pop_in_flight(ID).unwrap(), Some(InFlight::Other));

        let ended = registry.end().unwrap();
        assert_eq!(ended.pending_moves(), 1);
        assert_eq!(registry.phase(), Phase::Idle);
    }

    #[test]
    fn mismatched_id_is_rejected() {
        let mut registry = SessionRegistry::new();
        registry.begin(ID, GameType::Roulette, 10, None).unwrap();
        assert_eq!(
            registry.advance(SessionId(99), roulette(Vec::new())),
            Err(RegistryError::SessionMismatch {
                active: ID,
                found: SessionId(99),
            })
        );
        assert!(registry.current().unwrap().snapshot.is_none());
    }

    #[test]
    fn confirmed_copy_replaces_staged() {
        let mut registry = SessionRegistry::new();
        registry.begin(ID, GameType::Roulette, 10, None).unwrap();
        registry.bind(ID, Some(roulette(Vec::new()))).unwrap();

        let red = WagerSpec::new(1, 0, 5);
        let straight = WagerSpec::new(0, 17, 2);
        registry.stage(ID, &[red, straight]).unwrap();
        assert_eq!(registry.current().unwrap().wagers().len(), 2);

        registry
            .advance(ID, roulette(vec![Wager::confirmed(1, 0, 5)]))
            .unwrap();
        let wagers = registry.current().unwrap().wagers();
        assert_eq!(wagers.len(), 2);
        assert!(!wagers[0].is_staged());
        assert!(wagers[1].is_staged());

        registry.unstage(ID, &[straight]).unwrap();
        assert_eq!(registry.current().unwrap().wagers().len(), 1);
    }
}
