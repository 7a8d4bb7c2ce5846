//! Deferred "do X once the session exists" plans.
//!
//! A player may act before the ledger has confirmed their session. The plan
//! waits here and is taken exactly once, by whichever of the start signal
//! or the watchdog query sees the confirmed session first.

use casino_core::{Command, GameType, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("a plan for session {queued} is already queued")]
    Occupied { queued: SessionId },

    #[error("session {0} is already confirmed; submit directly")]
    AlreadyConfirmed(SessionId),

    #[error("auto-play plan has no steps")]
    Empty,
}

/// Command sequence replayed once `session_id` is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoPlayPlan {
    pub session_id: SessionId,
    pub game_type: GameType,
    pub steps: Vec<Command>,
}

impl AutoPlayPlan {
    pub fn new(session_id: SessionId, game_type: GameType, steps: Vec<Command>) -> Self {
        Self {
            session_id,
            game_type,
            steps,
        }
    }
}

/// Holds at most one outstanding plan.
#[derive(Debug, Default)]
pub struct Planner {
    plan: Option<AutoPlayPlan>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_queued(&self) -> bool {
        self.plan.is_some()
    }

    pub fn queued_for(&self) -> Option<SessionId> {
        self.plan.as_ref().map(|plan| plan.session_id)
    }

    /// Queues `plan`, replacing one bound to the same session.
    pub fn queue(&mut self, plan: AutoPlayPlan) -> Result<(), PlanError> {
        if plan.steps.is_empty() {
            return Err(PlanError::Empty);
        }
        if let Some(existing) = &self.plan
            && existing.session_id != plan.session_id
        {
            return Err(PlanError::Occupied {
                queued: existing.session_id,
            });
        }
        debug!(session_id = %plan.session_id, steps = plan.steps.len(), "auto-play queued");
        self.plan = Some(plan);
        Ok(())
    }

    /// Takes the plan bound to `session_id`; later calls get `None`.
    ///
    /// A plan whose game does not match is dropped.
    pub fn consume(&mut self, session_id: SessionId, game_type: GameType) -> Option<AutoPlayPlan> {
        if self.queued_for() != Some(session_id) {
            return None;
        }
        let plan = self.plan.take()?;
        if plan.game_type != game_type {
            warn!(
                %session_id,
                planned = %plan.game_type,
                confirmed = %game_type,
                "auto-play plan discarded: game mismatch"
            );
            return None;
        }
        Some(plan)
    }

    /// Drops the plan if it is bound to `session_id`.
    pub fn discard(&mut self, session_id: SessionId) -> bool {
        if self.queued_for() == Some(session_id) {
            self.plan = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use casino_core::WagerSpec;

    use super::*;

    const ID: SessionId = SessionId(3);

    fn plan(id: SessionId) -> AutoPlayPlan {
        AutoPlayPlan::new(
            id,
            GameType::SicBo,
            vec![Command::PlaceWager(WagerSpec::new(0, 0, 5)), Command::Advance],
        )
    }

    #[test]
    fn consumed_at_most_once() {
        let mut planner = Planner::new();
        planner.queue(plan(ID)).unwrap();
        assert_eq!(planner.consume(ID, GameType::SicBo).unwrap().steps.len(), 2);
        assert!(planner.consume(ID, GameType::SicBo).is_none());
    }

    #[test]
    fn replaces_only_for_same_session() {
        let mut planner = Planner::new();
        planner.queue(plan(ID)).unwrap();
        planner.queue(plan(ID)).unwrap();
        assert_eq!(
            planner.queue(plan(SessionId(4))),
            Err(PlanError::Occupied { queued: ID })
        );
        assert!(planner.consume(SessionId(4), GameType::SicBo).is_none());
        assert!(planner.is_queued());
        assert!(planner.discard(ID));
        assert!(!planner.is_queued());
    }

    #[test]
    fn game_mismatch_drops_plan() {
        let mut planner = Planner::new();
        planner.queue(plan(ID)).unwrap();
        assert!(planner.consume(ID, GameType::Craps).is_none());
        assert!(!planner.is_queued());
        assert_eq!(
            planner.queue(AutoPlayPlan::new(ID, GameType::SicBo, Vec::new())),
            Err(PlanError::Empty)
        );
    }
}
