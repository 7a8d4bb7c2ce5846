//! Decoded game state, one variant per table.
use crate::game::{GameType, Stage};
use crate::games::{
    BaccaratState, BlackjackState, CasinoWarState, CrapsState, HiLoState, RouletteState,
    SicBoState, ThreeCardState, UltimateHoldemState, VideoPokerState,
};
use crate::ledger::ResolvedWager;
use crate::wager::Wager;

/// Typed view of a session's on-ledger state blob.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "game", rename_all = "snake_case"))]
pub enum Snapshot {
    Baccarat(BaccaratState),
    Blackjack(BlackjackState),
    CasinoWar(CasinoWarState),
    Craps(CrapsState),
    VideoPoker(VideoPokerState),
    HiLo(HiLoState),
    Roulette(RouletteState),
    SicBo(SicBoState),
    ThreeCard(ThreeCardState),
    UltimateHoldem(UltimateHoldemState),
}

impl Snapshot {
    pub fn game_type(&self) -> GameType {
        match self {
            Snapshot::Baccarat(_) => GameType::Baccarat,
            Snapshot::Blackjack(_) => GameType::Blackjack,
            Snapshot::CasinoWar(_) => GameType::CasinoWar,
            Snapshot::Craps(_) => GameType::Craps,
            Snapshot::VideoPoker(_) => GameType::VideoPoker,
            Snapshot::HiLo(_) => GameType::HiLo,
            Snapshot::Roulette(_) => GameType::Roulette,
            Snapshot::SicBo(_) => GameType::SicBo,
            Snapshot::ThreeCard(_) => GameType::ThreeCard,
            Snapshot::UltimateHoldem(_) => GameType::UltimateHoldem,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Snapshot::Baccarat(state) => state.stage(),
            Snapshot::Blackjack(state) => state.stage(),
            Snapshot::CasinoWar(state) => state.stage(),
            Snapshot::Craps(state) => state.stage(),
            Snapshot::VideoPoker(state) => state.stage(),
            Snapshot::HiLo(state) => state.stage(),
            Snapshot::Roulette(state) => state.stage(),
            Snapshot::SicBo(state) => state.stage(),
            Snapshot::ThreeCard(state) => state.stage(),
            Snapshot::UltimateHoldem(state) => state.stage(),
        }
    }

    /// Wagers the ledger has confirmed, in the order it reports them.
    pub fn wagers(&self) -> Vec<Wager> {
        match self {
            Snapshot::Baccarat(state) => state.wagers.clone(),
            Snapshot::SicBo(state) => state.wagers.clone(),
            Snapshot::Roulette(state) => state.wagers.clone(),
            Snapshot::Craps(state) => state.wagers(),
            Snapshot::Blackjack(state) => state.wagers(),
            Snapshot::CasinoWar(state) => state.wagers(),
            Snapshot::ThreeCard(state) => state.wagers(),
            Snapshot::UltimateHoldem(state) => state.wagers(),
            Snapshot::VideoPoker(_) | Snapshot::HiLo(_) => Vec::new(),
        }
    }

    /// Re-encodes the snapshot in the layout it was decoded from.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Snapshot::Baccarat(state) => state.to_bytes(),
            Snapshot::Blackjack(state) => state.to_bytes(),
            Snapshot::CasinoWar(state) => state.to_bytes(),
            Snapshot::Craps(state) => state.to_bytes(),
            Snapshot::VideoPoker(state) => state.to_bytes(),
            Snapshot::HiLo(state) => state.to_bytes(),
            Snapshot::Roulette(state) => state.to_bytes(),
            Snapshot::SicBo(state) => state.to_bytes(),
            Snapshot::ThreeCard(state) => state.to_bytes(),
            Snapshot::UltimateHoldem(state) => state.to_bytes(),
        }
    }

    /// Per-wager outcomes as far as the visible state allows.
    pub fn resolve(&self) -> Vec<ResolvedWager> {
        match self {
            Snapshot::Baccarat(state) => state.resolve(),
            Snapshot::Blackjack(state) => state.resolve(),
            Snapshot::CasinoWar(state) => state.resolve(),
            Snapshot::Craps(state) => state.resolve(),
            Snapshot::VideoPoker(state) => state.resolve(),
            Snapshot::HiLo(state) => state.resolve(),
            Snapshot::Roulette(state) => state.resolve(),
            Snapshot::SicBo(state) => state.resolve(),
            Snapshot::ThreeCard(state) => state.resolve(),
            Snapshot::UltimateHoldem(state) => state.resolve(),
        }
    }

    /// Short human context for headlines, e.g. `Player 9 / Banker 7`.
    pub fn describe(&self) -> Option<String> {
        match self {
            Snapshot::Baccarat(state) => state.describe(),
            Snapshot::Blackjack(state) => state.describe(),
            Snapshot::CasinoWar(state) => state.describe(),
            Snapshot::Craps(state) => state.describe(),
            Snapshot::VideoPoker(state) => state.describe(),
            Snapshot::HiLo(state) => state.describe(),
            Snapshot::Roulette(state) => state.describe(),
            Snapshot::SicBo(state) => state.describe(),
            Snapshot::ThreeCard(state) => state.describe(),
            Snapshot::UltimateHoldem(state) => state.describe(),
        }
    }

    pub fn as_craps(&self) -> Option<&CrapsState> {
        match self {
            Snapshot::Craps(state) => Some(state),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_state;

    #[test]
    fn dispatches_by_variant() {
        let mut bytes = vec![12];
        bytes.extend_from_slice(&20_000u64.to_be_bytes());
        let snapshot = decode_state(GameType::HiLo, &bytes).unwrap();
        assert_eq!(snapshot.game_type(), GameType::HiLo);
        assert_eq!(snapshot.stage(), Stage::Playing);
        assert!(snapshot.wagers().is_empty());
        assert_eq!(snapshot.describe().as_deref(), Some("x2.00 on K♠"));
        assert_eq!(snapshot.to_bytes(), bytes);
        assert!(snapshot.as_craps().is_none());
    }
}
