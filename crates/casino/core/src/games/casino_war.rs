//! Casino War: `[2][version]` then `[stage][player][dealer]`, with v2 adding
//! `[tie bet:u64]`.
use bytes::BufMut;

use crate::card::CardSlot;
use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, PlayerMove, SideWager, StateReader,
    amount_payload, unsupported,
};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;
use crate::wager::Wager;

const GAME: GameType = GameType::CasinoWar;

/// Wager kind used for the tie side bet in [`CasinoWarState::wagers`].
pub const TIE_BET: u8 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum WarStage {
    #[default]
    Betting = 0,
    /// First cards tied; waiting for war or surrender.
    War = 1,
    Complete = 2,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CasinoWarState {
    pub version: u8,
    pub stage: WarStage,
    pub player: CardSlot,
    pub dealer: CardSlot,
    pub tie_bet: u64,
}

impl CasinoWarState {
    pub fn stage(&self) -> Stage {
        match self.stage {
            WarStage::Betting => Stage::Betting,
            WarStage::War => Stage::Playing,
            WarStage::Complete => Stage::Result,
        }
    }

    pub fn wagers(&self) -> Vec<Wager> {
        if self.tie_bet == 0 {
            Vec::new()
        } else {
            vec![Wager::confirmed(TIE_BET, 0, self.tie_bet)]
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = StateReader::new(GAME, bytes)?;
        let prefix = reader.u8()?;
        if prefix != GAME.id() {
            return Err(DecodeError::GamePrefix {
                game: GAME,
                found: prefix,
            });
        }
        let version = reader.u8()?;
        match version {
            1 => reader.require_total(5)?,
            2 => reader.require_total(13)?,
            other => return Err(reader.unsupported_version(other)),
        }
        let stage = reader.field("stage", WarStage::from_repr)?;
        let player = reader.card("player card")?;
        let dealer = reader.card("dealer card")?;
        let tie_bet = if version >= 2 { reader.u64()? } else { 0 };

        Ok(Self {
            version,
            stage,
            player,
            dealer,
            tie_bet,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(13);
        buf.put_u8(GAME.id());
        buf.put_u8(self.version);
        buf.put_u8(self.stage as u8);
        buf.put_u8(self.player.to_byte());
        buf.put_u8(self.dealer.to_byte());
        if self.version >= 2 {
            buf.put_u64(self.tie_bet);
        }
        buf
    }

    fn compare(&self) -> Option<std::cmp::Ordering> {
        let player = self.player.card()?.rank().high_value();
        let dealer = self.dealer.card()?.rank().high_value();
        Some(player.cmp(&dealer))
    }

    pub fn resolve(&self) -> Vec<ResolvedWager> {
        use std::cmp::Ordering;

        let main = match (self.stage, self.compare()) {
            (WarStage::Complete, Some(Ordering::Greater)) => WagerOutcome::Win,
            (WarStage::Complete, Some(Ordering::Less)) => WagerOutcome::Loss,
            (WarStage::Complete, Some(Ordering::Equal)) => WagerOutcome::Push,
            _ => WagerOutcome::Pending,
        };
        let mut lines = vec![ResolvedWager::on_stake("War", main)];
        if self.tie_bet > 0 {
            let tie = match self.compare() {
                Some(Ordering::Equal) => WagerOutcome::Win,
                Some(_) => WagerOutcome::Loss,
                None => WagerOutcome::Pending,
            };
            lines.push(ResolvedWager::new("Tie", self.tie_bet, tie));
        }
        lines
    }

    pub fn describe(&self) -> Option<String> {
        self.compare()
            .map(|_| format!("{} vs {}", self.player, self.dealer))
    }
}

pub struct CasinoWarCodec;

impl GameCodec for CasinoWarCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::Advance => Ok(vec![0]),
            Command::Move(PlayerMove::War) => Ok(vec![1]),
            Command::Move(PlayerMove::Surrender) => Ok(vec![2]),
            Command::SetSideWager {
                side: SideWager::Tie,
                amount,
            } => amount_payload(3, *amount),
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        CasinoWarState::from_bytes(bytes).map(Snapshot::CasinoWar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_game_prefix() {
        assert_eq!(
            CasinoWarState::from_bytes(&[3, 1, 0, 0xFF, 0xFF]),
            Err(DecodeError::GamePrefix {
                game: GameType::CasinoWar,
                found: 3,
            })
        );
    }

    #[test]
    fn decodes_both_versions() {
        // v1: complete, K♠ vs 9♥.
        let v1 = [2, 1, 2, 12, 21];
        let state = CasinoWarState::from_bytes(&v1).unwrap();
        assert_eq!(state.stage(), Stage::Result);
        assert_eq!(state.resolve()[0].outcome, WagerOutcome::Win);
        assert_eq!(state.describe().as_deref(), Some("K♠ vs 9♥"));
        assert_eq!(state.to_bytes(), v1);

        // v2 during betting with a tie bet of 10.
        let mut v2 = vec![2, 2, 0, 0xFF, 0xFF];
        v2.extend_from_slice(&10u64.to_be_bytes());
        let state = CasinoWarState::from_bytes(&v2).unwrap();
        assert_eq!(state.stage(), Stage::Betting);
        assert_eq!(state.wagers(), vec![Wager::confirmed(TIE_BET, 0, 10)]);
        assert_eq!(state.to_bytes(), v2);

        assert!(matches!(
            CasinoWarState::from_bytes(&v2[..9]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn tie_goes_to_war() {
        // 7♠ vs 7♦ during war: tie bet wins, main is still open.
        let mut bytes = vec![2, 2, 1, 6, 32];
        bytes.extend_from_slice(&5u64.to_be_bytes());
        let state = CasinoWarState::from_bytes(&bytes).unwrap();
        assert_eq!(state.stage(), Stage::Playing);
        let lines = state.resolve();
        assert_eq!(lines[0].outcome, WagerOutcome::Pending);
        assert_eq!(lines[1], ResolvedWager::new("Tie", 5, WagerOutcome::Win));
    }

    #[test]
    fn encodes_actions() {
        let codec = CasinoWarCodec;
        assert_eq!(codec.encode_command(&Command::Advance).unwrap(), vec![0]);
        assert_eq!(codec.encode_command(&Command::Move(PlayerMove::War)).unwrap(), vec![1]);
        let tie = codec
            .encode_command(&Command::SetSideWager {
                side: SideWager::Tie,
                amount: 3,
            })
            .unwrap();
        assert_eq!(tie[0], 3);
        assert_eq!(tie.len(), 9);
    }
}
