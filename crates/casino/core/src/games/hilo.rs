//! Hi-Lo: `[card][multiplier_bps:u64]` + optional `[streak]`.
use bytes::BufMut;

use crate::card::CardSlot;
use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, PlayerMove, StateReader, unsupported,
};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;

const GAME: GameType = GameType::HiLo;

/// Basis points per 1.00x.
pub const BPS_PER_UNIT: u64 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HiLoState {
    pub card: CardSlot,
    /// Accumulated payout multiplier in basis points (10_000 = 1.00x).
    pub multiplier_bps: u64,
    pub streak: Option<u8>,
}

impl HiLoState {
    /// Hi-Lo has no separate betting phase; the stake rides every guess.
    pub fn stage(&self) -> Stage {
        Stage::Playing
    }

    pub fn multiplier_label(&self) -> String {
        format!(
            "x{}.{:02}",
            self.multiplier_bps / BPS_PER_UNIT,
            (self.multiplier_bps % BPS_PER_UNIT) / 100
        )
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = StateReader::new(GAME, bytes)?;
        reader.require_total(9)?;
        let card = reader.card("current card")?;
        let multiplier_bps = reader.u64()?;
        let streak = reader.optional_u8();
        Ok(Self {
            card,
            multiplier_bps,
            streak,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10);
        buf.put_u8(self.card.to_byte());
        buf.put_u64(self.multiplier_bps);
        if let Some(streak) = self.streak {
            buf.put_u8(streak);
        }
        buf
    }

    pub fn resolve(&self) -> Vec<ResolvedWager> {
        vec![ResolvedWager::new(
            format!("Ladder {}", self.multiplier_label()),
            0,
            WagerOutcome::Pending,
        )]
    }

    pub fn describe(&self) -> Option<String> {
        Some(match self.streak {
            Some(streak) => format!("{} on {}, streak {streak}", self.multiplier_label(), self.card),
            None => format!("{} on {}", self.multiplier_label(), self.card),
        })
    }
}

pub struct HiLoCodec;

impl GameCodec for HiLoCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::Move(PlayerMove::Higher) => Ok(vec![0]),
            Command::Move(PlayerMove::Lower) => Ok(vec![1]),
            Command::Move(PlayerMove::CashOut) => Ok(vec![2]),
            Command::Move(PlayerMove::Same) => Ok(vec![3]),
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        HiLoState::from_bytes(bytes).map(Snapshot::HiLo)
    }
}
