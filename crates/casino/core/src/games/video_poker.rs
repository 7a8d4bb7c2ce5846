//! Jacks-or-better video poker: `[stage][c1..c5]` + optional `[rank]`.
use crate::card::{Card, CardSlot};
use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, PlayerMove, StateReader, unsupported,
};
use crate::eval::{PokerCategory, evaluate_five};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;

const GAME: GameType = GameType::VideoPoker;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum VideoPokerStage {
    /// Initial five dealt, waiting for holds.
    #[default]
    Deal = 0,
    Complete = 1,
}

/// Paytable ranks reported by the ledger.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::FromRepr, strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum VideoPokerRank {
    #[strum(serialize = "No Win")]
    HighCard = 0,
    #[strum(serialize = "Jacks or Better")]
    JacksOrBetter = 1,
    #[strum(serialize = "Two Pair")]
    TwoPair = 2,
    #[strum(serialize = "Three of a Kind")]
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    #[strum(serialize = "Full House")]
    FullHouse = 6,
    #[strum(serialize = "Four of a Kind")]
    FourOfAKind = 7,
    #[strum(serialize = "Straight Flush")]
    StraightFlush = 8,
    #[strum(serialize = "Royal Flush")]
    RoyalFlush = 9,
}

impl VideoPokerRank {
    /// Paytable rank of a five-card hand; pairs below jacks pay nothing.
    pub fn of(cards: [Card; 5]) -> Self {
        let value = evaluate_five(cards);
        match value.category {
            PokerCategory::HighCard => VideoPokerRank::HighCard,
            PokerCategory::Pair if value.ranks.first().is_some_and(|&r| r >= 11) => {
                VideoPokerRank::JacksOrBetter
            }
            PokerCategory::Pair => VideoPokerRank::HighCard,
            PokerCategory::TwoPair => VideoPokerRank::TwoPair,
            PokerCategory::ThreeOfAKind => VideoPokerRank::ThreeOfAKind,
            PokerCategory::Straight => VideoPokerRank::Straight,
            PokerCategory::Flush => VideoPokerRank::Flush,
            PokerCategory::FullHouse => VideoPokerRank::FullHouse,
            PokerCategory::FourOfAKind => VideoPokerRank::FourOfAKind,
            PokerCategory::StraightFlush => VideoPokerRank::StraightFlush,
            PokerCategory::RoyalFlush => VideoPokerRank::RoyalFlush,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoPokerState {
    pub stage: VideoPokerStage,
    pub cards: [CardSlot; 5],
    pub rank: Option<VideoPokerRank>,
}

impl VideoPokerState {
    pub fn stage(&self) -> Stage {
        match self.stage {
            VideoPokerStage::Deal => Stage::Playing,
            VideoPokerStage::Complete => Stage::Result,
        }
    }

    /// Rank reported by the ledger, or evaluated locally once all five
    /// cards are face up.
    pub fn hand_rank(&self) -> Option<VideoPokerRank> {
        if self.rank.is_some() {
            return self.rank;
        }
        let mut cards = [Card::new(0)?; 5];
        for (slot, card) in self.cards.iter().zip(cards.iter_mut()) {
            *card = slot.card()?;
        }
        Some(VideoPokerRank::of(cards))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = StateReader::new(GAME, bytes)?;
        reader.require_total(6)?;
        let stage = reader.field("stage", VideoPokerStage::from_repr)?;
        let cards = reader.cards::<5>("hand card")?;
        let rank = match reader.optional_u8() {
            Some(byte) => Some(
                VideoPokerRank::from_repr(byte).ok_or_else(|| reader.invalid("hand rank", byte))?,
            ),
            None => None,
        };
        Ok(Self { stage, cards, rank })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(7);
        buf.push(self.stage as u8);
        buf.extend(self.cards.iter().map(|slot| slot.to_byte()));
        if let Some(rank) = self.rank {
            buf.push(rank as u8);
        }
        buf
    }

    pub fn resolve(&self) -> Vec<ResolvedWager> {
        let outcome = match (self.stage, self.hand_rank()) {
            (VideoPokerStage::Complete, Some(VideoPokerRank::HighCard)) => WagerOutcome::Loss,
            (VideoPokerStage::Complete, Some(_)) => WagerOutcome::Win,
            _ => WagerOutcome::Pending,
        };
        vec![ResolvedWager::on_stake("Hand", outcome)]
    }

    pub fn describe(&self) -> Option<String> {
        self.hand_rank().map(|rank| rank.to_string())
    }
}

pub struct VideoPokerCodec;

impl GameCodec for VideoPokerCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::Move(PlayerMove::Hold { mask }) => Ok(vec![0, mask & 0b1_1111]),
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        VideoPokerState::from_bytes(bytes).map(Snapshot::VideoPoker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_with_and_without_rank() {
        // J♠ J♥ 4♦ 7♣ 9♠, waiting for holds.
        let dealt = [0, 10, 23, 29, 45, 8];
        let state = VideoPokerState::from_bytes(&dealt).unwrap();
        assert_eq!(state.stage(), Stage::Playing);
        assert_eq!(state.rank, None);
        assert_eq!(state.hand_rank(), Some(VideoPokerRank::JacksOrBetter));
        assert_eq!(state.to_bytes(), dealt);

        let ranked = [1, 10, 23, 29, 45, 8, 1];
        let state = VideoPokerState::from_bytes(&ranked).unwrap();
        assert_eq!(state.stage(), Stage::Result);
        assert_eq!(state.resolve()[0].outcome, WagerOutcome::Win);
        assert_eq!(state.describe().as_deref(), Some("Jacks or Better"));
    }

    #[test]
    fn low_pair_pays_nothing() {
        // 5♠ 5♥ K♦ 2♣ 9♠
        let bytes = [1, 4, 17, 38, 40, 8];
        let state = VideoPokerState::from_bytes(&bytes).unwrap();
        assert_eq!(state.hand_rank(), Some(VideoPokerRank::HighCard));
        assert_eq!(state.resolve()[0].outcome, WagerOutcome::Loss);
    }

    #[test]
    fn rejects_short_blob_and_bad_rank() {
        assert!(matches!(
            VideoPokerState::from_bytes(&[0, 1, 2]),
            Err(DecodeError::Truncated { .. })
        ));
        assert!(matches!(
            VideoPokerState::from_bytes(&[1, 0, 1, 2, 3, 4, 10]),
            Err(DecodeError::InvalidField { field: "hand rank", .. })
        ));
    }

    #[test]
    fn hold_mask_is_clamped_to_five_bits() {
        let payload = VideoPokerCodec
            .encode_command(&Command::Move(PlayerMove::Hold { mask: 0xFF }))
            .unwrap();
        assert_eq!(payload, vec![0, 0b1_1111]);
    }
}
