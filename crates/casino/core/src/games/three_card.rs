//! Three Card Poker.
//!
//! ```text
//! v1: [1][stage][p1 p2 p3][d1 d2 d3]
//! v2: v1 body followed by [pair plus:u64]
//! v3: v2 body followed by [six card bonus:u64][progressive:u64]
//! ```
use bytes::BufMut;

use crate::card::{Card, CardSlot};
use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, PlayerMove, SideWager, StateReader,
    amount_payload, unsupported,
};
use crate::eval::{PokerCategory, ThreeCardCategory, ThreeCardValue, best_hand, evaluate_three};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;
use crate::wager::Wager;

const GAME: GameType = GameType::ThreeCard;

pub const PAIR_PLUS: u8 = 1;
pub const SIX_CARD_BONUS: u8 = 2;
pub const PROGRESSIVE: u8 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ThreeCardStage {
    #[default]
    Betting = 0,
    /// Cards dealt; player chooses play or fold.
    Decision = 1,
    AwaitingReveal = 2,
    Complete = 3,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreeCardState {
    pub version: u8,
    pub stage: ThreeCardStage,
    pub player: [CardSlot; 3],
    pub dealer: [CardSlot; 3],
    pub pair_plus: u64,
    pub six_card_bonus: u64,
    pub progressive: u64,
}

fn face_up(slots: &[CardSlot; 3]) -> Option<[Card; 3]> {
    Some([slots[0].card()?, slots[1].card()?, slots[2].card()?])
}

impl ThreeCardState {
    pub fn stage(&self) -> Stage {
        match self.stage {
            ThreeCardStage::Betting => Stage::Betting,
            ThreeCardStage::Decision | ThreeCardStage::AwaitingReveal => Stage::Playing,
            ThreeCardStage::Complete => Stage::Result,
        }
    }

    pub fn player_hand(&self) -> Option<ThreeCardValue> {
        face_up(&self.player).map(evaluate_three)
    }

    pub fn dealer_hand(&self) -> Option<ThreeCardValue> {
        face_up(&self.dealer).map(evaluate_three)
    }

    pub fn wagers(&self) -> Vec<Wager> {
        [
            (PAIR_PLUS, self.pair_plus),
            (SIX_CARD_BONUS, self.six_card_bonus),
            (PROGRESSIVE, self.progressive),
        ]
        .into_iter()
        .filter(|&(_, amount)| amount > 0)
        .map(|(kind, amount)| Wager::confirmed(kind, 0, amount))
        .collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = StateReader::new(GAME, bytes)?;
        let version = reader.u8()?;
        match version {
            1 => reader.require_total(8)?,
            2 => reader.require_total(16)?,
            3 => reader.require_total(32)?,
            other => return Err(reader.unsupported_version(other)),
        }
        let stage = reader.field("stage", ThreeCardStage::from_repr)?;
        let player = reader.cards::<3>("player card")?;
        let dealer = reader.cards::<3>("dealer card")?;
        let pair_plus = if version >= 2 { reader.u64()? } else { 0 };
        let (six_card_bonus, progressive) = if version >= 3 {
            (reader.u64()?, reader.u64()?)
        } else {
            (0, 0)
        };

        Ok(Self {
            version,
            stage,
            player,
            dealer,
            pair_plus,
            six_card_bonus,
            progressive,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32);
        buf.put_u8(self.version);
        buf.put_u8(self.stage as u8);
        buf.extend(self.player.iter().map(|slot| slot.to_byte()));
        buf.extend(self.dealer.iter().map(|slot| slot.to_byte()));
        if self.version >= 2 {
            buf.put_u64(self.pair_plus);
        }
        if self.version >= 3 {
            buf.put_u64(self.six_card_bonus);
            buf.put_u64(self.progressive);
        }
        buf
    }

    pub fn resolve(&self) -> Vec<ResolvedWager> {
        let player = self.player_hand();
        let dealer = self.dealer_hand();
        let complete = self.stage == ThreeCardStage::Complete;

        let (ante, play) = match (&player, &dealer) {
            (Some(player), Some(dealer)) if complete => {
                if !dealer.dealer_qualifies() {
                    (WagerOutcome::Win, WagerOutcome::Push)
                } else {
                    match player.cmp(dealer) {
                        std::cmp::Ordering::Greater => (WagerOutcome::Win, WagerOutcome::Win),
                        std::cmp::Ordering::Less => (WagerOutcome::Loss, WagerOutcome::Loss),
                        std::cmp::Ordering::Equal => (WagerOutcome::Push, WagerOutcome::Push),
                    }
                }
            }
            _ => (WagerOutcome::Pending, WagerOutcome::Pending),
        };
        let mut lines = vec![
            ResolvedWager::on_stake("Ante", ante),
            ResolvedWager::on_stake("Play", play),
        ];

        if self.pair_plus > 0 {
            let outcome = match &player {
                Some(hand) if hand.category >= ThreeCardCategory::Pair => WagerOutcome::Win,
                Some(_) => WagerOutcome::Loss,
                None => WagerOutcome::Pending,
            };
            lines.push(ResolvedWager::new("Pair Plus", self.pair_plus, outcome));
        }
        if self.six_card_bonus > 0 {
            let outcome = match (face_up(&self.player), face_up(&self.dealer)) {
                (Some(player), Some(dealer)) => {
                    let six: Vec<Card> = player.into_iter().chain(dealer).collect();
                    match best_hand(&six) {
                        Some(best) if best.category >= PokerCategory::ThreeOfAKind => {
                            WagerOutcome::Win
                        }
                        _ => WagerOutcome::Loss,
                    }
                }
                _ => WagerOutcome::Pending,
            };
            lines.push(ResolvedWager::new("Six Card", self.six_card_bonus, outcome));
        }
        if self.progressive > 0 {
            let outcome = match &player {
                Some(hand) if hand.category >= ThreeCardCategory::StraightFlush => {
                    WagerOutcome::Win
                }
                Some(_) => WagerOutcome::Loss,
                None => WagerOutcome::Pending,
            };
            lines.push(ResolvedWager::new("Progressive", self.progressive, outcome));
        }
        lines
    }

    pub fn describe(&self) -> Option<String> {
        let player = self.player_hand()?;
        Some(match self.dealer_hand() {
            Some(dealer) => format!("{} vs {}", player.category, dealer.category),
            None => player.category.to_string(),
        })
    }
}

pub struct ThreeCardCodec;

impl GameCodec for ThreeCardCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::Move(PlayerMove::Play) => Ok(vec![0]),
            Command::Move(PlayerMove::Fold) => Ok(vec![1]),
            Command::Advance => Ok(vec![2]),
            Command::Reveal => Ok(vec![4]),
            Command::SetSideWager { side, amount } => match side {
                SideWager::PairPlus => amount_payload(3, *amount),
                SideWager::SixCardBonus => amount_payload(5, *amount),
                SideWager::Progressive => amount_payload(6, *amount),
                _ => Err(unsupported(GAME, command)),
            },
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        ThreeCardState::from_bytes(bytes).map(Snapshot::ThreeCard)
    }
}
