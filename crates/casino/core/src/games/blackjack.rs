//! Blackjack.
//!
//! ```text
//! v1: [1][stage][active][hands] {[mult][status][len][cards]} × hands [d_len][dealer cards]
//! v2: v1 body followed by [21+3 side bet:u64]
//! ```
use arrayvec::ArrayVec;
use bytes::BufMut;

use crate::card::{Card, CardSlot, Rank, revealed};
use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, PlayerMove, SideWager, StateReader,
    amount_payload, unsupported,
};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;
use crate::wager::Wager;

const GAME: GameType = GameType::Blackjack;

pub const MAX_HANDS: usize = 4;
pub const MAX_HAND_CARDS: usize = 11;

/// Wager kind used for the 21+3 side bet in [`BlackjackState::wagers`].
pub const TWENTY_ONE_PLUS_THREE: u8 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BlackjackStage {
    #[default]
    Betting = 0,
    PlayerTurn = 1,
    AwaitingReveal = 2,
    Complete = 3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum HandStatus {
    #[default]
    Playing = 0,
    Standing = 1,
    Busted = 2,
    Blackjack = 3,
    Surrendered = 4,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlackjackHand {
    /// 1 for a normal hand, 2 once doubled.
    pub bet_multiplier: u8,
    pub status: HandStatus,
    pub cards: ArrayVec<CardSlot, MAX_HAND_CARDS>,
}

impl BlackjackHand {
    pub fn value(&self) -> HandValue {
        hand_value(&revealed(&self.cards))
    }
}

/// Best blackjack total of a hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandValue {
    pub total: u8,
    /// An ace is still counted as eleven.
    pub soft: bool,
}

impl HandValue {
    pub fn is_bust(self) -> bool {
        self.total > 21
    }
}

pub fn hand_value(cards: &[Card]) -> HandValue {
    let mut total: u8 = 0;
    let mut aces = 0u8;
    for card in cards {
        total = total.saturating_add(match card.rank() {
            Rank::Ace => {
                aces += 1;
                11
            }
            rank => rank.pip_value().min(10),
        });
    }
    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    HandValue {
        total,
        soft: aces > 0,
    }
}

fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards).total == 21
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlackjackState {
    pub version: u8,
    pub stage: BlackjackStage,
    pub active_hand: u8,
    pub hands: ArrayVec<BlackjackHand, MAX_HANDS>,
    pub dealer: ArrayVec<CardSlot, MAX_HAND_CARDS>,
    pub twenty_one_plus_three: u64,
}

impl Default for BlackjackState {
    fn default() -> Self {
        Self {
            version: 2,
            stage: BlackjackStage::Betting,
            active_hand: 0,
            hands: ArrayVec::new(),
            dealer: ArrayVec::new(),
            twenty_one_plus_three: 0,
        }
    }
}

impl BlackjackState {
    pub fn stage(&self) -> Stage {
        match self.stage {
            BlackjackStage::Betting => Stage::Betting,
            BlackjackStage::PlayerTurn | BlackjackStage::AwaitingReveal => Stage::Playing,
            BlackjackStage::Complete => Stage::Result,
        }
    }

    pub fn dealer_value(&self) -> HandValue {
        hand_value(&revealed(&self.dealer))
    }

    pub fn wagers(&self) -> Vec<Wager> {
        if self.twenty_one_plus_three == 0 {
            return Vec::new();
        }
        vec![Wager::confirmed(
            TWENTY_ONE_PLUS_THREE,
            0,
            self.twenty_one_plus_three,
        )]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = StateReader::new(GAME, bytes)?;
        let version = reader.u8()?;
        match version {
            1 => reader.require_total(5)?,
            2 => reader.require_total(13)?,
            other => return Err(reader.unsupported_version(other)),
        }

        let stage = reader.field("stage", BlackjackStage::from_repr)?;
        let active_hand = reader.u8()?;
        let hand_count = reader.u8()?;
        if usize::from(hand_count) > MAX_HANDS {
            return Err(reader.invalid("hand count", hand_count));
        }
        if hand_count > 0 && active_hand >= hand_count {
            return Err(reader.invalid("active hand", active_hand));
        }

        let mut hands = ArrayVec::new();
        for _ in 0..hand_count {
            let bet_multiplier = reader.field("bet multiplier", |m| (1..=2).contains(&m).then_some(m))?;
            let status = reader.field("hand status", HandStatus::from_repr)?;
            let cards = reader.card_run("hand cards")?;
            hands.push(BlackjackHand {
                bet_multiplier,
                status,
                cards,
            });
        }
        let dealer = reader.card_run("dealer cards")?;
        let twenty_one_plus_three = if version >= 2 { reader.u64()? } else { 0 };

        Ok(Self {
            version,
            stage,
            active_hand,
            hands,
            dealer,
            twenty_one_plus_three,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32);
        buf.put_u8(self.version);
        buf.put_u8(self.stage as u8);
        buf.put_u8(self.active_hand);
        buf.put_u8(self.hands.len() as u8);
        for hand in &self.hands {
            buf.put_u8(hand.bet_multiplier);
            buf.put_u8(hand.status as u8);
            buf.put_u8(hand.cards.len() as u8);
            buf.extend(hand.cards.iter().map(|slot| slot.to_byte()));
        }
        buf.put_u8(self.dealer.len() as u8);
        buf.extend(self.dealer.iter().map(|slot| slot.to_byte()));
        if self.version >= 2 {
            buf.put_u64(self.twenty_one_plus_three);
        }
        buf
    }

    pub fn resolve(&self) -> Vec<ResolvedWager> {
        let complete = self.stage == BlackjackStage::Complete;
        let dealer_cards = revealed(&self.dealer);
        let dealer = hand_value(&dealer_cards);
        let dealer_natural = is_natural(&dealer_cards);

        let mut lines: Vec<ResolvedWager> = self
            .hands
            .iter()
            .enumerate()
            .map(|(idx, hand)| {
                let label = if self.hands.len() > 1 {
                    format!("Hand {}", idx + 1)
                } else {
                    "Hand".to_string()
                };
                let outcome = if !complete {
                    WagerOutcome::Pending
                } else {
                    hand_outcome(hand, dealer, dealer_natural)
                };
                ResolvedWager::on_stake(label, outcome)
            })
            .collect();

        if self.twenty_one_plus_three > 0 {
            let outcome = match (self.hands.first(), self.dealer.first()) {
                (Some(hand), Some(CardSlot::Revealed(up))) => {
                    let player = revealed(&hand.cards);
                    match player.as_slice() {
                        [a, b, ..] => twenty_one_plus_three([*a, *b, *up]),
                        _ => WagerOutcome::Pending,
                    }
                }
                _ => WagerOutcome::Pending,
            };
            lines.push(ResolvedWager::new(
                "21+3",
                self.twenty_one_plus_three,
                outcome,
            ));
        }
        lines
    }

    pub fn describe(&self) -> Option<String> {
        let hand = self.hands.get(usize::from(self.active_hand))?;
        let player = hand.value();
        let dealer = self.dealer_value();
        Some(if self.dealer.iter().any(|slot| slot.is_hidden()) {
            format!("{} vs dealer showing {}", player.total, dealer.total)
        } else {
            format!("{} vs {}", player.total, dealer.total)
        })
    }
}

fn hand_outcome(hand: &BlackjackHand, dealer: HandValue, dealer_natural: bool) -> WagerOutcome {
    let value = hand.value();
    match hand.status {
        HandStatus::Busted | HandStatus::Surrendered => return WagerOutcome::Loss,
        HandStatus::Blackjack if !dealer_natural => return WagerOutcome::Win,
        HandStatus::Blackjack => return WagerOutcome::Push,
        _ => {}
    }
    if value.is_bust() {
        WagerOutcome::Loss
    } else if dealer_natural {
        WagerOutcome::Loss
    } else if dealer.is_bust() || value.total > dealer.total {
        WagerOutcome::Win
    } else if value.total < dealer.total {
        WagerOutcome::Loss
    } else {
        WagerOutcome::Push
    }
}

/// Flush, straight or three of a kind across the player's first two cards
/// and the dealer's up-card.
fn twenty_one_plus_three(cards: [Card; 3]) -> WagerOutcome {
    let value = crate::eval::evaluate_three(cards);
    if value.category > crate::eval::ThreeCardCategory::Pair {
        WagerOutcome::Win
    } else {
        WagerOutcome::Loss
    }
}

pub struct BlackjackCodec;

impl GameCodec for BlackjackCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::Move(PlayerMove::Hit) => Ok(vec![0]),
            Command::Move(PlayerMove::Stand) => Ok(vec![1]),
            Command::Move(PlayerMove::Double) => Ok(vec![2]),
            Command::Move(PlayerMove::Split) => Ok(vec![3]),
            Command::Advance => Ok(vec![4]),
            Command::SetSideWager {
                side: SideWager::TwentyOnePlusThree,
                amount,
            } => amount_payload(5, *amount),
            Command::Reveal => Ok(vec![6]),
            Command::Move(PlayerMove::Surrender) => Ok(vec![7]),
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        BlackjackState::from_bytes(bytes).map(Snapshot::Blackjack)
    }
}
