//! Ultimate Texas Hold'em.
//!
//! ```text
//! v1: [1][stage][p1 p2][b1..b5][d1 d2][play multiplier]
//! v2: v1 body followed by [trips:u64]
//! v3: v2 body followed by [six card bonus:u64][progressive:u64]
//! ```
use bytes::BufMut;

use crate::card::{Card, CardSlot, revealed};
use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, PlayerMove, SideWager, StateReader,
    amount_payload, unsupported,
};
use crate::eval::{HandValue, PokerCategory, ThreeCardCategory, best_hand, evaluate_three};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;
use crate::wager::Wager;

const GAME: GameType = GameType::UltimateHoldem;

pub const TRIPS: u8 = 1;
pub const SIX_CARD_BONUS: u8 = 2;
pub const PROGRESSIVE: u8 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum HoldemStage {
    #[default]
    Betting = 0,
    Preflop = 1,
    Flop = 2,
    River = 3,
    AwaitingReveal = 4,
    Showdown = 5,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UltimateHoldemState {
    pub version: u8,
    pub stage: HoldemStage,
    pub player: [CardSlot; 2],
    pub board: [CardSlot; 5],
    pub dealer: [CardSlot; 2],
    /// Raise made on the play spot, as a multiple of the ante; 0 before any raise.
    pub play_multiplier: u8,
    pub trips: u64,
    pub six_card_bonus: u64,
    pub progressive: u64,
}

impl UltimateHoldemState {
    pub fn stage(&self) -> Stage {
        match self.stage {
            HoldemStage::Betting => Stage::Betting,
            HoldemStage::Showdown => Stage::Result,
            _ => Stage::Playing,
        }
    }

    fn hand_with(&self, hole: &[CardSlot; 2]) -> Option<HandValue> {
        let board = revealed(&self.board);
        let hole = revealed(hole);
        if board.len() < 5 || hole.len() < 2 {
            return None;
        }
        let cards: Vec<Card> = hole.into_iter().chain(board).collect();
        best_hand(&cards)
    }

    pub fn player_hand(&self) -> Option<HandValue> {
        self.hand_with(&self.player)
    }

    pub fn dealer_hand(&self) -> Option<HandValue> {
        self.hand_with(&self.dealer)
    }

    pub fn wagers(&self) -> Vec<Wager> {
        [
            (TRIPS, self.trips),
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
            1 => reader.require_total(12)?,
            2 => reader.require_total(20)?,
            3 => reader.require_total(36)?,
            other => return Err(reader.unsupported_version(other)),
        }
        let stage = reader.field("stage", HoldemStage::from_repr)?;
        let player = reader.cards::<2>("player card")?;
        let board = reader.cards::<5>("board card")?;
        let dealer = reader.cards::<2>("dealer card")?;
        let play_multiplier =
            reader.field("play multiplier", |m| matches!(m, 0..=4).then_some(m))?;
        let trips = if version >= 2 { reader.u64()? } else { 0 };
        let (six_card_bonus, progressive) = if version >= 3 {
            (reader.u64()?, reader.u64()?)
        } else {
            (0, 0)
        };

        Ok(Self {
            version,
            stage,
            player,
            board,
            dealer,
            play_multiplier,
            trips,
            six_card_bonus,
            progressive,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(36);
        buf.put_u8(self.version);
        buf.put_u8(self.stage as u8);
        buf.extend(self.player.iter().map(|slot| slot.to_byte()));
        buf.extend(self.board.iter().map(|slot| slot.to_byte()));
        buf.extend(self.dealer.iter().map(|slot| slot.to_byte()));
        buf.put_u8(self.play_multiplier);
        if self.version >= 2 {
            buf.put_u64(self.trips);
        }
        if self.version >= 3 {
            buf.put_u64(self.six_card_bonus);
            buf.put_u64(self.progressive);
        }
        buf
    }

    pub fn resolve(&self) -> Vec<ResolvedWager> {
        let player = self.player_hand();
        let showdown = self.stage == HoldemStage::Showdown;

        let main = match (&player, self.dealer_hand()) {
            (Some(player), Some(dealer)) if showdown => match player.cmp(&dealer) {
                std::cmp::Ordering::Greater => WagerOutcome::Win,
                std::cmp::Ordering::Less => WagerOutcome::Loss,
                std::cmp::Ordering::Equal => WagerOutcome::Push,
            },
            _ if showdown && self.play_multiplier == 0 => WagerOutcome::Loss,
            _ => WagerOutcome::Pending,
        };
        let mut lines = vec![ResolvedWager::on_stake("Ante/Blind", main)];

        if self.trips > 0 {
            let outcome = match &player {
                Some(hand) if hand.category >= PokerCategory::ThreeOfAKind => WagerOutcome::Win,
                Some(_) => WagerOutcome::Loss,
                None => WagerOutcome::Pending,
            };
            lines.push(ResolvedWager::new("Trips", self.trips, outcome));
        }
        if self.six_card_bonus > 0 {
            let cards: Vec<Card> = revealed(&self.player)
                .into_iter()
                .chain(revealed(&self.board).into_iter().take(3))
                .chain(revealed(&self.dealer).into_iter().take(1))
                .collect();
            let outcome = match best_hand(&cards) {
                Some(best) if cards.len() == 6 => {
                    if best.category >= PokerCategory::ThreeOfAKind {
                        WagerOutcome::Win
                    } else {
                        WagerOutcome::Loss
                    }
                }
                _ => WagerOutcome::Pending,
            };
            lines.push(ResolvedWager::new("Six Card", self.six_card_bonus, outcome));
        }
        if self.progressive > 0 {
            let hole = revealed(&self.player);
            let flop = revealed(&self.board);
            let outcome = match (hole.as_slice(), flop.as_slice()) {
                ([a, b], [c, ..]) => {
                    if evaluate_three([*a, *b, *c]).category >= ThreeCardCategory::ThreeOfAKind {
                        WagerOutcome::Win
                    } else {
                        WagerOutcome::Loss
                    }
                }
                _ => WagerOutcome::Pending,
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

pub struct UltimateHoldemCodec;

impl GameCodec for UltimateHoldemCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::Move(PlayerMove::Check) => Ok(vec![0]),
            Command::Move(PlayerMove::Bet { multiplier: 4 }) => Ok(vec![1]),
            Command::Move(PlayerMove::Bet { multiplier: 2 }) => Ok(vec![2]),
            Command::Move(PlayerMove::Bet { multiplier: 1 }) => Ok(vec![3]),
            Command::Move(PlayerMove::Fold) => Ok(vec![4]),
            Command::Advance => Ok(vec![5]),
            Command::Reveal => Ok(vec![7]),
            Command::SetSideWager { side, amount } => match side {
                SideWager::Trips => amount_payload(6, *amount),
                SideWager::SixCardBonus => amount_payload(8, *amount),
                SideWager::Progressive => amount_payload(9, *amount),
                _ => Err(unsupported(GAME, command)),
            },
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        UltimateHoldemState::from_bytes(bytes).map(Snapshot::UltimateHoldem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIDDEN: u8 = 0xFF;

    #[test]
    fn decodes_preflop_v1() {
        let bytes = [1, 1, 0, 13, HIDDEN, HIDDEN, HIDDEN, HIDDEN, HIDDEN, HIDDEN, HIDDEN, 0];
        let state = UltimateHoldemState::from_bytes(&bytes).unwrap();
        assert_eq!(state.stage, HoldemStage::Preflop);
        assert_eq!(state.stage(), Stage::Playing);
        assert!(state.player_hand().is_none());
        assert!(state.wagers().is_empty());
        assert_eq!(state.to_bytes(), bytes);
    }

    #[test]
    fn decodes_v3_side_bets() {
        let mut bytes = vec![3, 2, 0, 13, 26, 45, 1, HIDDEN, HIDDEN, HIDDEN, HIDDEN, 2];
        bytes.extend_from_slice(&0u64.to_be_bytes());
        bytes.extend_from_slice(&10u64.to_be_bytes());
        bytes.extend_from_slice(&1u64.to_be_bytes());
        let state = UltimateHoldemState::from_bytes(&bytes).unwrap();
        assert_eq!(state.version, 3);
        assert_eq!(state.stage, HoldemStage::Flop);
        assert_eq!(state.play_multiplier, 2);
        assert_eq!(
            state.wagers(),
            vec![
                Wager::confirmed(SIX_CARD_BONUS, 0, 10),
                Wager::confirmed(PROGRESSIVE, 0, 1),
            ]
        );
        assert_eq!(state.to_bytes(), bytes);

        assert!(matches!(
            UltimateHoldemState::from_bytes(&bytes[..28]),
            Err(DecodeError::Truncated { expected: 36, .. })
        ));
    }

    #[test]
    fn rejects_bad_multiplier_and_short_blob() {
        let bytes = [1, 1, 0, 13, HIDDEN, HIDDEN, HIDDEN, HIDDEN, HIDDEN, HIDDEN, HIDDEN, 3];
        assert!(UltimateHoldemState::from_bytes(&bytes).is_ok());
        let bytes = [1, 1, 0, 13, HIDDEN, HIDDEN, HIDDEN, HIDDEN, HIDDEN, HIDDEN, HIDDEN, 9];
        assert!(matches!(
            UltimateHoldemState::from_bytes(&bytes),
            Err(DecodeError::InvalidField { field: "play multiplier", value: 9, .. })
        ));
        assert!(matches!(
            UltimateHoldemState::from_bytes(&[2, 1, 0, 13]),
            Err(DecodeError::Truncated { expected: 20, .. })
        ));
    }

    #[test]
    fn showdown_with_trips() {
        // Player A♠ A♥, board A♦ 7♣ 2♠ 9♥ J♦, dealer K♣ Q♣.
        let mut bytes = vec![2, 5, 0, 13, 26, 45, 1, 21, 36, 51, 50, 4];
        bytes.extend_from_slice(&25u64.to_be_bytes());
        let state = UltimateHoldemState::from_bytes(&bytes).unwrap();
        assert_eq!(state.stage(), Stage::Result);
        assert_eq!(state.player_hand().unwrap().category, PokerCategory::ThreeOfAKind);
        let lines = state.resolve();
        assert_eq!(lines[0].outcome, WagerOutcome::Win);
        assert_eq!(lines[1], ResolvedWager::new("Trips", 25, WagerOutcome::Win));
        assert_eq!(state.describe().as_deref(), Some("Three of a Kind vs High Card"));
        assert_eq!(state.to_bytes(), bytes);
    }

    #[test]
    fn encodes_raises_by_multiplier() {
        let codec = UltimateHoldemCodec;
        let bet = |multiplier| Command::Move(PlayerMove::Bet { multiplier });
        assert_eq!(codec.encode_command(&bet(4)).unwrap(), vec![1]);
        assert_eq!(codec.encode_command(&bet(2)).unwrap(), vec![2]);
        assert_eq!(codec.encode_command(&bet(1)).unwrap(), vec![3]);
        assert!(codec.encode_command(&bet(3)).is_err());
        assert_eq!(codec.encode_command(&Command::Advance).unwrap(), vec![5]);
        let trips = codec
            .encode_command(&Command::SetSideWager {
                side: SideWager::Trips,
                amount: 10,
            })
            .unwrap();
        assert_eq!(trips[0], 6);
    }
}
