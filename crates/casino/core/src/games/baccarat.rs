//! Baccarat: `[n][wager × n]`, then once dealt
//! `[p_len][player cards][b_len][banker cards]`.
use arrayvec::ArrayVec;
use bytes::BufMut;

use crate::card::{Card, CardSlot, revealed};
use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, StateReader, batch_payload, place_payload,
    unsupported,
};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;
use crate::wager::{WAGER_RECORD_LEN, Wager, WagerSpec, encode_wager_records};

const GAME: GameType = GameType::Baccarat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BaccaratBet {
    Player = 0,
    Banker = 1,
    Tie = 2,
    #[strum(serialize = "Player Pair")]
    PlayerPair = 3,
    #[strum(serialize = "Banker Pair")]
    BankerPair = 4,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaccaratState {
    pub wagers: Vec<Wager>,
    pub player: ArrayVec<CardSlot, 3>,
    pub banker: ArrayVec<CardSlot, 3>,
}

impl BaccaratState {
    pub fn is_dealt(&self) -> bool {
        !self.player.is_empty() || !self.banker.is_empty()
    }

    pub fn stage(&self) -> Stage {
        if self.is_dealt() {
            Stage::Result
        } else {
            Stage::Betting
        }
    }

    pub fn player_total(&self) -> u8 {
        hand_total(&revealed(&self.player))
    }

    pub fn banker_total(&self) -> u8 {
        hand_total(&revealed(&self.banker))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = StateReader::new(GAME, bytes)?;
        let count = reader.wager_count(WAGER_RECORD_LEN)?;
        let wagers = reader.wagers(count, |kind| BaccaratBet::from_repr(kind).is_some())?;

        let (player, banker) = if reader.remaining() > 0 {
            (reader.card_run("player cards")?, reader.card_run("banker cards")?)
        } else {
            (ArrayVec::new(), ArrayVec::new())
        };

        Ok(Self {
            wagers,
            player,
            banker,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.wagers.len() * WAGER_RECORD_LEN + 8);
        buf.put_u8(self.wagers.len() as u8);
        buf.extend_from_slice(&encode_wager_records(&self.wagers));
        if self.is_dealt() {
            for hand in [&self.player, &self.banker] {
                buf.put_u8(hand.len() as u8);
                buf.extend(hand.iter().map(|slot| slot.to_byte()));
            }
        }
        buf
    }

    pub fn resolve(&self) -> Vec<ResolvedWager> {
        let player = revealed(&self.player);
        let banker = revealed(&self.banker);
        let settled = self.is_dealt() && player.len() >= 2 && banker.len() >= 2;
        let (p, b) = (hand_total(&player), hand_total(&banker));

        self.wagers
            .iter()
            .filter_map(|wager| {
                let bet = BaccaratBet::from_repr(wager.kind)?;
                let outcome = if !settled {
                    WagerOutcome::Pending
                } else {
                    match bet {
                        BaccaratBet::Player => compare(p, b),
                        BaccaratBet::Banker => compare(b, p),
                        BaccaratBet::Tie if p == b => WagerOutcome::Win,
                        BaccaratBet::Tie => WagerOutcome::Loss,
                        BaccaratBet::PlayerPair => pair_outcome(&player),
                        BaccaratBet::BankerPair => pair_outcome(&banker),
                    }
                };
                Some(ResolvedWager::new(bet.to_string(), wager.amount, outcome))
            })
            .collect()
    }

    pub fn describe(&self) -> Option<String> {
        self.is_dealt().then(|| {
            format!(
                "Player {} / Banker {}",
                self.player_total(),
                self.banker_total()
            )
        })
    }
}

/// Sum of card points modulo ten; court cards and tens count zero.
pub fn hand_total(cards: &[Card]) -> u8 {
    cards
        .iter()
        .map(|card| {
            let pip = card.rank().pip_value();
            if pip >= 10 { 0 } else { pip }
        })
        .sum::<u8>()
        % 10
}

fn compare(ours: u8, theirs: u8) -> WagerOutcome {
    match ours.cmp(&theirs) {
        std::cmp::Ordering::Greater => WagerOutcome::Win,
        std::cmp::Ordering::Less => WagerOutcome::Loss,
        std::cmp::Ordering::Equal => WagerOutcome::Push,
    }
}

fn pair_outcome(cards: &[Card]) -> WagerOutcome {
    match cards {
        [first, second, ..] if first.rank() == second.rank() => WagerOutcome::Win,
        _ => WagerOutcome::Loss,
    }
}

fn validate(spec: &WagerSpec) -> Result<(), EncodeError> {
    if BaccaratBet::from_repr(spec.kind).is_none() {
        return Err(EncodeError::UnknownWagerKind {
            game: GAME,
            kind: spec.kind,
        });
    }
    Ok(())
}

pub struct BaccaratCodec;

impl GameCodec for BaccaratCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::PlaceWager(spec) => place_payload(0, spec, validate),
            Command::Advance => Ok(vec![1]),
            Command::Clear => Ok(vec![2]),
            Command::PlaceBatch(specs) => batch_payload(3, specs, validate),
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        BaccaratState::from_bytes(bytes).map(Snapshot::Baccarat)
    }
}
