//! Sic Bo: `[n][wager × n]` + optional `[d1 d2 d3]` + optional `[rules]`.
use bytes::BufMut;

use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, StateReader, batch_payload, place_payload,
    unsupported,
};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;
use crate::wager::{WAGER_RECORD_LEN, Wager, WagerSpec, encode_wager_records};

const GAME: GameType = GameType::SicBo;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SicBoBet {
    Small = 0,
    Big = 1,
    Odd = 2,
    Even = 3,
    #[strum(serialize = "Triple")]
    SpecificTriple = 4,
    #[strum(serialize = "Any Triple")]
    AnyTriple = 5,
    #[strum(serialize = "Double")]
    SpecificDouble = 6,
    Total = 7,
    Single = 8,
    Domino = 9,
    #[strum(serialize = "Easy Hop")]
    ThreeNumberEasyHop = 10,
    #[strum(serialize = "Hard Hop")]
    ThreeNumberHardHop = 11,
    #[strum(serialize = "Four Number Hop")]
    FourNumberEasyHop = 12,
}

impl SicBoBet {
    /// Whether `target` is a meaningful sub-selector for this bet.
    pub fn accepts_target(self, target: u8) -> bool {
        let face = |n: u8| (1..=6).contains(&n);
        let (hi, lo) = (target >> 4, target & 0x0F);
        match self {
            SicBoBet::Small | SicBoBet::Big | SicBoBet::Odd | SicBoBet::Even | SicBoBet::AnyTriple => {
                true
            }
            SicBoBet::SpecificTriple | SicBoBet::SpecificDouble | SicBoBet::Single => face(target),
            SicBoBet::Total => (3..=18).contains(&target),
            SicBoBet::Domino => face(hi) && face(lo) && hi < lo,
            SicBoBet::ThreeNumberHardHop => face(hi) && face(lo) && hi != lo,
            SicBoBet::ThreeNumberEasyHop => target & !0x3F == 0 && target.count_ones() == 3,
            SicBoBet::FourNumberEasyHop => target & !0x3F == 0 && target.count_ones() == 4,
        }
    }

    pub(crate) fn label(self, target: u8) -> String {
        match self {
            SicBoBet::SpecificTriple | SicBoBet::SpecificDouble | SicBoBet::Single | SicBoBet::Total => {
                format!("{self} {target}")
            }
            SicBoBet::Domino | SicBoBet::ThreeNumberHardHop => {
                format!("{self} {}-{}", target >> 4, target & 0x0F)
            }
            SicBoBet::ThreeNumberEasyHop | SicBoBet::FourNumberEasyHop => {
                let faces: Vec<String> = (1..=6u8)
                    .filter(|face| target & (1 << (face - 1)) != 0)
                    .map(|face| face.to_string())
                    .collect();
                format!("{self} {}", faces.join("-"))
            }
            _ => self.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SicBoPaytable {
    #[default]
    Macau = 0,
    #[strum(serialize = "Atlantic City")]
    AtlanticCity = 1,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SicBoState {
    pub wagers: Vec<Wager>,
    pub dice: Option<[u8; 3]>,
    pub paytable: Option<SicBoPaytable>,
}

impl SicBoState {
    pub fn stage(&self) -> Stage {
        if self.dice.is_some() {
            Stage::Result
        } else {
            Stage::Betting
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = StateReader::new(GAME, bytes)?;
        let count = reader.wager_count(WAGER_RECORD_LEN)?;
        let wagers = reader.wagers(count, |kind| SicBoBet::from_repr(kind).is_some())?;

        let dice = if reader.remaining() >= 3 {
            let mut dice = [0u8; 3];
            for die in dice.iter_mut() {
                *die = reader.field("die", |d| (1..=6).contains(&d).then_some(d))?;
            }
            Some(dice)
        } else {
            None
        };
        let paytable = match reader.optional_u8() {
            Some(byte) => Some(
                SicBoPaytable::from_repr(byte).ok_or_else(|| reader.invalid("rules", byte))?,
            ),
            None => None,
        };
        reader.finish()?;

        Ok(Self {
            wagers,
            dice,
            paytable,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.wagers.len() * WAGER_RECORD_LEN + 4);
        buf.put_u8(self.wagers.len() as u8);
        buf.extend_from_slice(&encode_wager_records(&self.wagers));
        if let Some(dice) = self.dice {
            buf.extend_from_slice(&dice);
        }
        if let Some(paytable) = self.paytable {
            buf.put_u8(paytable as u8);
        }
        buf
    }

    pub fn total(&self) -> Option<u8> {
        self.dice.map(|dice| dice.iter().sum())
    }

    pub fn resolve(&self) -> Vec<ResolvedWager> {
        self.wagers
            .iter()
            .filter_map(|wager| {
                let bet = SicBoBet::from_repr(wager.kind)?;
                let outcome = match self.dice {
                    None => WagerOutcome::Pending,
                    Some(dice) if bet_wins(bet, wager.target, &dice) => WagerOutcome::Win,
                    Some(_) => WagerOutcome::Loss,
                };
                Some(ResolvedWager::new(
                    bet.label(wager.target),
                    wager.amount,
                    outcome,
                ))
            })
            .collect()
    }

    pub fn describe(&self) -> Option<String> {
        let [a, b, c] = self.dice?;
        Some(format!("Dice {a}-{b}-{c} = {}", a + b + c))
    }
}

pub fn bet_wins(bet: SicBoBet, target: u8, dice: &[u8; 3]) -> bool {
    let total: u8 = dice.iter().sum();
    let triple = dice[0] == dice[1] && dice[1] == dice[2];
    let count = |face: u8| dice.iter().filter(|&&d| d == face).count();
    let distinct = dice[0] != dice[1] && dice[1] != dice[2] && dice[0] != dice[2];
    let mask = dice
        .iter()
        .filter(|d| (1..=6).contains(*d))
        .fold(0u8, |mask, &d| mask | (1 << (d - 1)));
    let (hi, lo) = (target >> 4, target & 0x0F);

    if !bet.accepts_target(target) {
        return false;
    }
    match bet {
        SicBoBet::Small => (4..=10).contains(&total) && !triple,
        SicBoBet::Big => (11..=17).contains(&total) && !triple,
        SicBoBet::Odd => total % 2 == 1 && !triple,
        SicBoBet::Even => total % 2 == 0 && !triple,
        SicBoBet::SpecificTriple => triple && dice[0] == target,
        SicBoBet::AnyTriple => triple,
        SicBoBet::SpecificDouble => count(target) >= 2,
        SicBoBet::Total => total == target,
        SicBoBet::Single => count(target) >= 1,
        SicBoBet::Domino => count(hi) >= 1 && count(lo) >= 1,
        SicBoBet::ThreeNumberHardHop => count(hi) == 2 && count(lo) == 1,
        SicBoBet::ThreeNumberEasyHop | SicBoBet::FourNumberEasyHop => {
            distinct && mask & target == mask
        }
    }
}

fn validate(spec: &WagerSpec) -> Result<(), EncodeError> {
    let bet = SicBoBet::from_repr(spec.kind).ok_or(EncodeError::UnknownWagerKind {
        game: GAME,
        kind: spec.kind,
    })?;
    if !bet.accepts_target(spec.target) {
        return Err(EncodeError::InvalidTarget {
            game: GAME,
            kind: spec.kind,
            target: spec.target,
        });
    }
    Ok(())
}

pub struct SicBoCodec;

impl GameCodec for SicBoCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::PlaceWager(spec) => place_payload(0, spec, validate),
            Command::Advance => Ok(vec![1]),
            Command::Clear => Ok(vec![2]),
            Command::PlaceBatch(specs) => batch_payload(3, specs, validate),
            Command::SetRules(rules) => match SicBoPaytable::from_repr(*rules) {
                Some(paytable) => Ok(vec![4, paytable as u8]),
                None => Err(unsupported(GAME, command)),
            },
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        SicBoState::from_bytes(bytes).map(Snapshot::SicBo)
    }
}
