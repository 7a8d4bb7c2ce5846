//! Single-zero roulette: `[zero_rule][phase][n][wager × n]` + optional
//! `[result]`.
use bytes::BufMut;

use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, StateReader, batch_payload, place_payload,
    unsupported,
};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;
use crate::wager::{WAGER_RECORD_LEN, Wager, WagerSpec, encode_wager_records};

const GAME: GameType = GameType::Roulette;

const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

pub fn is_red(number: u8) -> bool {
    RED_NUMBERS.contains(&number)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RouletteBet {
    Straight = 0,
    Red = 1,
    Black = 2,
    Even = 3,
    Odd = 4,
    #[strum(serialize = "1-18")]
    Low = 5,
    #[strum(serialize = "19-36")]
    High = 6,
    Dozen = 7,
    Column = 8,
    #[strum(serialize = "Split")]
    SplitHorizontal = 9,
    #[strum(serialize = "Split")]
    SplitVertical = 10,
    Street = 11,
    Corner = 12,
    #[strum(serialize = "Six Line")]
    SixLine = 13,
}

impl RouletteBet {
    pub const fn is_even_money(self) -> bool {
        matches!(
            self,
            RouletteBet::Red
                | RouletteBet::Black
                | RouletteBet::Even
                | RouletteBet::Odd
                | RouletteBet::Low
                | RouletteBet::High
        )
    }

    pub fn accepts_target(self, target: u8) -> bool {
        match self {
            RouletteBet::Straight => target <= 36,
            RouletteBet::Dozen | RouletteBet::Column => target <= 2,
            RouletteBet::SplitHorizontal => (1..=35).contains(&target) && target % 3 != 0,
            RouletteBet::SplitVertical => (1..=33).contains(&target),
            RouletteBet::Street => (1..=34).contains(&target) && target % 3 == 1,
            RouletteBet::Corner => (1..=32).contains(&target) && target % 3 != 0,
            RouletteBet::SixLine => (1..=31).contains(&target) && target % 3 == 1,
            _ => true,
        }
    }

    /// Whether a ball landing on `number` wins this bet.
    pub fn covers(self, target: u8, number: u8) -> bool {
        if number == 0 {
            return self == RouletteBet::Straight && target == 0;
        }
        match self {
            RouletteBet::Straight => number == target,
            RouletteBet::Red => is_red(number),
            RouletteBet::Black => !is_red(number),
            RouletteBet::Even => number % 2 == 0,
            RouletteBet::Odd => number % 2 == 1,
            RouletteBet::Low => number <= 18,
            RouletteBet::High => number >= 19,
            RouletteBet::Dozen => (number - 1) / 12 == target,
            RouletteBet::Column => (number - 1) % 3 == target,
            _ => {
                let (target, number) = (u16::from(target), u16::from(number));
                match self {
                    RouletteBet::SplitHorizontal => number == target || number == target + 1,
                    RouletteBet::SplitVertical => number == target || number == target + 3,
                    RouletteBet::Street => (target..target + 3).contains(&number),
                    RouletteBet::Corner => {
                        [target, target + 1, target + 3, target + 4].contains(&number)
                    }
                    RouletteBet::SixLine => (target..target + 6).contains(&number),
                    _ => false,
                }
            }
        }
    }

    pub(crate) fn label(self, target: u8) -> String {
        let wide = u16::from(target);
        match self {
            RouletteBet::Straight => format!("Straight {target}"),
            RouletteBet::Dozen => format!("Dozen {}", wide + 1),
            RouletteBet::Column => format!("Column {}", wide + 1),
            RouletteBet::SplitHorizontal => format!("Split {}/{}", target, wide + 1),
            RouletteBet::SplitVertical => format!("Split {}/{}", target, wide + 3),
            RouletteBet::Street | RouletteBet::Corner | RouletteBet::SixLine => {
                format!("{self} {target}")
            }
            _ => self.to_string(),
        }
    }
}

/// What happens to even-money bets when the ball lands on zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ZeroRule {
    #[default]
    Standard = 0,
    #[strum(serialize = "La Partage")]
    LaPartage = 1,
    #[strum(serialize = "En Prison")]
    EnPrison = 2,
    #[strum(serialize = "En Prison (double)")]
    EnPrisonDouble = 3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RoulettePhase {
    #[default]
    Betting = 0,
    /// Even-money stakes are held after a zero and ride the next spin.
    Prison = 1,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouletteState {
    pub zero_rule: ZeroRule,
    pub phase: RoulettePhase,
    pub wagers: Vec<Wager>,
    pub result: Option<u8>,
}

impl RouletteState {
    pub fn stage(&self) -> Stage {
        match (self.result, self.phase) {
            (None, RoulettePhase::Prison) => Stage::Playing,
            (None, RoulettePhase::Betting) => Stage::Betting,
            (Some(_), _) => Stage::Result,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = StateReader::new(GAME, bytes)?;
        reader.require_total(3)?;
        let zero_rule = reader.field("zero rule", ZeroRule::from_repr)?;
        let phase = reader.field("phase", RoulettePhase::from_repr)?;
        let count = reader.wager_count(WAGER_RECORD_LEN)?;
        let wagers = reader.wagers(count, |kind| RouletteBet::from_repr(kind).is_some())?;
        for wager in &wagers {
            let accepted = RouletteBet::from_repr(wager.kind)
                .is_some_and(|bet| bet.accepts_target(wager.target));
            if !accepted {
                return Err(reader.invalid("wager target", wager.target));
            }
        }
        let result = match reader.optional_u8() {
            Some(number) if number <= 36 => Some(number),
            Some(number) => return Err(reader.invalid("result", number)),
            None => None,
        };
        reader.finish()?;

        Ok(Self {
            zero_rule,
            phase,
            wagers,
            result,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.wagers.len() * WAGER_RECORD_LEN);
        buf.put_u8(self.zero_rule as u8);
        buf.put_u8(self.phase as u8);
        buf.put_u8(self.wagers.len() as u8);
        buf.extend_from_slice(&encode_wager_records(&self.wagers));
        if let Some(result) = self.result {
            buf.put_u8(result);
        }
        buf
    }

    pub fn resolve(&self) -> Vec<ResolvedWager> {
        self.wagers
            .iter()
            .filter_map(|wager| {
                let bet = RouletteBet::from_repr(wager.kind)?;
                let outcome = match self.result {
                    None => WagerOutcome::Pending,
                    Some(number) => self.outcome(bet, wager.target, number),
                };
                Some(ResolvedWager::new(bet.label(wager.target), wager.amount, outcome))
            })
            .collect()
    }

    fn outcome(&self, bet: RouletteBet, target: u8, number: u8) -> WagerOutcome {
        let imprisoned = self.phase == RoulettePhase::Prison;
        if number == 0 && bet.is_even_money() {
            return match (self.zero_rule, imprisoned) {
                (ZeroRule::LaPartage, _) => WagerOutcome::HalfReturned,
                (ZeroRule::EnPrison | ZeroRule::EnPrisonDouble, false) => WagerOutcome::Imprisoned,
                (ZeroRule::EnPrisonDouble, true) => WagerOutcome::Imprisoned,
                _ => WagerOutcome::Loss,
            };
        }
        match (bet.covers(target, number), imprisoned && bet.is_even_money()) {
            (true, true) => WagerOutcome::Push,
            (true, false) => WagerOutcome::Win,
            (false, _) => WagerOutcome::Loss,
        }
    }

    pub fn describe(&self) -> Option<String> {
        let number = self.result?;
        let colour = match number {
            0 => "green",
            n if is_red(n) => "red",
            _ => "black",
        };
        Some(format!("Landed {number} {colour}"))
    }
}

fn validate(spec: &WagerSpec) -> Result<(), EncodeError> {
    let bet = RouletteBet::from_repr(spec.kind).ok_or(EncodeError::UnknownWagerKind {
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

pub struct RouletteCodec;

impl GameCodec for RouletteCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::PlaceWager(spec) => place_payload(0, spec, validate),
            Command::Advance => Ok(vec![1]),
            Command::Clear => Ok(vec![2]),
            Command::SetRules(rule) => match ZeroRule::from_repr(*rule) {
                Some(rule) => Ok(vec![3, rule as u8]),
                None => Err(unsupported(GAME, command)),
            },
            Command::PlaceBatch(specs) => batch_payload(4, specs, validate),
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        RouletteState::from_bytes(bytes).map(Snapshot::Roulette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(rule: ZeroRule, phase: RoulettePhase, wagers: &[Wager], result: Option<u8>) -> Vec<u8> {
        RouletteState {
            zero_rule: rule,
            phase,
            wagers: wagers.to_vec(),
            result,
        }
        .to_bytes()
    }

    #[test]
    fn decodes_spin_result() {
        let bytes = state(
            ZeroRule::Standard,
            RoulettePhase::Betting,
            &[Wager::confirmed(0, 17, 10), Wager::confirmed(1, 0, 20)],
            Some(17),
        );
        let decoded = RouletteState::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.stage(), Stage::Result);
        assert_eq!(decoded.describe().as_deref(), Some("Landed 17 black"));
        assert_eq!(
            decoded.resolve(),
            vec![
                ResolvedWager::new("Straight 17", 10, WagerOutcome::Win),
                ResolvedWager::new("Red", 20, WagerOutcome::Loss),
            ]
        );
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn zero_rules_on_even_money() {
        let red = [Wager::confirmed(1, 0, 20)];
        let outcome = |rule| {
            let bytes = state(rule, RoulettePhase::Betting, &red, Some(0));
            RouletteState::from_bytes(&bytes).unwrap().resolve()[0].outcome
        };
        assert_eq!(outcome(ZeroRule::Standard), WagerOutcome::Loss);
        assert_eq!(outcome(ZeroRule::LaPartage), WagerOutcome::HalfReturned);
        assert_eq!(outcome(ZeroRule::EnPrison), WagerOutcome::Imprisoned);
    }

    #[test]
    fn prison_phase_is_in_play() {
        let bytes = state(
            ZeroRule::EnPrison,
            RoulettePhase::Prison,
            &[Wager::confirmed(3, 0, 20)],
            None,
        );
        assert_eq!(RouletteState::from_bytes(&bytes).unwrap().stage(), Stage::Playing);
    }

    #[test]
    fn rejects_out_of_range_bytes() {
        assert!(matches!(
            RouletteState::from_bytes(&[4, 0, 0]),
            Err(DecodeError::InvalidField { field: "zero rule", .. })
        ));
        assert!(matches!(
            RouletteState::from_bytes(&[0, 0, 0, 37]),
            Err(DecodeError::InvalidField { field: "result", .. })
        ));
        assert!(matches!(
            RouletteState::from_bytes(&[0, 0]),
            Err(DecodeError::Truncated { .. })
        ));
        assert!(matches!(
            RouletteState::from_bytes(&[0, 0, 0, 5, 5]),
            Err(DecodeError::TrailingBytes { extra: 1, .. })
        ));
    }

    #[test]
    fn rejects_wager_target_off_the_layout() {
        let mut bytes = vec![0, 0, 1, 9, 255];
        bytes.extend_from_slice(&10u64.to_be_bytes());
        bytes.push(5);
        assert!(matches!(
            RouletteState::from_bytes(&bytes),
            Err(DecodeError::InvalidField {
                field: "wager target",
                value: 255,
                ..
            })
        ));
    }

    #[test]
    fn edge_targets_do_not_overflow() {
        assert!(!RouletteBet::SplitHorizontal.covers(255, 5));
        assert!(!RouletteBet::SixLine.covers(254, 36));
        assert_eq!(RouletteBet::SplitVertical.label(255), "Split 255/258");
    }

    #[test]
    fn coverage_of_inside_bets() {
        assert!(RouletteBet::Corner.covers(1, 5));
        assert!(!RouletteBet::Corner.covers(1, 3));
        assert!(RouletteBet::Column.covers(2, 36));
        assert!(RouletteBet::Dozen.covers(1, 13));
        assert!(!RouletteBet::Red.covers(0, 0));
    }

    #[test]
    fn encodes_rule_and_batch_discriminators() {
        let codec = RouletteCodec;
        assert_eq!(codec.encode_command(&Command::SetRules(2)).unwrap(), vec![3, 2]);
        let batch = codec
            .encode_command(&Command::PlaceBatch(vec![WagerSpec::new(1, 0, 5)]))
            .unwrap();
        assert_eq!(&batch[..2], &[4, 1]);
        assert!(matches!(
            codec.encode_command(&Command::PlaceWager(WagerSpec::new(0, 37, 5))),
            Err(EncodeError::InvalidTarget { .. })
        ));
    }
}
