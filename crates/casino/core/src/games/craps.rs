//! Craps.
//!
//! ```text
//! v1: [1][phase][point][d1][d2][made_points][n]        [bet × n] [rules]?
//! v2: [2][phase][point][d1][d2][made_points][epoch][n] [bet × n] [rules]?
//! bet:   [kind][target][status][amount:u64][odds:u64]
//! rules: [field_paytable][buy_commission]
//! ```
//!
//! The ledger removes bets as they resolve, so the client tracks rolls itself
//! with [`RollTracker`] to explain what each roll settled.
use bytes::BufMut;

use crate::codec::{
    Command, DecodeError, EncodeError, GameCodec, StateReader, amount_payload, place_payload,
    unsupported,
};
use crate::game::{GameType, Stage};
use crate::ledger::{ResolvedWager, WagerOutcome};
use crate::snapshot::Snapshot;
use crate::wager::{Wager, WagerSpec};

const GAME: GameType = GameType::Craps;

pub const CRAPS_BET_RECORD_LEN: usize = 19;

const POINT_NUMBERS: [u8; 6] = [4, 5, 6, 8, 9, 10];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CrapsBetKind {
    Pass = 0,
    #[strum(serialize = "Don't Pass")]
    DontPass = 1,
    Come = 2,
    #[strum(serialize = "Don't Come")]
    DontCome = 3,
    Field = 4,
    Yes = 5,
    No = 6,
    Next = 7,
    #[strum(serialize = "Hard 4")]
    Hardway4 = 8,
    #[strum(serialize = "Hard 6")]
    Hardway6 = 9,
    #[strum(serialize = "Hard 8")]
    Hardway8 = 10,
    #[strum(serialize = "Hard 10")]
    Hardway10 = 11,
    Fire = 12,
    Buy = 13,
    #[strum(serialize = "ATS Small")]
    AtsSmall = 15,
    #[strum(serialize = "ATS Tall")]
    AtsTall = 16,
    #[strum(serialize = "ATS All")]
    AtsAll = 17,
}

impl CrapsBetKind {
    pub fn accepts_target(self, target: u8) -> bool {
        match self {
            CrapsBetKind::Yes | CrapsBetKind::No | CrapsBetKind::Buy => {
                POINT_NUMBERS.contains(&target)
            }
            CrapsBetKind::Next => (2..=12).contains(&target),
            _ => true,
        }
    }

    const fn hardway_number(self) -> Option<u8> {
        match self {
            CrapsBetKind::Hardway4 => Some(4),
            CrapsBetKind::Hardway6 => Some(6),
            CrapsBetKind::Hardway8 => Some(8),
            CrapsBetKind::Hardway10 => Some(10),
            _ => None,
        }
    }

    /// Totals an All/Tall/Small bet must see before a seven.
    const fn ats_required(self) -> Option<u64> {
        match self {
            CrapsBetKind::AtsSmall => Some(0b00_0001_1111),
            CrapsBetKind::AtsTall => Some(0b11_1110_0000),
            CrapsBetKind::AtsAll => Some(0b11_1111_1111),
            _ => None,
        }
    }
}

fn ats_bit(total: u8) -> u64 {
    match total {
        2..=6 => 1 << (total - 2),
        8..=12 => 1 << (total - 3),
        _ => 0,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BetStatus {
    #[default]
    On = 0,
    /// Come / Don't Come waiting for its own point.
    Pending = 1,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CrapsPhase {
    #[default]
    ComeOut = 0,
    Point = 1,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FieldPaytable {
    #[default]
    Double2And12 = 0,
    Double2Triple12 = 1,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BuyCommission {
    #[default]
    AtPlacement = 0,
    OnWin = 1,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrapsRules {
    pub field_paytable: FieldPaytable,
    pub buy_commission: BuyCommission,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrapsBet {
    pub kind: CrapsBetKind,
    /// Point for Come/Yes/No/Buy, number for Next.
    pub target: u8,
    pub status: BetStatus,
    pub amount: u64,
    /// Odds behind a line bet; All/Tall/Small progress bits for ATS bets.
    pub odds: u64,
}

impl CrapsBet {
    fn write_record(&self, buf: &mut Vec<u8>) {
        buf.put_u8(self.kind as u8);
        buf.put_u8(self.target);
        buf.put_u8(self.status as u8);
        buf.put_u64(self.amount);
        buf.put_u64(self.odds);
    }

    fn label(&self) -> String {
        match (self.kind, self.status) {
            (CrapsBetKind::Come | CrapsBetKind::DontCome, BetStatus::On) if self.target != 0 => {
                format!("{} {}", self.kind, self.target)
            }
            (CrapsBetKind::Yes | CrapsBetKind::No | CrapsBetKind::Next | CrapsBetKind::Buy, _) => {
                format!("{} {}", self.kind, self.target)
            }
            _ => self.kind.to_string(),
        }
    }

    pub fn wager(&self) -> Wager {
        let secondary = if self.kind.ats_required().is_some() { 0 } else { self.odds };
        Wager::confirmed(self.kind as u8, self.target, self.amount).with_secondary(secondary)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrapsState {
    pub version: u8,
    pub phase: CrapsPhase,
    /// Zero during the come-out.
    pub point: u8,
    /// `[0, 0]` before the first roll.
    pub dice: [u8; 2],
    /// Fire bet progress: bit per point number made this shooter.
    pub made_points_mask: u8,
    pub epoch_point_established: bool,
    pub bets: Vec<CrapsBet>,
    pub rules: Option<CrapsRules>,
}

impl Default for CrapsState {
    fn default() -> Self {
        Self {
            version: 2,
            phase: CrapsPhase::ComeOut,
            point: 0,
            dice: [0, 0],
            made_points_mask: 0,
            epoch_point_established: false,
            bets: Vec::new(),
            rules: None,
        }
    }
}

impl CrapsState {
    pub fn has_rolled(&self) -> bool {
        self.dice != [0, 0]
    }

    pub fn total(&self) -> Option<u8> {
        self.has_rolled().then(|| self.dice[0] + self.dice[1])
    }

    /// Current point, if one is established.
    pub fn main_point(&self) -> Option<u8> {
        (self.phase == CrapsPhase::Point && self.point != 0).then_some(self.point)
    }

    pub fn stage(&self) -> Stage {
        match (self.has_rolled(), self.bets.is_empty()) {
            (false, _) => Stage::Betting,
            (true, false) => Stage::Playing,
            (true, true) => Stage::Result,
        }
    }

    pub fn wagers(&self) -> Vec<Wager> {
        self.bets.iter().map(CrapsBet::wager).collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = StateReader::new(GAME, bytes)?;
        let version = reader.u8()?;
        match version {
            1 => reader.require_total(7)?,
            2 => reader.require_total(8)?,
            other => return Err(reader.unsupported_version(other)),
        }

        let phase = reader.field("phase", CrapsPhase::from_repr)?;
        let point = reader.field("point", |p| (p == 0 || POINT_NUMBERS.contains(&p)).then_some(p))?;
        let die = |d: u8| (d <= 6).then_some(d);
        let dice = [reader.field("die", die)?, reader.field("die", die)?];
        if (dice[0] == 0) != (dice[1] == 0) {
            return Err(reader.invalid("die", 0));
        }
        let made_points_mask = reader.field("made points", |m| (m & !0x3F == 0).then_some(m))?;
        let epoch_point_established = if version == 2 {
            reader.u8()? != 0
        } else {
            phase == CrapsPhase::Point || point != 0 || made_points_mask != 0
        };

        let count = reader.wager_count(CRAPS_BET_RECORD_LEN)?;
        let mut bets = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = reader.field("bet kind", CrapsBetKind::from_repr)?;
            let target = reader.u8()?;
            let status = reader.field("bet status", BetStatus::from_repr)?;
            let amount = reader.u64()?;
            let odds = reader.u64()?;
            bets.push(CrapsBet {
                kind,
                target,
                status,
                amount,
                odds,
            });
        }

        let rules = if reader.remaining() >= 2 {
            Some(CrapsRules {
                field_paytable: reader.field("field paytable", FieldPaytable::from_repr)?,
                buy_commission: reader.field("buy commission", BuyCommission::from_repr)?,
            })
        } else {
            None
        };

        Ok(Self {
            version,
            phase,
            point,
            dice,
            made_points_mask,
            epoch_point_established,
            bets,
            rules,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + self.bets.len() * CRAPS_BET_RECORD_LEN + 2);
        buf.put_u8(self.version);
        buf.put_u8(self.phase as u8);
        buf.put_u8(self.point);
        buf.extend_from_slice(&self.dice);
        buf.put_u8(self.made_points_mask);
        if self.version >= 2 {
            buf.put_u8(u8::from(self.epoch_point_established));
        }
        buf.extend_from_slice(&self.encode_bets());
        if let Some(rules) = self.rules {
            buf.put_u8(rules.field_paytable as u8);
            buf.put_u8(rules.buy_commission as u8);
        }
        buf
    }

    /// `[n][bet × n]` exactly as the ledger lays it out.
    pub fn encode_bets(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.bets.len() * CRAPS_BET_RECORD_LEN);
        buf.put_u8(self.bets.len() as u8);
        for bet in &self.bets {
            bet.write_record(&mut buf);
        }
        buf
    }

    /// Bets still on the table are open; the ledger drops settled ones.
    pub fn resolve(&self) -> Vec<ResolvedWager> {
        self.bets
            .iter()
            .map(|bet| ResolvedWager::new(bet.label(), bet.amount, WagerOutcome::Pending))
            .collect()
    }

    pub fn describe(&self) -> Option<String> {
        let total = self.total()?;
        let [d1, d2] = self.dice;
        Some(match self.main_point() {
            Some(point) => format!("Rolled {d1}+{d2}={total}, point {point}"),
            None => format!("Rolled {d1}+{d2}={total}"),
        })
    }
}

/// Outcome of `bet` on a roll of `d1 + d2`, or `None` while it keeps working.
pub fn resolve_bet(
    bet: &CrapsBet,
    point: Option<u8>,
    made_points_mask: u8,
    d1: u8,
    d2: u8,
) -> Option<WagerOutcome> {
    use WagerOutcome::{Loss, Push, Win};

    let total = d1 + d2;
    let come_out_pass = |total: u8| match total {
        7 | 11 => Some(Win),
        2 | 3 | 12 => Some(Loss),
        _ => None,
    };
    let come_out_dont = |total: u8| match total {
        2 | 3 => Some(Win),
        12 => Some(Push),
        7 | 11 => Some(Loss),
        _ => None,
    };
    let number_before_seven = |number: u8| match total {
        7 => Some(Loss),
        t if t == number => Some(Win),
        _ => None,
    };
    let seven_before_number = |number: u8| match total {
        7 => Some(Win),
        t if t == number => Some(Loss),
        _ => None,
    };

    match bet.kind {
        CrapsBetKind::Pass => match point {
            None => come_out_pass(total),
            Some(p) => number_before_seven(p),
        },
        CrapsBetKind::DontPass => match point {
            None => come_out_dont(total),
            Some(p) => seven_before_number(p),
        },
        CrapsBetKind::Come => match bet.status {
            BetStatus::Pending => come_out_pass(total),
            BetStatus::On => number_before_seven(bet.target),
        },
        CrapsBetKind::DontCome => match bet.status {
            BetStatus::Pending => come_out_dont(total),
            BetStatus::On => seven_before_number(bet.target),
        },
        CrapsBetKind::Field => Some(if matches!(total, 2 | 3 | 4 | 9 | 10 | 11 | 12) {
            Win
        } else {
            Loss
        }),
        CrapsBetKind::Next => Some(if total == bet.target { Win } else { Loss }),
        CrapsBetKind::Yes | CrapsBetKind::Buy => number_before_seven(bet.target),
        CrapsBetKind::No => seven_before_number(bet.target),
        CrapsBetKind::Hardway4
        | CrapsBetKind::Hardway6
        | CrapsBetKind::Hardway8
        | CrapsBetKind::Hardway10 => {
            let number = bet.kind.hardway_number()?;
            if total == number && d1 == d2 {
                Some(Win)
            } else if total == number || total == 7 {
                Some(Loss)
            } else {
                None
            }
        }
        CrapsBetKind::Fire => match (point, total) {
            (Some(_), 7) if made_points_mask.count_ones() >= 4 => Some(Win),
            (Some(_), 7) => Some(Loss),
            _ => None,
        },
        CrapsBetKind::AtsSmall | CrapsBetKind::AtsTall | CrapsBetKind::AtsAll => {
            let required = bet.kind.ats_required()?;
            if total == 7 {
                Some(Loss)
            } else if (bet.odds | ats_bit(total)) & required == required {
                Some(Win)
            } else {
                None
            }
        }
    }
}

/// What a single observed roll did.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollReport {
    pub dice: [u8; 2],
    pub total: u8,
    pub point_before: Option<u8>,
    pub point_after: Option<u8>,
    pub resolved: Vec<ResolvedWager>,
}

/// Client-side roll history for the current shooter.
///
/// Any seven starts a fresh history of `[7]`; every other total is appended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RollTracker {
    history: Vec<u8>,
    resolved: Vec<ResolvedWager>,
}

impl RollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[u8] {
        &self.history
    }

    /// Every wager settled by rolls observed so far.
    pub fn resolved(&self) -> &[ResolvedWager] {
        &self.resolved
    }

    /// Records the roll that moved the table from `before` to `after`.
    ///
    /// Returns `None` if `after` carries no dice.
    pub fn observe(&mut self, before: Option<&CrapsState>, after: &CrapsState) -> Option<RollReport> {
        let total = after.total()?;
        let [d1, d2] = after.dice;

        if total == 7 {
            self.history.clear();
        }
        self.history.push(total);

        let point_before = before.and_then(CrapsState::main_point);
        let resolved: Vec<ResolvedWager> = before
            .map(|before| {
                before
                    .bets
                    .iter()
                    .filter_map(|bet| {
                        resolve_bet(bet, point_before, before.made_points_mask, d1, d2)
                            .map(|outcome| ResolvedWager::new(bet.label(), bet.amount, outcome))
                    })
                    .collect()
            })
            .unwrap_or_default();
        self.resolved.extend(resolved.iter().cloned());

        Some(RollReport {
            dice: after.dice,
            total,
            point_before,
            point_after: after.main_point(),
            resolved,
        })
    }
}

fn validate(spec: &WagerSpec) -> Result<(), EncodeError> {
    let kind = CrapsBetKind::from_repr(spec.kind).ok_or(EncodeError::UnknownWagerKind {
        game: GAME,
        kind: spec.kind,
    })?;
    if !kind.accepts_target(spec.target) {
        return Err(EncodeError::InvalidTarget {
            game: GAME,
            kind: spec.kind,
            target: spec.target,
        });
    }
    Ok(())
}

pub struct CrapsCodec;

impl GameCodec for CrapsCodec {
    fn game_type(&self) -> GameType {
        GAME
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError> {
        match command {
            Command::PlaceWager(spec) => place_payload(0, spec, validate),
            Command::AddOdds { amount } => amount_payload(1, *amount),
            Command::Advance => Ok(vec![2]),
            Command::Clear => Ok(vec![3]),
            other => Err(unsupported(GAME, other)),
        }
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
        CrapsState::from_bytes(bytes).map(Snapshot::Craps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(amount: u64) -> CrapsBet {
        CrapsBet {
            kind: CrapsBetKind::Pass,
            target: 0,
            status: BetStatus::On,
            amount,
            odds: 0,
        }
    }

    fn table(phase: CrapsPhase, point: u8, dice: [u8; 2], bets: Vec<CrapsBet>) -> CrapsState {
        CrapsState {
            phase,
            point,
            dice,
            bets,
            ..CrapsState::default()
        }
    }

    #[test]
    fn decodes_v1_and_v2_headers() {
        // v1: come-out, no point, no dice, one pass bet of 100.
        let mut v1 = vec![1, 0, 0, 0, 0, 0, 1];
        v1.extend_from_slice(&[0, 0, 0]);
        v1.extend_from_slice(&100u64.to_be_bytes());
        v1.extend_from_slice(&0u64.to_be_bytes());
        let state = CrapsState::from_bytes(&v1).unwrap();
        assert_eq!(state.version, 1);
        assert_eq!(state.stage(), Stage::Betting);
        assert_eq!(state.wagers(), vec![Wager::confirmed(0, 0, 100)]);
        assert_eq!(state.to_bytes(), v1);

        // v2 with point 6, dice 2+4, rules bytes.
        let mut v2 = vec![2, 1, 6, 2, 4, 0b100, 1, 1];
        let mut bet = pass(25);
        bet.odds = 50;
        let mut record = Vec::new();
        bet.write_record(&mut record);
        assert_eq!(record.len(), CRAPS_BET_RECORD_LEN);
        v2.extend_from_slice(&record);
        v2.extend_from_slice(&[1, 1]);
        let state = CrapsState::from_bytes(&v2).unwrap();
        assert_eq!(state.main_point(), Some(6));
        assert!(state.epoch_point_established);
        assert_eq!(state.wagers()[0].secondary_amount, 50);
        assert_eq!(
            state.rules,
            Some(CrapsRules {
                field_paytable: FieldPaytable::Double2Triple12,
                buy_commission: BuyCommission::OnWin,
            })
        );
        assert_eq!(state.to_bytes(), v2);
        assert_eq!(&state.encode_bets()[1..], record.as_slice());
    }

    #[test]
    fn rejects_unknown_version_and_bet_kind() {
        assert!(matches!(
            CrapsState::from_bytes(&[3, 0, 0, 0, 0, 0, 0, 0]),
            Err(DecodeError::UnsupportedVersion { version: 3, .. })
        ));
        let mut bad = vec![2, 0, 0, 0, 0, 0, 0, 1, 14, 0, 0];
        bad.extend_from_slice(&[0; 16]);
        assert!(matches!(
            CrapsState::from_bytes(&bad),
            Err(DecodeError::InvalidField { field: "bet kind", value: 14, .. })
        ));
        assert!(matches!(
            CrapsState::from_bytes(&[2, 0, 0, 0, 0, 0, 0]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn tracker_establishes_point_and_pays_it() {
        let mut tracker = RollTracker::new();

        let before = table(CrapsPhase::ComeOut, 0, [0, 0], vec![pass(100)]);
        let after = table(CrapsPhase::Point, 5, [2, 3], vec![pass(100)]);
        let report = tracker.observe(Some(&before), &after).unwrap();
        assert_eq!(report.total, 5);
        assert_eq!(report.point_before, None);
        assert_eq!(report.point_after, Some(5));
        assert!(report.resolved.is_empty());
        assert_eq!(tracker.history(), &[5]);

        let before = after;
        let after = table(CrapsPhase::ComeOut, 0, [1, 4], vec![]);
        let report = tracker.observe(Some(&before), &after).unwrap();
        assert_eq!(report.point_after, None);
        assert_eq!(
            report.resolved,
            vec![ResolvedWager::new("Pass", 100, WagerOutcome::Win)]
        );
        assert_eq!(tracker.history(), &[5, 5]);
    }

    #[test]
    fn seven_resets_history() {
        let mut tracker = RollTracker::new();
        for dice in [[3, 3], [4, 4], [2, 5], [6, 5]] {
            tracker.observe(None, &table(CrapsPhase::ComeOut, 0, dice, vec![]));
        }
        assert_eq!(tracker.history(), &[7, 11]);
    }

    #[test]
    fn seven_before_the_point_stays_in_history() {
        let mut tracker = RollTracker::new();

        let opening = table(CrapsPhase::ComeOut, 0, [0, 0], vec![]);
        let natural = table(CrapsPhase::ComeOut, 0, [3, 4], vec![pass(25)]);
        tracker.observe(Some(&opening), &natural).unwrap();
        assert_eq!(tracker.history(), &[7]);

        let point = table(CrapsPhase::Point, 5, [1, 4], vec![pass(25)]);
        let report = tracker.observe(Some(&natural), &point).unwrap();
        assert_eq!(report.point_after, Some(5));
        assert_eq!(tracker.history(), &[7, 5]);

        let made = table(CrapsPhase::ComeOut, 0, [2, 3], vec![]);
        let report = tracker.observe(Some(&point), &made).unwrap();
        assert_eq!(
            report.resolved,
            vec![ResolvedWager::new("Pass", 25, WagerOutcome::Win)]
        );
        assert_eq!(tracker.history(), &[7, 5, 5]);
    }

    #[test]
    fn single_roll_and_hardway_bets() {
        let field = CrapsBet {
            kind: CrapsBetKind::Field,
            ..pass(10)
        };
        assert_eq!(resolve_bet(&field, None, 0, 1, 1), Some(WagerOutcome::Win));
        assert_eq!(resolve_bet(&field, None, 0, 3, 4), Some(WagerOutcome::Loss));

        let hard8 = CrapsBet {
            kind: CrapsBetKind::Hardway8,
            ..pass(10)
        };
        assert_eq!(resolve_bet(&hard8, Some(6), 0, 4, 4), Some(WagerOutcome::Win));
        assert_eq!(resolve_bet(&hard8, Some(6), 0, 5, 3), Some(WagerOutcome::Loss));
        assert_eq!(resolve_bet(&hard8, Some(6), 0, 5, 4), None);
    }

    #[test]
    fn encodes_commands() {
        let codec = CrapsCodec;
        assert_eq!(codec.encode_command(&Command::Advance).unwrap(), vec![2]);
        assert_eq!(codec.encode_command(&Command::Clear).unwrap(), vec![3]);
        let odds = codec
            .encode_command(&Command::AddOdds { amount: 40 })
            .unwrap();
        assert_eq!(odds[0], 1);
        assert_eq!(&odds[1..], &40u64.to_be_bytes());
        assert!(matches!(
            codec.encode_command(&Command::PlaceWager(WagerSpec::new(5, 7, 10))),
            Err(EncodeError::InvalidTarget { .. })
        ));
    }
}
