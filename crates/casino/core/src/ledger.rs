//! Settled-session history.
//!
//! A [`LedgerEntry`] is written once per completed session and never
//! rewritten. Net PnL prefers the balance delta measured against the balance
//! snapshotted when the session began; without that snapshot it falls back
//! to the ledger-reported payout minus what was wagered.
use std::collections::VecDeque;
use std::fmt;

use bitflags::bitflags;

use crate::game::GameType;
use crate::session::SessionId;
use crate::snapshot::Snapshot;

bitflags! {
    /// Modifiers the ledger reports as consumed by a completed session.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CompletionFlags: u8 {
        const SHIELD_USED = 0b0000_0001;
        const DOUBLE_USED = 0b0000_0010;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WagerOutcome {
    #[strum(serialize = "WIN")]
    Win,
    #[strum(serialize = "LOSS")]
    Loss,
    #[strum(serialize = "PUSH")]
    Push,
    /// Roulette la partage: half the even-money stake comes back on zero.
    #[strum(serialize = "HALF BACK")]
    HalfReturned,
    /// Roulette en prison: the even-money stake is held for the next spin.
    #[strum(serialize = "IN PRISON")]
    Imprisoned,
    #[strum(serialize = "OPEN")]
    Pending,
}

/// One display line explaining how a wager ended.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedWager {
    pub label: String,
    /// Chips on a side or table wager; `None` for a hand played on the
    /// session stake.
    pub amount: Option<u64>,
    pub outcome: WagerOutcome,
}

impl ResolvedWager {
    pub fn new(label: impl Into<String>, amount: u64, outcome: WagerOutcome) -> Self {
        Self {
            label: label.into(),
            amount: Some(amount),
            outcome,
        }
    }

    /// A hand or main bet whose chips are the session stake.
    pub fn on_stake(label: impl Into<String>, outcome: WagerOutcome) -> Self {
        Self {
            label: label.into(),
            amount: None,
            outcome,
        }
    }
}

impl fmt::Display for ResolvedWager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount {
            Some(amount) => write!(f, "{} {amount}: {}", self.label, self.outcome),
            None => write!(f, "{}: {}", self.label, self.outcome),
        }
    }
}

/// How the net figure of a [`LedgerEntry`] was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PnlBasis {
    BalanceDelta,
    PayoutEstimate,
}

/// Net result of a session.
pub fn net_pnl(
    starting_balance: Option<u64>,
    final_balance: u64,
    payout: i64,
    wagered: u64,
) -> (i64, PnlBasis) {
    match starting_balance {
        Some(start) => (
            clamp_i64(i128::from(final_balance) - i128::from(start)),
            PnlBasis::BalanceDelta,
        ),
        None => (
            clamp_i64(i128::from(payout) - i128::from(wagered)),
            PnlBasis::PayoutEstimate,
        ),
    }
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub headline: String,
    pub details: Vec<String>,
}

impl Summary {
    /// Appends lines resolved outside the final snapshot (e.g. craps rolls).
    pub fn with_resolved(mut self, resolved: &[ResolvedWager]) -> Self {
        self.details
            .extend(resolved.iter().map(ResolvedWager::to_string));
        self
    }
}

/// Builds the headline and per-wager detail lines for a completed session.
///
/// The headline always carries the signed net amount.
pub fn summarize(
    game: GameType,
    snapshot: Option<&Snapshot>,
    net: i64,
    flags: CompletionFlags,
) -> Summary {
    let verdict = match net.signum() {
        1 => "WON",
        -1 => "LOST",
        _ => "PUSH",
    };
    let mut headline = format!("{}: {verdict} {net:+}", game.title());
    if let Some(context) = snapshot.and_then(Snapshot::describe) {
        headline.push_str(&format!(" ({context})"));
    }
    if flags.contains(CompletionFlags::SHIELD_USED) {
        headline.push_str(" [shield]");
    }
    if flags.contains(CompletionFlags::DOUBLE_USED) {
        headline.push_str(" [double]");
    }

    let details = snapshot
        .map(|snapshot| {
            snapshot
                .resolve()
                .iter()
                .map(ResolvedWager::to_string)
                .collect()
        })
        .unwrap_or_default();

    Summary { headline, details }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerEntry {
    pub session_id: SessionId,
    pub game_type: GameType,
    pub net: i64,
    pub basis: PnlBasis,
    pub flags: CompletionFlags,
    pub headline: String,
    pub details: Vec<String>,
    /// Unix milliseconds, stamped by the caller.
    pub recorded_at_ms: i64,
}

/// Append-only, bounded history of settled sessions.
#[derive(Clone, Debug)]
pub struct Ledger {
    entries: VecDeque<LedgerEntry>,
    capacity: usize,
}

impl Ledger {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
        }
    }

    /// Records a settled session. The oldest entry is dropped once the
    /// history is full.
    pub fn append(&mut self, entry: LedgerEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LedgerEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_net(&self) -> i64 {
        self.entries
            .iter()
            .fold(0i64, |sum, entry| sum.saturating_add(entry.net))
    }

    pub fn to_vec(&self) -> Vec<LedgerEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(256)
    }
}
