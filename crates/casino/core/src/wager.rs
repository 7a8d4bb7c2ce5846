//! Wagers as the client tracks them: confirmed by the ledger, or staged
//! locally while the command that places them is in flight.
use bytes::BufMut;

/// Upper bound on wagers carried by a single state blob or batch.
pub const MAX_WAGERS: usize = 20;

/// `[kind:u8][target:u8][amount:u64 BE]`
pub const WAGER_RECORD_LEN: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WagerOrigin {
    /// Optimistically added; not yet reflected in any ledger snapshot.
    Staged,
    Confirmed,
}

/// What the player asks to put on the table.
///
/// `target` is the game-specific sub-selector (a number, a dozen, a hop
/// mask); it is zero for kinds that take none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WagerSpec {
    pub kind: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: u8,
    pub amount: u64,
}

impl WagerSpec {
    pub const fn new(kind: u8, target: u8, amount: u64) -> Self {
        Self {
            kind,
            target,
            amount,
        }
    }

    pub fn write_record(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.kind);
        buf.put_u8(self.target);
        buf.put_u64(self.amount);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wager {
    pub kind: u8,
    pub target: u8,
    pub amount: u64,
    /// Odds behind a craps line bet; zero elsewhere.
    pub secondary_amount: u64,
    pub origin: WagerOrigin,
}

impl Wager {
    pub const fn confirmed(kind: u8, target: u8, amount: u64) -> Self {
        Self {
            kind,
            target,
            amount,
            secondary_amount: 0,
            origin: WagerOrigin::Confirmed,
        }
    }

    pub const fn staged(spec: WagerSpec) -> Self {
        Self {
            kind: spec.kind,
            target: spec.target,
            amount: spec.amount,
            secondary_amount: 0,
            origin: WagerOrigin::Staged,
        }
    }

    pub const fn with_secondary(mut self, secondary_amount: u64) -> Self {
        self.secondary_amount = secondary_amount;
        self
    }

    pub const fn spec(&self) -> WagerSpec {
        WagerSpec::new(self.kind, self.target, self.amount)
    }

    pub const fn is_staged(&self) -> bool {
        matches!(self.origin, WagerOrigin::Staged)
    }

    /// Structural equality used to pair a staged wager with its confirmation.
    pub const fn same_stake(&self, other: &Wager) -> bool {
        self.kind == other.kind && self.target == other.target && self.amount == other.amount
    }

    pub const fn total_amount(&self) -> u64 {
        self.amount.saturating_add(self.secondary_amount)
    }
}

/// Serializes wagers as consecutive 10-byte records.
pub fn encode_wager_records(wagers: &[Wager]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(wagers.len() * WAGER_RECORD_LEN);
    for wager in wagers {
        wager.spec().write_record(&mut buf);
    }
    buf
}

/// Returns the staged wagers still unconfirmed after the ledger moved from
/// `previous` to `confirmed`.
///
/// Each wager that appears in `confirmed` more often than in `previous`
/// absorbs one structurally equal staged wager, so a confirmed wager is never
/// shown twice and a repeated identical bet is not swallowed by an older one.
pub fn settle_staged(staged: &[Wager], previous: &[Wager], confirmed: &[Wager]) -> Vec<Wager> {
    let mut fresh: Vec<&Wager> = Vec::with_capacity(confirmed.len());
    let mut carried: Vec<bool> = vec![false; previous.len()];
    for wager in confirmed {
        let matched = previous
            .iter()
            .enumerate()
            .find(|(idx, old)| !carried[*idx] && old.same_stake(wager));
        match matched {
            Some((idx, _)) => carried[idx] = true,
            None => fresh.push(wager),
        }
    }

    staged
        .iter()
        .filter(|pending| {
            match fresh.iter().position(|wager| wager.same_stake(pending)) {
                Some(idx) => {
                    fresh.swap_remove(idx);
                    false
                }
                None => true,
            }
        })
        .copied()
        .collect()
}

/// Confirmed wagers followed by the staged ones still awaiting the ledger.
pub fn merge_wagers(staged: &[Wager], confirmed: &[Wager]) -> Vec<Wager> {
    confirmed.iter().chain(staged.iter()).copied().collect()
}
