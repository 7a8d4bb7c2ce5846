//! Game-agnostic player commands.
//!
//! The runtime and UI speak in [`Command`]s; each game's codec maps them onto
//! its own one-byte action discriminator and operands.
use crate::wager::WagerSpec;

/// Optional side bets attached to a card game round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case")]
pub enum SideWager {
    /// Blackjack: player's first two cards plus dealer up-card.
    TwentyOnePlusThree,
    /// Casino War: first cards tie.
    Tie,
    /// Three Card Poker.
    PairPlus,
    /// Three Card Poker and Ultimate Hold'em.
    SixCardBonus,
    Progressive,
    /// Ultimate Hold'em.
    Trips,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlayerMove {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
    /// Casino War: go to war on a tie.
    War,
    Higher,
    Lower,
    Same,
    CashOut,
    /// Video poker: bit `i` keeps card `i`.
    Hold { mask: u8 },
    Play,
    Fold,
    Check,
    /// Ultimate Hold'em raise, as a multiple of the ante (4, 2 or 1).
    Bet { multiplier: u8 },
}

impl PlayerMove {
    pub const fn name(&self) -> &'static str {
        match self {
            PlayerMove::Hit => "hit",
            PlayerMove::Stand => "stand",
            PlayerMove::Double => "double",
            PlayerMove::Split => "split",
            PlayerMove::Surrender => "surrender",
            PlayerMove::War => "war",
            PlayerMove::Higher => "higher",
            PlayerMove::Lower => "lower",
            PlayerMove::Same => "same",
            PlayerMove::CashOut => "cash out",
            PlayerMove::Hold { .. } => "hold",
            PlayerMove::Play => "play",
            PlayerMove::Fold => "fold",
            PlayerMove::Check => "check",
            PlayerMove::Bet { .. } => "bet",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Command {
    PlaceWager(WagerSpec),
    /// Several wagers submitted as one atomic payload.
    PlaceBatch(Vec<WagerSpec>),
    /// Craps odds behind the line bet.
    AddOdds { amount: u64 },
    /// Deal, roll or spin, depending on the table.
    Advance,
    Clear,
    SetSideWager { side: SideWager, amount: u64 },
    SetRules(u8),
    /// Ask the ledger to reveal the dealer's hidden cards.
    Reveal,
    Move(PlayerMove),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::PlaceWager(_) => "place wager",
            Command::PlaceBatch(_) => "place batch",
            Command::AddOdds { .. } => "add odds",
            Command::Advance => "advance",
            Command::Clear => "clear",
            Command::SetSideWager { .. } => "side wager",
            Command::SetRules(_) => "set rules",
            Command::Reveal => "reveal",
            Command::Move(player_move) => player_move.name(),
        }
    }

    /// Wagers this command puts on the table, for optimistic staging.
    pub fn placed_wagers(&self) -> Vec<WagerSpec> {
        match self {
            Command::PlaceWager(spec) => vec![*spec],
            Command::PlaceBatch(specs) => specs.clone(),
            _ => Vec::new(),
        }
    }

    /// Chips this command commits on top of the session stake.
    pub fn committed_amount(&self) -> u64 {
        match self {
            Command::PlaceWager(spec) => spec.amount,
            Command::PlaceBatch(specs) => specs
                .iter()
                .fold(0u64, |sum, spec| sum.saturating_add(spec.amount)),
            Command::AddOdds { amount } | Command::SetSideWager { amount, .. } => *amount,
            _ => 0,
        }
    }

    pub const fn is_advance(&self) -> bool {
        matches!(self, Command::Advance)
    }
}
