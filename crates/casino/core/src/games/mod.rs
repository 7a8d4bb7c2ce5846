//! Per-game state layouts and command codecs.
//!
//! Each module owns one ledger contract: a `*State` that decodes the
//! contract's state blob and a `*Codec` implementing
//! [`GameCodec`](crate::codec::GameCodec) for its action payloads.
pub mod baccarat;
pub mod blackjack;
pub mod casino_war;
pub mod craps;
pub mod hilo;
pub mod roulette;
pub mod sic_bo;
pub mod three_card;
pub mod ultimate_holdem;
pub mod video_poker;

pub use baccarat::{BaccaratBet, BaccaratCodec, BaccaratState};
pub use blackjack::{BlackjackCodec, BlackjackHand, BlackjackStage, BlackjackState, HandStatus};
pub use casino_war::{CasinoWarCodec, CasinoWarState, WarStage};
pub use craps::{
    BetStatus, CrapsBet, CrapsBetKind, CrapsCodec, CrapsPhase, CrapsRules, CrapsState,
    RollReport, RollTracker,
};
pub use hilo::{HiLoCodec, HiLoState};
pub use roulette::{RouletteBet, RouletteCodec, RoulettePhase, RouletteState, ZeroRule};
pub use sic_bo::{SicBoBet, SicBoCodec, SicBoPaytable, SicBoState};
pub use three_card::{ThreeCardCodec, ThreeCardStage, ThreeCardState};
pub use ultimate_holdem::{HoldemStage, UltimateHoldemCodec, UltimateHoldemState};
pub use video_poker::{VideoPokerCodec, VideoPokerRank, VideoPokerStage, VideoPokerState};

use crate::game::GameType;
use crate::wager::Wager;

/// Display label for one wager record of `game`, e.g. "Straight 17".
pub fn wager_label(game: GameType, wager: &Wager) -> String {
    let (kind, target) = (wager.kind, wager.target);
    let label = match game {
        GameType::Roulette => RouletteBet::from_repr(kind).map(|bet| bet.label(target)),
        GameType::SicBo => SicBoBet::from_repr(kind).map(|bet| bet.label(target)),
        GameType::Baccarat => BaccaratBet::from_repr(kind).map(|bet| bet.to_string()),
        GameType::Craps => CrapsBetKind::from_repr(kind).map(|bet| match target {
            0 => bet.to_string(),
            target => format!("{bet} {target}"),
        }),
        GameType::Blackjack if kind == blackjack::TWENTY_ONE_PLUS_THREE => {
            Some("21+3".to_string())
        }
        GameType::CasinoWar if kind == casino_war::TIE_BET => Some("Tie".to_string()),
        GameType::ThreeCard => match kind {
            three_card::PAIR_PLUS => Some("Pair Plus".to_string()),
            three_card::SIX_CARD_BONUS => Some("Six Card".to_string()),
            three_card::PROGRESSIVE => Some("Progressive".to_string()),
            _ => None,
        },
        GameType::UltimateHoldem => match kind {
            ultimate_holdem::TRIPS => Some("Trips".to_string()),
            ultimate_holdem::SIX_CARD_BONUS => Some("Six Card".to_string()),
            ultimate_holdem::PROGRESSIVE => Some("Progressive".to_string()),
            _ => None,
        },
        _ => None,
    };
    label.unwrap_or_else(|| format!("Bet {kind}/{target}"))
}
