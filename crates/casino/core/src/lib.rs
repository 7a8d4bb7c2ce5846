//! Pure game model shared by the sync runtime and tooling.
//!
//! `casino-core` knows the byte layouts of the ten table contracts: it decodes
//! state blobs into typed [`Snapshot`]s, encodes player [`Command`]s into
//! action payloads through [`CodecRegistry`], and turns a finished session
//! into a ledger [`Summary`]. Nothing here performs I/O or reads a clock.
pub mod card;
pub mod codec;
pub mod error;
pub mod eval;
pub mod game;
pub mod games;
pub mod ledger;
pub mod session;
pub mod snapshot;
pub mod wager;

pub use card::{Card, CardSlot, HIDDEN_CARD, Rank, Suit};
pub use codec::{
    CodecRegistry, Command, DecodeError, EncodeError, GameCodec, PlayerMove, SideWager,
    decode_state, encode_command,
};
pub use error::{CasinoError, ErrorSeverity};
pub use game::{GameType, Stage};
pub use games::{CrapsState, RollReport, RollTracker, wager_label};
pub use ledger::{
    CompletionFlags, Ledger, LedgerEntry, PnlBasis, ResolvedWager, Summary, WagerOutcome,
    net_pnl, summarize,
};
pub use session::SessionId;
pub use snapshot::Snapshot;
pub use wager::{
    MAX_WAGERS, Wager, WagerOrigin, WagerSpec, encode_wager_records, merge_wagers,
    settle_staged,
};
