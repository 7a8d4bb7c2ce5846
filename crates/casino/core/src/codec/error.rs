use thiserror::Error;

use crate::error::{CasinoError, ErrorSeverity};
use crate::game::GameType;

/// A state blob the client refuses to interpret.
///
/// Decoding never returns a partially filled snapshot: any of these leaves
/// the caller's last good snapshot in place.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{game} state is empty")]
    Empty { game: GameType },

    #[error("{game} state truncated: need {expected} bytes, got {actual}")]
    Truncated {
        game: GameType,
        expected: usize,
        actual: usize,
    },

    #[error("{game} state version {version} is not supported")]
    UnsupportedVersion { game: GameType, version: u8 },

    #[error("{game} state has invalid {field} byte {value:#04x}")]
    InvalidField {
        game: GameType,
        field: &'static str,
        value: u8,
    },

    #[error("{game} state carries {count} wagers (limit {max})")]
    TooManyWagers {
        game: GameType,
        count: usize,
        max: usize,
    },

    #[error("{game} state has {extra} unexpected trailing bytes")]
    TrailingBytes { game: GameType, extra: usize },

    #[error("{game} state starts with game id {found}")]
    GamePrefix { game: GameType, found: u8 },

    #[error("no codec registered for {0}")]
    NoCodec(GameType),
}

impl CasinoError for DecodeError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }
}

/// A command that cannot be expressed as a payload for the given game.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{game} does not support {command}")]
    Unsupported {
        game: GameType,
        command: &'static str,
    },

    #[error("{game} has no wager kind {kind}")]
    UnknownWagerKind { game: GameType, kind: u8 },

    #[error("{game} wager target {target} is out of range for kind {kind}")]
    InvalidTarget { game: GameType, kind: u8, target: u8 },

    #[error("wager amount must be greater than zero")]
    ZeroAmount,

    #[error("batch of {count} wagers must hold between 1 and {max}")]
    BatchSize { count: usize, max: usize },

    #[error("no codec registered for {0}")]
    NoCodec(GameType),
}

impl CasinoError for EncodeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            EncodeError::NoCodec(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }
}
