//! Byte-level codec between ledger state blobs / command payloads and typed
//! snapshots / commands.
//!
//! All multi-byte integers are big-endian. Every payload starts with a
//! one-byte action discriminator; every state blob either yields a complete
//! snapshot or is rejected. Wager tables whose layout ends in optional fields
//! also reject bytes past the last one.
mod command;
mod error;
mod reader;
mod registry;

use std::sync::OnceLock;

use bytes::BufMut;

pub use command::{Command, PlayerMove, SideWager};
pub use error::{DecodeError, EncodeError};
pub(crate) use reader::StateReader;
pub use registry::CodecRegistry;

use crate::game::GameType;
use crate::snapshot::Snapshot;
use crate::wager::{MAX_WAGERS, WAGER_RECORD_LEN, WagerSpec};

/// Per-game translation between typed commands/snapshots and ledger bytes.
pub trait GameCodec: Send + Sync {
    fn game_type(&self) -> GameType;

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>, EncodeError>;

    fn decode_state(&self, bytes: &[u8]) -> Result<Snapshot, DecodeError>;
}

fn default_registry() -> &'static CodecRegistry {
    static REGISTRY: OnceLock<CodecRegistry> = OnceLock::new();
    REGISTRY.get_or_init(CodecRegistry::with_defaults)
}

/// Encodes `command` for `game` with the built-in codecs.
pub fn encode_command(game: GameType, command: &Command) -> Result<Vec<u8>, EncodeError> {
    default_registry().encode_command(game, command)
}

/// Decodes a state blob for `game` with the built-in codecs.
pub fn decode_state(game: GameType, bytes: &[u8]) -> Result<Snapshot, DecodeError> {
    default_registry().decode_state(game, bytes)
}

pub(crate) fn unsupported(game: GameType, command: &Command) -> EncodeError {
    EncodeError::Unsupported {
        game,
        command: command.name(),
    }
}

/// `[action][kind][target][amount]`
pub(crate) fn place_payload(
    action: u8,
    spec: &WagerSpec,
    validate: impl Fn(&WagerSpec) -> Result<(), EncodeError>,
) -> Result<Vec<u8>, EncodeError> {
    check_wager(spec, &validate)?;
    let mut buf = Vec::with_capacity(1 + WAGER_RECORD_LEN);
    buf.put_u8(action);
    spec.write_record(&mut buf);
    Ok(buf)
}

/// `[action][count][kind target amount × count]`
pub(crate) fn batch_payload(
    action: u8,
    specs: &[WagerSpec],
    validate: impl Fn(&WagerSpec) -> Result<(), EncodeError>,
) -> Result<Vec<u8>, EncodeError> {
    if specs.is_empty() || specs.len() > MAX_WAGERS {
        return Err(EncodeError::BatchSize {
            count: specs.len(),
            max: MAX_WAGERS,
        });
    }
    let mut buf = Vec::with_capacity(2 + specs.len() * WAGER_RECORD_LEN);
    buf.put_u8(action);
    buf.put_u8(specs.len() as u8);
    for spec in specs {
        check_wager(spec, &validate)?;
        spec.write_record(&mut buf);
    }
    Ok(buf)
}

/// `[action][amount]`
pub(crate) fn amount_payload(action: u8, amount: u64) -> Result<Vec<u8>, EncodeError> {
    if amount == 0 {
        return Err(EncodeError::ZeroAmount);
    }
    let mut buf = Vec::with_capacity(9);
    buf.put_u8(action);
    buf.put_u64(amount);
    Ok(buf)
}

fn check_wager(
    spec: &WagerSpec,
    validate: &impl Fn(&WagerSpec) -> Result<(), EncodeError>,
) -> Result<(), EncodeError> {
    if spec.amount == 0 {
        return Err(EncodeError::ZeroAmount);
    }
    validate(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_payload_bounds() {
        let ok = |_: &WagerSpec| Ok(());
        assert!(matches!(
            batch_payload(3, &[], ok),
            Err(EncodeError::BatchSize { count: 0, .. })
        ));
        let many = vec![WagerSpec::new(0, 0, 1); MAX_WAGERS + 1];
        assert!(matches!(
            batch_payload(3, &many, ok),
            Err(EncodeError::BatchSize { .. })
        ));
    }

    #[test]
    fn zero_amounts_are_rejected() {
        assert_eq!(amount_payload(1, 0), Err(EncodeError::ZeroAmount));
        assert_eq!(
            place_payload(0, &WagerSpec::new(0, 0, 0), |_| Ok(())),
            Err(EncodeError::ZeroAmount)
        );
    }
}
