//! Common types for ledger interactions.

use std::fmt;
use std::str::FromStr;

use casino_core::{CompletionFlags, GameType, SessionId};
use serde::{Deserialize, Serialize};

/// Player account key (32 bytes), shown and parsed as hex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for AccountId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque transaction handle returned by a submission.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle(#[serde(with = "hex_bytes")] pub Vec<u8>);

impl TxHandle {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Session-wide modifiers the player can arm before a round.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Modifier {
    /// Loss shield: a losing session returns the stake.
    Shield,
    /// Win multiplier: a winning session pays double.
    Double,
}

impl Modifier {
    /// Completion flag reporting that this modifier was consumed.
    pub fn consumed_flag(self) -> CompletionFlags {
        match self {
            Modifier::Shield => CompletionFlags::SHIELD_USED,
            Modifier::Double => CompletionFlags::DOUBLE_USED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Session as read back from the ledger by a direct query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainSession {
    pub session_id: SessionId,
    pub game_type: GameType,
    pub status: SessionStatus,
    /// Current state blob; empty until the contract writes one.
    #[serde(with = "hex_bytes")]
    pub state: Vec<u8>,
}

impl OnChainSession {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Push notification emitted by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum ChainSignal {
    Started {
        session_id: SessionId,
        game_type: GameType,
        #[serde(with = "hex_bytes", default)]
        state: Vec<u8>,
    },
    Moved {
        session_id: SessionId,
        #[serde(with = "hex_bytes")]
        state: Vec<u8>,
    },
    Completed {
        session_id: SessionId,
        final_balance: u64,
        payout: i64,
        #[serde(default)]
        flags: CompletionFlags,
    },
    Error {
        #[serde(default)]
        session_id: Option<SessionId>,
        message: String,
    },
}

impl ChainSignal {
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            ChainSignal::Started { session_id, .. }
            | ChainSignal::Moved { session_id, .. }
            | ChainSignal::Completed { session_id, .. } => Some(*session_id),
            ChainSignal::Error { session_id, .. } => *session_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChainSignal::Started { .. } => "started",
            ChainSignal::Moved { .. } => "moved",
            ChainSignal::Completed { .. } => "completed",
            ChainSignal::Error { .. } => "error",
        }
    }
}

/// Serde adapter writing byte vectors as hex strings.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}
