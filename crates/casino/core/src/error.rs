//! Common error infrastructure for casino-core.
//!
//! Concern-specific errors (`DecodeError`, `EncodeError`) live next to the
//! codec that raises them. This module only carries the classification that
//! lets the runtime decide whether a failure should be surfaced, retried or
//! treated as a bug.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed later (transport hiccup)
/// - **Validation**: the request itself is wrong and must not be retried as-is
/// - **Internal**: bytes or state the client cannot make sense of
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all casino errors.
pub trait CasinoError: std::error::Error {
    fn severity(&self) -> ErrorSeverity;

    fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }
}
