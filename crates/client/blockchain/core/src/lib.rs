//! Ledger transport contract for the casino client.
//!
//! The runtime never talks to a chain directly. It submits through
//! [`CommandSubmitter`], queries through [`SessionQuery`] and receives push
//! notifications as [`ChainSignal`]s.
//!
//! # Architecture
//!
//! ```text
//! CasinoChain (composite trait)
//!   ├── CommandSubmitter   start / command / modifier transactions
//!   └── SessionQuery       direct reads used by the watchdog and balance refresh
//!
//! ChainSignal               Started / Moved / Completed / Error push events
//! ```
//!
//! Signing, key management and fee handling live behind the trait
//! implementations; the runtime treats every call as opaque.

pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use traits::{CasinoChain, CommandSubmitter, SessionQuery, TransportError};
pub use types::{AccountId, ChainSignal, Modifier, OnChainSession, SessionStatus, TxHandle};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockChain, Submission};
