//! Worker tasks that back the runtime orchestration.
//!
//! The reconciler owns every piece of session state; the watchdog is the
//! timer it arms while waiting on the ledger.

mod reconciler;
mod watchdog;

pub use reconciler::{Command, ReconcilerWorker};
