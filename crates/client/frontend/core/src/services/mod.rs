//! Services that keep presentation state in step with runtime events.

mod updater;

pub use updater::{UpdateScope, ViewModelUpdater};
