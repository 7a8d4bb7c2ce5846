//! Cross-frontend primitives for presenting the casino table.
//!
//! Houses message logging, event handling, formatting and the table view
//! model that terminal replays and future graphical clients can reuse.
pub mod config;
pub mod event;
pub mod format;
pub mod frontend;
pub mod message;
pub mod services;
pub mod view_model;

pub use config::{FrontendConfig, MessageConfig, TableConfig};
pub use event::{EventConsumer, EventImpact, TableEventConsumer};
pub use frontend::Frontend;
pub use message::{MessageEntry, MessageLevel, MessageLog};
pub use services::{UpdateScope, ViewModelUpdater};
pub use view_model::{HandRow, TableViewModel, WagerRow, hand_rows};
