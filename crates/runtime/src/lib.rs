//! Client-side session reconciliation for ledger-backed casino tables.
//!
//! This crate keeps one local session in step with a remote ledger that
//! acknowledges submissions quickly but reports their effects later, out of
//! order with the player's intent, or not at all. Consumers embed [`Runtime`]
//! to open sessions, submit commands, and subscribe to events through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`session`] holds the registry, tentative modifiers and the UI view
//! - [`planner`] queues auto-play plans until their session is confirmed
//! - `workers` keeps the reconciler task internal to the crate
pub mod api;
pub mod events;
pub mod planner;
pub mod runtime;
pub mod session;

mod workers;

pub use api::{PlanError, RegistryError, Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, Notice, NoticeLevel, SessionEvent, Topic};
pub use planner::AutoPlayPlan;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use session::{ModifierView, Phase, SessionView};
