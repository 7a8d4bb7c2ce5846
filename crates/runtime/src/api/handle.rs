//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving a session or streaming events from specific topics.
use std::collections::HashMap;

use casino_core::{Command as GameCommand, GameType, LedgerEntry, SessionId};
use client_blockchain_core::{ChainSignal, Modifier, TxHandle};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::planner::AutoPlayPlan;
use crate::session::SessionView;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Opens a session and resolves once the start transaction is accepted.
    ///
    /// The session is not yet confirmed: wait for
    /// [`SessionEvent::Confirmed`](crate::SessionEvent::Confirmed) before
    /// submitting, or use [`begin_with_plan`](Self::begin_with_plan).
    pub async fn begin(&self, game_type: GameType, stake: u64) -> Result<SessionId> {
        self.request(|reply| Command::Begin {
            game_type,
            stake,
            plan: None,
            reply,
        })
        .await?
    }

    /// Opens a session and submits `steps` as soon as it is confirmed.
    pub async fn begin_with_plan(
        &self,
        game_type: GameType,
        stake: u64,
        steps: Vec<GameCommand>,
    ) -> Result<SessionId> {
        self.request(|reply| Command::Begin {
            game_type,
            stake,
            plan: Some(steps),
            reply,
        })
        .await?
    }

    /// Attaches a plan to a session that is still awaiting confirmation.
    pub async fn queue_auto_play(&self, plan: AutoPlayPlan) -> Result<()> {
        self.request(|reply| Command::QueuePlan { plan, reply })
            .await?
    }

    /// Submits one command and returns its transaction handle.
    pub async fn submit(&self, command: GameCommand) -> Result<TxHandle> {
        let handles = self.submit_batch(vec![command]).await?;
        handles.into_iter().last().ok_or(RuntimeError::EmptyBatch)
    }

    /// Submits commands in order, all gated as one batch.
    pub async fn submit_batch(&self, commands: Vec<GameCommand>) -> Result<Vec<TxHandle>> {
        self.request(|reply| Command::Submit { commands, reply })
            .await?
    }

    /// Flips a session modifier; resolves to its new armed state.
    pub async fn toggle_modifier(&self, modifier: Modifier) -> Result<bool> {
        self.request(|reply| Command::ToggleModifier { modifier, reply })
            .await?
    }

    /// Drops the active session locally without waiting on the ledger.
    pub async fn abandon(&self) -> Result<SessionId> {
        self.request(|reply| Command::Abandon { reply }).await?
    }

    /// Feeds a ledger signal through the command channel.
    ///
    /// Transports normally push through the signal channel given to
    /// [`RuntimeBuilder::signals`](crate::RuntimeBuilder::signals); this is
    /// for replays and tests.
    pub async fn deliver(&self, signal: ChainSignal) -> Result<()> {
        self.command_tx
            .send(Command::Deliver { signal })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Re-reads the account balance from the ledger.
    pub async fn refresh_balance(&self) -> Result<u64> {
        self.request(|reply| Command::RefreshBalance { reply })
            .await?
    }

    /// Query the current session (read-only snapshot)
    pub async fn view(&self) -> Result<SessionView> {
        self.request(|reply| Command::View { reply }).await
    }

    /// Settled sessions, oldest first.
    pub async fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        self.request(|reply| Command::Ledger { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Session` - Lifecycle, submissions, balance and modifiers
    /// - `Topic::Ledger` - One entry per settled session
    /// - `Topic::Notice` - Human-readable warnings and errors
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut ledger_rx = handle.subscribe(Topic::Ledger);
    /// while let Ok(event) = ledger_rx.recv().await {
    ///     // Render the settled session
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
