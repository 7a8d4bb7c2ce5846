//! Reconciliation worker that owns the [`SessionRegistry`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle) and push
//! signals from the transport, keeps the local session in step with the
//! ledger, and publishes every change to the [`EventBus`].
//!
//! Network calls never run on the worker itself. Each one is spawned and its
//! answer comes back as a [`Continuation`] tagged with the session (and, for
//! watchdog queries, the watchdog generation) it was issued for, so an answer
//! that arrives after the session moved on is dropped instead of applied.

use std::future::{self, Future};
use std::sync::Arc;

use casino_core::{
    Command as GameCommand, CodecRegistry, CompletionFlags, GameType, Ledger, LedgerEntry,
    RollTracker, SessionId, Snapshot, Stage, WagerSpec, net_pnl, summarize,
};
use client_blockchain_core::{
    AccountId, CasinoChain, ChainSignal, Modifier, OnChainSession, TransportError, TxHandle,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use super::watchdog::{Watchdog, wait_deadline};
use crate::api::{PlanError, RegistryError, Result, RuntimeError};
use crate::events::{Event, EventBus, Notice, NoticeLevel, SessionEvent};
use crate::planner::{AutoPlayPlan, Planner};
use crate::runtime::RuntimeConfig;
use crate::session::{
    ActiveSession, InFlight, Modifiers, Phase, SessionRegistry, SessionView,
};

/// Requests sent from [`RuntimeHandle`](crate::RuntimeHandle) to the worker.
pub enum Command {
    /// Open a session; replies once the start transaction is acknowledged.
    Begin {
        game_type: GameType,
        stake: u64,
        plan: Option<Vec<GameCommand>>,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    QueuePlan {
        plan: AutoPlayPlan,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Submit commands in order; replies with one handle per command.
    Submit {
        commands: Vec<GameCommand>,
        reply: oneshot::Sender<Result<Vec<TxHandle>>>,
    },
    ToggleModifier {
        modifier: Modifier,
        reply: oneshot::Sender<Result<bool>>,
    },
    Abandon {
        reply: oneshot::Sender<Result<SessionId>>,
    },
    /// Inject a signal as if the transport had pushed it.
    Deliver { signal: ChainSignal },
    RefreshBalance {
        reply: oneshot::Sender<Result<u64>>,
    },
    View {
        reply: oneshot::Sender<SessionView>,
    },
    Ledger {
        reply: oneshot::Sender<Vec<LedgerEntry>>,
    },
}

/// Result of a spawned network call, routed back into the worker loop.
enum Continuation {
    StartSubmitted {
        session_id: SessionId,
        result: std::result::Result<TxHandle, TransportError>,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    CommandsSubmitted {
        session_id: SessionId,
        specs: Vec<WagerSpec>,
        committed: u64,
        result: std::result::Result<Vec<TxHandle>, TransportError>,
        reply: Option<oneshot::Sender<Result<Vec<TxHandle>>>>,
    },
    ModifierSet {
        modifier: Modifier,
        enabled: bool,
        result: std::result::Result<TxHandle, TransportError>,
        reply: oneshot::Sender<Result<bool>>,
    },
    Fallback {
        session_id: SessionId,
        generation: u64,
        result: std::result::Result<Option<OnChainSession>, TransportError>,
    },
    Balance {
        epoch: u64,
        result: std::result::Result<u64, TransportError>,
        reply: Option<oneshot::Sender<Result<u64>>>,
    },
}

/// Encoded batch that passed every submission gate.
struct Submission {
    session_id: SessionId,
    payloads: Vec<Vec<u8>>,
    specs: Vec<WagerSpec>,
    committed: u64,
    moves: Vec<InFlight>,
}

pub struct ReconcilerWorker {
    chain: Arc<dyn CasinoChain>,
    account: Option<AccountId>,
    codecs: CodecRegistry,
    registry: SessionRegistry,
    planner: Planner,
    modifiers: Modifiers,
    tracker: RollTracker,
    ledger: Ledger,
    watchdog: Watchdog,
    refresh: Option<Interval>,
    balance: Option<u64>,
    /// Bumped by authoritative balance updates; older queries are ignored.
    balance_epoch: u64,
    last_tx: Option<TxHandle>,
    last_session: Option<SessionId>,
    command_rx: mpsc::Receiver<Command>,
    signal_rx: Option<mpsc::Receiver<ChainSignal>>,
    continuation_tx: mpsc::UnboundedSender<Continuation>,
    continuation_rx: mpsc::UnboundedReceiver<Continuation>,
    event_bus: EventBus,
}

impl ReconcilerWorker {
    pub fn new(
        chain: Arc<dyn CasinoChain>,
        config: &RuntimeConfig,
        command_rx: mpsc::Receiver<Command>,
        signal_rx: Option<mpsc::Receiver<ChainSignal>>,
        event_bus: EventBus,
    ) -> Self {
        let (continuation_tx, continuation_rx) = mpsc::unbounded_channel();
        let refresh = config.balance_refresh.map(|period| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        info!(
            chain = chain.name(),
            network = chain.network(),
            account = ?config.account,
            "ReconcilerWorker initialized"
        );

        Self {
            chain,
            account: config.account,
            codecs: CodecRegistry::with_defaults(),
            registry: SessionRegistry::new(),
            planner: Planner::new(),
            modifiers: Modifiers::default(),
            tracker: RollTracker::new(),
            ledger: Ledger::new(config.ledger_capacity),
            watchdog: Watchdog::new(config.watchdog),
            refresh,
            balance: None,
            balance_epoch: 0,
            last_tx: None,
            last_session: None,
            command_rx,
            signal_rx,
            continuation_tx,
            continuation_rx,
            event_bus,
        }
    }

    /// Main worker loop. Exits once every handle is dropped.
    pub async fn run(mut self) {
        self.request_balance(None);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                signal = recv_signal(&mut self.signal_rx) => match signal {
                    Some(signal) => self.handle_signal(signal),
                    None => {
                        debug!("signal stream closed");
                        self.signal_rx = None;
                    }
                },
                Some(continuation) = self.continuation_rx.recv() => {
                    self.handle_continuation(continuation);
                }
                _ = wait_deadline(self.watchdog.deadline()) => {
                    self.on_watchdog_expired();
                }
                _ = tick(&mut self.refresh) => {
                    if self.registry.phase() == Phase::Idle {
                        self.request_balance(None);
                    }
                }
            }
        }

        debug!("ReconcilerWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Begin {
                game_type,
                stake,
                plan,
                reply,
            } => self.begin(game_type, stake, plan, reply),
            Command::QueuePlan { plan, reply } => {
                let result = self.queue_plan(plan);
                respond(reply, result, "QueuePlan");
            }
            Command::Submit { commands, reply } => self.submit(commands, Some(reply)),
            Command::ToggleModifier { modifier, reply } => self.toggle_modifier(modifier, reply),
            Command::Abandon { reply } => {
                let result = match self.registry.current().map(|session| session.id) {
                    Some(session_id) => {
                        self.abandon(session_id, "abandoned by player");
                        Ok(session_id)
                    }
                    None => Err(RegistryError::NoActiveSession.into()),
                };
                respond(reply, result, "Abandon");
            }
            Command::Deliver { signal } => self.handle_signal(signal),
            Command::RefreshBalance { reply } => self.request_balance(Some(reply)),
            Command::View { reply } => respond(reply, self.view(), "View"),
            Command::Ledger { reply } => respond(reply, self.ledger.to_vec(), "Ledger"),
        }
    }

    fn handle_signal(&mut self, signal: ChainSignal) {
        debug!(kind = signal.kind(), session_id = ?signal.session_id(), "signal received");
        match signal {
            ChainSignal::Started {
                session_id,
                game_type,
                state,
            } => self.on_started(session_id, game_type, &state),
            ChainSignal::Moved { session_id, state } => self.on_moved(session_id, &state),
            ChainSignal::Completed {
                session_id,
                final_balance,
                payout,
                flags,
            } => self.on_completed(session_id, final_balance, payout, flags),
            ChainSignal::Error {
                session_id,
                message,
            } => self.on_error(session_id, message),
        }
    }

    fn handle_continuation(&mut self, continuation: Continuation) {
        match continuation {
            Continuation::StartSubmitted {
                session_id,
                result,
                reply,
            } => self.on_start_submitted(session_id, result, reply),
            Continuation::CommandsSubmitted {
                session_id,
                specs,
                committed,
                result,
                reply,
            } => self.on_commands_submitted(session_id, &specs, committed, result, reply),
            Continuation::ModifierSet {
                modifier,
                enabled,
                result,
                reply,
            } => self.on_modifier_set(modifier, enabled, result, reply),
            Continuation::Fallback {
                session_id,
                generation,
                result,
            } => self.on_fallback(session_id, generation, result),
            Continuation::Balance {
                epoch,
                result,
                reply,
            } => self.on_balance(epoch, result, reply),
        }
    }

    // ----- session lifecycle -------------------------------------------------

    fn begin(
        &mut self,
        game_type: GameType,
        stake: u64,
        plan: Option<Vec<GameCommand>>,
        reply: oneshot::Sender<Result<SessionId>>,
    ) {
        if stake == 0 && !game_type.is_wager_table() {
            respond(reply, Err(RuntimeError::InvalidStake(game_type)), "Begin");
            return;
        }
        if let Some(session) = self.registry.current() {
            let error = RegistryError::AlreadyActive(session.id);
            respond(reply, Err(error.into()), "Begin");
            return;
        }
        if plan.as_ref().is_some_and(Vec::is_empty) {
            respond(reply, Err(PlanError::Empty.into()), "Begin");
            return;
        }

        let session_id = self.next_session_id();
        if let Err(error) = self
            .registry
            .begin(session_id, game_type, stake, self.balance)
        {
            respond(reply, Err(error.into()), "Begin");
            return;
        }
        if let Some(steps) = plan
            && let Err(error) = self
                .planner
                .queue(AutoPlayPlan::new(session_id, game_type, steps))
        {
            self.registry.end();
            respond(reply, Err(error.into()), "Begin");
            return;
        }

        self.tracker = RollTracker::new();
        self.watchdog.arm();
        info!(%session_id, game = %game_type, stake, "session begun");
        self.publish_session(SessionEvent::Begun {
            session_id,
            game_type,
            stake,
        });

        let chain = Arc::clone(&self.chain);
        self.spawn_continuation(async move {
            let result = chain.submit_start(game_type, stake, session_id).await;
            Continuation::StartSubmitted {
                session_id,
                result,
                reply,
            }
        });
    }

    fn on_start_submitted(
        &mut self,
        session_id: SessionId,
        result: std::result::Result<TxHandle, TransportError>,
        reply: oneshot::Sender<Result<SessionId>>,
    ) {
        match result {
            Ok(tx) => {
                debug!(%session_id, %tx, "start acknowledged");
                note_stale(self.registry.record_tx(session_id, tx.clone()), "record start tx");
                self.last_tx = Some(tx);
                respond(reply, Ok(session_id), "Begin");
            }
            Err(error) => {
                error!(%session_id, %error, "start submission failed");
                let unconfirmed = self
                    .registry
                    .current()
                    .is_some_and(|session| session.id == session_id && !session.confirmed);
                if unconfirmed {
                    self.abandon(session_id, format!("start failed: {error}"));
                }
                respond(reply, Err(error.into()), "Begin");
            }
        }
    }

    fn queue_plan(&mut self, plan: AutoPlayPlan) -> Result<()> {
        let session = self
            .registry
            .current()
            .ok_or(RegistryError::NoActiveSession)?;
        if session.id != plan.session_id {
            return Err(RegistryError::SessionMismatch {
                active: session.id,
                found: plan.session_id,
            }
            .into());
        }
        if session.confirmed {
            return Err(PlanError::AlreadyConfirmed(session.id).into());
        }
        self.planner.queue(plan)?;
        Ok(())
    }

    fn on_started(&mut self, session_id: SessionId, game_type: GameType, state: &[u8]) {
        let Some(session) = self.registry.current() else {
            debug!(%session_id, "start signal with no active session");
            return;
        };
        if session.id != session_id {
            debug!(%session_id, active = %session.id, "ignoring stale start signal");
            return;
        }
        if session.confirmed {
            debug!(%session_id, "session already confirmed");
            return;
        }
        if session.game_type != game_type {
            let reason = format!(
                "ledger opened {} instead of {}",
                game_type.title(),
                session.game_type.title()
            );
            self.abandon(session_id, reason);
            return;
        }

        let snapshot = self.decode(game_type, state);
        self.confirm(session_id, snapshot);
    }

    fn confirm(&mut self, session_id: SessionId, snapshot: Option<Snapshot>) {
        let stage = snapshot.as_ref().map(Snapshot::stage);
        match note_stale(self.registry.bind(session_id, snapshot), "bind") {
            Some(true) => {}
            Some(false) => {
                debug!(%session_id, "session already confirmed");
                return;
            }
            None => return,
        }

        self.watchdog.disarm();
        info!(%session_id, ?stage, "session confirmed");
        self.publish_session(SessionEvent::Confirmed { session_id, stage });
        self.run_plan(session_id);
    }

    fn run_plan(&mut self, session_id: SessionId) {
        let Some(game_type) = self.registry.current().map(|session| session.game_type) else {
            return;
        };
        if let Some(plan) = self.planner.consume(session_id, game_type) {
            info!(%session_id, steps = plan.steps.len(), "running auto-play plan");
            self.submit(plan.steps, None);
        }
    }

    fn on_moved(&mut self, session_id: SessionId, state: &[u8]) {
        let Some(session) = self.registry.current().filter(|s| s.id == session_id) else {
            debug!(%session_id, "ignoring stale state signal");
            return;
        };
        if !session.confirmed {
            debug!(%session_id, "state signal before confirmation ignored");
            return;
        }
        let game_type = session.game_type;

        let retired = note_stale(self.registry.pop_in_flight(session_id), "pop").flatten();
        if let Some(snapshot) = self.decode(game_type, state)
            && let Some(previous) = note_stale(self.registry.advance(session_id, snapshot), "advance")
            && retired == Some(InFlight::Advance)
        {
            self.observe_roll(previous.as_ref());
        }

        let pending = self
            .registry
            .current()
            .map_or(0, ActiveSession::pending_moves);
        if pending == 0 {
            note_stale(self.registry.discard_staged(session_id), "discard staged");
            self.watchdog.disarm();
        } else {
            self.watchdog.arm();
        }

        let stage = self.current_stage();
        debug!(%session_id, ?stage, pending, "state advanced");
        self.publish_session(SessionEvent::Advanced {
            session_id,
            stage,
            pending_moves: pending,
        });
    }

    fn observe_roll(&mut self, previous: Option<&Snapshot>) {
        let Some(after) = self
            .registry
            .current()
            .and_then(|session| session.snapshot.as_ref())
            .and_then(Snapshot::as_craps)
        else {
            return;
        };
        let before = previous.and_then(Snapshot::as_craps);
        if let Some(report) = self.tracker.observe(before, after) {
            debug!(
                total = report.total,
                point = ?report.point_after,
                settled = report.resolved.len(),
                "craps roll observed"
            );
        }
    }

    fn on_completed(
        &mut self,
        session_id: SessionId,
        final_balance: u64,
        payout: i64,
        flags: CompletionFlags,
    ) {
        if !self.registry.is_current(session_id) {
            debug!(%session_id, "ignoring stale completion");
            return;
        }
        let Some(session) = self.registry.end() else {
            return;
        };

        let (net, basis) = net_pnl(
            session.starting_balance,
            final_balance,
            payout,
            session.total_wagered(),
        );
        let summary = summarize(session.game_type, session.snapshot.as_ref(), net, flags)
            .with_resolved(self.tracker.resolved());
        let entry = LedgerEntry {
            session_id,
            game_type: session.game_type,
            net,
            basis,
            flags,
            headline: summary.headline,
            details: summary.details,
            recorded_at_ms: chrono::Utc::now().timestamp_millis(),
        };
        info!(%session_id, net, ?basis, "{}", entry.headline);

        self.ledger.append(entry.clone());
        self.event_bus.publish(Event::Ledger(Box::new(entry)));
        self.finish(session_id);
        self.modifiers.consume(flags);
        self.balance_epoch += 1;
        self.set_balance(final_balance);
        self.publish_session(SessionEvent::Completed { session_id, net });
    }

    fn on_error(&mut self, session_id: Option<SessionId>, message: String) {
        match session_id {
            Some(id) if self.registry.is_current(id) => {
                warn!(session_id = %id, %message, "ledger reported an error");
                self.abandon(id, message);
            }
            Some(id) => debug!(session_id = %id, %message, "ignoring error for inactive session"),
            None => {
                warn!(%message, "ledger reported an error");
                self.notice(NoticeLevel::Error, message);
            }
        }
    }

    /// Drops the session locally and re-reads the balance.
    fn abandon(&mut self, session_id: SessionId, reason: impl Into<String>) {
        if !self.registry.is_current(session_id) {
            return;
        }
        let reason = reason.into();
        self.registry.end();
        self.finish(session_id);

        warn!(%session_id, %reason, "session abandoned");
        self.notice(
            NoticeLevel::Warning,
            format!("Session {session_id} abandoned: {reason}"),
        );
        self.publish_session(SessionEvent::Abandoned { session_id, reason });
        self.request_balance(None);
    }

    /// Per-session cleanup shared by completion and abandonment.
    fn finish(&mut self, session_id: SessionId) {
        self.planner.discard(session_id);
        self.watchdog.disarm();
        self.tracker = RollTracker::new();
        self.last_session = Some(session_id);
    }

    // ----- submission --------------------------------------------------------

    fn submit(
        &mut self,
        commands: Vec<GameCommand>,
        reply: Option<oneshot::Sender<Result<Vec<TxHandle>>>>,
    ) {
        let submission = match self.prepare_submission(&commands) {
            Ok(submission) => submission,
            Err(error) => {
                match reply {
                    Some(reply) => respond(reply, Err(error), "Submit"),
                    None => {
                        warn!(%error, "auto-play submission rejected");
                        self.notice(NoticeLevel::Warning, format!("Auto-play skipped: {error}"));
                    }
                }
                return;
            }
        };

        let Submission {
            session_id,
            payloads,
            specs,
            committed,
            moves,
        } = submission;
        let staged = self.registry.stage(session_id, &specs);
        let pending = match staged.and(self.registry.push_in_flight(session_id, moves)) {
            Ok(pending) => pending,
            Err(error) => {
                if let Some(reply) = reply {
                    respond(reply, Err(error.into()), "Submit");
                }
                return;
            }
        };
        self.watchdog.arm();
        debug!(%session_id, count = payloads.len(), pending, "submitting commands");

        let chain = Arc::clone(&self.chain);
        self.spawn_continuation(async move {
            let result = submit_in_order(chain.as_ref(), session_id, payloads).await;
            Continuation::CommandsSubmitted {
                session_id,
                specs,
                committed,
                result,
                reply,
            }
        });
    }

    /// Applies the submission gates and encodes every command up front.
    fn prepare_submission(&self, commands: &[GameCommand]) -> Result<Submission> {
        let session = self
            .registry
            .current()
            .ok_or(RegistryError::NoActiveSession)?;
        if !session.confirmed {
            return Err(RuntimeError::NotConfirmed(session.id));
        }
        let pending = session.pending_moves();
        if pending > 0 {
            return Err(RuntimeError::StillPending {
                session_id: session.id,
                pending,
            });
        }
        if commands.is_empty() {
            return Err(RuntimeError::EmptyBatch);
        }

        let payloads = commands
            .iter()
            .map(|command| self.codecs.encode_command(session.game_type, command))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Submission {
            session_id: session.id,
            payloads,
            specs: commands.iter().flat_map(GameCommand::placed_wagers).collect(),
            committed: commands
                .iter()
                .map(GameCommand::committed_amount)
                .fold(0, u64::saturating_add),
            moves: commands
                .iter()
                .map(|command| {
                    if command.is_advance() {
                        InFlight::Advance
                    } else {
                        InFlight::Other
                    }
                })
                .collect(),
        })
    }

    fn on_commands_submitted(
        &mut self,
        session_id: SessionId,
        specs: &[WagerSpec],
        committed: u64,
        result: std::result::Result<Vec<TxHandle>, TransportError>,
        reply: Option<oneshot::Sender<Result<Vec<TxHandle>>>>,
    ) {
        match result {
            Ok(handles) => {
                let last = handles.last().cloned();
                if let Some(tx) = &last {
                    self.last_tx = Some(tx.clone());
                }
                if self.registry.is_current(session_id) {
                    note_stale(self.registry.record_wagered(session_id, committed), "wagered");
                    if let Some(tx) = &last {
                        note_stale(self.registry.record_tx(session_id, tx.clone()), "record tx");
                    }
                    self.publish_session(SessionEvent::Submitted {
                        session_id,
                        commands: handles.len(),
                        tx: last,
                    });
                }
                if let Some(reply) = reply {
                    respond(reply, Ok(handles), "Submit");
                }
            }
            Err(error) => {
                error!(%session_id, %error, "command submission failed");
                if self.registry.is_current(session_id) {
                    note_stale(self.registry.unstage(session_id, specs), "unstage");
                    note_stale(self.registry.clear_pending(session_id), "clear pending");
                    self.watchdog.disarm();
                    self.notice(NoticeLevel::Error, format!("Submission failed: {error}"));
                    self.publish_session(SessionEvent::Reverted {
                        session_id,
                        reason: error.to_string(),
                    });
                }
                if let Some(reply) = reply {
                    respond(reply, Err(error.into()), "Submit");
                }
            }
        }
    }

    // ----- modifiers ---------------------------------------------------------

    fn toggle_modifier(&mut self, modifier: Modifier, reply: oneshot::Sender<Result<bool>>) {
        let slot = self.modifiers.get_mut(modifier);
        let enabled = !*slot.value();
        if !slot.propose(enabled) {
            respond(reply, Err(RuntimeError::ModifierPending(modifier)), "ToggleModifier");
            return;
        }
        debug!(%modifier, enabled, "modifier toggle proposed");
        self.publish_session(SessionEvent::ModifierChanged {
            modifier,
            enabled,
            tentative: true,
        });

        let chain = Arc::clone(&self.chain);
        self.spawn_continuation(async move {
            let result = chain.set_modifier(modifier, enabled).await;
            Continuation::ModifierSet {
                modifier,
                enabled,
                result,
                reply,
            }
        });
    }

    fn on_modifier_set(
        &mut self,
        modifier: Modifier,
        enabled: bool,
        result: std::result::Result<TxHandle, TransportError>,
        reply: oneshot::Sender<Result<bool>>,
    ) {
        let slot = self.modifiers.get_mut(modifier);
        match result {
            Ok(tx) => {
                slot.commit();
                let enabled = *slot.value();
                self.last_tx = Some(tx);
                self.publish_session(SessionEvent::ModifierChanged {
                    modifier,
                    enabled,
                    tentative: false,
                });
                respond(reply, Ok(enabled), "ToggleModifier");
            }
            Err(error) => {
                slot.revert();
                let current = *slot.value();
                warn!(%modifier, enabled, %error, "modifier toggle rejected");
                self.notice(
                    NoticeLevel::Error,
                    format!("Could not set {modifier}: {error}"),
                );
                self.publish_session(SessionEvent::ModifierChanged {
                    modifier,
                    enabled: current,
                    tentative: false,
                });
                respond(reply, Err(error.into()), "ToggleModifier");
            }
        }
    }

    // ----- watchdog ----------------------------------------------------------

    fn on_watchdog_expired(&mut self) {
        let generation = self.watchdog.fire();
        let Some(session_id) = self.registry.current().map(|session| session.id) else {
            return;
        };
        warn!(%session_id, phase = %self.registry.phase(), "watchdog expired; querying ledger");

        let chain = Arc::clone(&self.chain);
        self.spawn_continuation(async move {
            let result = chain.fetch_session(session_id).await;
            Continuation::Fallback {
                session_id,
                generation,
                result,
            }
        });
    }

    fn on_fallback(
        &mut self,
        session_id: SessionId,
        generation: u64,
        result: std::result::Result<Option<OnChainSession>, TransportError>,
    ) {
        if !self.watchdog.is_current(generation) {
            debug!(%session_id, generation, "stale watchdog query ignored");
            return;
        }
        let Some(session) = self.registry.current().filter(|s| s.id == session_id) else {
            debug!(%session_id, "watchdog query for an inactive session ignored");
            return;
        };
        let (game_type, confirmed) = (session.game_type, session.confirmed);

        match result {
            Ok(Some(remote))
                if remote.is_active()
                    && remote.session_id == session_id
                    && remote.game_type == game_type =>
            {
                info!(%session_id, confirmed, "watchdog query found the session live");
                let snapshot = self.decode(game_type, &remote.state);
                if confirmed {
                    self.resync(session_id, snapshot);
                } else {
                    self.confirm(session_id, snapshot);
                }
            }
            Ok(Some(remote)) if !remote.is_active() => {
                self.abandon(session_id, "session already settled on the ledger");
            }
            Ok(Some(remote)) => {
                let reason = format!("ledger holds {} for this session", remote.game_type.title());
                self.abandon(session_id, reason);
            }
            Ok(None) => self.abandon(session_id, "ledger has no record of the session"),
            Err(error) => self.abandon(session_id, format!("ledger unreachable: {error}")),
        }
    }

    /// Adopts the ledger's state in place of every outstanding state signal.
    fn resync(&mut self, session_id: SessionId, snapshot: Option<Snapshot>) {
        let rolling = self
            .registry
            .current()
            .is_some_and(ActiveSession::awaits_advance);
        if let Some(snapshot) = snapshot
            && let Some(previous) = note_stale(self.registry.advance(session_id, snapshot), "advance")
            && rolling
            && self.current_snapshot() != previous.as_ref()
        {
            self.observe_roll(previous.as_ref());
        }
        note_stale(self.registry.clear_pending(session_id), "clear pending");
        note_stale(self.registry.discard_staged(session_id), "discard staged");
        self.publish_session(SessionEvent::Advanced {
            session_id,
            stage: self.current_stage(),
            pending_moves: 0,
        });
    }

    // ----- balance -----------------------------------------------------------

    fn request_balance(&mut self, reply: Option<oneshot::Sender<Result<u64>>>) {
        let Some(account) = self.account else {
            if let Some(reply) = reply {
                respond(reply, Err(RuntimeError::NoAccount), "RefreshBalance");
            }
            return;
        };
        let epoch = self.balance_epoch;
        let chain = Arc::clone(&self.chain);
        self.spawn_continuation(async move {
            let result = chain.fetch_balance(&account).await;
            Continuation::Balance {
                epoch,
                result,
                reply,
            }
        });
    }

    fn on_balance(
        &mut self,
        epoch: u64,
        result: std::result::Result<u64, TransportError>,
        reply: Option<oneshot::Sender<Result<u64>>>,
    ) {
        match result {
            Ok(balance) => {
                if epoch == self.balance_epoch {
                    self.set_balance(balance);
                } else {
                    debug!(balance, "balance read overtaken by a settlement");
                }
                if let Some(reply) = reply {
                    respond(reply, Ok(balance), "RefreshBalance");
                }
            }
            Err(error) => {
                warn!(%error, "balance refresh failed");
                if let Some(reply) = reply {
                    respond(reply, Err(error.into()), "RefreshBalance");
                }
            }
        }
    }

    fn set_balance(&mut self, balance: u64) {
        if self.balance == Some(balance) {
            return;
        }
        self.balance = Some(balance);
        self.publish_session(SessionEvent::BalanceChanged { balance });
    }

    // ----- helpers -----------------------------------------------------------

    fn view(&self) -> SessionView {
        let session = self.registry.current();
        SessionView {
            phase: self.registry.phase(),
            session_id: session.map(|s| s.id),
            game_type: session.map(|s| s.game_type),
            stake: session.map_or(0, |s| s.stake),
            stage: self.current_stage(),
            snapshot: session.and_then(|s| s.snapshot.clone()),
            wagers: session.map(ActiveSession::wagers).unwrap_or_default(),
            pending_moves: session.map_or(0, ActiveSession::pending_moves),
            balance: self.balance,
            last_tx: self.last_tx.clone(),
            shield: self.modifiers.get(Modifier::Shield).into(),
            double: self.modifiers.get(Modifier::Double).into(),
            roll_history: self.tracker.history().to_vec(),
            plan_queued: self.planner.is_queued(),
        }
    }

    fn current_snapshot(&self) -> Option<&Snapshot> {
        self.registry
            .current()
            .and_then(|session| session.snapshot.as_ref())
    }

    fn current_stage(&self) -> Option<Stage> {
        self.current_snapshot().map(Snapshot::stage)
    }

    /// Decodes a state blob. Empty blobs carry no state; a malformed one is
    /// reported and skipped so the last good snapshot stays in place.
    fn decode(&self, game_type: GameType, bytes: &[u8]) -> Option<Snapshot> {
        if bytes.is_empty() {
            return None;
        }
        match self.codecs.decode_state(game_type, bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                warn!(game = %game_type, len = bytes.len(), %error, "state decode failed");
                self.notice(
                    NoticeLevel::Warning,
                    format!("Could not read {} state: {error}", game_type.title()),
                );
                None
            }
        }
    }

    /// Random non-zero id that differs from the previous session's.
    fn next_session_id(&self) -> SessionId {
        loop {
            if let Some(id) = SessionId::new(rand::random::<u64>())
                && Some(id) != self.last_session
            {
                return id;
            }
        }
    }

    fn spawn_continuation<F>(&self, task: F)
    where
        F: Future<Output = Continuation> + Send + 'static,
    {
        let continuation_tx = self.continuation_tx.clone();
        tokio::spawn(async move {
            let continuation = task.await;
            if continuation_tx.send(continuation).is_err() {
                debug!("reconciler stopped before a network call returned");
            }
        });
    }

    fn publish_session(&self, event: SessionEvent) {
        self.event_bus.publish(Event::Session(event));
    }

    fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.event_bus.publish(Event::Notice(Notice::new(level, message)));
    }
}

async fn submit_in_order(
    chain: &dyn CasinoChain,
    session_id: SessionId,
    payloads: Vec<Vec<u8>>,
) -> std::result::Result<Vec<TxHandle>, TransportError> {
    let mut handles = Vec::with_capacity(payloads.len());
    for payload in payloads {
        handles.push(chain.submit_command(session_id, payload).await?);
    }
    Ok(handles)
}

async fn recv_signal(rx: &mut Option<mpsc::Receiver<ChainSignal>>) -> Option<ChainSignal> {
    match rx {
        Some(rx) => rx.recv().await,
        None => future::pending().await,
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

fn respond<T>(reply: oneshot::Sender<T>, value: T, op: &'static str) {
    if reply.send(value).is_err() {
        debug!(op, "reply channel closed (caller dropped)");
    }
}

/// Logs a registry update that lost a race with a session change.
fn note_stale<T>(result: std::result::Result<T, RegistryError>, op: &'static str) -> Option<T> {
    result
        .map_err(|error| debug!(%error, op, "registry update skipped"))
        .ok()
}
