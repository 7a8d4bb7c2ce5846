//! High-level runtime orchestrator.
//!
//! The runtime owns the reconciler worker, wires up command/signal/event
//! channels, and exposes a builder-based API for clients to play sessions.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{AccountId, CasinoChain, ChainSignal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::workers::{Command, ReconcilerWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// How long to wait on the ledger before querying it directly.
    pub watchdog: Duration,
    /// Idle balance polling period; `None` disables polling.
    pub balance_refresh: Option<Duration>,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Capacity of the channel returned by [`RuntimeBuilder::signal_channel`].
    pub signal_buffer_size: usize,
    pub ledger_capacity: usize,
    pub account: Option<AccountId>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            watchdog: Duration::from_millis(15_000),
            balance_refresh: Some(Duration::from_secs(30)),
            event_buffer_size: 100,
            command_buffer_size: 32,
            signal_buffer_size: 64,
            ledger_capacity: 256,
            account: None,
        }
    }
}

impl RuntimeConfig {
    pub const WATCHDOG_MS: &'static str = "CASINO_WATCHDOG_MS";
    pub const BALANCE_REFRESH_SECS: &'static str = "CASINO_BALANCE_REFRESH_SECS";
    pub const EVENT_BUFFER: &'static str = "CASINO_EVENT_BUFFER";
    pub const COMMAND_BUFFER: &'static str = "CASINO_COMMAND_BUFFER";
    pub const SIGNAL_BUFFER: &'static str = "CASINO_SIGNAL_BUFFER";
    pub const LEDGER_CAPACITY: &'static str = "CASINO_LEDGER_CAPACITY";
    pub const ACCOUNT: &'static str = "CASINO_ACCOUNT";

    /// Defaults overridden by any `CASINO_*` variables that are set.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            watchdog: read_env(Self::WATCHDOG_MS)
                .map(Duration::from_millis)
                .unwrap_or(defaults.watchdog),
            balance_refresh: match read_env::<u64>(Self::BALANCE_REFRESH_SECS) {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.balance_refresh,
            },
            event_buffer_size: read_env(Self::EVENT_BUFFER)
                .filter(|&size| size > 0)
                .unwrap_or(defaults.event_buffer_size),
            command_buffer_size: read_env(Self::COMMAND_BUFFER)
                .filter(|&size| size > 0)
                .unwrap_or(defaults.command_buffer_size),
            signal_buffer_size: read_env(Self::SIGNAL_BUFFER)
                .filter(|&size| size > 0)
                .unwrap_or(defaults.signal_buffer_size),
            ledger_capacity: read_env(Self::LEDGER_CAPACITY).unwrap_or(defaults.ledger_capacity),
            account: read_env(Self::ACCOUNT).or(defaults.account),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, value = %raw, %error, "ignoring invalid environment value");
            None
        }
    }
}

/// Main runtime that reconciles sessions against the ledger
///
/// Design: Runtime owns the worker; [`RuntimeHandle`] provides a cloneable
/// façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every outstanding handle clone is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    chain: Option<Arc<dyn CasinoChain>>,
    signals: Option<mpsc::Receiver<ChainSignal>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            chain: None,
            signals: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required ledger transport
    pub fn chain(mut self, chain: Arc<dyn CasinoChain>) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Push-signal stream produced by the transport (optional)
    pub fn signals(mut self, signals: mpsc::Receiver<ChainSignal>) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Creates a signal channel sized by the config and wires its receiver.
    ///
    /// Returns the sender for the transport to push into.
    pub fn signal_channel(mut self) -> (Self, mpsc::Sender<ChainSignal>) {
        let (signal_tx, signal_rx) = mpsc::channel(self.config.signal_buffer_size);
        self.signals = Some(signal_rx);
        (self, signal_tx)
    }

    /// Account whose balance is tracked
    pub fn account(mut self, account: AccountId) -> Self {
        self.config.account = Some(account);
        self
    }

    /// Build the runtime and spawn its worker
    pub fn build(self) -> Result<Runtime> {
        let chain = self.chain.ok_or(RuntimeError::MissingChain)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let worker =
            ReconcilerWorker::new(chain, &self.config, command_rx, self.signals, event_bus);

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RuntimeConfig::default();
        assert_eq!(config.watchdog, Duration::from_secs(15));
        assert_eq!(config.balance_refresh, Some(Duration::from_secs(30)));
        assert_eq!(config.command_buffer_size, 32);
        assert_eq!(config.ledger_capacity, 256);
        assert!(config.account.is_none());
    }

    #[test]
    fn build_requires_a_chain() {
        assert!(matches!(
            Runtime::builder().build(),
            Err(RuntimeError::MissingChain)
        ));
    }
}
