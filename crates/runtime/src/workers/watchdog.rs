//! Liveness timer for the reconciler.
//!
//! Armed whenever the reconciler waits on the network. Every arm or disarm
//! starts a new generation; a fallback query started under generation `g`
//! may only act if the watchdog is still at `g` when its answer arrives.

use std::future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

#[derive(Debug)]
pub(crate) struct Watchdog {
    window: Duration,
    deadline: Option<Instant>,
    generation: u64,
}

impl Watchdog {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            generation: 0,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// (Re)starts the window from now.
    pub fn arm(&mut self) -> u64 {
        self.generation += 1;
        self.deadline = Some(Instant::now() + self.window);
        self.generation
    }

    pub fn disarm(&mut self) {
        self.generation += 1;
        self.deadline = None;
    }

    /// Stops the timer after expiry without starting a new generation.
    pub fn fire(&mut self) -> u64 {
        self.deadline = None;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// Resolves at `deadline`, or never when unarmed.
pub(crate) async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
