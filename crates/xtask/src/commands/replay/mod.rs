//! Replay a scripted session against the in-memory chain
//!
//! Runs the real runtime and table presentation, with the script standing in
//! for both the player and the ledger's push signals.

mod frontend;
mod script;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use client_blockchain_core::{AccountId, MockChain};
use client_frontend_core::{Frontend, FrontendConfig};
use runtime::{Runtime, RuntimeConfig};

use frontend::ReplayFrontend;
use script::{ScriptLine, parse_script};

/// Account used when `CASINO_ACCOUNT` is not set.
const REPLAY_ACCOUNT: AccountId = AccountId([0x11; 32]);

/// Replay a session script
#[derive(Parser)]
pub struct Replay {
    /// Script file, one JSON step per line
    #[arg(value_name = "FILE")]
    script: PathBuf,

    /// Starting balance of the replay account
    #[arg(short, long, default_value = "1000")]
    balance: u64,

    /// Print the table after every step
    #[arg(long)]
    frames: bool,

    /// Watchdog timeout in milliseconds (overrides CASINO_WATCHDOG_MS)
    #[arg(long, value_name = "MS")]
    watchdog_ms: Option<u64>,

    /// Print the settled sessions as JSON at the end
    #[arg(long)]
    ledger: bool,
}

impl Replay {
    pub fn execute(self) -> Result<()> {
        let source = std::fs::read_to_string(&self.script)
            .with_context(|| format!("Failed to read script: {}", self.script.display()))?;
        let script = parse_script(&source)?;

        println!(
            "{} {} ({} steps)",
            style("Script:").bold().cyan(),
            self.script.display(),
            script.len()
        );

        tokio::runtime::Runtime::new()?.block_on(self.execute_async(script))
    }

    async fn execute_async(self, script: Vec<ScriptLine>) -> Result<()> {
        let mut config = RuntimeConfig::from_env();
        let account = *config.account.get_or_insert(REPLAY_ACCOUNT);
        if let Some(ms) = self.watchdog_ms {
            config.watchdog = Duration::from_millis(ms);
        }

        let chain = MockChain::new().with_balance(account, self.balance);
        let runtime = Runtime::builder()
            .config(config)
            .chain(Arc::new(chain.clone()))
            .build()?;
        let handle = runtime.handle();

        let mut frontend = ReplayFrontend::new(
            script,
            chain,
            account,
            FrontendConfig::from_env(),
            self.frames,
        );
        frontend.run(handle.clone()).await?;

        if self.ledger {
            let entries = handle.ledger().await?;
            println!();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }

        drop(handle);
        runtime.shutdown().await?;
        Ok(())
    }
}
