//! Replay script format: one JSON step per line.
//!
//! Blank lines and lines starting with `#` are skipped. Signal steps apply to
//! whichever session is open when they run, so scripts never hard-code the
//! randomly generated session ids.

use anyhow::{Context, Result};
use serde::Deserialize;

use casino_core::{Command, CompletionFlags, GameType};
use client_blockchain_core::Modifier;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Open a session, optionally with an auto-play plan.
    Begin {
        game: GameType,
        #[serde(default)]
        stake: u64,
        #[serde(default)]
        plan: Option<Vec<Command>>,
    },
    Submit {
        commands: Vec<Command>,
    },
    Toggle {
        modifier: Modifier,
    },
    Abandon,
    Refresh,

    /// Ledger acknowledged the open session with this hex state.
    Started {
        state: String,
    },
    Moved {
        state: String,
    },
    Completed {
        final_balance: u64,
        payout: i64,
        #[serde(default)]
        flags: CompletionFlags,
    },
    /// Error signal; `detached` ones carry no session id.
    Error {
        message: String,
        #[serde(default)]
        detached: bool,
    },

    /// Set the account balance held by the in-memory chain.
    Balance {
        amount: u64,
    },
    FailNextSubmit {
        reason: String,
    },
    FailNextQuery {
        reason: String,
    },
    Wait {
        ms: u64,
    },
    /// Print the table.
    Frame,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Begin { .. } => "begin",
            Step::Submit { .. } => "submit",
            Step::Toggle { .. } => "toggle",
            Step::Abandon => "abandon",
            Step::Refresh => "refresh",
            Step::Started { .. } => "started",
            Step::Moved { .. } => "moved",
            Step::Completed { .. } => "completed",
            Step::Error { .. } => "error",
            Step::Balance { .. } => "balance",
            Step::FailNextSubmit { .. } => "fail_next_submit",
            Step::FailNextQuery { .. } => "fail_next_query",
            Step::Wait { .. } => "wait",
            Step::Frame => "frame",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    /// 1-based line in the source file.
    pub number: usize,
    pub step: Step,
}

pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            let step = serde_json::from_str(line)
                .with_context(|| format!("Invalid step on line {number}: {line}"))?;
            Ok(ScriptLine { number, step })
        })
        .collect()
}
