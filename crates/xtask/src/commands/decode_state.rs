//! Decode and inspect a ledger state blob
//!
//! Parses the hex-encoded state of one game and shows the table it describes.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use casino_core::{Snapshot, decode_state};
use client_frontend_core::format::format_wager;
use client_frontend_core::hand_rows;

use crate::utils::{parse_game, parse_hex};

/// Decode and inspect a state blob
#[derive(Parser)]
pub struct DecodeState {
    /// Game the blob belongs to (e.g. roulette, craps, sic_bo)
    #[arg(value_name = "GAME")]
    game: String,

    /// State blob as hex, with or without a 0x prefix
    #[arg(value_name = "HEX")]
    state: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Table view (cards, dice, wagers, outcome)
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl DecodeState {
    pub fn execute(self) -> Result<()> {
        let game = parse_game(&self.game)?;
        let bytes = parse_hex(&self.state)?;

        let snapshot = decode_state(game, &bytes)
            .with_context(|| format!("Failed to decode {} state", game.title()))?;

        println!("{} {}", style("Game:").bold().cyan(), game.title());
        println!("{} {} bytes", style("Size:").bold().cyan(), bytes.len());
        println!("{} {}", style("Stage:").bold().cyan(), snapshot.stage());
        println!();

        match self.format {
            OutputFormat::Summary => print_summary(&snapshot),
            OutputFormat::Json => print_json(&snapshot)?,
            OutputFormat::Debug => println!("{snapshot:#?}"),
        }

        Ok(())
    }
}

fn print_summary(snapshot: &Snapshot) {
    let game = snapshot.game_type();

    for hand in hand_rows(snapshot) {
        match hand.value {
            Some(value) => println!("  {:<8} {}  ({value})", hand.label, hand.cards),
            None => println!("  {:<8} {}", hand.label, hand.cards),
        }
    }
    if let Some(outcome) = snapshot.describe() {
        println!("  {}", style(outcome).italic());
    }

    let wagers = snapshot.wagers();
    if !wagers.is_empty() {
        println!();
        println!("{}", style("Wagers:").bold().yellow());
        for wager in &wagers {
            println!("  {}", format_wager(game, wager));
        }
    }

    let resolved = snapshot.resolve();
    if !resolved.is_empty() {
        println!();
        println!("{}", style("Resolved:").bold().yellow());
        for line in &resolved {
            println!("  {line}");
        }
    }
}

fn print_json(snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    println!("{json}");
    Ok(())
}
