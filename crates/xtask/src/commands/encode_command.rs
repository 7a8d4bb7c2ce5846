//! Encode a player command into its ledger action payload
//!
//! Commands are given as JSON, e.g. `"advance"` or
//! `{"place_wager":{"kind":1,"target":0,"amount":5}}`.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use casino_core::{Command, encode_command};
use client_frontend_core::format::format_amount;

use crate::utils::parse_game;

/// Encode a command for one game
#[derive(Parser)]
pub struct EncodeCommand {
    /// Game the command targets (e.g. roulette, blackjack)
    #[arg(value_name = "GAME")]
    game: String,

    /// Command as JSON
    #[arg(value_name = "COMMAND")]
    command: String,

    /// Print only the hex payload
    #[arg(short, long)]
    quiet: bool,
}

impl EncodeCommand {
    pub fn execute(self) -> Result<()> {
        let game = parse_game(&self.game)?;
        let command: Command = serde_json::from_str(&self.command)
            .with_context(|| format!("Failed to parse command: {}", self.command))?;

        let payload = encode_command(game, &command)
            .with_context(|| format!("{} cannot encode {}", game.title(), command.name()))?;

        if self.quiet {
            println!("{}", hex::encode(&payload));
            return Ok(());
        }

        println!("{} {}", style("Game:").bold().cyan(), game.title());
        println!("{} {}", style("Command:").bold().cyan(), command.name());
        println!(
            "{} {}",
            style("Commits:").bold().cyan(),
            format_amount(command.committed_amount())
        );
        println!(
            "{} {} ({} bytes)",
            style("Payload:").bold().cyan(),
            hex::encode(&payload),
            payload.len()
        );

        Ok(())
    }
}
