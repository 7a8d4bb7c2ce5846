//! Development tasks for the casino workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo run -p xtask -- <command>`

mod commands;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{DecodeState, EncodeCommand, Replay};

/// Development tasks for the casino workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the casino sync engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Decode and inspect a ledger state blob
    DecodeState(DecodeState),

    /// Encode a player command into its action payload
    EncodeCommand(EncodeCommand),

    /// Replay a session script against the in-memory chain
    Replay(Replay),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for CASINO_* settings)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::DecodeState(cmd) => cmd.execute(),
        Command::EncodeCommand(cmd) => cmd.execute(),
        Command::Replay(cmd) => cmd.execute(),
    }
}
