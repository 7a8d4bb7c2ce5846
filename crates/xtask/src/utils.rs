//! Utility functions for xtask commands

use anyhow::{Context, Result, anyhow};
use casino_core::GameType;
use client_frontend_core::{MessageEntry, MessageLevel, TableViewModel};
use console::style;

/// Parse a game name such as `roulette` or `Sic_Bo`.
pub fn parse_game(name: &str) -> Result<GameType> {
    name.parse().map_err(|_| {
        let known: Vec<_> = GameType::ALL.iter().map(ToString::to_string).collect();
        anyhow!("Unknown game: {name}\n\nKnown games: {}", known.join(", "))
    })
}

/// Decode hex, tolerating a `0x` prefix and embedded whitespace.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.split_whitespace().collect();
    let digits = compact.strip_prefix("0x").unwrap_or(&compact);
    hex::decode(digits).with_context(|| format!("Invalid hex: {input}"))
}

pub fn print_message(entry: &MessageEntry) {
    let text = match entry.level {
        MessageLevel::Info => style(entry.text.as_str()),
        MessageLevel::Win => style(entry.text.as_str()).green().bold(),
        MessageLevel::Warning => style(entry.text.as_str()).yellow(),
        MessageLevel::Error => style(entry.text.as_str()).red().bold(),
    };
    println!("  {text}");
}

/// Render one table frame without its message log.
pub fn print_frame(model: &TableViewModel) {
    println!("{}", style(format!("=== {} ===", model.header)).bold().green());
    println!("{} {}", style("Status:").bold().cyan(), model.status);
    println!(
        "{} {}   {} {}   {} {}",
        style("Balance:").bold().cyan(),
        model.balance,
        style("Stake:").bold().cyan(),
        model.stake,
        style("Net:").bold().cyan(),
        model.session_net
    );

    for hand in &model.hands {
        match &hand.value {
            Some(value) => println!("  {:<8} {}  ({value})", hand.label, hand.cards),
            None => println!("  {:<8} {}", hand.label, hand.cards),
        }
    }
    if let Some(outcome) = &model.outcome {
        println!("  {}", style(outcome).italic());
    }

    if !model.wagers.is_empty() {
        println!("{}", style("Wagers:").bold().yellow());
        for wager in &model.wagers {
            if wager.staged {
                println!("  {} {}", wager.text, style("(pending)").dim());
            } else {
                println!("  {}", wager.text);
            }
        }
    }

    if let Some(history) = &model.roll_history {
        println!("{} {history}", style("Rolls:").bold().cyan());
    }
    println!(
        "{} {}",
        style("Modifiers:").bold().cyan(),
        model.modifiers.join(", ")
    );
    if let Some(tx) = &model.last_tx {
        println!("{} {}", style("Last tx:").bold().cyan(), style(tx).dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn games_parse_in_any_case() {
        assert_eq!(parse_game("sic_bo").expect("sic bo"), GameType::SicBo);
        assert_eq!(parse_game("Roulette").expect("roulette"), GameType::Roulette);
        assert!(parse_game("poker").is_err());
    }

    #[test]
    fn hex_accepts_prefix_and_spaces() {
        assert_eq!(parse_hex("0x01 ff").expect("hex"), vec![0x01, 0xff]);
        assert!(parse_hex("zz").is_err());
    }
}
