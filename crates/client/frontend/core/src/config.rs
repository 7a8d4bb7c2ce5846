//! Frontend configuration structures and loaders.
//!
//! Settings here are shared by every table renderer (terminal replay today,
//! graphical clients later).

use std::env;

/// Frontend-specific configuration.
#[derive(Clone, Debug, Default)]
pub struct FrontendConfig {
    pub messages: MessageConfig,
    pub table: TableConfig,
}

impl FrontendConfig {
    pub const MESSAGE_CAPACITY: &'static str = "CASINO_MESSAGE_CAPACITY";
    pub const SHOW_DETAIL_LINES: &'static str = "CASINO_SHOW_DETAIL_LINES";
    pub const SHOW_SUBMISSIONS: &'static str = "CASINO_SHOW_SUBMISSIONS";
    pub const MESSAGE_LIMIT: &'static str = "CASINO_MESSAGE_LIMIT";

    pub const fn new(messages: MessageConfig, table: TableConfig) -> Self {
        Self { messages, table }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CASINO_MESSAGE_CAPACITY` - Message log capacity (default: 64)
    /// - `CASINO_SHOW_DETAIL_LINES` - Log per-wager settlement lines (default: true)
    /// - `CASINO_SHOW_SUBMISSIONS` - Log accepted transactions (default: false)
    /// - `CASINO_MESSAGE_LIMIT` - Messages carried by each table frame (default: 8)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>(Self::MESSAGE_CAPACITY) {
            config.messages.capacity = capacity.max(1);
        }
        if let Some(show) = read_env_bool(Self::SHOW_DETAIL_LINES) {
            config.messages.show_detail_lines = show;
        }
        if let Some(show) = read_env_bool(Self::SHOW_SUBMISSIONS) {
            config.messages.show_submissions = show;
        }
        if let Some(limit) = read_env::<usize>(Self::MESSAGE_LIMIT) {
            config.table.message_limit = limit;
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub capacity: usize,
    /// Follow each settlement headline with one line per resolved wager.
    pub show_detail_lines: bool,
    /// Log every transaction the transport accepts.
    pub show_submissions: bool,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            show_detail_lines: true,
            show_submissions: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TableConfig {
    pub message_limit: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { message_limit: 8 }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FrontendConfig::default();
        assert_eq!(config.messages.capacity, 64);
        assert!(config.messages.show_detail_lines);
        assert!(!config.messages.show_submissions);
        assert_eq!(config.table.message_limit, 8);
    }
}
