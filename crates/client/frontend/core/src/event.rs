//! Utilities for reacting to runtime events inside UI layers.
use casino_core::LedgerEntry;
use client_blockchain_core::Modifier;
use runtime::{Event, SessionEvent};

use crate::config::MessageConfig;
use crate::format::{format_amount, format_signed, modifier_title};
use crate::message::{MessageEntry, MessageLevel, MessageLog};

#[derive(Clone, Copy, Debug, Default)]
pub struct EventImpact {
    pub requires_redraw: bool,
}

impl EventImpact {
    pub const fn none() -> Self {
        Self {
            requires_redraw: false,
        }
    }

    pub const fn redraw() -> Self {
        Self {
            requires_redraw: true,
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            requires_redraw: self.requires_redraw || other.requires_redraw,
        }
    }
}

pub trait EventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact;
    fn message_log(&self) -> &MessageLog;
    fn message_log_mut(&mut self) -> &mut MessageLog;
    fn take_message_log(self) -> MessageLog
    where
        Self: Sized;
}

/// Turns runtime events into the table's message log.
///
/// Abandonment and rejected modifier toggles arrive as notices from the
/// runtime, so their session events add no line of their own.
#[derive(Clone, Debug)]
pub struct TableEventConsumer {
    log: MessageLog,
    config: MessageConfig,
    /// Value of the last tentative toggle per modifier, `[shield, double]`.
    proposed: [Option<bool>; 2],
    session_net: i64,
    settled: usize,
}

impl TableEventConsumer {
    pub fn new(config: MessageConfig) -> Self {
        Self {
            log: MessageLog::new(config.capacity),
            config,
            proposed: [None; 2],
            session_net: 0,
            settled: 0,
        }
    }

    /// Net across every ledger entry seen so far.
    pub fn session_net(&self) -> i64 {
        self.session_net
    }

    pub fn settled(&self) -> usize {
        self.settled
    }

    fn on_session(&mut self, event: &SessionEvent) -> EventImpact {
        match event {
            SessionEvent::Begun {
                session_id,
                game_type,
                stake,
            } => {
                self.log.push_text(format!(
                    "{} {session_id} opened, stake {}",
                    game_type.title(),
                    format_amount(*stake)
                ));
            }
            SessionEvent::Confirmed { session_id, .. } => {
                self.log
                    .push_text(format!("Session {session_id} confirmed by the ledger"));
            }
            SessionEvent::Submitted { commands, tx, .. } => {
                if self.config.show_submissions {
                    let noun = if *commands == 1 { "command" } else { "commands" };
                    let text = match tx {
                        Some(tx) => format!("{commands} {noun} accepted ({tx})"),
                        None => format!("{commands} {noun} accepted"),
                    };
                    self.log.push_text(text);
                }
            }
            SessionEvent::Reverted { session_id, reason } => {
                self.log.push_level(
                    format!("Submission for session {session_id} reverted: {reason}"),
                    MessageLevel::Error,
                );
            }
            SessionEvent::ModifierChanged {
                modifier,
                enabled,
                tentative,
            } => {
                let slot = &mut self.proposed[modifier_index(*modifier)];
                if *tentative {
                    *slot = Some(*enabled);
                } else if slot.take() == Some(*enabled) {
                    let state = if *enabled { "armed" } else { "disarmed" };
                    self.log
                        .push_text(format!("{} {state}", modifier_title(*modifier)));
                }
            }
            SessionEvent::Advanced { .. }
            | SessionEvent::Completed { .. }
            | SessionEvent::Abandoned { .. }
            | SessionEvent::BalanceChanged { .. } => {}
        }
        EventImpact::redraw()
    }

    fn on_ledger(&mut self, entry: &LedgerEntry) -> EventImpact {
        self.session_net = self.session_net.saturating_add(entry.net);
        self.settled += 1;

        let level = if entry.net > 0 {
            MessageLevel::Win
        } else {
            MessageLevel::Info
        };
        let timestamp = u64::try_from(entry.recorded_at_ms).ok();
        self.log.push(MessageEntry::new(
            entry.headline.clone(),
            timestamp,
            level,
        ));
        if self.config.show_detail_lines {
            for line in &entry.details {
                self.log.push(MessageEntry::new(
                    format!("  {line}"),
                    timestamp,
                    MessageLevel::Info,
                ));
            }
        }
        self.log.push_text(format!(
            "Running total {} over {} sessions",
            format_signed(self.session_net),
            self.settled
        ));
        EventImpact::redraw()
    }
}

impl EventConsumer for TableEventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact {
        match event {
            Event::Session(session) => self.on_session(session),
            Event::Ledger(entry) => self.on_ledger(entry),
            Event::Notice(notice) => {
                self.log
                    .push_level(notice.message.clone(), notice.level.into());
                EventImpact::redraw()
            }
        }
    }

    fn message_log(&self) -> &MessageLog {
        &self.log
    }

    fn message_log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn take_message_log(self) -> MessageLog {
        self.log
    }
}

fn modifier_index(modifier: Modifier) -> usize {
    match modifier {
        Modifier::Shield => 0,
        Modifier::Double => 1,
    }
}

#[cfg(test)]
mod tests {
    use casino_core::{CompletionFlags, GameType, PnlBasis, SessionId};
    use runtime::{Notice, NoticeLevel};

    use super::*;

    fn session(id: u64) -> SessionId {
        SessionId::new(id).expect("non-zero id")
    }

    fn texts(consumer: &TableEventConsumer) -> Vec<String> {
        consumer
            .message_log()
            .iter()
            .map(|entry| entry.text.clone())
            .collect()
    }

    fn entry(net: i64) -> LedgerEntry {
        LedgerEntry {
            session_id: session(9),
            game_type: GameType::Roulette,
            net,
            basis: PnlBasis::BalanceDelta,
            flags: CompletionFlags::empty(),
            headline: format!("Roulette: WON {}", format_signed(net)),
            details: vec!["Red 50: won".to_string()],
            recorded_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn ledger_entries_log_headline_details_and_total() {
        let mut consumer = TableEventConsumer::new(MessageConfig::default());
        consumer.on_event(&Event::Ledger(Box::new(entry(350))));
        consumer.on_event(&Event::Ledger(Box::new(entry(-100))));

        assert_eq!(consumer.session_net(), 250);
        assert_eq!(consumer.settled(), 2);

        let first = consumer.message_log().iter().next().expect("headline");
        assert_eq!(first.level, MessageLevel::Win);
        assert_eq!(first.timestamp, Some(1_700_000_000_000));
        assert_eq!(
            texts(&consumer)[..3],
            [
                "Roulette: WON +350".to_string(),
                "  Red 50: won".to_string(),
                "Running total +350 over 1 sessions".to_string(),
            ]
        );
    }

    #[test]
    fn detail_lines_can_be_hidden() {
        let config = MessageConfig {
            show_detail_lines: false,
            ..MessageConfig::default()
        };
        let mut consumer = TableEventConsumer::new(config);
        consumer.on_event(&Event::Ledger(Box::new(entry(10))));
        assert_eq!(consumer.message_log().len(), 2);
    }

    #[test]
    fn notices_keep_their_level() {
        let mut consumer = TableEventConsumer::new(MessageConfig::default());
        let impact = consumer.on_event(&Event::Notice(Notice::new(
            NoticeLevel::Warning,
            "Session #5 abandoned: timed out",
        )));

        assert!(impact.requires_redraw);
        let entry = consumer.message_log().recent(1).next().expect("notice");
        assert_eq!(entry.level, MessageLevel::Warning);
    }

    #[test]
    fn modifier_lines_only_for_committed_toggles() {
        let mut consumer = TableEventConsumer::new(MessageConfig::default());
        let changed = |enabled, tentative| {
            Event::Session(SessionEvent::ModifierChanged {
                modifier: Modifier::Shield,
                enabled,
                tentative,
            })
        };

        consumer.on_event(&changed(true, true));
        consumer.on_event(&changed(true, false));
        consumer.on_event(&changed(false, true));
        // rejected: runtime reverts to the previous value
        consumer.on_event(&changed(true, false));

        assert_eq!(texts(&consumer), ["Shield armed"]);
    }

    #[test]
    fn submissions_are_quiet_by_default() {
        let submitted = Event::Session(SessionEvent::Submitted {
            session_id: session(3),
            commands: 2,
            tx: None,
        });

        let mut quiet = TableEventConsumer::new(MessageConfig::default());
        quiet.on_event(&submitted);
        assert!(quiet.message_log().is_empty());

        let mut verbose = TableEventConsumer::new(MessageConfig {
            show_submissions: true,
            ..MessageConfig::default()
        });
        verbose.on_event(&submitted);
        assert_eq!(texts(&verbose), ["2 commands accepted"]);
    }
}
