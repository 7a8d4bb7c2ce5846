//! Incremental [`TableViewModel`] updates driven by runtime events.
//!
//! # Architecture
//!
//! - `UpdateScope`: Bitflags tracking which parts of the view model changed
//! - `ViewModelUpdater`: Stateless service applying one runtime [`Event`]

use bitflags::bitflags;
use runtime::{Event, SessionEvent, SessionView};

use crate::view_model::TableViewModel;

bitflags! {
    /// Tracks which parts of [`TableViewModel`] have been updated.
    ///
    /// Renderers skip redrawing panels whose flag is clear.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct UpdateScope: u32 {
        /// Header, status, hands, wagers, roll history.
        const TABLE     = 0b00001;

        const BALANCE   = 0b00010;

        /// Shield and double indicators.
        const MODIFIERS = 0b00100;

        /// A session settled; running totals changed.
        const LEDGER    = 0b01000;

        /// Only the message log changed.
        const MESSAGES  = 0b10000;

        const ALL = Self::TABLE.bits()
                  | Self::BALANCE.bits()
                  | Self::MODIFIERS.bits()
                  | Self::LEDGER.bits()
                  | Self::MESSAGES.bits();
    }
}

impl Default for UpdateScope {
    fn default() -> Self {
        Self::empty()
    }
}

/// Applies runtime events to a [`TableViewModel`].
///
/// Session events carry identifiers rather than state, so table changes are
/// rebuilt from a [`SessionView`] read after the event.
pub struct ViewModelUpdater;

impl ViewModelUpdater {
    pub fn update(model: &mut TableViewModel, event: &Event, view: &SessionView) -> UpdateScope {
        match event {
            Event::Session(SessionEvent::BalanceChanged { balance }) => {
                model.refresh_balance(Some(*balance));
                UpdateScope::BALANCE
            }
            Event::Session(SessionEvent::ModifierChanged { .. }) => {
                model.refresh_modifiers(view);
                UpdateScope::MODIFIERS
            }
            Event::Session(SessionEvent::Completed { .. }) => {
                model.refresh_table(view);
                model.refresh_modifiers(view);
                UpdateScope::TABLE | UpdateScope::MODIFIERS
            }
            Event::Session(_) => {
                model.refresh_table(view);
                UpdateScope::TABLE
            }
            Event::Ledger(_) => UpdateScope::LEDGER | UpdateScope::MESSAGES,
            Event::Notice(_) => UpdateScope::MESSAGES,
        }
    }
}

#[cfg(test)]
mod tests {
    use casino_core::{GameType, SessionId};
    use runtime::{ModifierView, Notice, NoticeLevel, Phase};

    use super::*;
    use crate::message::MessageLog;

    #[test]
    fn balance_changes_touch_only_the_balance() {
        let view = SessionView::default();
        let mut model = TableViewModel::from_view(&view, &MessageLog::new(1), 1);

        let scope = ViewModelUpdater::update(
            &mut model,
            &Event::Session(SessionEvent::BalanceChanged { balance: 2_500 }),
            &view,
        );

        assert_eq!(scope, UpdateScope::BALANCE);
        assert_eq!(model.balance, "2,500");
    }

    #[test]
    fn lifecycle_events_rebuild_the_table() {
        let idle = SessionView::default();
        let mut model = TableViewModel::from_view(&idle, &MessageLog::new(1), 1);

        let session_id = SessionId::new(11).expect("non-zero id");
        let view = SessionView {
            phase: Phase::AwaitingStart,
            session_id: Some(session_id),
            game_type: Some(GameType::HiLo),
            stake: 100,
            double: ModifierView {
                enabled: true,
                tentative: true,
            },
            ..SessionView::default()
        };
        let scope = ViewModelUpdater::update(
            &mut model,
            &Event::Session(SessionEvent::Begun {
                session_id,
                game_type: GameType::HiLo,
                stake: 100,
            }),
            &view,
        );

        assert_eq!(scope, UpdateScope::TABLE);
        assert_eq!(model.header, "Hi-Lo #11");
        assert_eq!(model.status, "Waiting for the table");
        assert_eq!(model.modifiers[1], "Double off");
    }

    #[test]
    fn notices_only_touch_messages() {
        let view = SessionView::default();
        let mut model = TableViewModel::from_view(&view, &MessageLog::new(1), 1);
        let scope = ViewModelUpdater::update(
            &mut model,
            &Event::Notice(Notice::new(NoticeLevel::Info, "hello")),
            &view,
        );
        assert_eq!(scope, UpdateScope::MESSAGES);
        assert!(!scope.contains(UpdateScope::TABLE));
    }
}
