//! Table view model derived from the runtime's [`SessionView`].
use casino_core::card::revealed;
use casino_core::games::blackjack::{BlackjackHand, HandStatus, hand_value};
use casino_core::games::roulette::is_red;
use casino_core::{CardSlot, GameType, Snapshot, Stage};
use client_blockchain_core::Modifier;
use runtime::{Phase, SessionView};

use crate::format::{
    format_amount, format_balance, format_cards, format_dice, format_modifier, format_signed,
    format_wager,
};
use crate::message::{MessageEntry, MessageLog};

/// Everything a renderer draws for one frame of the table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableViewModel {
    /// `Roulette #42`, or the idle banner.
    pub header: String,
    pub phase: Phase,
    pub stage: Option<Stage>,
    pub status: String,
    pub balance: String,
    pub stake: String,
    pub hands: Vec<HandRow>,
    /// One-line outcome reported by the snapshot, once there is one.
    pub outcome: Option<String>,
    pub wagers: Vec<WagerRow>,
    pub modifiers: Vec<String>,
    /// Craps roll totals since the last seven.
    pub roll_history: Option<String>,
    pub last_tx: Option<String>,
    /// Net over every session settled while this view was alive.
    pub session_net: String,
    pub accepts_input: bool,
    /// Newest first.
    pub messages: Vec<MessageEntry>,
}

impl TableViewModel {
    pub fn from_view(view: &SessionView, messages: &MessageLog, message_limit: usize) -> Self {
        let mut model = Self {
            header: String::new(),
            phase: view.phase,
            stage: None,
            status: String::new(),
            balance: String::new(),
            stake: String::new(),
            hands: Vec::new(),
            outcome: None,
            wagers: Vec::new(),
            modifiers: Vec::new(),
            roll_history: None,
            last_tx: None,
            session_net: format_signed(0),
            accepts_input: false,
            messages: collect_messages(messages, message_limit),
        };
        model.refresh_table(view);
        model.refresh_balance(view.balance);
        model.refresh_modifiers(view);
        model
    }

    /// Rebuilds everything that depends on the session itself.
    pub fn refresh_table(&mut self, view: &SessionView) {
        self.phase = view.phase;
        self.stage = view.stage;
        self.header = header(view);
        self.status = status(view);
        self.stake = match view.game_type {
            Some(_) => format_amount(view.stake),
            None => "-".to_string(),
        };
        self.hands = view.snapshot.as_ref().map(hand_rows).unwrap_or_default();
        self.outcome = view.snapshot.as_ref().and_then(Snapshot::describe);
        self.wagers = match view.game_type {
            Some(game) => view
                .wagers
                .iter()
                .map(|wager| WagerRow {
                    text: format_wager(game, wager),
                    staged: wager.is_staged(),
                })
                .collect(),
            None => Vec::new(),
        };
        self.roll_history = (view.game_type == Some(GameType::Craps)
            && !view.roll_history.is_empty())
        .then(|| {
            view.roll_history
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        });
        self.last_tx = view.last_tx.as_ref().map(ToString::to_string);
        self.accepts_input = view.accepts_input();
    }

    pub fn refresh_balance(&mut self, balance: Option<u64>) {
        self.balance = format_balance(balance);
    }

    pub fn refresh_modifiers(&mut self, view: &SessionView) {
        self.modifiers = vec![
            format_modifier(Modifier::Shield, view.shield),
            format_modifier(Modifier::Double, view.double),
        ];
    }

    pub fn refresh_session_net(&mut self, net: i64) {
        self.session_net = format_signed(net);
    }

    pub fn refresh_messages(&mut self, messages: &MessageLog, limit: usize) {
        self.messages = collect_messages(messages, limit);
    }
}

/// One row of cards or dice, e.g. `Banker: 9♦ K♣ (9)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandRow {
    pub label: String,
    pub cards: String,
    pub value: Option<String>,
}

impl HandRow {
    fn new(label: impl Into<String>, cards: String) -> Self {
        Self {
            label: label.into(),
            cards,
            value: None,
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WagerRow {
    pub text: String,
    /// Submitted but not yet reflected by the ledger.
    pub staged: bool,
}

fn header(view: &SessionView) -> String {
    match (view.game_type, view.session_id) {
        (Some(game), Some(id)) => format!("{} {id}", game.title()),
        (Some(game), None) => game.title().to_string(),
        _ => "No active session".to_string(),
    }
}

fn status(view: &SessionView) -> String {
    match view.phase {
        Phase::Idle => "Choose a game and stake".to_string(),
        Phase::AwaitingStart if view.plan_queued => {
            "Waiting for the table, auto-play queued".to_string()
        }
        Phase::AwaitingStart => "Waiting for the table".to_string(),
        Phase::InPlay => match view.stage {
            Some(Stage::Betting) | None => "Place your bets".to_string(),
            Some(Stage::Playing) => "Your move".to_string(),
            Some(Stage::Result) => "Round settled".to_string(),
        },
        Phase::AwaitingCompletion => match view.pending_moves {
            1 => "Waiting for 1 result".to_string(),
            pending => format!("Waiting for {pending} results"),
        },
    }
}

/// Card and dice rows for any decoded table state.
pub fn hand_rows(snapshot: &Snapshot) -> Vec<HandRow> {
    match snapshot {
        Snapshot::Baccarat(state) if state.is_dealt() => vec![
            HandRow::new("Player", format_cards(&state.player))
                .with_value(state.player_total().to_string()),
            HandRow::new("Banker", format_cards(&state.banker))
                .with_value(state.banker_total().to_string()),
        ],
        Snapshot::Baccarat(_) => Vec::new(),
        Snapshot::Blackjack(state) => {
            let split = state.hands.len() > 1;
            let mut rows: Vec<_> = state
                .hands
                .iter()
                .enumerate()
                .map(|(index, hand)| {
                    let label = if split {
                        format!("Hand {}", index + 1)
                    } else {
                        "Player".to_string()
                    };
                    HandRow::new(label, format_cards(&hand.cards)).with_value(blackjack_value(hand))
                })
                .collect();
            if !state.dealer.is_empty() {
                let value = hand_value(&revealed(&state.dealer));
                rows.push(
                    HandRow::new("Dealer", format_cards(&state.dealer))
                        .with_value(value.total.to_string()),
                );
            }
            rows
        }
        Snapshot::CasinoWar(state) => vec![
            HandRow::new("Player", format_cards(std::slice::from_ref(&state.player))),
            HandRow::new("Dealer", format_cards(std::slice::from_ref(&state.dealer))),
        ],
        Snapshot::Craps(state) => match state.total() {
            Some(_) => {
                let row = HandRow::new("Dice", format_dice(&state.dice));
                vec![match state.main_point() {
                    Some(point) => row.with_value(format!("point {point}")),
                    None => row.with_value("come out"),
                }]
            }
            None => Vec::new(),
        },
        Snapshot::VideoPoker(state) => {
            let row = HandRow::new("Hand", format_cards(&state.cards));
            vec![match state.hand_rank() {
                Some(rank) => row.with_value(rank.to_string()),
                None => row,
            }]
        }
        Snapshot::HiLo(state) => vec![
            HandRow::new("Card", format_cards(std::slice::from_ref(&state.card)))
                .with_value(state.multiplier_label()),
        ],
        Snapshot::Roulette(state) => state
            .result
            .map(|number| {
                let color = match number {
                    0 => "green",
                    number if is_red(number) => "red",
                    _ => "black",
                };
                vec![HandRow::new("Ball", number.to_string()).with_value(color)]
            })
            .unwrap_or_default(),
        Snapshot::SicBo(state) => state
            .dice
            .map(|dice| vec![HandRow::new("Dice", format_dice(&dice))])
            .unwrap_or_default(),
        Snapshot::ThreeCard(state) => dealt_rows(&[
            ("Player", &state.player[..]),
            ("Dealer", &state.dealer[..]),
        ]),
        Snapshot::UltimateHoldem(state) => dealt_rows(&[
            ("Player", &state.player[..]),
            ("Board", &state.board[..]),
            ("Dealer", &state.dealer[..]),
        ]),
    }
}

/// Rows for fixed-size hands, skipping any with nothing face up.
fn dealt_rows(hands: &[(&str, &[CardSlot])]) -> Vec<HandRow> {
    hands
        .iter()
        .filter(|(_, cards)| cards.iter().any(|slot| slot.card().is_some()))
        .map(|(label, cards)| HandRow::new(*label, format_cards(cards)))
        .collect()
}

fn blackjack_value(hand: &BlackjackHand) -> String {
    let value = hand.value();
    let mut text = match hand.status {
        HandStatus::Blackjack => "blackjack".to_string(),
        HandStatus::Busted => format!("{} bust", value.total),
        HandStatus::Surrendered => "surrendered".to_string(),
        _ if value.soft => format!("soft {}", value.total),
        _ => value.total.to_string(),
    };
    if hand.bet_multiplier > 1 {
        text.push_str(", doubled");
    }
    text
}

fn collect_messages(log: &MessageLog, limit: usize) -> Vec<MessageEntry> {
    log.recent(limit).cloned().collect()
}
