//! Drives a runtime over the in-memory chain and renders every event into
//! the message log and table view model.

use std::sync::Arc;
use std::time::Duration;

use casino_core::games::RouletteState;
use casino_core::{Command, CompletionFlags, GameType, Snapshot, Wager, WagerSpec};
use client_blockchain_core::{AccountId, ChainSignal, MockChain};
use client_frontend_core::{
    EventConsumer, MessageConfig, MessageLevel, TableEventConsumer, TableViewModel, UpdateScope,
    ViewModelUpdater,
};
use runtime::{Event, Runtime, RuntimeConfig, RuntimeHandle, Topic};
use tokio::sync::broadcast;

const ACCOUNT: AccountId = AccountId([3; 32]);

fn roulette(wagers: &[Wager], result: Option<u8>) -> Vec<u8> {
    Snapshot::Roulette(RouletteState {
        wagers: wagers.to_vec(),
        result,
        ..RouletteState::default()
    })
    .to_bytes()
}

struct Table {
    handle: RuntimeHandle,
    receivers: Vec<broadcast::Receiver<Event>>,
    consumer: TableEventConsumer,
    model: TableViewModel,
}

impl Table {
    async fn new(handle: RuntimeHandle) -> Self {
        let receivers = Topic::ALL
            .iter()
            .map(|topic| handle.subscribe(*topic))
            .collect();
        let consumer = TableEventConsumer::new(MessageConfig::default());
        let view = handle.view().await.expect("view");
        let model = TableViewModel::from_view(&view, consumer.message_log(), 16);
        Self {
            handle,
            receivers,
            consumer,
            model,
        }
    }

    /// Lets the worker drain, then applies every pending event.
    async fn pump(&mut self) -> UpdateScope {
        tokio::time::sleep(Duration::from_millis(1)).await;
        let view = self.handle.view().await.expect("view");
        let mut scope = UpdateScope::empty();
        for rx in &mut self.receivers {
            while let Ok(event) = rx.try_recv() {
                self.consumer.on_event(&event);
                scope |= ViewModelUpdater::update(&mut self.model, &event, &view);
            }
        }
        self.model.refresh_session_net(self.consumer.session_net());
        self.model.refresh_messages(self.consumer.message_log(), 16);
        scope
    }

    fn texts(&self) -> Vec<String> {
        self.consumer
            .message_log()
            .iter()
            .map(|entry| entry.text.clone())
            .collect()
    }
}

#[tokio::test(start_paused = true)]
async fn roulette_session_renders_end_to_end() {
    let chain = MockChain::new().with_balance(ACCOUNT, 1_000);
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            balance_refresh: None,
            account: Some(ACCOUNT),
            ..RuntimeConfig::default()
        })
        .chain(Arc::new(chain.clone()))
        .build()
        .expect("runtime should build");
    let handle = runtime.handle();
    let mut table = Table::new(handle.clone()).await;
    table.pump().await;
    assert_eq!(table.model.balance, "1,000");

    let id = handle.begin(GameType::Roulette, 0).await.expect("begin");
    table.pump().await;
    assert_eq!(table.model.status, "Waiting for the table");

    handle
        .deliver(ChainSignal::Started {
            session_id: id,
            game_type: GameType::Roulette,
            state: roulette(&[], None),
        })
        .await
        .expect("deliver");
    let scope = table.pump().await;
    assert!(scope.contains(UpdateScope::TABLE));
    assert!(table.model.accepts_input);
    assert_eq!(table.model.status, "Place your bets");

    handle
        .submit(Command::PlaceWager(WagerSpec::new(1, 0, 50)))
        .await
        .expect("submit");
    table.pump().await;
    assert_eq!(table.model.wagers.len(), 1);
    assert!(table.model.wagers[0].staged);
    assert_eq!(table.model.wagers[0].text, "Red 50");

    let red = Wager::confirmed(1, 0, 50);
    handle
        .deliver(ChainSignal::Moved {
            session_id: id,
            state: roulette(&[red], None),
        })
        .await
        .expect("deliver");
    table.pump().await;
    assert!(!table.model.wagers[0].staged);

    handle.submit(Command::Advance).await.expect("spin");
    handle
        .deliver(ChainSignal::Moved {
            session_id: id,
            state: roulette(&[red], Some(3)),
        })
        .await
        .expect("deliver");
    table.pump().await;
    assert_eq!(table.model.hands[0].cards, "3");
    assert_eq!(table.model.hands[0].value.as_deref(), Some("red"));

    handle
        .deliver(ChainSignal::Completed {
            session_id: id,
            final_balance: 1_050,
            payout: 100,
            flags: CompletionFlags::empty(),
        })
        .await
        .expect("deliver");
    let scope = table.pump().await;
    assert!(scope.contains(UpdateScope::LEDGER | UpdateScope::BALANCE));

    assert_eq!(table.model.header, "No active session");
    assert_eq!(table.model.balance, "1,050");
    assert_eq!(table.model.session_net, "+50");

    let texts = table.texts();
    assert_eq!(texts[0], format!("Roulette {id} opened, stake 0"));
    assert_eq!(texts[1], format!("Session {id} confirmed by the ledger"));
    assert!(
        texts
            .iter()
            .any(|text| text.starts_with("Roulette: WON +50"))
    );
    assert_eq!(
        texts.last().map(String::as_str),
        Some("Running total +50 over 1 sessions")
    );
    let headline = table
        .consumer
        .message_log()
        .iter()
        .find(|entry| entry.text.starts_with("Roulette: WON"))
        .expect("headline");
    assert_eq!(headline.level, MessageLevel::Win);
    assert_eq!(table.model.messages[0].text, "Running total +50 over 1 sessions");

    drop(table);
    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}
