//! Session reconciliation scenarios against the in-memory chain.
//!
//! Time is paused: `settle()` lets spawned network calls and the worker drain,
//! and longer sleeps drive the watchdog deterministically.

use std::sync::Arc;
use std::time::Duration;

use casino_core::games::{BetStatus, CrapsBet, CrapsBetKind, CrapsPhase, RouletteState};
use casino_core::{
    Command, CompletionFlags, CrapsState, GameType, PnlBasis, SessionId, Snapshot, Stage, Wager,
    WagerSpec,
};
use client_blockchain_core::{AccountId, ChainSignal, MockChain, Modifier, TransportError};
use runtime::{
    Event, NoticeLevel, Phase, RegistryError, Runtime, RuntimeConfig, RuntimeError,
    RuntimeHandle, SessionEvent, Topic,
};
use tokio::sync::broadcast;

const ACCOUNT: AccountId = AccountId([7; 32]);
const RED: WagerSpec = WagerSpec::new(1, 0, 5);

fn config() -> RuntimeConfig {
    RuntimeConfig {
        watchdog: Duration::from_secs(15),
        balance_refresh: None,
        account: Some(ACCOUNT),
        ..RuntimeConfig::default()
    }
}

async fn start(chain: &MockChain) -> (Runtime, RuntimeHandle) {
    let runtime = Runtime::builder()
        .config(config())
        .chain(Arc::new(chain.clone()))
        .build()
        .expect("runtime should build");
    let handle = runtime.handle();
    settle().await;
    (runtime, handle)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn roulette(wagers: &[Wager], result: Option<u8>) -> Vec<u8> {
    Snapshot::Roulette(RouletteState {
        wagers: wagers.to_vec(),
        result,
        ..RouletteState::default()
    })
    .to_bytes()
}

fn other_id(id: SessionId) -> SessionId {
    SessionId(if id.get() == 1 { 2 } else { 1 })
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

async fn open_roulette(handle: &RuntimeHandle) -> SessionId {
    let id = handle
        .begin(GameType::Roulette, 10)
        .await
        .expect("begin should succeed");
    handle
        .deliver(ChainSignal::Started {
            session_id: id,
            game_type: GameType::Roulette,
            state: roulette(&[], None),
        })
        .await
        .expect("deliver");
    settle().await;
    id
}

/// Begin, confirm, place, spin, settle: the ledger entry carries the
/// balance delta and the running balance follows the completion signal.
#[tokio::test(start_paused = true)]
async fn full_session_settles_into_the_ledger() {
    let chain = MockChain::new().with_balance(ACCOUNT, 1_000);
    let (runtime, handle) = start(&chain).await;
    let mut ledger_rx = handle.subscribe(Topic::Ledger);

    assert_eq!(handle.view().await.unwrap().balance, Some(1_000));

    let id = handle.begin(GameType::Roulette, 10).await.unwrap();
    assert_eq!(handle.view().await.unwrap().phase, Phase::AwaitingStart);

    handle
        .deliver(ChainSignal::Started {
            session_id: id,
            game_type: GameType::Roulette,
            state: roulette(&[], None),
        })
        .await
        .unwrap();
    settle().await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::InPlay);
    assert_eq!(view.stage, Some(Stage::Betting));

    handle.submit(Command::PlaceWager(RED)).await.unwrap();
    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::AwaitingCompletion);
    assert_eq!(view.staged_count(), 1);

    let red = Wager::confirmed(1, 0, 5);
    handle
        .deliver(ChainSignal::Moved {
            session_id: id,
            state: roulette(&[red], None),
        })
        .await
        .unwrap();
    settle().await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.pending_moves, 0);
    assert_eq!(view.wagers.len(), 1);
    assert!(!view.wagers[0].is_staged());

    handle.submit(Command::Advance).await.unwrap();
    handle
        .deliver(ChainSignal::Moved {
            session_id: id,
            state: roulette(&[red], Some(1)),
        })
        .await
        .unwrap();
    handle
        .deliver(ChainSignal::Completed {
            session_id: id,
            final_balance: 1_350,
            payout: 360,
            flags: CompletionFlags::empty(),
        })
        .await
        .unwrap();
    settle().await;

    let Ok(Event::Ledger(entry)) = ledger_rx.try_recv() else {
        panic!("expected a ledger entry");
    };
    assert_eq!(entry.session_id, id);
    assert_eq!(entry.net, 350);
    assert_eq!(entry.basis, PnlBasis::BalanceDelta);
    assert!(entry.headline.starts_with("Roulette: WON +350"));

    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(view.balance, Some(1_350));
    assert_eq!(handle.ledger().await.unwrap().len(), 1);

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

/// Without a captured starting balance the net falls back to payout minus
/// everything wagered.
#[tokio::test(start_paused = true)]
async fn payout_estimate_without_starting_balance() {
    let chain = MockChain::new();
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            account: None,
            balance_refresh: None,
            ..RuntimeConfig::default()
        })
        .chain(Arc::new(chain.clone()))
        .build()
        .unwrap();
    let handle = runtime.handle();

    let id = open_roulette(&handle).await;
    handle.submit(Command::PlaceWager(RED)).await.unwrap();
    handle
        .deliver(ChainSignal::Completed {
            session_id: id,
            final_balance: 0,
            payout: 40,
            flags: CompletionFlags::empty(),
        })
        .await
        .unwrap();
    settle().await;

    let ledger = handle.ledger().await.unwrap();
    assert_eq!(ledger[0].basis, PnlBasis::PayoutEstimate);
    assert_eq!(ledger[0].net, 40 - 15);
    assert!(matches!(
        handle.refresh_balance().await,
        Err(RuntimeError::NoAccount)
    ));
}

/// The watchdog query confirms the session first; the late start signal
/// must not replay the plan.
#[tokio::test(start_paused = true)]
async fn auto_play_runs_at_most_once() {
    let chain = MockChain::new().with_balance(ACCOUNT, 500);
    let (_runtime, handle) = start(&chain).await;

    let id = handle
        .begin_with_plan(
            GameType::Roulette,
            10,
            vec![Command::PlaceWager(RED), Command::Advance],
        )
        .await
        .unwrap();
    assert!(handle.view().await.unwrap().plan_queued);

    tokio::time::sleep(Duration::from_secs(16)).await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::AwaitingCompletion);
    assert_eq!(view.pending_moves, 2);
    assert!(!view.plan_queued);

    handle
        .deliver(ChainSignal::Started {
            session_id: id,
            game_type: GameType::Roulette,
            state: roulette(&[], None),
        })
        .await
        .unwrap();
    settle().await;

    assert_eq!(chain.commands_for(id).len(), 2);
    assert_eq!(handle.view().await.unwrap().pending_moves, 2);
}

#[tokio::test(start_paused = true)]
async fn plan_is_rejected_once_confirmed() {
    let chain = MockChain::new();
    let (_runtime, handle) = start(&chain).await;
    let id = open_roulette(&handle).await;

    let plan = runtime::AutoPlayPlan::new(id, GameType::Roulette, vec![Command::Advance]);
    assert!(matches!(
        handle.queue_auto_play(plan).await,
        Err(RuntimeError::Plan(runtime::PlanError::AlreadyConfirmed(found))) if found == id
    ));
}

#[tokio::test(start_paused = true)]
async fn stale_signals_are_ignored() {
    let chain = MockChain::new().with_balance(ACCOUNT, 1_000);
    let (_runtime, handle) = start(&chain).await;

    let id = handle.begin(GameType::Roulette, 10).await.unwrap();
    handle
        .deliver(ChainSignal::Moved {
            session_id: id,
            state: roulette(&[], Some(3)),
        })
        .await
        .unwrap();
    settle().await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::AwaitingStart);
    assert!(view.snapshot.is_none());

    let stranger = other_id(id);
    for signal in [
        ChainSignal::Started {
            session_id: stranger,
            game_type: GameType::Roulette,
            state: Vec::new(),
        },
        ChainSignal::Completed {
            session_id: stranger,
            final_balance: 0,
            payout: 0,
            flags: CompletionFlags::empty(),
        },
        ChainSignal::Error {
            session_id: Some(stranger),
            message: "not yours".into(),
        },
    ] {
        handle.deliver(signal).await.unwrap();
    }
    settle().await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.session_id, Some(id));
    assert_eq!(view.phase, Phase::AwaitingStart);

    assert_eq!(handle.abandon().await.unwrap(), id);
    handle
        .deliver(ChainSignal::Completed {
            session_id: id,
            final_balance: 1_500,
            payout: 500,
            flags: CompletionFlags::empty(),
        })
        .await
        .unwrap();
    settle().await;
    assert!(handle.ledger().await.unwrap().is_empty());
    assert_eq!(handle.view().await.unwrap().balance, Some(1_000));
}

#[tokio::test(start_paused = true)]
async fn submission_gates() {
    let chain = MockChain::new();
    let (_runtime, handle) = start(&chain).await;

    assert!(matches!(
        handle.submit(Command::Advance).await,
        Err(RuntimeError::Registry(RegistryError::NoActiveSession))
    ));
    assert!(matches!(
        handle.begin(GameType::Blackjack, 0).await,
        Err(RuntimeError::InvalidStake(GameType::Blackjack))
    ));

    let id = handle.begin(GameType::Roulette, 0).await.unwrap();
    assert!(matches!(
        handle.submit(Command::Advance).await,
        Err(RuntimeError::NotConfirmed(found)) if found == id
    ));
    assert!(matches!(
        handle.begin(GameType::Craps, 0).await,
        Err(RuntimeError::Registry(RegistryError::AlreadyActive(found))) if found == id
    ));

    handle
        .deliver(ChainSignal::Started {
            session_id: id,
            game_type: GameType::Roulette,
            state: Vec::new(),
        })
        .await
        .unwrap();
    settle().await;

    assert!(matches!(
        handle.submit_batch(Vec::new()).await,
        Err(RuntimeError::EmptyBatch)
    ));
    assert!(matches!(
        handle.submit(Command::Reveal).await,
        Err(RuntimeError::Encode(_))
    ));

    handle.submit(Command::PlaceWager(RED)).await.unwrap();
    assert!(matches!(
        handle.submit(Command::Advance).await,
        Err(RuntimeError::StillPending { pending: 1, .. })
    ));
    assert_eq!(chain.commands_for(id).len(), 1);
}

/// A blob that fails to decode keeps the last good snapshot but still
/// retires the outstanding move.
#[tokio::test(start_paused = true)]
async fn malformed_state_keeps_last_snapshot() {
    let chain = MockChain::new();
    let (_runtime, handle) = start(&chain).await;
    let mut notices = handle.subscribe(Topic::Notice);
    let id = open_roulette(&handle).await;

    handle.submit(Command::PlaceWager(RED)).await.unwrap();
    handle
        .deliver(ChainSignal::Moved {
            session_id: id,
            state: vec![9, 9],
        })
        .await
        .unwrap();
    settle().await;

    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::InPlay);
    assert_eq!(view.pending_moves, 0);
    assert_eq!(view.stage, Some(Stage::Betting));
    assert_eq!(view.staged_count(), 0);

    let warned = drain(&mut notices).into_iter().any(|event| {
        matches!(event, Event::Notice(notice) if notice.level == NoticeLevel::Warning)
    });
    assert!(warned);
}

#[tokio::test(start_paused = true)]
async fn failed_submission_rolls_back() {
    let chain = MockChain::new();
    let (_runtime, handle) = start(&chain).await;
    let mut session_rx = handle.subscribe(Topic::Session);

    chain.fail_next_submit(TransportError::Network("timeout".into()));
    assert!(matches!(
        handle.begin(GameType::Roulette, 10).await,
        Err(RuntimeError::Transport(TransportError::Network(_)))
    ));
    assert_eq!(handle.view().await.unwrap().phase, Phase::Idle);

    let id = open_roulette(&handle).await;
    chain.fail_next_submit(TransportError::Rejected("limit".into()));
    assert!(handle.submit(Command::PlaceWager(RED)).await.is_err());

    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::InPlay);
    assert!(view.wagers.is_empty());
    assert!(drain(&mut session_rx).into_iter().any(|event| matches!(
        event,
        Event::Session(SessionEvent::Reverted { session_id, .. }) if session_id == id
    )));
}

#[tokio::test(start_paused = true)]
async fn watchdog_abandons_missing_session() {
    let chain = MockChain::new().with_balance(ACCOUNT, 1_000);
    let (_runtime, handle) = start(&chain).await;

    let id = handle.begin(GameType::Roulette, 10).await.unwrap();
    chain.remove_session(id);

    tokio::time::sleep(Duration::from_secs(14)).await;
    assert_eq!(handle.view().await.unwrap().phase, Phase::AwaitingStart);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::Idle);
    assert!(view.session_id.is_none());
}

/// A session the ledger already settled is dropped and the balance re-read.
#[tokio::test(start_paused = true)]
async fn watchdog_on_settled_session_refreshes_balance() {
    let chain = MockChain::new().with_balance(ACCOUNT, 1_000);
    let (_runtime, handle) = start(&chain).await;
    let id = open_roulette(&handle).await;

    handle.submit(Command::Advance).await.unwrap();
    chain.complete_session(id);
    chain.set_balance(ACCOUNT, 940);

    tokio::time::sleep(Duration::from_secs(16)).await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(view.balance, Some(940));
}

/// The watchdog query finding the session live adopts its state.
#[tokio::test(start_paused = true)]
async fn watchdog_resyncs_live_session() {
    let chain = MockChain::new();
    let (_runtime, handle) = start(&chain).await;
    let id = open_roulette(&handle).await;

    handle.submit(Command::PlaceWager(RED)).await.unwrap();
    chain.set_session_state(id, roulette(&[Wager::confirmed(1, 0, 5)], None));

    tokio::time::sleep(Duration::from_secs(16)).await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::InPlay);
    assert_eq!(view.wagers, vec![Wager::confirmed(1, 0, 5)]);
}

#[tokio::test(start_paused = true)]
async fn error_signals() {
    let chain = MockChain::new();
    let (_runtime, handle) = start(&chain).await;
    let mut notices = handle.subscribe(Topic::Notice);
    let id = open_roulette(&handle).await;

    handle
        .deliver(ChainSignal::Error {
            session_id: None,
            message: "node lagging".into(),
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(handle.view().await.unwrap().session_id, Some(id));
    assert!(drain(&mut notices).into_iter().any(|event| matches!(
        event,
        Event::Notice(notice) if notice.level == NoticeLevel::Error && notice.message == "node lagging"
    )));

    handle
        .deliver(ChainSignal::Error {
            session_id: Some(id),
            message: "bet limit exceeded".into(),
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(handle.view().await.unwrap().phase, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn modifier_toggle_commits_or_reverts() {
    let chain = MockChain::new();
    let (_runtime, handle) = start(&chain).await;

    assert!(handle.toggle_modifier(Modifier::Shield).await.unwrap());
    let view = handle.view().await.unwrap();
    assert!(view.shield.enabled);
    assert!(!view.shield.tentative);

    chain.fail_next_submit(TransportError::Network("down".into()));
    assert!(handle.toggle_modifier(Modifier::Shield).await.is_err());
    let view = handle.view().await.unwrap();
    assert!(view.shield.enabled);
    assert!(!view.shield.tentative);

    let id = open_roulette(&handle).await;
    handle
        .deliver(ChainSignal::Completed {
            session_id: id,
            final_balance: 10,
            payout: 10,
            flags: CompletionFlags::SHIELD_USED,
        })
        .await
        .unwrap();
    settle().await;
    assert!(!handle.view().await.unwrap().shield.enabled);
    let ledger = handle.ledger().await.unwrap();
    assert!(ledger[0].headline.ends_with("[shield]"));
}

/// A toggle still awaiting the transport when the round settles is applied
/// once the transport confirms it.
#[tokio::test(start_paused = true)]
async fn modifier_toggle_in_flight_across_settlement() {
    let chain = MockChain::new();
    let (_runtime, handle) = start(&chain).await;
    let id = open_roulette(&handle).await;

    chain.set_submit_latency(Duration::from_secs(3));
    let toggle = tokio::spawn({
        let handle = handle.clone();
        async move { handle.toggle_modifier(Modifier::Shield).await }
    });
    settle().await;
    assert!(handle.view().await.unwrap().shield.tentative);

    handle
        .deliver(ChainSignal::Completed {
            session_id: id,
            final_balance: 10,
            payout: 10,
            flags: CompletionFlags::SHIELD_USED,
        })
        .await
        .unwrap();
    settle().await;
    assert!(handle.view().await.unwrap().shield.tentative);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(toggle.await.expect("toggle task").expect("toggle confirmed"));
    let view = handle.view().await.unwrap();
    assert!(view.shield.enabled);
    assert!(!view.shield.tentative);
}

fn craps(phase: CrapsPhase, point: u8, dice: [u8; 2], bets: Vec<CrapsBet>) -> Vec<u8> {
    CrapsState {
        phase,
        point,
        dice,
        bets,
        ..CrapsState::default()
    }
    .to_bytes()
}

fn pass(amount: u64) -> CrapsBet {
    CrapsBet {
        kind: CrapsBetKind::Pass,
        target: 0,
        status: BetStatus::On,
        amount,
        odds: 0,
    }
}

/// Only state signals answering a roll extend the history; a seven
/// starts it over.
#[tokio::test(start_paused = true)]
async fn craps_roll_history() {
    let chain = MockChain::new().with_balance(ACCOUNT, 1_000);
    let (_runtime, handle) = start(&chain).await;

    let id = handle.begin(GameType::Craps, 0).await.unwrap();
    handle
        .deliver(ChainSignal::Started {
            session_id: id,
            game_type: GameType::Craps,
            state: craps(CrapsPhase::ComeOut, 0, [0, 0], Vec::new()),
        })
        .await
        .unwrap();
    settle().await;

    let moved = |state| ChainSignal::Moved { session_id: id, state };

    handle
        .submit(Command::PlaceWager(WagerSpec::new(CrapsBetKind::Pass as u8, 0, 10)))
        .await
        .unwrap();
    handle
        .deliver(moved(craps(CrapsPhase::ComeOut, 0, [0, 0], vec![pass(10)])))
        .await
        .unwrap();
    settle().await;

    handle.submit(Command::Advance).await.unwrap();
    handle
        .deliver(moved(craps(CrapsPhase::Point, 6, [3, 3], vec![pass(10)])))
        .await
        .unwrap();
    settle().await;
    assert_eq!(handle.view().await.unwrap().roll_history, vec![6]);

    handle.submit(Command::AddOdds { amount: 20 }).await.unwrap();
    handle
        .deliver(moved(craps(CrapsPhase::Point, 6, [3, 3], vec![pass(10)])))
        .await
        .unwrap();
    settle().await;
    assert_eq!(handle.view().await.unwrap().roll_history, vec![6]);

    handle.submit(Command::Advance).await.unwrap();
    handle
        .deliver(moved(craps(CrapsPhase::ComeOut, 0, [4, 3], Vec::new())))
        .await
        .unwrap();
    settle().await;
    assert_eq!(handle.view().await.unwrap().roll_history, vec![7]);

    handle
        .deliver(ChainSignal::Completed {
            session_id: id,
            final_balance: 970,
            payout: 0,
            flags: CompletionFlags::empty(),
        })
        .await
        .unwrap();
    settle().await;
    let entry = handle.ledger().await.unwrap().remove(0);
    assert_eq!(entry.net, -30);
    assert!(entry.details.iter().any(|line| line.starts_with("Pass 10")));
}

/// A come-out seven is kept when a point follows; a roll the watchdog
/// recovers from the ledger extends the history like a pushed one.
#[tokio::test(start_paused = true)]
async fn craps_history_across_point_and_resync() {
    let chain = MockChain::new().with_balance(ACCOUNT, 1_000);
    let (_runtime, handle) = start(&chain).await;

    let id = handle.begin(GameType::Craps, 0).await.unwrap();
    handle
        .deliver(ChainSignal::Started {
            session_id: id,
            game_type: GameType::Craps,
            state: craps(CrapsPhase::ComeOut, 0, [0, 0], Vec::new()),
        })
        .await
        .unwrap();
    settle().await;

    let moved = |state| ChainSignal::Moved { session_id: id, state };

    handle.submit(Command::Advance).await.unwrap();
    handle
        .deliver(moved(craps(CrapsPhase::ComeOut, 0, [3, 4], Vec::new())))
        .await
        .unwrap();
    settle().await;
    assert_eq!(handle.view().await.unwrap().roll_history, vec![7]);

    handle
        .submit(Command::PlaceWager(WagerSpec::new(CrapsBetKind::Pass as u8, 0, 10)))
        .await
        .unwrap();
    handle
        .deliver(moved(craps(CrapsPhase::ComeOut, 0, [3, 4], vec![pass(10)])))
        .await
        .unwrap();
    settle().await;

    handle.submit(Command::Advance).await.unwrap();
    handle
        .deliver(moved(craps(CrapsPhase::Point, 5, [1, 4], vec![pass(10)])))
        .await
        .unwrap();
    settle().await;
    assert_eq!(handle.view().await.unwrap().roll_history, vec![7, 5]);

    handle.submit(Command::Advance).await.unwrap();
    chain.set_session_state(id, craps(CrapsPhase::ComeOut, 0, [2, 3], Vec::new()));
    tokio::time::sleep(Duration::from_secs(16)).await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.phase, Phase::InPlay);
    assert_eq!(view.roll_history, vec![7, 5, 5]);

    handle
        .deliver(ChainSignal::Completed {
            session_id: id,
            final_balance: 1_010,
            payout: 20,
            flags: CompletionFlags::empty(),
        })
        .await
        .unwrap();
    settle().await;
    let entry = handle.ledger().await.unwrap().remove(0);
    assert_eq!(entry.net, 10);
    assert!(entry.details.iter().any(|line| line.starts_with("Pass 10")));
}
