//! Terminal frontend that plays a script against the runtime.

use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use console::style;
use tokio::sync::broadcast;

use client_blockchain_core::{AccountId, ChainSignal, MockChain, TransportError};
use client_frontend_core::format::{format_amount, modifier_title};
use client_frontend_core::{
    EventConsumer, Frontend, FrontendConfig, TableEventConsumer, TableViewModel,
    ViewModelUpdater,
};
use runtime::{Event, RuntimeHandle, SessionView, Topic};

use super::script::{ScriptLine, Step};
use crate::utils::{parse_hex, print_frame, print_message};

/// Time granted to the worker and the in-memory chain after each step.
const SETTLE: Duration = Duration::from_millis(20);

pub struct ReplayFrontend {
    script: Vec<ScriptLine>,
    chain: MockChain,
    account: AccountId,
    config: FrontendConfig,
    consumer: TableEventConsumer,
    /// Print the table after every step, not just on `frame`.
    frames: bool,
    printed: u64,
}

impl ReplayFrontend {
    pub fn new(
        script: Vec<ScriptLine>,
        chain: MockChain,
        account: AccountId,
        config: FrontendConfig,
        frames: bool,
    ) -> Self {
        Self {
            script,
            chain,
            account,
            consumer: TableEventConsumer::new(config.messages.clone()),
            config,
            frames,
            printed: 0,
        }
    }

    async fn apply(&self, handle: &RuntimeHandle, step: &Step) -> Result<()> {
        match step {
            Step::Begin { game, stake, plan } => {
                let session_id = match plan {
                    Some(steps) => handle.begin_with_plan(*game, *stake, steps.clone()).await?,
                    None => handle.begin(*game, *stake).await?,
                };
                println!("  {} {session_id}", style("session").dim());
            }
            Step::Submit { commands } => {
                let handles = handle.submit_batch(commands.clone()).await?;
                println!("  {} {}", style("accepted").dim(), handles.len());
            }
            Step::Toggle { modifier } => {
                let enabled = handle.toggle_modifier(*modifier).await?;
                let state = if enabled { "on" } else { "off" };
                println!("  {} {state}", modifier_title(*modifier));
            }
            Step::Abandon => {
                let session_id = handle.abandon().await?;
                println!("  {} {session_id}", style("abandoned").dim());
            }
            Step::Refresh => {
                let balance = handle.refresh_balance().await?;
                println!("  {} {}", style("balance").dim(), format_amount(balance));
            }
            Step::Started { state } => {
                let view = handle.view().await?;
                let (Some(session_id), Some(game_type)) = (view.session_id, view.game_type)
                else {
                    bail!("no session is open");
                };
                handle
                    .deliver(ChainSignal::Started {
                        session_id,
                        game_type,
                        state: parse_hex(state)?,
                    })
                    .await?;
            }
            Step::Moved { state } => {
                let session_id = open_session(handle).await?;
                handle
                    .deliver(ChainSignal::Moved {
                        session_id,
                        state: parse_hex(state)?,
                    })
                    .await?;
            }
            Step::Completed {
                final_balance,
                payout,
                flags,
            } => {
                let session_id = open_session(handle).await?;
                self.chain.set_balance(self.account, *final_balance);
                handle
                    .deliver(ChainSignal::Completed {
                        session_id,
                        final_balance: *final_balance,
                        payout: *payout,
                        flags: *flags,
                    })
                    .await?;
            }
            Step::Error { message, detached } => {
                let session_id = if *detached {
                    None
                } else {
                    Some(open_session(handle).await?)
                };
                handle
                    .deliver(ChainSignal::Error {
                        session_id,
                        message: message.clone(),
                    })
                    .await?;
            }
            Step::Balance { amount } => self.chain.set_balance(self.account, *amount),
            Step::FailNextSubmit { reason } => self
                .chain
                .fail_next_submit(TransportError::Rejected(reason.clone())),
            Step::FailNextQuery { reason } => self
                .chain
                .fail_next_query(TransportError::Network(reason.clone())),
            Step::Wait { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
            Step::Frame => {}
        }
        Ok(())
    }

    /// Lets the worker catch up, then feeds every pending event through the
    /// consumer and view model.
    async fn pump(
        &mut self,
        handle: &RuntimeHandle,
        receivers: &mut [broadcast::Receiver<Event>],
        model: &mut TableViewModel,
    ) -> Result<SessionView> {
        tokio::time::sleep(SETTLE).await;
        let view = handle.view().await?;

        for rx in receivers.iter_mut() {
            loop {
                match rx.try_recv() {
                    Ok(event) => {
                        self.consumer.on_event(&event);
                        ViewModelUpdater::update(model, &event, &view);
                    }
                    Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "replay fell behind the event bus");
                    }
                    Err(_) => break,
                }
            }
        }

        let limit = self.config.table.message_limit;
        model.refresh_session_net(self.consumer.session_net());
        model.refresh_messages(self.consumer.message_log(), limit);
        self.print_new_messages();
        Ok(view)
    }

    fn print_new_messages(&mut self) {
        let log = self.consumer.message_log();
        let fresh = usize::try_from(log.pushed() - self.printed).unwrap_or(usize::MAX);
        let mut entries: Vec<_> = log.recent(fresh).collect();
        entries.reverse();
        for entry in entries {
            print_message(entry);
        }
        self.printed = log.pushed();
    }
}

async fn open_session(handle: &RuntimeHandle) -> Result<casino_core::SessionId> {
    match handle.view().await?.session_id {
        Some(session_id) => Ok(session_id),
        None => bail!("no session is open"),
    }
}

#[async_trait]
impl Frontend for ReplayFrontend {
    async fn run(&mut self, handle: RuntimeHandle) -> Result<()> {
        let mut receivers: Vec<_> = Topic::ALL
            .iter()
            .map(|topic| handle.subscribe(*topic))
            .collect();
        let view = handle.view().await?;
        let limit = self.config.table.message_limit;
        let mut model = TableViewModel::from_view(&view, self.consumer.message_log(), limit);
        self.pump(&handle, &mut receivers, &mut model).await?;

        let script = std::mem::take(&mut self.script);
        for line in &script {
            println!(
                "{} {}",
                style(format!("[{:>3}]", line.number)).dim(),
                style(line.step.name()).bold()
            );
            if let Err(error) = self.apply(&handle, &line.step).await {
                println!("  {} {error:#}", style("error:").red().bold());
            }
            self.pump(&handle, &mut receivers, &mut model).await?;

            if self.frames || line.step == Step::Frame {
                println!();
                print_frame(&model);
                println!();
            }
        }

        println!();
        print_frame(&model);
        Ok(())
    }
}
