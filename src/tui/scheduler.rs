//! Scheduler - executes widget commands off the event loop
//!
//! Each command becomes an independent tokio task that sends exactly one
//! [`DashEvent`] back. Outstanding tasks are never cancelled; a late result is
//! delivered like any other.

use super::command::Command;
use super::events::{DashEvent, WidgetId};
use crate::error::WidgetError;
use crate::widgets::Payload;
use chrono::Local;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Upper bound on a single network fetch
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Neutral executor for [`Command`] values
#[derive(Debug, Clone)]
pub struct Scheduler {
    tx: UnboundedSender<DashEvent>,
    timeout: Duration,
}

impl Scheduler {
    /// Create a scheduler posting into `tx`
    pub fn new(tx: UnboundedSender<DashEvent>) -> Self {
        Self {
            tx,
            timeout: COMMAND_TIMEOUT,
        }
    }

    /// Create a scheduler together with the event receiver it feeds
    pub fn channel() -> (Self, UnboundedReceiver<DashEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Override the fetch timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sender for other event producers (terminal input)
    pub fn sender(&self) -> UnboundedSender<DashEvent> {
        self.tx.clone()
    }

    /// Execute a batch of commands
    pub fn spawn_all<I>(&self, commands: I)
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            self.spawn(command);
        }
    }

    /// Execute one command as an independent task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, command: Command) -> JoinHandle<()> {
        trace!("Spawning {} command for {}", command.kind(), command.widget());
        let tx = self.tx.clone();

        match command {
            Command::Tick { widget, after } => tokio::spawn(async move {
                tokio::time::sleep(after).await;
                post(
                    &tx,
                    DashEvent::Tick {
                        widget,
                        at: Local::now(),
                    },
                );
            }),
            Command::Fetch { widget, future } => {
                let timeout = self.timeout;
                tokio::spawn(async move {
                    let result = match tokio::time::timeout(timeout, future).await {
                        Ok(result) => result,
                        Err(elapsed) => Err(WidgetError::from(elapsed)),
                    };
                    post_result(&tx, widget, result);
                })
            }
            Command::Blocking { widget, job } => tokio::spawn(async move {
                let result = match tokio::task::spawn_blocking(job).await {
                    Ok(result) => result,
                    Err(join) => Err(WidgetError::Io(join.to_string())),
                };
                post_result(&tx, widget, result);
            }),
        }
    }
}

fn post_result(tx: &UnboundedSender<DashEvent>, widget: WidgetId, result: Result<Payload, WidgetError>) {
    if let Err(e) = &result {
        debug!("Command for {} failed: {}", widget, e);
    }
    post(tx, DashEvent::Fetched { widget, result });
}

fn post(tx: &UnboundedSender<DashEvent>, event: DashEvent) {
    if tx.send(event).is_err() {
        debug!("Event loop gone, dropping event");
    }
}
