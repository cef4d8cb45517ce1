//! Commands - deferred work returned by widgets
//!
//! Widgets never touch the runtime. They describe what should happen next as
//! a [`Command`] value and the [`Scheduler`](super::Scheduler) turns it into a
//! task that eventually posts exactly one event back to the loop.

use super::events::WidgetId;
use crate::error::WidgetError;
use crate::widgets::Payload;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Future resolving to a widget payload
pub type FetchFuture = BoxFuture<'static, Result<Payload, WidgetError>>;

/// Blocking closure producing a widget payload
pub type BlockingJob = Box<dyn FnOnce() -> Result<Payload, WidgetError> + Send + 'static>;

/// A unit of deferred work owned by one widget
pub enum Command {
    /// Fire a one-shot tick for `widget` after `after`
    Tick { widget: WidgetId, after: Duration },

    /// Run async I/O; bounded by the scheduler's command timeout
    Fetch { widget: WidgetId, future: FetchFuture },

    /// Run blocking work (file reads, OS counters) off the event loop
    Blocking { widget: WidgetId, job: BlockingJob },
}

impl Command {
    /// Schedule a tick for `widget` at least `after` from now.
    ///
    /// Timers never repeat: a widget that wants periodic refresh issues a new
    /// tick every time it handles one.
    pub fn tick(widget: WidgetId, after: Duration) -> Self {
        Command::Tick { widget, after }
    }

    /// Wrap an async fetch
    pub fn fetch<F>(widget: WidgetId, future: F) -> Self
    where
        F: Future<Output = Result<Payload, WidgetError>> + Send + 'static,
    {
        Command::Fetch {
            widget,
            future: future.boxed(),
        }
    }

    /// Wrap a blocking job
    pub fn blocking<F>(widget: WidgetId, job: F) -> Self
    where
        F: FnOnce() -> Result<Payload, WidgetError> + Send + 'static,
    {
        Command::Blocking {
            widget,
            job: Box::new(job),
        }
    }

    /// Widget that will receive the resulting event
    pub fn widget(&self) -> WidgetId {
        match self {
            Command::Tick { widget, .. }
            | Command::Fetch { widget, .. }
            | Command::Blocking { widget, .. } => *widget,
        }
    }

    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Tick { .. } => "tick",
            Command::Fetch { .. } => "fetch",
            Command::Blocking { .. } => "blocking",
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Tick { widget, after } => f
                .debug_struct("Tick")
                .field("widget", widget)
                .field("after", after)
                .finish(),
            Command::Fetch { widget, .. } => {
                f.debug_struct("Fetch").field("widget", widget).finish_non_exhaustive()
            }
            Command::Blocking { widget, .. } => {
                f.debug_struct("Blocking").field("widget", widget).finish_non_exhaustive()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_command() {
        let cmd = Command::tick(WidgetId(3), Duration::from_secs(5));
        assert_eq!(cmd.widget(), WidgetId(3));
        assert_eq!(cmd.kind(), "tick");
        assert!(matches!(
            cmd,
            Command::Tick { after, .. } if after == Duration::from_secs(5)
        ));
    }

    #[test]
    fn test_fetch_and_blocking_tags() {
        let fetch = Command::fetch(WidgetId(1), async { Ok(Payload::Text("ok".to_string())) });
        assert_eq!(fetch.kind(), "fetch");
        assert_eq!(fetch.widget(), WidgetId(1));

        let blocking = Command::blocking(WidgetId(2), || Ok(Payload::Text("ok".to_string())));
        assert_eq!(blocking.kind(), "blocking");
        assert!(format!("{:?}", blocking).contains("Blocking"));
    }
}
