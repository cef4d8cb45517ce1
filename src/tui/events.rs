//! Event handling system
//!
//! Every input to the dashboard arrives as a [`DashEvent`] on one channel:
//! terminal input from the pump thread below, timer and fetch results from
//! the [`Scheduler`](super::Scheduler).

use crate::error::WidgetError;
use crate::widgets::Payload;
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Position of a widget in the dashboard's fixed display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub usize);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

/// Dashboard events
#[derive(Debug, Clone)]
pub enum DashEvent {
    /// Terminal size changed (also sent once at startup)
    Resize { width: u16, height: u16 },

    /// Key press
    Key(KeyEvent),

    /// One-shot timer requested by `widget` has fired
    Tick { widget: WidgetId, at: DateTime<Local> },

    /// Background work requested by `widget` has finished
    Fetched {
        widget: WidgetId,
        result: Result<Payload, WidgetError>,
    },
}

impl DashEvent {
    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            DashEvent::Resize { .. } => "resize",
            DashEvent::Key(_) => "key",
            DashEvent::Tick { .. } => "tick",
            DashEvent::Fetched { .. } => "fetched",
        }
    }

    /// Timestamp of a tick addressed to `id`
    pub fn tick_for(&self, id: WidgetId) -> Option<DateTime<Local>> {
        match self {
            DashEvent::Tick { widget, at } if *widget == id => Some(*at),
            _ => None,
        }
    }

    /// Result of a fetch addressed to `id`
    pub fn fetched_for(&self, id: WidgetId) -> Option<&Result<Payload, WidgetError>> {
        match self {
            DashEvent::Fetched { widget, result } if *widget == id => Some(result),
            _ => None,
        }
    }
}

/// Check if key event is a quit shortcut (q, Q, Esc, Ctrl+C)
pub fn is_quit_key(key: &KeyEvent) -> bool {
    matches!(
        (key.code, key.modifiers),
        (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), _)
            | (KeyCode::Char('Q'), _)
            | (KeyCode::Esc, _)
    )
}

/// Map a raw terminal event to a dashboard event
///
/// Only key presses and resizes matter; releases, repeats, mouse and focus
/// events are dropped.
pub fn translate(event: Event) -> Option<DashEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(DashEvent::Key(key)),
        Event::Resize(width, height) => Some(DashEvent::Resize { width, height }),
        _ => None,
    }
}

/// Spawn the terminal input pump
///
/// Polls crossterm on a dedicated thread so blocking reads never stall the
/// event loop. The thread exits once the receiving side is gone.
pub fn spawn_input_pump(tx: UnboundedSender<DashEvent>, poll_interval: Duration) -> JoinHandle<()> {
    thread::spawn(move || loop {
        if tx.is_closed() {
            debug!("Event channel closed, stopping input pump");
            return;
        }

        match event::poll(poll_interval) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("Terminal poll failed: {}", e);
                return;
            }
        }

        match event::read() {
            Ok(raw) => {
                if let Some(ev) = translate(raw) {
                    if tx.send(ev).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("Terminal read failed: {}", e);
                return;
            }
        }
    })
}
