//! Event loop driving the dashboard
//!
//! One iteration: wait for an event, drain whatever else is already queued,
//! feed the batch to the dashboard in arrival order, hand the resulting
//! commands to the scheduler and draw exactly one frame.

use super::dashboard::{Dashboard, Flow};
use super::events::DashEvent;
use super::scheduler::Scheduler;
use crate::error::{DashError, Result};
use ratatui::{backend::Backend, Terminal};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, trace};

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// A quit key was pressed
    Quit,
    /// Every event sender is gone
    Closed,
}

/// Run the dashboard until quit
///
/// Startup commands are scheduled first, then the current terminal size is
/// fed in as the initial resize so the first frame is already laid out.
pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
    scheduler: &Scheduler,
    rx: &mut UnboundedReceiver<DashEvent>,
) -> Result<LoopExit> {
    scheduler.spawn_all(dashboard.init());

    let size = terminal.size().map_err(DashError::Terminal)?;
    let mut batch = vec![DashEvent::Resize {
        width: size.width,
        height: size.height,
    }];

    loop {
        while let Ok(event) = rx.try_recv() {
            batch.push(event);
        }

        trace!("Processing batch of {} events", batch.len());
        for event in batch.drain(..) {
            match dashboard.update(&event) {
                Flow::Quit => {
                    debug!("Quit requested, leaving event loop");
                    return Ok(LoopExit::Quit);
                }
                Flow::Continue(commands) => scheduler.spawn_all(commands),
            }
        }

        terminal
            .draw(|frame| frame.render_widget(&*dashboard, frame.area()))
            .map_err(DashError::Terminal)?;

        match rx.recv().await {
            Some(event) => batch.push(event),
            None => {
                debug!("Event channel closed");
                return Ok(LoopExit::Closed);
            }
        }
    }
}
