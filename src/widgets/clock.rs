//! Clock panel - local date and time, refreshed every second

use super::Widget;
use crate::tui::{Command, DashEvent, WidgetId};
use chrono::{DateTime, Local};
use ratatui::text::Text;
use std::time::Duration;

pub struct ClockWidget {
    id: WidgetId,
    now: DateTime<Local>,
    every: Duration,
}

impl ClockWidget {
    pub fn new(id: WidgetId, every: Duration) -> Self {
        Self {
            id,
            now: Local::now(),
            every,
        }
    }

    /// Start from a fixed instant
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }
}

impl Widget for ClockWidget {
    fn title(&self) -> &str {
        "Clock"
    }

    fn init(&self) -> Option<Command> {
        Some(Command::tick(self.id, self.every))
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        let at = event.tick_for(self.id)?;
        self.now = at;
        Some(Command::tick(self.id, self.every))
    }

    fn render(&self, _width: u16, _height: u16) -> Text<'static> {
        Text::from(self.now.format("%a %b %e %H:%M:%S %Z").to_string())
    }
}
