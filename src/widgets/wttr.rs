//! wttr.in panels - current weather and moon phase
//!
//! Both panels are the same widget pointed at different endpoints:
//! `https://wttr.in/<location>?<params>`.

use super::{error_line, http, style, updated_line, Payload, RefreshState, Widget};
use crate::config::WttrConfig;
use crate::error::WidgetError;
use crate::tui::{Command, DashEvent, WidgetId};
use ratatui::text::{Line, Text};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::warn;

const WTTR_BASE: &str = "https://wttr.in/";
const DEFAULT_WEATHER_LOCATION: &str = "San Francisco";
const DEFAULT_WEATHER_PARAMS: &str = "format=3";
const DEFAULT_MOON_LOCATION: &str = "moon";
const DEFAULT_MOON_PARAMS: &str = "format=Moon:+%m";

pub struct WttrWidget {
    id: WidgetId,
    title: &'static str,
    location: String,
    params: String,
    every: Duration,
    state: RefreshState<String>,
    client: Client,
}

impl WttrWidget {
    /// Weather conditions panel
    pub fn weather(id: WidgetId, cfg: &WttrConfig, every: Duration) -> Self {
        Self::build(id, "Weather", cfg, DEFAULT_WEATHER_LOCATION, DEFAULT_WEATHER_PARAMS, every)
    }

    /// Moon phase panel
    pub fn moon(id: WidgetId, cfg: &WttrConfig, every: Duration) -> Self {
        Self::build(id, "Moon Phase", cfg, DEFAULT_MOON_LOCATION, DEFAULT_MOON_PARAMS, every)
    }

    fn build(
        id: WidgetId,
        title: &'static str,
        cfg: &WttrConfig,
        location: &str,
        params: &str,
        every: Duration,
    ) -> Self {
        Self {
            id,
            title,
            location: cfg.location.clone().unwrap_or_else(|| location.to_string()),
            params: cfg.params.clone().unwrap_or_else(|| params.to_string()),
            every,
            state: RefreshState::default(),
            client: http::client(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn fetch(&self) -> Command {
        let client = self.client.clone();
        let url = wttr_url(&self.location, &self.params);
        Command::fetch(self.id, async move {
            let body = http::get_text(&client, url?).await?;
            Ok(Payload::Text(body))
        })
    }
}

/// Endpoint URL with the location escaped as a single path segment
pub fn wttr_url(location: &str, params: &str) -> Result<Url, WidgetError> {
    let mut url = Url::parse(WTTR_BASE).map_err(|e| WidgetError::Parse(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| WidgetError::Parse("wttr.in base URL cannot take a path".to_string()))?
        .clear()
        .push(location);
    if !params.is_empty() {
        url.set_query(Some(params));
    }
    Ok(url)
}

impl Widget for WttrWidget {
    fn title(&self) -> &str {
        self.title
    }

    fn init(&self) -> Option<Command> {
        Some(self.fetch())
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        if event.tick_for(self.id).is_some() {
            return Some(self.fetch());
        }

        let result = event.fetched_for(self.id)?;
        match result {
            Ok(Payload::Text(summary)) => {
                self.state.succeed(summary.trim_end().to_string(), chrono::Local::now())
            }
            Ok(other) => self.state.fail(WidgetError::Parse(format!(
                "unexpected payload: {:?}",
                other
            ))),
            Err(e) => {
                warn!("{} refresh failed: {}", self.title, e);
                self.state.fail(e.clone());
            }
        }
        Some(Command::tick(self.id, self.every))
    }

    fn render(&self, _width: u16, _height: u16) -> Text<'static> {
        let mut lines = vec![Line::from(vec![
            style::label("Location: "),
            self.location.clone().into(),
        ])];

        if let Some(err) = self.state.error() {
            lines.push(error_line(err));
            return Text::from(lines);
        }

        match self.state.value() {
            None => lines.push(Line::styled("Loading forecast...", style::muted())),
            Some(summary) => {
                lines.extend(summary.lines().map(|l| Line::from(l.to_string())));
                if let Some(at) = self.state.updated() {
                    lines.push(updated_line(at));
                }
            }
        }
        Text::from(lines)
    }
}
