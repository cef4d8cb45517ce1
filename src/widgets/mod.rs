//! Dashboard widgets
//!
//! Every panel implements [`Widget`]. The dashboard owns widgets as
//! `Box<dyn Widget>` in a fixed order and drives them uniformly:
//! - `init` once at startup,
//! - `update` for every event (widgets ignore what is not theirs),
//! - `render` whenever a frame is drawn.
//!
//! Widgets never block and never spawn. Network, file and OS work is handed
//! back as a [`Command`] and its outcome returns later as an event.

pub mod calendar;
pub mod clock;
pub mod github;
pub mod gitlab;
pub mod http;
pub mod ip;
pub mod markdown;
pub mod profile;
pub mod smart;
pub mod style;
pub mod system;
pub mod text_viewer;
pub mod wttr;

pub use calendar::CalendarWidget;
pub use clock::ClockWidget;
pub use github::{GitHubUser, GitHubWidget};
pub use gitlab::{GitLabUser, GitLabWidget};
pub use ip::IpWidget;
pub use markdown::MarkdownWidget;
pub use profile::RepoStats;
pub use smart::{SmartReport, SmartWidget};
pub use system::{SystemSample, SystemWidget};
pub use text_viewer::TextViewerWidget;
pub use wttr::WttrWidget;

use crate::config::{DashboardConfig, RefreshIntervals};
use crate::error::WidgetError;
use crate::tui::{Command, DashEvent, WidgetId};
use chrono::{DateTime, Local};
use ratatui::text::{Line, Text};

/// The contract every dashboard panel implements
pub trait Widget: Send {
    /// Stable title; also the key for height-unit overrides
    fn title(&self) -> &str;

    /// Work to start when the dashboard comes up
    fn init(&self) -> Option<Command>;

    /// React to an event; unrelated events leave the widget untouched
    fn update(&mut self, event: &DashEvent) -> Option<Command>;

    /// Body text for a `width` x `height` box. Pure: no I/O, no mutation.
    fn render(&self, width: u16, height: u16) -> Text<'static>;
}

/// Data delivered back to widgets by completed commands
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Plain text body (wttr.in responses, documents)
    Text(String),
    /// Informational message shown instead of data
    Notice(String),
    System(SystemSample),
    /// Formatted `iface: address` lines
    Addresses(Vec<String>),
    GitHub(GitHubUser),
    GitLab(GitLabUser),
    /// Per-repository counters, in configured order
    Repos(Vec<RepoStats>),
    Smart(SmartReport),
}

/// Last outcome of a widget's periodic refresh
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshState<T> {
    value: Option<T>,
    error: Option<WidgetError>,
    updated: Option<DateTime<Local>>,
}

impl<T> Default for RefreshState<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            updated: None,
        }
    }
}

impl<T> RefreshState<T> {
    /// Record a successful refresh; clears any previous error
    pub fn succeed(&mut self, value: T, at: DateTime<Local>) {
        self.value = Some(value);
        self.error = None;
        self.updated = Some(at);
    }

    /// Record a failed refresh; the last good value is kept
    pub fn fail(&mut self, error: WidgetError) {
        self.error = Some(error);
    }

    /// Most recent successful value
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Error from the latest attempt, if it failed
    pub fn error(&self) -> Option<&WidgetError> {
        self.error.as_ref()
    }

    /// Time of the last success
    pub fn updated(&self) -> Option<DateTime<Local>> {
        self.updated
    }
}

/// One-line error body
pub fn error_line(err: &WidgetError) -> Line<'static> {
    Line::styled(format!("Error: {}", err), style::error())
}

/// Dimmed `Updated HH:MM:SS` footer
pub fn updated_line(at: DateTime<Local>) -> Line<'static> {
    Line::styled(format!("Updated {}", at.format("%H:%M:%S")), style::muted())
}

/// Build the standard panel set in display order.
///
/// Order is fixed: Clock, Weather, Moon Phase, System, IP Info, Markdown,
/// GitHub, GitLab, then the optional Calendar, SMART Status and Text Viewer
/// panels.
pub fn default_widgets(cfg: &DashboardConfig) -> Vec<Box<dyn Widget>> {
    let refresh = &cfg.refresh;
    let mut widgets: Vec<Box<dyn Widget>> = Vec::new();

    // ids follow push order
    let mut id = 0usize;
    let mut take = || {
        let current = WidgetId(id);
        id += 1;
        current
    };

    widgets.push(Box::new(ClockWidget::new(
        take(),
        RefreshIntervals::every(refresh.clock),
    )));
    widgets.push(Box::new(WttrWidget::weather(
        take(),
        &cfg.weather,
        RefreshIntervals::every(refresh.weather),
    )));
    widgets.push(Box::new(WttrWidget::moon(
        take(),
        &cfg.moon,
        RefreshIntervals::every(refresh.weather),
    )));
    widgets.push(Box::new(SystemWidget::new(
        take(),
        RefreshIntervals::every(refresh.system),
    )));
    widgets.push(Box::new(IpWidget::new(
        take(),
        RefreshIntervals::every(refresh.ip),
    )));
    widgets.push(Box::new(MarkdownWidget::new(take(), &cfg.markdown)));
    widgets.push(Box::new(GitHubWidget::new(
        take(),
        &cfg.github,
        RefreshIntervals::every(refresh.github),
    )));
    widgets.push(Box::new(GitLabWidget::new(
        take(),
        &cfg.gitlab,
        RefreshIntervals::every(refresh.gitlab),
    )));

    if cfg.extras.calendar {
        widgets.push(Box::new(CalendarWidget::new(
            take(),
            RefreshIntervals::every(refresh.calendar),
        )));
    }
    if cfg.extras.smart {
        widgets.push(Box::new(SmartWidget::new(
            take(),
            RefreshIntervals::every(refresh.smart),
        )));
    }
    if let Some(path) = &cfg.extras.text_file {
        widgets.push(Box::new(TextViewerWidget::new(take(), path.clone())));
    }

    widgets
}
