//! Text Viewer panel - head of a plain text file

use super::{error_line, style, Payload, RefreshState, Widget};
use crate::error::WidgetError;
use crate::tui::{Command, DashEvent, WidgetId};
use ratatui::text::{Line, Text};
use std::path::PathBuf;
use tracing::warn;

pub const MAX_LINES: usize = 100;
pub const TRUNCATED_MARKER: &str = "... (truncated)";

/// Keep the first `max` lines, marking the cut
pub fn head(content: &str, max: usize) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() <= max {
        return content.to_string();
    }
    let mut kept = lines[..max].join("\n");
    kept.push('\n');
    kept.push_str(TRUNCATED_MARKER);
    kept
}

pub struct TextViewerWidget {
    id: WidgetId,
    path: PathBuf,
    state: RefreshState<String>,
}

impl TextViewerWidget {
    pub fn new(id: WidgetId, path: PathBuf) -> Self {
        Self {
            id,
            path,
            state: RefreshState::default(),
        }
    }
}

impl Widget for TextViewerWidget {
    fn title(&self) -> &str {
        "Text Viewer"
    }

    fn init(&self) -> Option<Command> {
        let path = self.path.clone();
        Some(Command::blocking(self.id, move || {
            let content = std::fs::read_to_string(&path)?;
            Ok(Payload::Text(head(&content, MAX_LINES)))
        }))
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        match event.fetched_for(self.id)? {
            Ok(Payload::Text(content)) => self.state.succeed(content.clone(), chrono::Local::now()),
            Ok(other) => self.state.fail(WidgetError::Parse(format!(
                "unexpected payload: {:?}",
                other
            ))),
            Err(e) => {
                warn!("Reading {} failed: {}", self.path.display(), e);
                self.state.fail(e.clone());
            }
        }
        None
    }

    fn render(&self, _width: u16, _height: u16) -> Text<'static> {
        if let Some(err) = self.state.error() {
            return Text::from(error_line(err));
        }
        match self.state.value() {
            None => Text::from(Line::styled("Loading...", style::muted())),
            Some(content) => Text::from(
                content
                    .lines()
                    .map(|l| Line::from(l.to_string()))
                    .collect::<Vec<_>>(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_head_keeps_short_files() {
        assert_eq!(head("a\nb\nc", 100), "a\nb\nc");
    }

    #[test]
    fn test_head_truncates() {
        let content = (1..=150).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let kept = head(&content, MAX_LINES);
        let lines: Vec<&str> = kept.lines().collect();
        assert_eq!(lines.len(), 101);
        assert_eq!(lines[99], "100");
        assert_eq!(lines[100], TRUNCATED_MARKER);
    }

    #[test]
    fn test_load_and_render() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first\nsecond").unwrap();

        let mut w = TextViewerWidget::new(WidgetId(9), file.path().to_path_buf());
        assert_eq!(w.render(30, 5).to_string(), "Loading...");

        let Some(Command::Blocking { job, .. }) = w.init() else {
            panic!("expected blocking read");
        };
        w.update(&DashEvent::Fetched {
            widget: WidgetId(9),
            result: job(),
        });
        assert_eq!(w.render(30, 5).to_string(), "first\nsecond");
    }

    #[test]
    fn test_missing_file() {
        let mut w = TextViewerWidget::new(WidgetId(9), PathBuf::from("/no/such/file.txt"));
        let Some(Command::Blocking { job, .. }) = w.init() else {
            panic!("expected blocking read");
        };
        w.update(&DashEvent::Fetched {
            widget: WidgetId(9),
            result: job(),
        });
        assert!(w.render(30, 5).to_string().starts_with("Error: "));
    }
}
