//! SMART Status panel - root filesystem usage and drives visible to smartctl
//!
//! Both probes are external programs, so the whole sample runs as a blocking
//! command. `smartctl` is optional: without it the panel shows an install hint.

use super::{style, updated_line, Payload, RefreshState, Widget};
use crate::error::WidgetError;
use crate::tui::{Command, DashEvent, WidgetId};
use ratatui::text::{Line, Text};
use std::process;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of one disk probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartReport {
    /// `df` header and data line, first five columns each
    pub disk: Vec<String>,
    /// Device paths from `smartctl --scan`; `None` when smartctl is unavailable
    pub drives: Option<Vec<String>>,
}

/// Reduce `df -h /` output to its header and first data row
pub fn df_summary(output: &str) -> Vec<String> {
    let mut rows = output.lines().filter(|l| !l.trim().is_empty());
    let (Some(header), Some(data)) = (rows.next(), rows.next()) else {
        return Vec::new();
    };

    [header, data]
        .iter()
        .map(|row| row.split_whitespace().collect::<Vec<_>>())
        .filter(|fields| fields.len() >= 5)
        .map(|fields| fields[..5].join(" "))
        .collect()
}

/// Device names from `smartctl --scan` (first field of each line)
pub fn scanned_drives(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

fn run(program: &str, args: &[&str]) -> std::io::Result<process::Output> {
    process::Command::new(program).args(args).output()
}

/// Run `df` and `smartctl`; only a failing `df` is an error
pub fn probe_disks() -> Result<SmartReport, WidgetError> {
    let os = std::env::consts::OS;
    if os != "linux" && os != "macos" {
        return Err(WidgetError::Io(format!(
            "SMART monitoring not supported on {os}"
        )));
    }

    let df = run("df", &["-h", "/"])?;
    if !df.status.success() {
        return Err(WidgetError::Io(format!(
            "df exited with {}: {}",
            df.status,
            String::from_utf8_lossy(&df.stderr).trim()
        )));
    }
    let disk = df_summary(&String::from_utf8_lossy(&df.stdout));

    let drives = match run("smartctl", &["--scan"]) {
        Ok(out) if out.status.success() && !out.stdout.is_empty() => {
            Some(scanned_drives(&String::from_utf8_lossy(&out.stdout)))
        }
        Ok(out) => {
            debug!("smartctl --scan exited with {}", out.status);
            None
        }
        Err(e) => {
            debug!("smartctl unavailable: {}", e);
            None
        }
    };

    Ok(SmartReport { disk, drives })
}

pub struct SmartWidget {
    id: WidgetId,
    every: Duration,
    state: RefreshState<SmartReport>,
}

impl SmartWidget {
    pub fn new(id: WidgetId, every: Duration) -> Self {
        Self {
            id,
            every,
            state: RefreshState::default(),
        }
    }

    fn sample(&self) -> Command {
        Command::blocking(self.id, || probe_disks().map(Payload::Smart))
    }
}

impl Widget for SmartWidget {
    fn title(&self) -> &str {
        "SMART Status"
    }

    fn init(&self) -> Option<Command> {
        Some(self.sample())
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        if event.tick_for(self.id).is_some() {
            return Some(self.sample());
        }

        match event.fetched_for(self.id)? {
            Ok(Payload::Smart(report)) => self.state.succeed(report.clone(), chrono::Local::now()),
            Ok(other) => self.state.fail(WidgetError::Parse(format!(
                "unexpected payload: {:?}",
                other
            ))),
            Err(e) => {
                warn!("Disk probe failed: {}", e);
                self.state.fail(e.clone());
            }
        }
        Some(Command::tick(self.id, self.every))
    }

    fn render(&self, _width: u16, _height: u16) -> Text<'static> {
        if let Some(err) = self.state.error() {
            return Text::from(vec![
                Line::styled(format!("Error: {}", err), style::error()),
                Line::default(),
                Line::styled("Note: SMART data requires", style::muted()),
                Line::styled("smartmontools and root access", style::muted()),
            ]);
        }

        let Some(report) = self.state.value() else {
            return Text::from(Line::styled("Loading SMART data...", style::muted()));
        };

        let mut lines = vec![Line::from(style::label("Disk Status:"))];
        if !report.disk.is_empty() {
            lines.push(Line::default());
            lines.extend(report.disk.iter().map(|row| Line::from(row.clone())));
        }

        lines.push(Line::default());
        match &report.drives {
            Some(drives) => {
                lines.push(Line::from(style::label("Detected drives:")));
                lines.extend(drives.iter().map(|d| Line::from(format!("  {d}"))));
            }
            None => {
                lines.push(Line::styled("Install smartmontools", style::muted()));
                lines.push(Line::styled("for detailed SMART data", style::muted()));
            }
        }

        if let Some(at) = self.state.updated() {
            lines.push(updated_line(at));
        }
        Text::from(lines)
    }
}
