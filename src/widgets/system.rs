//! System panel - CPU, memory and root filesystem usage
//!
//! Samples come from `/proc/stat`, `/proc/meminfo` and `statvfs("/")` on the
//! blocking pool. CPU load is the busy share of the jiffies elapsed since the
//! previous sample (since boot for the very first one).

use super::{error_line, style, updated_line, Payload, RefreshState, Widget};
use crate::error::WidgetError;
use crate::tui::{Command, DashEvent, WidgetId};
use ratatui::text::{Line, Text};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Aggregate CPU jiffies from `/proc/stat`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub busy: u64,
    pub total: u64,
}

impl CpuTimes {
    /// Busy percentage between `prev` and `self`
    pub fn usage_since(&self, prev: Option<&CpuTimes>) -> f64 {
        let (busy, total) = match prev {
            Some(p) if self.total > p.total => (
                self.busy.saturating_sub(p.busy),
                self.total - p.total,
            ),
            _ => (self.busy, self.total),
        };
        if total == 0 {
            return 0.0;
        }
        (busy as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// One raw resource sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemSample {
    pub cpu: CpuTimes,
    pub mem_used: u64,
    pub mem_total: u64,
    pub disk_used: u64,
    pub disk_total: u64,
}

/// Values shown in the panel
#[derive(Debug, Clone, Copy, PartialEq)]
struct Usage {
    cpu_percent: f64,
    sample: SystemSample,
}

pub struct SystemWidget {
    id: WidgetId,
    every: Duration,
    state: RefreshState<Usage>,
    last_cpu: Option<CpuTimes>,
}

impl SystemWidget {
    pub fn new(id: WidgetId, every: Duration) -> Self {
        Self {
            id,
            every,
            state: RefreshState::default(),
            last_cpu: None,
        }
    }

    fn sample(&self) -> Command {
        Command::blocking(self.id, || sample_system().map(Payload::System))
    }
}

impl Widget for SystemWidget {
    fn title(&self) -> &str {
        "System"
    }

    fn init(&self) -> Option<Command> {
        Some(self.sample())
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        if event.tick_for(self.id).is_some() {
            return Some(self.sample());
        }

        match event.fetched_for(self.id)? {
            Ok(Payload::System(sample)) => {
                let cpu_percent = sample.cpu.usage_since(self.last_cpu.as_ref());
                self.last_cpu = Some(sample.cpu);
                self.state.succeed(
                    Usage {
                        cpu_percent,
                        sample: *sample,
                    },
                    chrono::Local::now(),
                );
            }
            Ok(other) => self.state.fail(WidgetError::Parse(format!(
                "unexpected payload: {:?}",
                other
            ))),
            Err(e) => {
                warn!("System sample failed: {}", e);
                self.state.fail(e.clone());
            }
        }
        Some(Command::tick(self.id, self.every))
    }

    fn render(&self, width: u16, _height: u16) -> Text<'static> {
        if let Some(err) = self.state.error() {
            return Text::from(error_line(err));
        }
        let Some(usage) = self.state.value() else {
            return Text::from(Line::styled("Collecting metrics...", style::muted()));
        };

        let s = &usage.sample;
        let bar_width = width.saturating_sub(30).min(20);
        let mut lines = vec![
            gauge_line(
                format!("CPU Load: {:0.1}%", usage.cpu_percent),
                usage.cpu_percent,
                bar_width,
            ),
            gauge_line(
                format!("Memory: {:0.1} / {:0.1} GiB", gib(s.mem_used), gib(s.mem_total)),
                percent(s.mem_used, s.mem_total),
                bar_width,
            ),
            gauge_line(
                format!("Disk: {:0.1} / {:0.1} GiB", gib(s.disk_used), gib(s.disk_total)),
                percent(s.disk_used, s.disk_total),
                bar_width,
            ),
        ];
        if let Some(at) = self.state.updated() {
            lines.push(updated_line(at));
        }
        Text::from(lines)
    }
}

fn gauge_line(label: String, percent: f64, bar_width: u16) -> Line<'static> {
    if bar_width == 0 {
        return Line::from(label);
    }
    let padded = format!("{:<28}", label);
    Line::from(vec![padded.into(), style::usage_bar(percent, bar_width)])
}

fn gib(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

/// Parse the aggregate `cpu` line of `/proc/stat`
///
/// Busy time is everything except idle and iowait.
pub fn parse_proc_stat(raw: &str) -> Result<CpuTimes, WidgetError> {
    let line = raw
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| WidgetError::Parse("missing aggregate cpu line".to_string()))?;

    let fields = line
        .split_whitespace()
        .skip(1)
        .map(|v| {
            v.parse::<u64>()
                .map_err(|e| WidgetError::Parse(format!("invalid cpu counter {v:?}: {e}")))
        })
        .collect::<Result<Vec<u64>, _>>()?;

    if fields.len() < 4 {
        return Err(WidgetError::Parse(format!(
            "cpu line has {} fields, expected at least 4",
            fields.len()
        )));
    }

    // user nice system idle iowait irq softirq steal ...
    let total: u64 = fields.iter().take(8).sum();
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Ok(CpuTimes {
        busy: total.saturating_sub(idle),
        total,
    })
}

/// Parse `/proc/meminfo` into (used, total) bytes
pub fn parse_meminfo(raw: &str) -> Result<(u64, u64), WidgetError> {
    let mut values = HashMap::<&str, u64>::new();

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((key, rest)) = line.split_once(':') else {
            return Err(WidgetError::Parse(format!(
                "invalid meminfo line (missing ':'): {line}"
            )));
        };
        let mut parts = rest.split_whitespace();
        let Some(value_raw) = parts.next() else {
            continue;
        };
        let value = value_raw.parse::<u64>().map_err(|err| {
            WidgetError::Parse(format!("invalid meminfo value in line {line:?}: {err}"))
        })?;
        let bytes = match parts.next() {
            None => value,
            Some("kB") => value.saturating_mul(1024),
            Some(unit) => {
                return Err(WidgetError::Parse(format!(
                    "unsupported meminfo unit in line {line:?}: {unit}"
                )));
            }
        };
        values.insert(key.trim(), bytes);
    }

    let required = |key: &str| {
        values
            .get(key)
            .copied()
            .ok_or_else(|| WidgetError::Parse(format!("missing required meminfo field: {key}")))
    };

    let total = required("MemTotal")?;
    let available = required("MemAvailable")?;
    Ok((total.saturating_sub(available), total))
}

#[cfg(target_os = "linux")]
fn sample_system() -> Result<SystemSample, WidgetError> {
    let cpu = parse_proc_stat(&std::fs::read_to_string("/proc/stat")?)?;
    let (mem_used, mem_total) = parse_meminfo(&std::fs::read_to_string("/proc/meminfo")?)?;

    let stat = nix::sys::statvfs::statvfs("/")?;
    #[allow(clippy::unnecessary_cast)]
    let fragment = stat.fragment_size() as u64;
    #[allow(clippy::unnecessary_cast)]
    let disk_total = (stat.blocks() as u64).saturating_mul(fragment);
    #[allow(clippy::unnecessary_cast)]
    let disk_free = (stat.blocks_free() as u64).saturating_mul(fragment);

    Ok(SystemSample {
        cpu,
        mem_used,
        mem_total,
        disk_used: disk_total.saturating_sub(disk_free),
        disk_total,
    })
}

#[cfg(not(target_os = "linux"))]
fn sample_system() -> Result<SystemSample, WidgetError> {
    Err(WidgetError::Io(
        "system metrics are only collected on Linux".to_string(),
    ))
}
