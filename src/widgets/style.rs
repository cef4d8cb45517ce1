//! Consistent color palette and small styled fragments for panel bodies

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

/// Color palette for dashboard elements
pub struct DashboardColors;

impl DashboardColors {
    /// Panel borders
    pub const BORDER: Color = Color::Cyan;

    /// Labels in key/value lines
    pub const LABEL: Color = Color::Yellow;

    /// Secondary text (timestamps, hints)
    pub const SECONDARY: Color = Color::DarkGray;

    /// Failures
    pub const ERROR: Color = Color::Red;

    /// Low usage (< 60%)
    pub const USAGE_LOW: Color = Color::Green;

    /// Medium usage (60-75%)
    pub const USAGE_MEDIUM: Color = Color::Yellow;

    /// High usage (75-90%)
    pub const USAGE_HIGH: Color = Color::LightRed;

    /// Critical usage (> 90%)
    pub const USAGE_CRITICAL: Color = Color::Red;
}

pub fn error() -> Style {
    Style::default().fg(DashboardColors::ERROR)
}

pub fn muted() -> Style {
    Style::default()
        .fg(DashboardColors::SECONDARY)
        .add_modifier(Modifier::ITALIC)
}

pub fn label(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(DashboardColors::LABEL))
}

/// Color for a usage percentage (green → yellow → red zones)
pub fn usage_color(percent: f64) -> Color {
    if percent < 60.0 {
        DashboardColors::USAGE_LOW
    } else if percent < 75.0 {
        DashboardColors::USAGE_MEDIUM
    } else if percent < 90.0 {
        DashboardColors::USAGE_HIGH
    } else {
        DashboardColors::USAGE_CRITICAL
    }
}

/// Text gauge of `width` cells, filled proportionally to `percent`
pub fn usage_bar(percent: f64, width: u16) -> Span<'static> {
    let percent = percent.clamp(0.0, 100.0);
    let width = usize::from(width);
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(width - filled.min(width)));
    Span::styled(bar, Style::default().fg(usage_color(percent)))
}
