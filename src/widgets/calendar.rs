//! Calendar panel - current month grid with today in brackets

use super::{style, Widget};
use crate::tui::{Command, DashEvent, WidgetId};
use chrono::{Datelike, Local, NaiveDate};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Text};
use std::time::Duration;

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

pub struct CalendarWidget {
    id: WidgetId,
    every: Duration,
    today: NaiveDate,
}

impl CalendarWidget {
    pub fn new(id: WidgetId, every: Duration) -> Self {
        Self {
            id,
            every,
            today: Local::now().date_naive(),
        }
    }

    pub fn on(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Month grid for `today`: title, weekday header, then one row per week.
///
/// Weeks start on Sunday. Every cell is four columns wide so the bracketed
/// day stays aligned with the header.
pub fn month_grid(today: NaiveDate) -> Vec<String> {
    let first = today.with_day(1).unwrap_or(today);
    let lead = first.weekday().num_days_from_sunday() as usize;
    let last = days_in_month(first);

    let mut lines = vec![
        first.format("%B %Y").to_string(),
        String::new(),
        WEEKDAYS.iter().map(|d| format!(" {d} ")).collect::<String>().trim_end().to_string(),
    ];

    let mut row = "    ".repeat(lead);
    let mut column = lead;
    for day in 1..=last {
        if day == today.day() {
            row.push_str(&format!("[{day:>2}]"));
        } else {
            row.push_str(&format!(" {day:>2} "));
        }
        column += 1;
        if column == 7 {
            lines.push(row.trim_end().to_string());
            row.clear();
            column = 0;
        }
    }
    if column > 0 {
        lines.push(row.trim_end().to_string());
    }
    lines
}

impl Widget for CalendarWidget {
    fn title(&self) -> &str {
        "Calendar"
    }

    fn init(&self) -> Option<Command> {
        Some(Command::tick(self.id, self.every))
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        let at = event.tick_for(self.id)?;
        self.today = at.date_naive();
        Some(Command::tick(self.id, self.every))
    }

    fn render(&self, _width: u16, _height: u16) -> Text<'static> {
        let mut grid = month_grid(self.today).into_iter();
        let mut lines = Vec::new();
        if let Some(title) = grid.next() {
            lines.push(Line::styled(title, Style::default().add_modifier(Modifier::BOLD)));
        }
        if let Some(blank) = grid.next() {
            lines.push(Line::from(blank));
        }
        if let Some(header) = grid.next() {
            lines.push(Line::styled(header, style::muted()));
        }
        lines.extend(grid.map(Line::from));
        Text::from(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_march_2024_grid() {
        // March 1st 2024 was a Friday
        let grid = month_grid(date(2024, 3, 9));
        assert_eq!(grid[0], "March 2024");
        assert_eq!(grid[1], "");
        assert_eq!(grid[2], " Su  Mo  Tu  We  Th  Fr  Sa");
        assert_eq!(grid[3], "                      1   2");
        assert_eq!(grid[4], "  3   4   5   6   7   8 [ 9]");
        assert_eq!(grid.last().unwrap(), " 31");
        assert_eq!(grid.len(), 9);
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!(days_in_month(date(2024, 2, 1)), 29);
        assert_eq!(days_in_month(date(2023, 2, 1)), 28);
        assert_eq!(days_in_month(date(2024, 12, 1)), 31);
        assert_eq!(days_in_month(date(2024, 4, 1)), 30);
    }

    #[test]
    fn test_today_is_bracketed_once() {
        let grid = month_grid(date(2024, 2, 29)).join("\n");
        assert_eq!(grid.matches('[').count(), 1);
        assert!(grid.contains("[29]"));
    }

    #[test]
    fn test_tick_moves_day_and_rearms() {
        let mut w = CalendarWidget::new(WidgetId(8), Duration::from_secs(60)).on(date(2024, 3, 31));
        let cmd = w.update(&DashEvent::Tick {
            widget: WidgetId(8),
            at: Local.with_ymd_and_hms(2024, 4, 1, 0, 0, 30).unwrap(),
        });
        assert!(matches!(cmd, Some(Command::Tick { after, .. }) if after == Duration::from_secs(60)));
        assert!(w.render(30, 10).to_string().starts_with("April 2024"));
    }
}
