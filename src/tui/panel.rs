//! Panel renderer - bordered, titled box around a widget body
//!
//! Frame geometry: a rounded border plus one row of vertical and two columns
//! of horizontal padding. The first interior row holds the bold title; body
//! lines follow and anything past the last interior row is dropped. Lines are
//! never wrapped here, long lines are cut at the right edge.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, BorderType, Padding, Paragraph, Widget},
};

const BORDER: u16 = 1;
const PADDING_X: u16 = 2;
const PADDING_Y: u16 = 1;

/// Columns consumed by border and padding
pub const FRAME_WIDTH: u16 = 2 * (BORDER + PADDING_X);

/// Rows consumed by border and padding
pub const FRAME_HEIGHT: u16 = 2 * (BORDER + PADDING_Y);

/// Interior size of a panel box, each dimension clamped to at least 1
pub fn interior_size(width: u16, height: u16) -> (u16, u16) {
    (
        width.saturating_sub(FRAME_WIDTH).max(1),
        height.saturating_sub(FRAME_HEIGHT).max(1),
    )
}

/// Keep at most `max` lines of `text`
pub fn clamp_lines(text: Text<'_>, max: usize) -> Text<'_> {
    let mut text = text;
    text.lines.truncate(max);
    text
}

/// A titled panel ready to be drawn into a buffer
#[derive(Debug, Clone)]
pub struct Panel<'a> {
    title: &'a str,
    body: Text<'a>,
    title_style: Style,
    border_style: Style,
}

impl<'a> Panel<'a> {
    /// Create new panel
    pub fn new(title: &'a str, body: impl Into<Text<'a>>) -> Self {
        Self {
            title,
            body: body.into(),
            title_style: Style::default().add_modifier(Modifier::BOLD),
            border_style: Style::default(),
        }
    }

    /// Set border style
    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    /// Height that shows the whole body without truncation
    pub fn fit_height(&self) -> u16 {
        let lines = u16::try_from(self.body.lines.len()).unwrap_or(u16::MAX);
        FRAME_HEIGHT.saturating_add(1).saturating_add(lines)
    }

    fn block(&self) -> Block<'static> {
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(self.border_style)
            .padding(Padding::new(PADDING_X, PADDING_X, PADDING_Y, PADDING_Y))
    }
}

impl Widget for Panel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let title_area = Rect { height: 1, ..inner };
        Line::styled(self.title, self.title_style).render(title_area, buf);

        let rows = inner.height - 1;
        if rows == 0 {
            return;
        }
        let body_area = Rect {
            y: inner.y + 1,
            height: rows,
            ..inner
        };
        Paragraph::new(clamp_lines(self.body, usize::from(rows))).render(body_area, buf);
    }
}

/// Render a panel into a fresh buffer
///
/// The box is exactly `width` columns wide. A `height` of 0 sizes the box to
/// its content; any other value fixes it to that many rows.
pub fn render_panel(width: u16, height: u16, title: &str, body: &str) -> Buffer {
    let panel = Panel::new(title, body);
    let height = if height > 0 { height } else { panel.fit_height() };
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    panel.render(area, &mut buf);
    buf
}

/// Plain-text rows of a buffer (trailing blanks kept)
pub fn buffer_rows(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.y..area.y + area.height)
        .map(|y| {
            (area.x..area.x + area.width)
                .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
                .collect()
        })
        .collect()
}
