//! Dashboard controller
//!
//! Owns the widget sequence, tracks whether the terminal size is known, routes
//! every event to every widget and composes the frame from the layout plan.

use super::events::{is_quit_key, DashEvent};
use super::panel::{interior_size, Panel};
use super::Command;
use crate::config::DashboardConfig;
use crate::layout::{compute_layout, LayoutConfig, LayoutPlan, UnitHints};
use crate::widgets::{default_widgets, style::DashboardColors, Widget};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Widget as _;
use tracing::{debug, trace};

/// Shown until the first resize arrives
pub const LOADING_PLACEHOLDER: &str = "Loading layout...";

/// Widgets never get a render box narrower than this
const MIN_RENDER_WIDTH: u16 = 10;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashState {
    /// No terminal size known yet
    Uninitialized,
    /// Size known; the dashboard never leaves this state
    Ready { width: u16, height: u16 },
}

/// Outcome of handling one event
#[derive(Debug)]
pub enum Flow {
    /// Keep running; execute these commands
    Continue(Vec<Command>),
    /// Quit key pressed
    Quit,
}

pub struct Dashboard {
    widgets: Vec<Box<dyn Widget>>,
    hints: UnitHints,
    layout: LayoutConfig,
    state: DashState,
}

impl Dashboard {
    /// Create a dashboard over `widgets` in display order
    pub fn new(widgets: Vec<Box<dyn Widget>>, hints: UnitHints, layout: LayoutConfig) -> Self {
        Self {
            widgets,
            hints,
            layout,
            state: DashState::Uninitialized,
        }
    }

    /// Standard widget set; unit hints resolved through `lookup` (the
    /// process environment in production)
    pub fn from_config<F>(cfg: &DashboardConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let widgets = default_widgets(cfg);
        let titles: Vec<String> = widgets.iter().map(|w| w.title().to_string()).collect();
        let hints = UnitHints::new(cfg.unit_hints_for(titles.iter().map(String::as_str), lookup));
        debug!("Dashboard with {} widgets: {:?}", widgets.len(), titles);
        Self::new(widgets, hints, cfg.layout.clone())
    }

    /// Collect every widget's startup command
    pub fn init(&self) -> Vec<Command> {
        self.widgets.iter().filter_map(|w| w.init()).collect()
    }

    pub fn state(&self) -> DashState {
        self.state
    }

    pub fn titles(&self) -> Vec<&str> {
        self.widgets.iter().map(|w| w.title()).collect()
    }

    /// Handle one event
    ///
    /// Quit keys stop here. Everything else is offered to every widget in
    /// display order; returned commands are collected in the same order.
    pub fn update(&mut self, event: &DashEvent) -> Flow {
        match event {
            DashEvent::Key(key) if is_quit_key(key) => {
                debug!("Quit key pressed");
                return Flow::Quit;
            }
            DashEvent::Resize { width, height } => {
                if self.state == DashState::Uninitialized {
                    debug!("Dashboard ready at {}x{}", width, height);
                }
                self.state = DashState::Ready {
                    width: *width,
                    height: *height,
                };
            }
            _ => {}
        }

        trace!("Dispatching {} event", event.kind());
        let commands = self
            .widgets
            .iter_mut()
            .filter_map(|w| w.update(event))
            .collect();
        Flow::Continue(commands)
    }

    /// Layout for the current size, if known
    pub fn plan(&self) -> Option<LayoutPlan> {
        match self.state {
            DashState::Uninitialized => None,
            DashState::Ready { width, height } => {
                let titles = self.titles();
                Some(compute_layout(width, height, &titles, &self.hints, &self.layout))
            }
        }
    }

    /// Compose the full frame into `buf`, clipped to `area`
    pub fn draw(&self, area: Rect, buf: &mut Buffer) {
        let Some(plan) = self.plan() else {
            Line::from(LOADING_PLACEHOLDER).render(area, buf);
            return;
        };

        for (widget, placement) in self.widgets.iter().zip(&plan.placements) {
            let rect = placement.rect();
            let (inner_width, inner_height) = interior_size(rect.width, rect.height);
            // First interior row is the title
            let body = widget.render(
                inner_width.max(MIN_RENDER_WIDTH),
                inner_height.saturating_sub(1).max(1),
            );

            let mut scratch = Buffer::empty(Rect::new(0, 0, rect.width, rect.height));
            Panel::new(widget.title(), body)
                .border_style(Style::default().fg(DashboardColors::BORDER))
                .render(scratch.area, &mut scratch);
            blit(&scratch, rect.x, rect.y, area, buf);
        }
    }
}

impl ratatui::widgets::Widget for &Dashboard {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.draw(area, buf);
    }
}

/// Copy `src` to (`x`, `y`) in `dst`, dropping cells outside `clip`
fn blit(src: &Buffer, x: u16, y: u16, clip: Rect, dst: &mut Buffer) {
    let clip = clip.intersection(dst.area);
    for sy in 0..src.area.height {
        let Some(ty) = y.checked_add(sy) else { break };
        if ty < clip.top() || ty >= clip.bottom() {
            continue;
        }
        for sx in 0..src.area.width {
            let Some(tx) = x.checked_add(sx) else { break };
            if tx < clip.left() || tx >= clip.right() {
                continue;
            }
            if let (Some(from), Some(to)) = (src.cell((sx, sy)), dst.cell_mut((tx, ty))) {
                *to = from.clone();
            }
        }
    }
}
