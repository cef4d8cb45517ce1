//! Layout engine - size-adaptive grid for dashboard panels
//!
//! The plan is a pure function of terminal size, widget order and per-widget
//! height units. Nothing is cached between frames: every resize (and every
//! frame) recomputes it from scratch.
//!
//! Widgets are dealt into columns round-robin by display index. A column's
//! weight is the sum of the units of its widgets; the heaviest column decides
//! the base row height, so a widget with 2 units is exactly twice as tall as
//! one with 1 unit. Rows are stacked in display order and each row is as tall
//! as its tallest panel.

use crate::config::widget_key;
use ratatui::layout::Rect;
use serde::Deserialize;
use std::collections::HashMap;

/// Grid parameters
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Column count on wide terminals
    pub columns: u16,
    /// Terminals narrower than this get a single column
    pub narrow_width: u16,
    /// Blank cells between adjacent columns
    pub gap: u16,
    /// Lower bound for the base row height
    pub min_row_height: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: 2,
            narrow_width: 90,
            gap: 2,
            min_row_height: 5,
        }
    }
}

/// Largest accepted height unit; keeps `base × unit` inside `u16`
pub const MAX_UNIT_HINT: u16 = 1000;

/// Relative height weights, keyed by normalized widget title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitHints {
    units: HashMap<String, u16>,
}

impl UnitHints {
    /// Create from a map keyed by [`widget_key`] form
    pub fn new(units: HashMap<String, u16>) -> Self {
        Self { units }
    }

    /// Set the weight for a title, clamped to `1..=MAX_UNIT_HINT`
    pub fn with(mut self, title: &str, units: u16) -> Self {
        self.units
            .insert(widget_key(title), units.clamp(1, MAX_UNIT_HINT));
        self
    }

    /// Weight for a widget title; 1 unless a positive override exists
    pub fn unit_for(&self, title: &str) -> u16 {
        self.units
            .get(&widget_key(title))
            .copied()
            .filter(|v| *v > 0)
            .map_or(1, |v| v.min(MAX_UNIT_HINT))
    }
}

/// Box assigned to one widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Column index (round-robin by display order)
    pub column: u16,
    /// Row index in display order
    pub row: u16,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Height units this box was sized with
    pub units: u16,
}

impl Placement {
    /// Absolute rectangle, possibly extending past the terminal
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Result of one layout pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub columns: u16,
    pub column_width: u16,
    /// Largest per-column unit sum (at least 1)
    pub max_units: u32,
    pub base_height: u16,
    /// One entry per widget, in display order
    pub placements: Vec<Placement>,
}

/// Number of columns for a terminal width
pub fn column_count(terminal_width: u16, cfg: &LayoutConfig) -> u16 {
    if terminal_width < cfg.narrow_width {
        1
    } else {
        cfg.columns.max(1)
    }
}

/// Width of a single column
///
/// A single column spans the terminal minus two cells of border slack;
/// multiple columns split the width left after the gaps.
pub fn column_width(terminal_width: u16, columns: u16, gap: u16) -> u16 {
    if columns <= 1 {
        return terminal_width.saturating_sub(2);
    }
    let gaps = gap.saturating_mul(columns - 1);
    terminal_width.saturating_sub(gaps) / columns
}

/// Compute placements for widgets given in display order
pub fn compute_layout(
    terminal_width: u16,
    terminal_height: u16,
    titles: &[&str],
    hints: &UnitHints,
    cfg: &LayoutConfig,
) -> LayoutPlan {
    let columns = column_count(terminal_width, cfg);
    let col_width = column_width(terminal_width, columns, cfg.gap);
    let units: Vec<u16> = titles.iter().map(|t| hints.unit_for(t)).collect();

    let mut column_units = vec![0u32; usize::from(columns)];
    for (i, u) in units.iter().enumerate() {
        column_units[i % usize::from(columns)] += u32::from(*u);
    }
    let max_units = column_units.into_iter().max().unwrap_or(0).max(1);

    let base_height = (u32::from(terminal_height) / max_units).max(u32::from(cfg.min_row_height));
    let base_height = clamp_u16(base_height);

    let mut placements = Vec::with_capacity(titles.len());
    let mut row_y: u32 = 0;
    let mut row_height: u32 = 0;

    for (i, u) in units.iter().enumerate() {
        let column = (i % usize::from(columns)) as u16;
        let row = (i / usize::from(columns)) as u16;

        if column == 0 && i > 0 {
            row_y += row_height;
            row_height = 0;
        }

        let height = u32::from(base_height) * u32::from(*u);
        row_height = row_height.max(height);

        let x = u32::from(column) * (u32::from(col_width) + u32::from(cfg.gap));
        placements.push(Placement {
            column,
            row,
            x: clamp_u16(x),
            y: clamp_u16(row_y),
            width: col_width,
            height: clamp_u16(height),
            units: *u,
        });
    }

    LayoutPlan {
        columns,
        column_width: col_width,
        max_units,
        base_height,
        placements,
    }
}

fn clamp_u16(v: u32) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TITLES: [&str; 8] = [
        "Clock",
        "Weather",
        "Moon Phase",
        "System",
        "IP Info",
        "Markdown",
        "GitHub",
        "GitLab",
    ];

    #[test]
    fn test_narrow_terminal_single_column() {
        let plan = compute_layout(60, 40, &TITLES, &UnitHints::default(), &LayoutConfig::default());
        assert_eq!(plan.columns, 1);
        assert_eq!(plan.column_width, 58);
        assert!(plan.placements.iter().all(|p| p.column == 0 && p.x == 0));
        assert!(plan.placements.iter().all(|p| p.width == 58));
    }

    #[test]
    fn test_wide_terminal_two_columns() {
        let plan = compute_layout(120, 40, &TITLES, &UnitHints::default(), &LayoutConfig::default());
        assert_eq!(plan.columns, 2);
        assert_eq!(plan.column_width, 59);
        assert_eq!(plan.placements[1].x, 61);
        assert_eq!(plan.placements[2].row, 1);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let cfg = LayoutConfig::default();
        assert_eq!(column_count(89, &cfg), 1);
        assert_eq!(column_count(90, &cfg), 2);
    }

    #[test]
    fn test_round_robin_assignment() {
        let plan = compute_layout(120, 40, &TITLES, &UnitHints::default(), &LayoutConfig::default());
        let columns: Vec<u16> = plan.placements.iter().map(|p| p.column).collect();
        assert_eq!(columns, vec![0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_units_in_same_column_scale_height() {
        // Indices 0 and 2 share column 0 in a two-column grid
        let titles = ["A", "B", "C"];
        let hints = UnitHints::default().with("C", 2);
        let plan = compute_layout(120, 30, &titles, &hints, &LayoutConfig::default());

        assert_eq!(plan.max_units, 3);
        assert_eq!(plan.base_height, 10);
        assert_eq!(plan.placements[0].height, 10);
        assert_eq!(plan.placements[2].height, 20);
        assert_eq!(plan.placements[2].height, 2 * plan.placements[0].height);
    }

    #[test]
    fn test_base_height_floor() {
        let plan = compute_layout(60, 12, &TITLES, &UnitHints::default(), &LayoutConfig::default());
        assert_eq!(plan.max_units, 8);
        assert_eq!(plan.base_height, 5);
    }

    #[test]
    fn test_rows_stack_by_tallest_panel() {
        let titles = ["A", "B", "C", "D"];
        let hints = UnitHints::default().with("B", 3);
        let plan = compute_layout(100, 40, &titles, &hints, &LayoutConfig::default());

        // Column 1 carries B(3) + D(1) = 4 units
        assert_eq!(plan.base_height, 10);
        assert_eq!(plan.placements[2].y, 30);
        assert_eq!(plan.placements[3].y, 30);
        assert_eq!(plan.placements[3].y + plan.placements[3].height, 40);
    }

    #[test]
    fn test_empty_widget_list() {
        let plan = compute_layout(120, 40, &[], &UnitHints::default(), &LayoutConfig::default());
        assert!(plan.placements.is_empty());
        assert_eq!(plan.max_units, 1);
        assert_eq!(plan.base_height, 40);
    }

    #[test]
    fn test_configured_column_count() {
        let cfg = LayoutConfig {
            columns: 3,
            ..LayoutConfig::default()
        };
        let plan = compute_layout(122, 40, &TITLES, &UnitHints::default(), &cfg);
        assert_eq!(plan.columns, 3);
        assert_eq!(plan.column_width, 39);
        assert_eq!(plan.placements[2].x, 82);
    }

    #[test]
    fn test_unit_hint_lookup_uses_normalized_key() {
        let mut map = HashMap::new();
        map.insert("MOON_PHASE".to_string(), 2);
        map.insert("CLOCK".to_string(), 0);
        let hints = UnitHints::new(map);
        assert_eq!(hints.unit_for("Moon Phase"), 2);
        assert_eq!(hints.unit_for("Clock"), 1);
        assert_eq!(hints.unit_for("Weather"), 1);
    }

    #[test]
    fn test_oversized_hints_are_capped() {
        let hints = UnitHints::default().with("Tall", 40000);
        assert_eq!(hints.unit_for("Tall"), MAX_UNIT_HINT);

        let mut map = HashMap::new();
        map.insert("TALL".to_string(), u16::MAX);
        assert_eq!(UnitHints::new(map).unit_for("Tall"), MAX_UNIT_HINT);

        let plan = compute_layout(80, 24, &["Tall", "Short"], &hints, &LayoutConfig::default());
        assert_eq!(plan.placements[0].height, 5 * MAX_UNIT_HINT);
        assert_eq!(plan.placements[1].height, 5);
    }

    proptest! {
        #[test]
        fn prop_column_count_follows_width(width in 0u16..400, height in 0u16..200) {
            let plan = compute_layout(width, height, &TITLES, &UnitHints::default(), &LayoutConfig::default());
            if width < 90 {
                prop_assert_eq!(plan.columns, 1);
            } else {
                prop_assert_eq!(plan.columns, 2);
            }
        }

        #[test]
        fn prop_height_never_below_minimum(
            width in 0u16..400,
            height in 1u16..300,
            units in proptest::collection::vec(1u16..5, 1..10),
        ) {
            let titles: Vec<String> = (0..units.len()).map(|i| format!("W{i}")).collect();
            let mut hints = UnitHints::default();
            for (t, u) in titles.iter().zip(&units) {
                hints = hints.with(t, *u);
            }
            let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
            let plan = compute_layout(width, height, &refs, &hints, &LayoutConfig::default());

            for (p, u) in plan.placements.iter().zip(&units) {
                prop_assert!(p.height >= 5 * u);
                prop_assert_eq!(p.height, plan.base_height * u);
            }
        }

        #[test]
        fn prop_heights_stay_exact_for_large_hints(
            height in 1u16..=u16::MAX,
            units in proptest::collection::vec(1u16..=MAX_UNIT_HINT, 1..4),
        ) {
            let titles: Vec<String> = (0..units.len()).map(|i| format!("W{i}")).collect();
            let mut hints = UnitHints::default();
            for (t, u) in titles.iter().zip(&units) {
                hints = hints.with(t, *u);
            }
            let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
            let plan = compute_layout(60, height, &refs, &hints, &LayoutConfig::default());

            for (p, u) in plan.placements.iter().zip(&units) {
                prop_assert_eq!(u32::from(p.height), u32::from(plan.base_height) * u32::from(*u));
                prop_assert!(u32::from(p.height) >= 5 * u32::from(*u));
            }
        }
    }
}
