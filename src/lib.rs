//! tuidash - terminal dashboard of independently refreshing widgets
//!
//! Panels (clock, weather, system load, network, documents, repository
//! profiles) are laid out in a responsive grid and refresh on their own
//! cadences without ever blocking each other.
//!
//! # Architecture
//!
//! - **Widgets**: each panel implements [`widgets::Widget`] and reacts to
//!   events by returning [`tui::Command`]s instead of doing I/O itself
//! - **Scheduler**: executes commands as tokio tasks and posts exactly one
//!   [`tui::DashEvent`] back per command
//! - **Dashboard**: single-threaded controller that routes events, computes the
//!   [`layout`] and draws one frame per event batch
//! - **Config**: file, environment and CLI layering in [`config`]
//!
//! # Example
//!
//! ```ignore
//! use tuidash_core::{config::DashboardConfig, tui::{Dashboard, Scheduler}};
//!
//! let cfg = DashboardConfig::load(None)?;
//! let mut dashboard = Dashboard::from_config(&cfg, |k| std::env::var(k).ok());
//! let (scheduler, mut rx) = Scheduler::channel();
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod tui;
pub mod widgets;

pub use config::DashboardConfig;
pub use error::{DashError, Result, WidgetError};
pub use layout::{compute_layout, LayoutConfig, LayoutPlan, UnitHints};
pub use tui::{Dashboard, DashEvent, Scheduler};
pub use widgets::{Payload, Widget};
