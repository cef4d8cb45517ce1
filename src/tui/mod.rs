//! Terminal UI runtime for the dashboard
//!
//! This module contains:
//! - Terminal setup and teardown
//! - Events and the input pump
//! - Commands and the scheduler that executes them
//! - The panel renderer and the dashboard controller
//! - The event loop tying them together

mod app;
mod command;
mod dashboard;
mod events;
pub mod panel;
mod scheduler;
mod terminal;

pub use app::{run_app, LoopExit};
pub use command::{BlockingJob, Command, FetchFuture};
pub use dashboard::{DashState, Dashboard, Flow, LOADING_PLACEHOLDER};
pub use events::{is_quit_key, spawn_input_pump, translate, DashEvent, WidgetId};
pub use panel::{render_panel, Panel};
pub use scheduler::{Scheduler, COMMAND_TIMEOUT};
pub use terminal::{TerminalConfig, TerminalManager};
