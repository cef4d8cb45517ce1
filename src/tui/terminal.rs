//! Terminal setup and teardown

use crate::error::{DashError, Result};
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};
use tracing::{debug, warn};

/// Terminal configuration
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Enable mouse capture
    pub mouse_enabled: bool,

    /// Use alternate screen
    pub alternate_screen: bool,

    /// Enable raw mode
    pub raw_mode: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            mouse_enabled: false,
            alternate_screen: true,
            raw_mode: true,
        }
    }
}

/// Full-screen terminal session
///
/// Restores the terminal on [`restore`](Self::restore) or, best effort, on
/// drop.
pub struct TerminalManager {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    config: TerminalConfig,
    restored: bool,
}

impl TerminalManager {
    /// Enter raw mode and the alternate screen
    ///
    /// A failure part way through undoes the steps already taken.
    pub fn new(config: TerminalConfig) -> Result<Self> {
        let mut setup = SetupGuard::new(io::stdout());

        if config.raw_mode {
            enable_raw_mode().map_err(DashError::Terminal)?;
            setup.raw_mode = true;
        }
        if config.alternate_screen {
            execute!(setup.out, EnterAlternateScreen).map_err(DashError::Terminal)?;
            setup.alternate_screen = true;
        }
        if config.mouse_enabled {
            execute!(setup.out, EnableMouseCapture).map_err(DashError::Terminal)?;
            setup.mouse_capture = true;
        }

        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend).map_err(DashError::Terminal)?;
        terminal.hide_cursor().map_err(DashError::Terminal)?;
        setup.disarm();
        debug!("Terminal session started: {:?}", config);

        Ok(Self {
            terminal,
            config,
            restored: false,
        })
    }

    /// Get mutable reference to terminal
    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Leave the alternate screen and raw mode
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        if self.config.raw_mode {
            disable_raw_mode().map_err(DashError::Terminal)?;
        }
        let backend = self.terminal.backend_mut();
        if self.config.mouse_enabled {
            execute!(backend, DisableMouseCapture).map_err(DashError::Terminal)?;
        }
        if self.config.alternate_screen {
            execute!(backend, LeaveAlternateScreen).map_err(DashError::Terminal)?;
        }
        execute!(backend, Show).map_err(DashError::Terminal)?;
        debug!("Terminal restored");
        Ok(())
    }
}

impl Drop for TerminalManager {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Steps of a session start that still need undoing
///
/// Armed until [`disarm`](Self::disarm); dropping it armed reverts every
/// recorded step, best effort.
struct SetupGuard<W: Write> {
    out: W,
    raw_mode: bool,
    alternate_screen: bool,
    mouse_capture: bool,
    armed: bool,
}

impl<W: Write> SetupGuard<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            raw_mode: false,
            alternate_screen: false,
            mouse_capture: false,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<W: Write> Drop for SetupGuard<W> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        if self.mouse_capture {
            let _ = execute!(self.out, DisableMouseCapture);
        }
        if self.alternate_screen {
            let _ = execute!(self.out, LeaveAlternateScreen);
        }
        let _ = execute!(self.out, Show);
        if self.raw_mode {
            if let Err(e) = disable_raw_mode() {
                warn!("Failed to leave raw mode: {}", e);
            }
        }
        debug!("Partial terminal setup undone");
    }
}
