//! Progress reporting for the importer
//!
//! The pipeline talks to a [`Ui`] only. Three implementations exist:
//! - [`ConsoleUi`] prints one line per event (default)
//! - [`UiApp`] is a full-screen ratatui dashboard (`--tui`)
//! - [`SilentUi`] swallows everything (tests, library use)

mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use crate::model::RecordKind;
use crate::pipeline::KindStats;
use components::{LogPanel, ProgressPanel, StatsPanel, StatusPanel};

/// Pipeline phases shown in the status panel
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Connecting,
    Fetching(RecordKind),
    Validating(RecordKind),
    Reconciling,
    Writing(RecordKind),
    Complete,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Connecting => write!(f, "Opening database"),
            Phase::Fetching(kind) => write!(f, "Fetching {}", kind),
            Phase::Validating(kind) => write!(f, "Validating {}", kind),
            Phase::Reconciling => write!(f, "Reconciling town halls"),
            Phase::Writing(kind) => write!(f, "Writing {}", kind),
            Phase::Complete => write!(f, "Complete"),
            Phase::Failed => write!(f, "Failed (rolled back)"),
        }
    }
}

/// Progress information for the current operation
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Trait for UI implementations - allows both real TUI and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    /// Latest statistics for one record kind
    fn report(&mut self, kind: RecordKind, stats: &KindStats);
    fn log(&mut self, message: impl Into<String>);
}

/// Full-screen dashboard
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: StatusPanel,
    progress: ProgressPanel,
    stats: StatsPanel,
    log: LogPanel,
}

impl UiApp {
    /// Create the dashboard and enter the alternate screen
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            status: StatusPanel::new(),
            progress: ProgressPanel::new(),
            stats: StatsPanel::new(),
            log: LogPanel::new(),
        })
    }

    fn draw(&mut self) -> Result<()> {
        let status = &self.status;
        let progress = &self.progress;
        let stats = &self.stats;
        let log = &self.log;

        self.terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5), // Status
                    Constraint::Length(3), // Progress bar
                    Constraint::Length(7), // Per-kind table
                    Constraint::Min(5),    // Log
                ])
                .split(frame.area());

            status.render(frame, chunks[0]);
            progress.render(frame, chunks[1]);
            stats.render(frame, chunks[2]);
            log.render(frame, chunks[3]);
        })?;

        Ok(())
    }

    /// Show the final line, wait for a key and restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.clear_progress();
        self.log(summary);
        self.log("Press any key to exit...");

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let CrosstermEvent::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Restore terminal without waiting
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.draw().ok();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.draw().ok();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress
            .set_progress(Progress::new(current, total, label));
        self.draw().ok();
    }

    fn clear_progress(&mut self) {
        self.progress.clear();
        self.draw().ok();
    }

    fn report(&mut self, kind: RecordKind, stats: &KindStats) {
        self.stats.update(kind, *stats);
        self.draw().ok();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(message);
        self.draw().ok();
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

/// Plain stdout output, one line per phase and log message
#[derive(Default)]
pub struct ConsoleUi {
    verbose: bool,
}

impl ConsoleUi {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        println!("{}...", phase);
    }

    fn set_info(&mut self, info: impl Into<String>) {
        println!("  {}", info.into());
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        if self.verbose {
            println!("  {}: {}/{}", label.into(), current, total);
        }
    }

    fn clear_progress(&mut self) {}

    fn report(&mut self, kind: RecordKind, stats: &KindStats) {
        if self.verbose {
            println!("  {}: {}", kind, stats);
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        println!("{}", message.into());
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn report(&mut self, _kind: RecordKind, _stats: &KindStats) {}
    fn log(&mut self, _message: impl Into<String>) {}
}
