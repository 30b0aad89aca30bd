//! Panels of the import dashboard

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;

use super::{Phase, Progress};
use crate::model::RecordKind;
use crate::pipeline::KindStats;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Blue))
}

/// Current phase plus a free-form info line
pub struct StatusPanel {
    phase: Phase,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Connecting,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (indicator, color) = match self.phase {
            Phase::Complete => ("✓", Color::Green),
            Phase::Failed => ("✗", Color::Red),
            Phase::Fetching(_) => ("↓", Color::Cyan),
            Phase::Writing(_) => ("⚙", Color::Cyan),
            _ => ("◐", Color::Cyan),
        };
        let style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", indicator), style),
                Span::styled(self.phase.to_string(), style),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("   {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];

        frame.render_widget(Paragraph::new(lines).block(panel(" EKATTE import ")), area);
    }
}

/// Gauge for the chunked upsert of the current table
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(format!(
                "{}: {}/{} rows",
                progress.label, progress.current, progress.total
            ));
        frame.render_widget(gauge, area);
    }
}

/// One row of counters per record kind
pub struct StatsPanel {
    rows: Vec<(RecordKind, KindStats)>,
}

impl StatsPanel {
    pub fn new() -> Self {
        Self {
            rows: RecordKind::ALL
                .iter()
                .map(|kind| (*kind, KindStats::default()))
                .collect(),
        }
    }

    pub fn update(&mut self, kind: RecordKind, stats: KindStats) {
        if let Some(row) = self.rows.iter_mut().find(|(k, _)| *k == kind) {
            row.1 = stats;
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(["table", "fetched", "rejected", "synthesized", "duplicates", "written"])
            .style(Style::default().fg(Color::Yellow));

        let rows = self.rows.iter().map(|(kind, s)| {
            Row::new(vec![
                Cell::from(kind.table()),
                Cell::from(s.fetched.to_string()),
                Cell::from(s.rejected.to_string()),
                Cell::from(s.synthesized.to_string()),
                Cell::from(s.duplicates.to_string()),
                Cell::from(s.written.to_string()),
            ])
        });

        let widths = [
            Constraint::Length(18),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(11),
            Constraint::Length(9),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(panel(" Tables "));
        frame.render_widget(table, area);
    }
}

/// Tail of the activity log
pub struct LogPanel {
    entries: Vec<String>,
    max_entries: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 100,
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.entries.len().saturating_sub(visible);
        let last = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self.entries[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let color = if start + i == last {
                    Color::White
                } else {
                    Color::DarkGray
                };
                ListItem::new(Span::styled(format!(" {}", entry), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(List::new(items).block(panel(" Activity ")), area);
    }
}
