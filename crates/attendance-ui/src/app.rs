//! Main application state and TUI event loop for the attendance monitor.
//!
//! [`App`] owns the theme, the weekly records of one run and the active
//! filters. It drives the interactive table view.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::{info, warn};

use attendance_core::calculations::ReportSummary;
use attendance_core::models::{ComplianceStatus, RecordFilter, WeeklyRecord};
use attendance_data::export;

use crate::components::header::Header;
use crate::table_view::{self, TableRowData, TableTotals};
use crate::themes::Theme;

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the attendance TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Input file or directory shown in the header.
    pub source: String,
    pub target_hours: f64,
    /// Every record of the run, sorted by (employee, week).
    pub records: Vec<WeeklyRecord>,
    pub employees: Vec<String>,
    pub weeks: Vec<NaiveDate>,
    pub filter: RecordFilter,
    /// Directory that `x` writes CSV exports to.
    pub export_dir: PathBuf,
    /// One-line feedback shown in the footer (export result, errors).
    pub status_message: Option<String>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(
        theme_name: &str,
        source: String,
        target_hours: f64,
        records: Vec<WeeklyRecord>,
        export_dir: PathBuf,
    ) -> Self {
        let employees = records
            .iter()
            .map(|r| r.employee_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let weeks = records
            .iter()
            .map(|r| r.week_start)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            theme: Theme::from_name(theme_name),
            source,
            target_hours,
            records,
            employees,
            weeks,
            filter: RecordFilter::default(),
            export_dir,
            status_message: None,
            should_quit: false,
        }
    }

    /// Start with `filter` already applied (from the command line).
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Records passing the current filter.
    pub fn visible_records(&self) -> Vec<WeeklyRecord> {
        self.filter.apply(&self.records)
    }

    pub fn visible_summary(&self) -> Option<ReportSummary> {
        ReportSummary::from_records(&self.visible_records(), self.target_hours)
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    /// Apply one key press to the state.
    ///
    /// * `e` / `w` / `s` cycle the employee / week / status filter
    /// * `r` clears all filters
    /// * `x` exports the visible records to CSV
    /// * `q`, `Q`, `Ctrl+C` quit
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('e') => {
                self.filter.employee = cycle(&self.filter.employee, &self.employees);
                self.status_message = None;
            }
            KeyCode::Char('w') => {
                self.filter.week = cycle(&self.filter.week, &self.weeks);
                self.status_message = None;
            }
            KeyCode::Char('s') => {
                self.filter.status = cycle(
                    &self.filter.status,
                    &[ComplianceStatus::Met, ComplianceStatus::Below],
                );
                self.status_message = None;
            }
            KeyCode::Char('r') => {
                self.filter = RecordFilter::default();
                self.status_message = None;
            }
            KeyCode::Char('x') => self.export_visible(),
            _ => {}
        }
    }

    /// Write the visible records to a timestamped CSV in `export_dir`.
    pub fn export_visible(&mut self) {
        let visible = self.visible_records();
        self.status_message = Some(match export::export_csv(&self.export_dir, &visible) {
            Ok(path) => {
                info!("TUI export written to {}", path.display());
                format!("Exported {} records to {}", visible.len(), path.display())
            }
            Err(e) => {
                warn!("TUI export failed: {}", e);
                format!("Export failed: {e}")
            }
        });
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the interactive table until `q` / `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the loop never
    /// blocks indefinitely on input.
    pub fn run_table(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, table_area, footer_area] = Layout::vertical([
            Constraint::Length(5),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .areas(frame.area());

        let visible = self.visible_records();
        let summary = ReportSummary::from_records(&visible, self.target_hours);

        let header = Header::new(&self.source, self.target_hours, summary.as_ref(), &self.theme);
        frame.render_widget(Paragraph::new(header.to_lines()), header_area);

        if visible.is_empty() {
            let reason = if self.records.is_empty() {
                "The input produced no weekly records."
            } else {
                "The active filters match no records."
            };
            table_view::render_no_data(frame, table_area, reason, &self.theme);
        } else {
            let rows: Vec<TableRowData> = visible.iter().map(TableRowData::from).collect();
            let totals = TableTotals::from_rows(&rows);
            table_view::render_table_view(
                frame,
                table_area,
                "Weekly Compliance",
                &rows,
                &totals,
                &self.theme,
            );
        }

        frame.render_widget(Paragraph::new(self.footer_lines()), footer_area);
    }

    fn footer_lines(&self) -> Vec<Line<'_>> {
        let t = &self.theme;
        let value = |v: Option<String>| match v {
            Some(v) => Span::styled(v, t.filter_active),
            None => Span::styled("all", t.dim),
        };

        let filters = Line::from(vec![
            Span::styled("employee: ", t.label),
            value(self.filter.employee.clone()),
            Span::styled("  week: ", t.label),
            value(self.filter.week.map(|w| w.format("%Y-%m-%d").to_string())),
            Span::styled("  status: ", t.label),
            value(self.filter.status.map(|s| s.as_str().to_string())),
        ]);

        let second = match &self.status_message {
            Some(msg) => Line::from(Span::styled(msg.clone(), t.info)),
            None => Line::from(Span::styled(
                "[e] employee  [w] week  [s] status  [r] reset  [x] export  [q] quit",
                t.dim,
            )),
        };

        vec![filters, second]
    }
}

/// Step `current` through `options` and back to `None`.
fn cycle<T: Clone + PartialEq>(current: &Option<T>, options: &[T]) -> Option<T> {
    match current {
        None => options.first().cloned(),
        Some(cur) => options
            .iter()
            .position(|o| o == cur)
            .and_then(|i| options.get(i + 1))
            .cloned(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
