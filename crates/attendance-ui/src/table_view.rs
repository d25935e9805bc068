//! Weekly compliance table for the attendance TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per
//! (employee, week) plus a highlighted totals row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use attendance_core::formatting;
use attendance_core::models::{ComplianceStatus, WeeklyRecord};

use crate::components::progress_bar::{PerformanceBar, ProgressBarConfig};
use crate::themes::Theme;

/// Display width of the employee column.
pub const EMPLOYEE_COLUMN_WIDTH: usize = 20;

const PERFORMANCE_BAR_WIDTH: u16 = 10;

/// Data for a single row in the weekly table.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Employee id, truncated to [`EMPLOYEE_COLUMN_WIDTH`] columns.
    pub employee: String,
    /// Week start, `YYYY-MM-DD`.
    pub week: String,
    pub total_hours: f64,
    pub target_hours: f64,
    pub days_worked: u32,
    pub gap_hours: f64,
    pub gap_percent: f64,
    pub performance_score: f64,
    pub status: ComplianceStatus,
}

impl From<&WeeklyRecord> for TableRowData {
    fn from(r: &WeeklyRecord) -> Self {
        Self {
            employee: truncate_to_width(&r.employee_id, EMPLOYEE_COLUMN_WIDTH),
            week: r.week_key(),
            total_hours: r.total_hours,
            target_hours: r.target_hours,
            days_worked: r.days_worked,
            gap_hours: r.gap_hours,
            gap_percent: r.gap_percent,
            performance_score: r.performance_score,
            status: r.status,
        }
    }
}

/// Aggregated totals across all rows in the table.
#[derive(Debug, Clone, Default)]
pub struct TableTotals {
    pub total_hours: f64,
    pub target_hours: f64,
    pub days_worked: u32,
    pub met: usize,
    /// Number of rows represented.
    pub entries_count: usize,
}

impl TableTotals {
    pub fn from_rows(rows: &[TableRowData]) -> Self {
        Self {
            total_hours: rows.iter().map(|r| r.total_hours).sum(),
            target_hours: rows.iter().map(|r| r.target_hours).sum(),
            days_worked: rows.iter().map(|r| r.days_worked).sum(),
            met: rows
                .iter()
                .filter(|r| r.status == ComplianceStatus::Met)
                .count(),
            entries_count: rows.len(),
        }
    }

    pub fn gap_hours(&self) -> f64 {
        self.target_hours - self.total_hours
    }
}

/// Cut `s` to at most `max` display columns, marking the cut with `…`.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Render the weekly table into `area`.
///
/// One data row per [`TableRowData`] entry, followed by a highlighted totals
/// row, all within a bordered block titled `title`.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[TableRowData],
    totals: &TableTotals,
    theme: &Theme,
) {
    let header_cells = [
        "Employee",
        "Week",
        "Days",
        "Hours",
        "Target",
        "Gap",
        "Gap %",
        "Performance",
        "Status",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let bar = PerformanceBar::new(row.total_hours, row.target_hours, theme)
                .with_config(ProgressBarConfig::compact(PERFORMANCE_BAR_WIDTH));
            Row::new(vec![
                Cell::from(row.employee.clone()),
                Cell::from(row.week.clone()),
                Cell::from(row.days_worked.to_string()),
                Cell::from(formatting::format_hours(row.total_hours)),
                Cell::from(formatting::format_hours(row.target_hours)),
                Cell::from(formatting::format_gap(row.gap_hours)).style(theme.gap_style(row.gap_hours)),
                Cell::from(formatting::format_percent(row.gap_percent)),
                Cell::from(bar.to_line()),
                Cell::from(row.status.as_str().to_uppercase()).style(theme.status_style(row.status)),
            ])
            .style(style)
        })
        .collect();

    // Totals row
    let total_row = Row::new(vec![
        Cell::from("TOTAL").style(theme.table_total),
        Cell::from(format!("{} weeks", totals.entries_count)),
        Cell::from(totals.days_worked.to_string()),
        Cell::from(formatting::format_hours(totals.total_hours)),
        Cell::from(formatting::format_hours(totals.target_hours)),
        Cell::from(formatting::format_gap(totals.gap_hours())),
        Cell::from(""),
        Cell::from(""),
        Cell::from(format!("{}/{} met", totals.met, totals.entries_count)),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(EMPLOYEE_COLUMN_WIDTH as u16 + 1),
        Constraint::Length(11),
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(PERFORMANCE_BAR_WIDTH + 8),
        Constraint::Length(10),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a placeholder when there are no weekly records to show.
///
/// `reason` distinguishes "nothing in the file" from "filters hide everything".
pub fn render_no_data(frame: &mut Frame, area: Rect, reason: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No attendance records to show", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(reason.to_string(), theme.dim)),
        Line::from(Span::styled("Press 'r' to reset filters, 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Attendance Monitor "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
