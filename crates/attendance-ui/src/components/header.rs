use attendance_core::calculations::ReportSummary;
use attendance_core::formatting::{format_hours, format_number, format_percent};
use crate::components::progress_bar::ComplianceBar;
use crate::themes::Theme;
use ratatui::text::{Line, Span};

pub const TITLE: &str = "ATTENDANCE COMPLIANCE MONITOR";

/// Dashboard header rendering five lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. Source and target in `[ source | target 40.00h ]` format.
/// 4. Summary figures, or a placeholder when there are no records.
/// 5. Compliance bar (empty line when there are no records).
pub struct Header<'a> {
    /// Input file or directory name.
    pub source: &'a str,
    pub target_hours: f64,
    pub summary: Option<&'a ReportSummary>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        source: &'a str,
        target_hours: f64,
        summary: Option<&'a ReportSummary>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            source,
            target_hours,
            summary,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let t = self.theme;
        let mut lines = vec![
            Line::from(Span::styled(TITLE, t.header)),
            Line::from(Span::styled("=".repeat(60), t.separator)),
            Line::from(vec![
                Span::styled("[ ", t.label),
                Span::styled(self.source, t.value),
                Span::styled(" | target ", t.label),
                Span::styled(format_hours(self.target_hours), t.value),
                Span::styled(" ]", t.label),
            ]),
        ];

        match self.summary {
            Some(s) => {
                lines.push(Line::from(vec![
                    Span::styled("Records ", t.label),
                    Span::styled(s.total_records.to_string(), t.value),
                    Span::styled("  Hours ", t.label),
                    Span::styled(format_number(s.total_actual_hours, 1), t.value),
                    Span::styled(" / ", t.dim),
                    Span::styled(format_number(s.total_target_hours, 1), t.value),
                    Span::styled("  Avg performance ", t.label),
                    Span::styled(
                        format_percent(s.avg_performance),
                        t.performance_style(s.avg_performance),
                    ),
                ]));
                lines.push(ComplianceBar::new(s.compliant_records, s.total_records, t).to_line());
            }
            None => {
                lines.push(Line::from(Span::styled("No weekly records", t.dim)));
                lines.push(Line::from(""));
            }
        }

        lines
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
