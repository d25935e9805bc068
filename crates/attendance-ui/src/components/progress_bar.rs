use attendance_core::formatting::{format_hours, format_percent};
use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Configuration controlling visual appearance of a progress bar.
pub struct ProgressBarConfig {
    /// Total width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    /// Character used to fill the completed portion of the bar.
    pub filled_char: char,
    /// Character used to fill the empty portion of the bar.
    pub empty_char: char,
    /// Whether to append the hours label after the percentage.
    pub show_label: bool,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 30,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
            show_label: true,
        }
    }
}

impl ProgressBarConfig {
    /// Bar only, no hours label; used inside table cells.
    pub fn compact(width: u16) -> Self {
        Self {
            width,
            show_label: false,
            ..Self::default()
        }
    }
}

/// Number of filled columns for `percentage` of `width`, clamped to the bar.
fn filled_columns(percentage: f64, width: u16) -> u16 {
    let clamped = percentage.clamp(0.0, 100.0);
    ((clamped / 100.0) * width as f64) as u16
}

// ── PerformanceBar ───────────────────────────────────────────────────────────

/// Horizontal bar showing worked hours against the weekly target.
///
/// Scores above 100 % render a full bar; the label keeps the real figure.
pub struct PerformanceBar<'a> {
    /// `actual / target * 100`, unclamped.
    pub score: f64,
    pub actual_hours: f64,
    pub target_hours: f64,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> PerformanceBar<'a> {
    pub fn new(actual_hours: f64, target_hours: f64, theme: &'a Theme) -> Self {
        let score = if target_hours > 0.0 {
            actual_hours / target_hours * 100.0
        } else {
            0.0
        };
        Self {
            score,
            actual_hours,
            target_hours,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProgressBarConfig) -> Self {
        self.config = config;
        self
    }

    /// Render the bar as a [`Line`] suitable for embedding in any ratatui
    /// widget that accepts `Line` values.
    pub fn to_line(&self) -> Line<'a> {
        let filled = filled_columns(self.score, self.config.width);
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        let label = if self.config.show_label {
            format!(
                " {} ({}/{})",
                format_percent(self.score),
                format_hours(self.actual_hours),
                format_hours(self.target_hours),
            )
        } else {
            format!(" {}", format_percent(self.score))
        };

        Line::from(vec![
            Span::styled(filled_str, self.theme.performance_style(self.score)),
            Span::styled(empty_str, self.theme.progress_empty),
            Span::styled(label, self.theme.progress_label),
        ])
    }
}

// ── ComplianceBar ────────────────────────────────────────────────────────────

/// Share of weekly records that met the target.
pub struct ComplianceBar<'a> {
    pub compliant: usize,
    pub total: usize,
    pub theme: &'a Theme,
    pub width: u16,
}

impl<'a> ComplianceBar<'a> {
    pub fn new(compliant: usize, total: usize, theme: &'a Theme) -> Self {
        Self {
            compliant,
            total,
            theme,
            width: 30,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.compliant as f64 / self.total as f64 * 100.0
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let pct = self.percentage();
        let filled = filled_columns(pct, self.width);
        let empty = self.width.saturating_sub(filled);

        Line::from(vec![
            Span::styled("\u{2588}".repeat(filled as usize), self.theme.success),
            Span::styled("\u{2588}".repeat(empty as usize), self.theme.error),
            Span::styled(
                format!(" {} met ({}/{})", format_percent(pct), self.compliant, self.total),
                self.theme.progress_label,
            ),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_performance_bar_partial_fill() {
        let theme = Theme::dark();
        let bar = PerformanceBar::new(32.0, 40.0, &theme);
        assert_eq!(bar.score, 80.0);

        let line = bar.to_line();
        assert_eq!(line.spans[0].content.chars().count(), 24);
        assert_eq!(line.spans[1].content.chars().count(), 6);
        assert_eq!(line.spans[0].style.fg, Some(Color::Yellow));
        assert!(text(&line).ends_with(" 80.0% (32.00h/40.00h)"));
    }

    #[test]
    fn test_performance_bar_over_target_is_full() {
        let theme = Theme::dark();
        let line = PerformanceBar::new(50.0, 40.0, &theme).to_line();
        assert_eq!(line.spans[0].content.chars().count(), 30);
        assert!(line.spans[1].content.is_empty());
        assert_eq!(line.spans[0].style.fg, Some(Color::Green));
        assert!(text(&line).contains("125.0%"));
    }

    #[test]
    fn test_performance_bar_negative_hours_is_empty() {
        let theme = Theme::dark();
        let line = PerformanceBar::new(-4.0, 40.0, &theme).to_line();
        assert!(line.spans[0].content.is_empty());
        assert_eq!(line.spans[1].content.chars().count(), 30);
        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_performance_bar_compact() {
        let theme = Theme::dark();
        let line = PerformanceBar::new(20.0, 40.0, &theme)
            .with_config(ProgressBarConfig::compact(10))
            .to_line();
        assert_eq!(line.spans[0].content.chars().count(), 5);
        assert_eq!(text(&line).chars().count(), 10 + " 50.0%".len());
    }

    #[test]
    fn test_performance_bar_zero_target() {
        let theme = Theme::dark();
        assert_eq!(PerformanceBar::new(8.0, 0.0, &theme).score, 0.0);
    }

    #[test]
    fn test_compliance_bar() {
        let theme = Theme::dark();
        let bar = ComplianceBar::new(1, 4, &theme);
        assert_eq!(bar.percentage(), 25.0);
        let line = bar.to_line();
        assert_eq!(line.spans[0].content.chars().count(), 7);
        assert_eq!(line.spans[1].content.chars().count(), 23);
        assert!(text(&line).ends_with(" 25.0% met (1/4)"));
    }

    #[test]
    fn test_compliance_bar_empty() {
        let theme = Theme::dark();
        assert_eq!(ComplianceBar::new(0, 0, &theme).percentage(), 0.0);
    }
}
