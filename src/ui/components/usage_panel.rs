//! Plan usage panel, drawn from a [`DashboardView`].

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use quotapanel_core::dashboard::{DashboardView, UsageSection, PANEL_TITLE};
use quotapanel_core::usage::Severity;

/// Width reserved for the "100% used" column
const USAGE_TEXT_WIDTH: usize = 9;
/// Narrowest bar drawn
const MIN_BAR_WIDTH: usize = 4;

/// Usage panel widget
pub struct UsagePanel;

impl UsagePanel {
    /// Height needed for `view` (0 when hidden)
    pub fn height(view: &DashboardView) -> u16 {
        let content_rows = match view {
            DashboardView::Hidden => return 0,
            DashboardView::Loading { .. } => 1,
            // title, message, blank, retry hint
            DashboardView::Failed { .. } => 4,
            DashboardView::Usage { sections, .. } => {
                let rows: usize = sections
                    .iter()
                    .map(|s| 3 + usize::from(s.note.is_some()))
                    .sum();
                // blank line between sections
                rows + sections.len().saturating_sub(1)
            }
        };
        content_rows as u16 + 2
    }

    /// Render the panel
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        view: &DashboardView,
        updated_at: Option<DateTime<Local>>,
        color: bool,
    ) {
        if matches!(view, DashboardView::Hidden) || area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .title(Self::build_title(updated_at))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Self::fg(Color::Gray, color));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = Self::lines(view, inner.width, color);
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    /// Block title, with the time of the last update
    fn build_title(updated_at: Option<DateTime<Local>>) -> String {
        match updated_at {
            Some(at) => format!(" {} ({}) ", PANEL_TITLE, at.format("%H:%M")),
            None => format!(" {} ", PANEL_TITLE),
        }
    }

    /// Content lines for `view` at the given inner width
    pub fn lines(view: &DashboardView, width: u16, color: bool) -> Vec<Line<'static>> {
        match view {
            DashboardView::Hidden => Vec::new(),
            DashboardView::Loading { text } => vec![Line::from(Span::styled(
                format!(" {}", text),
                Self::fg(Color::DarkGray, color),
            ))],
            DashboardView::Failed {
                title,
                message,
                retry_label,
            } => vec![
                Line::from(Span::styled(
                    format!(" {}", title),
                    Self::fg(Color::Red, color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!(" {}", message),
                    Self::fg(Color::Red, color),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled(
                        " [r] ",
                        Self::fg(Color::Green, color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(retry_label.to_string()),
                ]),
            ],
            DashboardView::Usage { sections, .. } => {
                let mut lines = Vec::new();
                for (i, section) in sections.iter().enumerate() {
                    if i > 0 {
                        lines.push(Line::from(""));
                    }
                    lines.extend(Self::section_lines(section, width, color));
                }
                lines
            }
        }
    }

    /// " Current session"
    /// " ███████████░░░░░░░░░░  50% used"
    /// " Resets in 1 hr 0 min"
    fn section_lines(section: &UsageSection, width: u16, color: bool) -> Vec<Line<'static>> {
        let dim = Style::default().add_modifier(Modifier::DIM);

        let bar_width = (width as usize)
            .saturating_sub(1 + 1 + USAGE_TEXT_WIDTH)
            .max(MIN_BAR_WIDTH);
        let (filled, empty) = Self::bar_cells(bar_width, section.bar_fill_percent);
        let padding = USAGE_TEXT_WIDTH.saturating_sub(section.usage_text.width());

        let mut lines = vec![
            Line::from(Span::styled(
                format!(" {}", section.label),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "█".repeat(filled),
                    Self::fg(Self::severity_color(section.severity), color),
                ),
                Span::styled("░".repeat(empty), Self::fg(Color::DarkGray, color)),
                Span::raw(format!(" {}{}", " ".repeat(padding), section.usage_text)),
            ]),
            Line::from(Span::styled(format!(" {}", section.reset_text), dim)),
        ];

        if let Some(ref note) = section.note {
            lines.push(Line::from(Span::styled(
                format!(" {}", note),
                dim.add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    }

    /// Split a bar of `width` cells into (filled, empty)
    fn bar_cells(width: usize, fill_percent: f64) -> (usize, usize) {
        let filled = ((width as f64) * fill_percent / 100.0).floor() as usize;
        let filled = filled.min(width);
        (filled, width - filled)
    }

    /// Bar colour for a severity tier
    pub fn severity_color(severity: Severity) -> Color {
        match severity {
            Severity::Normal => Color::Gray,
            Severity::Warning => Color::Yellow,
            Severity::Critical => Color::Red,
        }
    }

    fn fg(color: Color, enabled: bool) -> Style {
        if enabled {
            Style::default().fg(color)
        } else {
            Style::default()
        }
    }
}
