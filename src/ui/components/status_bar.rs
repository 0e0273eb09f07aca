use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// What the status bar reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// Signed-in flag fed to the dashboard
    pub authenticated: bool,
    /// Simulated host scenario, `None` when no host runs
    pub host: Option<String>,
    /// Whether the announcement dialog is up
    pub announcement_open: bool,
    /// A request is in flight
    pub loading: bool,
    /// Highest utilization on screen, e.g. "83%"
    pub peak: Option<String>,
}

/// Status bar widget
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn render(frame: &mut Frame, area: Rect, info: &StatusInfo) {
        let paragraph = Paragraph::new(Line::from(Self::spans(info)))
            .style(Style::default().bg(Color::Black));
        frame.render_widget(paragraph, area);
    }

    fn spans(info: &StatusInfo) -> Vec<Span<'static>> {
        let mut spans = vec![];

        if info.authenticated {
            spans.push(Span::styled(
                " SIGNED IN ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(
                " SIGNED OUT ",
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ));
        }
        spans.push(Span::raw(" "));

        let host = match info.host {
            Some(ref scenario) => format!("host: {}", scenario),
            None => "host: off".to_string(),
        };
        spans.push(Span::styled(host, Style::default().fg(Color::DarkGray)));

        if let Some(ref peak) = info.peak {
            spans.push(Span::styled(
                format!(" peak {}", peak),
                Style::default().fg(Color::White),
            ));
        }

        if info.loading {
            spans.push(Span::styled(
                " (waiting...)",
                Style::default().fg(Color::DarkGray),
            ));
        }
        spans.push(Span::raw("  "));

        let hints: &[(&str, &str)] = if info.announcement_open {
            &[("Enter", "Close"), ("o", "Open link")]
        } else {
            &[("a", "Sign in/out"), ("r", "Refresh"), ("q", "Quit")]
        };
        for (key, desc) in hints {
            spans.push(Span::styled(
                key.to_string(),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::styled(
                format!(":{} ", desc),
                Style::default().fg(Color::White),
            ));
        }

        spans
    }
}
