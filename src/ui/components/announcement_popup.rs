use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use quotapanel_core::announcement::Announcement;

/// Release announcement popup
pub struct AnnouncementPopup;

impl AnnouncementPopup {
    /// Render the popup
    pub fn render(frame: &mut Frame, area: Rect, announcement: &Announcement) {
        // Clear the area first
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", announcement.title()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));

        let paragraph = Paragraph::new(Self::lines(announcement))
            .block(block)
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, area);
    }

    fn lines(announcement: &Announcement) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(" {}", announcement.heading),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
        ];

        lines.extend(announcement.highlights.iter().map(|highlight| {
            Line::from(vec![
                Span::styled("  • ", Style::default().fg(Color::Cyan)),
                Span::styled(highlight.clone(), Style::default().fg(Color::White)),
            ])
        }));

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", announcement.repository_line()),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Self::key_span("o"),
            Span::styled("Open link  ", Style::default().fg(Color::DarkGray)),
            Self::key_span("Enter/Esc"),
            Span::styled("Close", Style::default().fg(Color::DarkGray)),
        ]));
        lines
    }

    fn key_span(key: &str) -> Span<'static> {
        Span::styled(
            format!(" {} ", key),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    }
}
