use ratatui::layout::{Constraint, Direction, Rect};

/// Status bar height
const STATUS_BAR_HEIGHT: u16 = 1;
/// Panel never grows wider than this
const MAX_PANEL_WIDTH: u16 = 72;

/// Computed layout areas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutAreas {
    /// Usage panel
    pub panel: Rect,
    /// Bottom status line
    pub status_bar: Rect,
}

/// Layout configuration for the UI
#[derive(Debug, Clone)]
pub struct Layout {
    /// Maximum width of the usage panel
    pub max_panel_width: u16,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    /// Create a new layout with default settings
    pub fn new() -> Self {
        Self {
            max_panel_width: MAX_PANEL_WIDTH,
        }
    }

    /// Split the screen into the panel and the status bar.
    ///
    /// The panel is `panel_height` rows tall (clamped to the screen) and
    /// horizontally centered.
    pub fn calculate(&self, area: Rect, panel_height: u16) -> LayoutAreas {
        let rows = ratatui::layout::Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
            .split(area);

        let body = rows[0];
        let width = body.width.min(self.max_panel_width);
        let height = body.height.min(panel_height);
        let panel = Rect {
            x: body.x + (body.width - width) / 2,
            y: body.y,
            width,
            height,
        };

        LayoutAreas {
            panel,
            status_bar: rows[1],
        }
    }

    /// Calculate popup area (centered)
    pub fn popup_area(&self, area: Rect, width_pct: u16, height_pct: u16) -> Rect {
        let popup_layout = ratatui::layout::Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - height_pct) / 2),
                Constraint::Percentage(height_pct),
                Constraint::Percentage((100 - height_pct) / 2),
            ])
            .split(area);

        ratatui::layout::Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - width_pct) / 2),
                Constraint::Percentage(width_pct),
                Constraint::Percentage((100 - width_pct) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}
