use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Style},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use quotapanel_core::announcement::{
    should_show, Announcement, AnnouncementDialog, AnnouncementStore, FileAnnouncementStore,
};
use quotapanel_core::channel::{HostEndpoint, MessageBus};
use quotapanel_core::config::Settings;
use quotapanel_core::dashboard::{DashboardView, RateLimitDashboard, ViewState};
use quotapanel_core::usage::{format_utilization_percent, Clock, SystemClock};

use crate::host::{Scenario, SimulatedHost};

use super::components::{AnnouncementPopup, StatusBar, StatusInfo, UsagePanel};
use super::key_handler::{resolve_key, KeyAction};
use super::Layout;

const SIGNED_OUT_HINT: &str = " Signed out. Press 'a' to sign in.";

/// Announcement currently on screen
struct ActiveAnnouncement {
    content: Announcement,
    dialog: AnnouncementDialog,
}

/// Main application
pub struct App {
    settings: Settings,
    bus: MessageBus,
    dashboard: RateLimitDashboard,
    /// Host end of the channel until `run` hands it to the simulated host.
    /// Held for the app's lifetime when no host runs.
    host_endpoint: Option<HostEndpoint>,
    scenario: Option<Scenario>,
    clock: Arc<dyn Clock>,
    announcement: Option<ActiveAnnouncement>,
    layout: Layout,
    authenticated: bool,
    updated_at: Option<DateTime<Local>>,
    running: bool,
}

impl App {
    /// Create a new application recording announcements in the state file
    pub fn new(settings: Settings) -> Result<Self> {
        let store = FileAnnouncementStore::new(settings.announcement.state_path());
        Self::with_store(settings, Arc::new(store))
    }

    /// Create a new application with the given announcement store
    pub fn with_store(settings: Settings, store: Arc<dyn AnnouncementStore>) -> Result<Self> {
        let scenario = if settings.host.enabled {
            Some(settings.host.scenario.parse::<Scenario>()?)
        } else {
            None
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let (bus, host_endpoint) = MessageBus::new();
        let dashboard = RateLimitDashboard::mount(bus.clone(), clock.clone());
        let announcement = Self::load_announcement(&settings, store);

        Ok(Self {
            authenticated: settings.authenticated_on_start,
            settings,
            bus,
            dashboard,
            host_endpoint: Some(host_endpoint),
            scenario,
            clock,
            announcement,
            layout: Layout::new(),
            updated_at: None,
            running: true,
        })
    }

    fn load_announcement(
        settings: &Settings,
        store: Arc<dyn AnnouncementStore>,
    ) -> Option<ActiveAnnouncement> {
        let config = &settings.announcement;
        if !config.enabled {
            return None;
        }

        let last_shown = store.last_shown().unwrap_or_else(|e| {
            warn!("Could not read announcement state: {}", e);
            None
        });
        if !should_show(&config.id, last_shown.as_deref()) {
            debug!("Announcement {} already shown", config.id);
            return None;
        }

        let id = config.id.clone();
        let dialog = AnnouncementDialog::new(move || {
            if let Err(e) = store.mark_shown(&id) {
                warn!("Could not record announcement {} as shown: {}", id, e);
            }
        });
        Some(ActiveAnnouncement {
            content: Announcement::for_release(
                &config.id,
                env!("CARGO_PKG_VERSION"),
                &config.repository_url,
            ),
            dialog,
        })
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        if let Some(scenario) = self.scenario {
            if let Some(endpoint) = self.host_endpoint.take() {
                let latency = Duration::from_millis(self.settings.host.latency_ms);
                SimulatedHost::new(endpoint, scenario, latency, self.clock.clone()).start();
            }
        } else {
            info!("Simulated host disabled, requests will stay unanswered");
        }

        self.dashboard.on_authenticated_change(self.authenticated);

        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let tick = Duration::from_millis(self.settings.ui.tick_ms);

        while self.running {
            self.pump();

            terminal.draw(|frame| self.draw(frame))?;

            // Handle events with timeout
            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }
        }

        Ok(())
    }

    /// Apply queued host replies to the dashboard
    fn pump(&mut self) {
        if self.dashboard.pump() && matches!(self.dashboard.state(), ViewState::Ready(_)) {
            self.updated_at = Some(Local::now());
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let view = self.dashboard.render();
        let hidden = matches!(view, DashboardView::Hidden);
        let panel_height = if hidden { 1 } else { UsagePanel::height(&view) };
        let areas = self.layout.calculate(frame.area(), panel_height);

        if hidden {
            frame.render_widget(
                Paragraph::new(SIGNED_OUT_HINT).style(Style::default().fg(Color::DarkGray)),
                areas.panel,
            );
        } else {
            UsagePanel::render(
                frame,
                areas.panel,
                &view,
                self.updated_at,
                self.settings.ui.color,
            );
        }

        StatusBar::render(frame, areas.status_bar, &self.status_info());

        if let Some(ref active) = self.announcement {
            if active.dialog.is_open() {
                let popup_area = self.layout.popup_area(frame.area(), 60, 50);
                AnnouncementPopup::render(frame, popup_area, &active.content);
            }
        }
    }

    fn status_info(&self) -> StatusInfo {
        StatusInfo {
            authenticated: self.authenticated,
            host: self.scenario.map(|s| s.name().to_string()),
            announcement_open: self.announcement_open(),
            loading: self.dashboard.state().is_loading(),
            peak: self
                .dashboard
                .state()
                .snapshot()
                .map(|s| format_utilization_percent(s.peak_utilization())),
        }
    }

    fn announcement_open(&self) -> bool {
        self.announcement
            .as_ref()
            .is_some_and(|active| active.dialog.is_open())
    }

    /// Close the announcement, recording it as shown
    fn close_announcement(&mut self) {
        if let Some(mut active) = self.announcement.take() {
            active.dialog.close();
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let action = resolve_key(code, modifiers, self.announcement_open());
        self.execute(action);
    }

    fn execute(&mut self, action: KeyAction) {
        match action {
            KeyAction::None => {}
            KeyAction::Quit => {
                self.close_announcement();
                self.running = false;
            }
            KeyAction::ToggleAuth => {
                self.authenticated = !self.authenticated;
                info!(
                    "User signed {}",
                    if self.authenticated { "in" } else { "out" }
                );
                self.dashboard.on_authenticated_change(self.authenticated);
                if !self.authenticated {
                    self.updated_at = None;
                }
            }
            KeyAction::Refresh => {
                if matches!(self.dashboard.state(), ViewState::Failed(_)) {
                    self.dashboard.retry();
                } else {
                    self.dashboard.request_refresh();
                }
            }
            KeyAction::CloseAnnouncement => self.close_announcement(),
            KeyAction::OpenRepository => {
                if let Some(ref active) = self.announcement {
                    if let Err(e) = active.content.open_repository(&self.bus) {
                        warn!("Could not open {}: {}", active.content.repository_url, e);
                    }
                }
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // an exit that bypassed the quit keys still counts as shown
        self.close_announcement();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotapanel_core::announcement::MemoryAnnouncementStore;
    use quotapanel_core::protocol::OutboundMessage;
    use ratatui::backend::TestBackend;

    fn settings(host: bool, announcement: bool) -> Settings {
        let mut settings = Settings::default();
        settings.host.enabled = host;
        settings.announcement.enabled = announcement;
        settings.announcement.id = "2026-10".to_string();
        settings.authenticated_on_start = false;
        settings
    }

    fn app(host: bool, announcement: bool) -> (App, Arc<MemoryAnnouncementStore>) {
        let store = Arc::new(MemoryAnnouncementStore::new());
        let app = App::with_store(settings(host, announcement), store.clone()).unwrap();
        (app, store)
    }

    fn press(app: &mut App, c: char) {
        app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..24u16 {
            for x in 0..80u16 {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_app_creation() {
        let (app, _store) = app(true, false);
        assert_eq!(app.scenario, Some(Scenario::Healthy));
        assert!(app.running);
        assert!(!app.announcement_open());
    }

    #[test]
    fn test_unknown_scenario_is_an_error() {
        let mut settings = settings(true, false);
        settings.host.scenario = "chaos".to_string();
        let store = Arc::new(MemoryAnnouncementStore::new());
        assert!(App::with_store(settings, store).is_err());
    }

    #[test]
    fn test_toggle_auth_requests_rate_limits() {
        let (mut app, _store) = app(false, false);
        press(&mut app, 'a');

        assert!(app.dashboard.is_authenticated());
        assert!(app.dashboard.state().is_loading());
        let endpoint = app.host_endpoint.as_mut().unwrap();
        assert_eq!(endpoint.try_recv(), Some(OutboundMessage::RequestRateLimits));

        press(&mut app, 'a');
        assert_eq!(app.dashboard.state(), &ViewState::Unauthenticated);
    }

    #[test]
    fn test_refresh_while_signed_out_sends_nothing() {
        let (mut app, _store) = app(false, false);
        press(&mut app, 'r');
        assert_eq!(app.host_endpoint.as_mut().unwrap().try_recv(), None);
    }

    #[test]
    fn test_announcement_close_records_id() {
        let (mut app, store) = app(false, true);
        assert!(app.announcement_open());

        // quit key closes the dialog first
        press(&mut app, 'q');
        assert!(app.running);
        assert!(!app.announcement_open());
        assert_eq!(store.last_shown().unwrap().as_deref(), Some("2026-10"));

        press(&mut app, 'q');
        assert!(!app.running);
    }

    #[test]
    fn test_ctrl_c_with_announcement_open_records_id() {
        let (mut app, store) = app(false, true);
        assert!(app.announcement_open());

        app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!app.running);
        assert!(!app.announcement_open());
        assert_eq!(store.last_shown().unwrap().as_deref(), Some("2026-10"));
    }

    #[test]
    fn test_dropping_app_records_open_announcement() {
        let (app, store) = app(false, true);
        assert!(app.announcement_open());

        drop(app);
        assert_eq!(store.last_shown().unwrap().as_deref(), Some("2026-10"));
    }

    #[test]
    fn test_announcement_not_shown_twice() {
        let store = Arc::new(MemoryAnnouncementStore::new());
        store.mark_shown("2026-10").unwrap();
        let app = App::with_store(settings(false, true), store).unwrap();
        assert!(!app.announcement_open());
    }

    #[test]
    fn test_open_repository_posts_to_host() {
        let (mut app, _store) = app(false, true);
        press(&mut app, 'o');

        let endpoint = app.host_endpoint.as_mut().unwrap();
        assert!(matches!(
            endpoint.try_recv(),
            Some(OutboundMessage::OpenExternal { .. })
        ));
        assert!(app.announcement_open());
    }

    #[test]
    fn test_draw_signed_out_and_loading() {
        let (mut app, _store) = app(false, false);
        assert!(screen_text(&app).contains("Signed out"));

        press(&mut app, 'a');
        let text = screen_text(&app);
        assert!(text.contains("Loading rate limits..."));
        assert!(text.contains("SIGNED IN"));
    }

    #[test]
    fn test_draw_announcement_popup() {
        let (app, _store) = app(false, true);
        let text = screen_text(&app);
        assert!(text.contains("What's new in"));
    }
}
