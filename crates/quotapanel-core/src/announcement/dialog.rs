//! Announcement content and the dialog visibility toggle.

use tracing::debug;

use crate::channel::{ChannelError, MessageBus};
use crate::protocol::OutboundMessage;

/// Repository the announcement links to
pub const DEFAULT_REPOSITORY_URL: &str = "https://github.com/PabloVitasso/Klaus-Code";

/// Whether the announcement `latest_id` still needs to be shown
pub fn should_show(latest_id: &str, last_shown: Option<&str>) -> bool {
    last_shown != Some(latest_id)
}

/// What the announcement says
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    /// Identifier recorded once shown (normally the release version)
    pub id: String,
    /// Release version shown in the title
    pub version: String,
    /// Lead-in above the highlights
    pub heading: String,
    /// One line per release highlight
    pub highlights: Vec<String>,
    /// Link opened through the host
    pub repository_url: String,
}

impl Announcement {
    /// Announcement for the given release
    pub fn for_release(id: &str, version: &str, repository_url: &str) -> Self {
        Self {
            id: id.to_string(),
            version: version.to_string(),
            heading: "This release brings:".to_string(),
            highlights: vec![
                "Provider integrations moved to the AI SDK".to_string(),
                "Individual tools can now be disabled".to_string(),
                "Telemetry is disabled".to_string(),
            ],
            repository_url: repository_url.to_string(),
        }
    }

    /// Dialog title
    pub fn title(&self) -> String {
        format!("What's new in {}", self.version)
    }

    /// Footer line pointing at the repository
    pub fn repository_line(&self) -> String {
        format!("Source and issues: {}", self.repository_url)
    }

    /// Ask the host to open the repository link
    pub fn open_repository(&self, bus: &MessageBus) -> Result<(), ChannelError> {
        bus.post_message(OutboundMessage::OpenExternal {
            url: self.repository_url.clone(),
        })
    }
}

/// Visibility toggle for the announcement dialog.
///
/// Open on creation. Every close, whichever way it happens, calls `on_hide`
/// once so the caller can record the announcement as seen.
pub struct AnnouncementDialog {
    open: bool,
    on_hide: Box<dyn FnMut() + Send>,
}

impl AnnouncementDialog {
    /// Create an open dialog
    pub fn new(on_hide: impl FnMut() + Send + 'static) -> Self {
        Self {
            open: true,
            on_hide: Box::new(on_hide),
        }
    }

    /// Whether the dialog is visible
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Change visibility. Closing an open dialog fires `on_hide`.
    pub fn set_open(&mut self, open: bool) {
        let closing = self.open && !open;
        self.open = open;
        if closing {
            debug!("Announcement dismissed");
            (self.on_hide)();
        }
    }

    /// Close the dialog
    pub fn close(&mut self) {
        self.set_open(false);
    }
}

impl std::fmt::Debug for AnnouncementDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnouncementDialog")
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}
