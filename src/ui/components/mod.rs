mod announcement_popup;
mod status_bar;
mod usage_panel;

pub use announcement_popup::AnnouncementPopup;
pub use status_bar::{StatusBar, StatusInfo};
pub use usage_panel::UsagePanel;
