mod settings;

pub use settings::{AnnouncementSettings, Config, HostSettings, Settings, UiSettings};
