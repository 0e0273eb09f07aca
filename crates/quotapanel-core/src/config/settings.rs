use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Plan usage panel for the Claude Code host channel")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Do not start the simulated host (requests stay unanswered)
    #[arg(long)]
    pub no_host: bool,

    /// Simulated host scenario (healthy, busy, critical, error, empty, flaky)
    #[arg(short, long)]
    pub scenario: Option<String>,

    /// Simulated host reply latency in milliseconds
    #[arg(short = 'L', long)]
    pub latency_ms: Option<u64>,

    /// Start signed in
    #[arg(short, long, action = clap::ArgAction::Set)]
    pub authenticated: Option<bool>,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether the panel starts signed in
    #[serde(default = "default_authenticated_on_start")]
    pub authenticated_on_start: bool,

    /// Simulated host settings
    #[serde(default)]
    pub host: HostSettings,

    /// Release announcement settings
    #[serde(default)]
    pub announcement: AnnouncementSettings,

    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,
}

fn default_authenticated_on_start() -> bool {
    true
}

/// Simulated host settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSettings {
    /// Run the simulated host
    #[serde(default = "default_host_enabled")]
    pub enabled: bool,

    /// Delay before each reply, in milliseconds
    #[serde(default = "default_host_latency")]
    pub latency_ms: u64,

    /// Scenario name
    #[serde(default = "default_host_scenario")]
    pub scenario: String,
}

fn default_host_enabled() -> bool {
    true
}

fn default_host_latency() -> u64 {
    400
}

fn default_host_scenario() -> String {
    "healthy".to_string()
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            enabled: default_host_enabled(),
            latency_ms: default_host_latency(),
            scenario: default_host_scenario(),
        }
    }
}

/// Release announcement settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementSettings {
    /// Show the announcement at all
    #[serde(default = "default_announcement_enabled")]
    pub enabled: bool,

    /// Announcement id; a new id shows the announcement again
    #[serde(default = "default_announcement_id")]
    pub id: String,

    /// Repository link shown in the announcement
    #[serde(default = "default_repository_url")]
    pub repository_url: String,

    /// Override for the file recording the last shown id
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

fn default_announcement_enabled() -> bool {
    true
}

fn default_announcement_id() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_repository_url() -> String {
    crate::announcement::DEFAULT_REPOSITORY_URL.to_string()
}

impl Default for AnnouncementSettings {
    fn default() -> Self {
        Self {
            enabled: default_announcement_enabled(),
            id: default_announcement_id(),
            repository_url: default_repository_url(),
            state_file: None,
        }
    }
}

impl AnnouncementSettings {
    /// File the announcement store writes to
    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(crate::paths::announcement_state_path)
    }
}

/// UI-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Enable color output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Input poll tick in milliseconds
    #[serde(default = "default_tick")]
    pub tick_ms: u64,
}

fn default_color() -> bool {
    true
}

fn default_tick() -> u64 {
    50
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            color: default_color(),
            tick_ms: default_tick(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            authenticated_on_start: default_authenticated_on_start(),
            host: HostSettings::default(),
            announcement: AnnouncementSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::load_file(p);
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("quotapanel/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/quotapanel/config.toml")),
            dirs::home_dir().map(|p| p.join(".quotapanel.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    fn load_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if cli.no_host {
            self.host.enabled = false;
        }
        if let Some(ref scenario) = cli.scenario {
            self.host.scenario = scenario.clone();
        }
        if let Some(latency) = cli.latency_ms {
            self.host.latency_ms = latency;
        }
        if let Some(authenticated) = cli.authenticated {
            self.authenticated_on_start = authenticated;
        }
    }

    /// Validate and normalize settings values
    pub fn validate(&mut self) {
        const MIN_TICK_MS: u64 = 10;
        const MAX_LATENCY_MS: u64 = 60_000;

        if self.ui.tick_ms < MIN_TICK_MS {
            self.ui.tick_ms = MIN_TICK_MS;
        }
        if self.host.latency_ms > MAX_LATENCY_MS {
            self.host.latency_ms = MAX_LATENCY_MS;
        }
        self.host.scenario = self.host.scenario.trim().to_lowercase();
    }
}
