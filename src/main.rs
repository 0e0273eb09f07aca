use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quotapanel_core::config::{Config, Settings};
use quotapanel_core::paths;

mod host;
mod ui;

use ui::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug)?;

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    // Run the application
    let mut app = App::new(settings)?;
    app.run().await
}

/// Log to a file in the state directory; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default filter.
fn setup_logging(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("quotapanel=debug,quotapanel_core=debug")
        } else {
            EnvFilter::new("quotapanel=info,quotapanel_core=info")
        }
    });

    paths::ensure_state_dir()?;
    let log_path = paths::log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {:?}", log_path))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
