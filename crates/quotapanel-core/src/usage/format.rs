//! Display formatting for usage windows.
//!
//! These must produce byte-identical text to the host's own web panel, so
//! the two percentage clamps below are deliberately different: the text
//! rounds before clamping, the bar width clamps the raw value.

use serde::Serialize;

const SECS_PER_HOUR: f64 = 3600.0;
const SECS_PER_MINUTE: f64 = 60.0;

/// Percentage at which a bar turns to the warning colour
pub const WARNING_THRESHOLD: f64 = 80.0;
/// Percentage at which a bar turns to the critical colour
pub const CRITICAL_THRESHOLD: f64 = 95.0;

/// Colour tier of a usage bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Below 80%
    Normal,
    /// 80% up to (not including) 95%
    Warning,
    /// 95% and above
    Critical,
}

impl Severity {
    /// Classify a utilization fraction. Lower bounds are inclusive.
    pub fn from_utilization(utilization: f64) -> Self {
        let percent = bar_fill_percent(utilization);
        if percent >= CRITICAL_THRESHOLD {
            Severity::Critical
        } else if percent >= WARNING_THRESHOLD {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

/// Format a reset timestamp as a countdown relative to `now`.
///
/// Both arguments are Unix epoch seconds. A zero (or NaN) reset time means
/// the host does not know when the window resets.
///
/// ```text
///   0                 -> "N/A"
///   now - 10          -> "now"
///   now + 1800        -> "30 min"
///   now + 7500        -> "2 hr 5 min"
///   now + 100000      -> "1 day 3 hr"
/// ```
pub fn format_reset_duration(reset_time: f64, now: f64) -> String {
    if reset_time == 0.0 || reset_time.is_nan() {
        return "N/A".to_string();
    }

    let diff = reset_time - now;
    if diff <= 0.0 {
        return "now".to_string();
    }

    let hours = (diff / SECS_PER_HOUR).floor() as u64;
    let minutes = ((diff % SECS_PER_HOUR) / SECS_PER_MINUTE).floor() as u64;

    if hours > 24 {
        let days = hours / 24;
        let remaining_hours = hours % 24;
        let plural = if days > 1 { "s" } else { "" };
        return format!("{} day{} {} hr", days, plural, remaining_hours);
    }

    if hours > 0 {
        return format!("{} hr {} min", hours, minutes);
    }

    format!("{} min", minutes)
}

/// Format a utilization fraction as whole-percent text, capped at 100%
pub fn format_utilization_percent(utilization: f64) -> String {
    let percent = utilization * 100.0;
    let rounded = if percent.is_nan() || percent <= 0.0 {
        0.0
    } else {
        // away from zero is half-up for positives, as in the web panel
        percent.round().min(100.0)
    };
    format!("{}%", rounded as i64)
}

/// Width of the filled part of a usage bar, in percent (0.0..=100.0)
pub fn bar_fill_percent(utilization: f64) -> f64 {
    let percent = utilization * 100.0;
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}
