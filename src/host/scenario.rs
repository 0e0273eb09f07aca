use std::fmt;
use std::str::FromStr;

use anyhow::bail;

use quotapanel_core::protocol::{InboundMessage, ProtocolError};
use quotapanel_core::usage::{OverageWindow, RateLimitSnapshot, UsageWindow};

const HOUR: f64 = 3600.0;
const DAY: f64 = 24.0 * HOUR;

/// Scripted behaviour of the simulated host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Moderate session usage plus a weekly window
    Healthy,
    /// All three windows, extra usage switched off
    Busy,
    /// Everything at or past the critical tier
    Critical,
    /// Every request fails with a host error
    Error,
    /// Replies carry neither `error` nor `values`
    Empty,
    /// Alternates error and data, starting with an error
    Flaky,
}

impl Scenario {
    /// Every scenario, in help-text order
    pub const ALL: [Scenario; 6] = [
        Scenario::Healthy,
        Scenario::Busy,
        Scenario::Critical,
        Scenario::Error,
        Scenario::Empty,
        Scenario::Flaky,
    ];

    /// Config/CLI name
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Healthy => "healthy",
            Scenario::Busy => "busy",
            Scenario::Critical => "critical",
            Scenario::Error => "error",
            Scenario::Empty => "empty",
            Scenario::Flaky => "flaky",
        }
    }

    /// Reply to the `request_index`-th request (0-based), at epoch `now`
    pub fn respond(&self, request_index: u64, now: f64) -> Result<InboundMessage, ProtocolError> {
        match self {
            Scenario::Healthy => InboundMessage::rate_limits(&healthy(request_index, now)),
            Scenario::Busy => InboundMessage::rate_limits(&busy(now)),
            Scenario::Critical => InboundMessage::rate_limits(&critical(now)),
            Scenario::Error => Ok(InboundMessage::rate_limits_error(
                "rate limit service unavailable",
            )),
            Scenario::Empty => Ok(InboundMessage::rate_limits_empty()),
            Scenario::Flaky => {
                if request_index % 2 == 0 {
                    Ok(InboundMessage::rate_limits_error(
                        "upstream timed out while reading usage",
                    ))
                } else {
                    InboundMessage::rate_limits(&healthy(request_index / 2, now))
                }
            }
        }
    }
}

/// Session usage creeps up a little with every refresh
fn healthy(request_index: u64, now: f64) -> RateLimitSnapshot {
    let session = (0.42 + 0.04 * request_index as f64).min(1.2);
    RateLimitSnapshot {
        five_hour: UsageWindow::new(session, now + 2.5 * HOUR),
        weekly_unified: Some(UsageWindow::new(0.23, now + 3.0 * DAY + 5.0 * HOUR)),
        overage: None,
    }
}

fn busy(now: f64) -> RateLimitSnapshot {
    RateLimitSnapshot {
        five_hour: UsageWindow::new(0.83, now + 1800.0),
        weekly_unified: Some(UsageWindow::new(0.61, now + 100_000.0)),
        overage: Some(OverageWindow {
            utilization: 0.0,
            reset_time: 0.0,
            disabled_reason: Some("Extra usage is not enabled for this organization".to_string()),
        }),
    }
}

fn critical(now: f64) -> RateLimitSnapshot {
    RateLimitSnapshot {
        five_hour: UsageWindow::new(0.97, now + 7500.0),
        weekly_unified: Some(UsageWindow::new(0.953, now + DAY + 2.0 * HOUR)),
        overage: Some(OverageWindow {
            utilization: 1.4,
            reset_time: now + 12.0 * DAY,
            disabled_reason: None,
        }),
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if let Some(scenario) = Scenario::ALL.iter().find(|sc| sc.name() == wanted) {
            return Ok(*scenario);
        }
        let names: Vec<&str> = Scenario::ALL.iter().map(|sc| sc.name()).collect();
        bail!(
            "unknown host scenario '{}' (expected one of: {})",
            s,
            names.join(", ")
        )
    }
}
