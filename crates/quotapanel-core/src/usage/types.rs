//! Rate-limit snapshot types as sent by the host.

use serde::{Deserialize, Serialize};

/// One quota period (e.g. the 5-hour session window)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageWindow {
    /// Fraction of the window used (1.0 = 100%, may exceed 1.0)
    pub utilization: f64,
    /// Reset time as Unix epoch seconds (0 = unknown)
    #[serde(default)]
    pub reset_time: f64,
}

/// The extra-usage window, which may carry a reason it is disabled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverageWindow {
    /// Fraction of the window used
    pub utilization: f64,
    /// Reset time as Unix epoch seconds (0 = unknown)
    #[serde(default)]
    pub reset_time: f64,
    /// Why extra usage is unavailable (e.g. "Extra usage is turned off")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_reason: Option<String>,
}

/// Complete rate-limit snapshot.
///
/// Replaced wholesale on every successful response, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitSnapshot {
    /// Short-period (5-hour) session window
    pub five_hour: UsageWindow,
    /// Weekly aggregate across models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_unified: Option<UsageWindow>,
    /// Extra usage beyond the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overage: Option<OverageWindow>,
}

impl UsageWindow {
    /// Create a window from a utilization fraction and reset epoch
    pub fn new(utilization: f64, reset_time: f64) -> Self {
        Self {
            utilization,
            reset_time,
        }
    }
}

impl RateLimitSnapshot {
    /// Snapshot with only the session window
    pub fn session_only(utilization: f64, reset_time: f64) -> Self {
        Self {
            five_hour: UsageWindow::new(utilization, reset_time),
            weekly_unified: None,
            overage: None,
        }
    }

    /// Highest utilization across all present windows
    pub fn peak_utilization(&self) -> f64 {
        let mut peak = self.five_hour.utilization;
        if let Some(ref weekly) = self.weekly_unified {
            peak = peak.max(weekly.utilization);
        }
        if let Some(ref overage) = self.overage {
            peak = peak.max(overage.utilization);
        }
        peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_round_trip_shape() {
        let snapshot = RateLimitSnapshot {
            five_hour: UsageWindow::new(0.5, 100.0),
            weekly_unified: None,
            overage: Some(OverageWindow {
                utilization: 0.2,
                reset_time: 200.0,
                disabled_reason: None,
            }),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["fiveHour"]["resetTime"], 100.0);
        assert!(json.get("weeklyUnified").is_none());
        assert!(json["overage"].get("disabledReason").is_none());
    }

    #[test]
    fn test_missing_reset_time_defaults_to_unknown() {
        let window: UsageWindow = serde_json::from_str(r#"{"utilization":0.3}"#).unwrap();
        assert_eq!(window.reset_time, 0.0);
    }

    #[test]
    fn test_peak_utilization() {
        let mut snapshot = RateLimitSnapshot::session_only(0.3, 0.0);
        assert_eq!(snapshot.peak_utilization(), 0.3);

        snapshot.weekly_unified = Some(UsageWindow::new(0.9, 0.0));
        assert_eq!(snapshot.peak_utilization(), 0.9);
    }
}
