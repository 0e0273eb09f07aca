//! Render output of the dashboard.
//!
//! A [`DashboardView`] is a plain description of what to draw. It is derived
//! from a [`ViewState`] and the current time only, so any front-end (the
//! terminal one in this repo, or a JSON consumer) can draw it without
//! touching component state.

use serde::Serialize;

use crate::usage::{
    bar_fill_percent, format_reset_duration, format_utilization_percent, RateLimitSnapshot,
    Severity,
};

use super::state::ViewState;

/// Heading of the populated panel
pub const PANEL_TITLE: &str = "Plan usage limits";
/// Text shown while the first snapshot is loading
pub const LOADING_TEXT: &str = "Loading rate limits...";
/// Heading of the error panel
pub const FAILED_TITLE: &str = "Failed to load rate limits";
/// Label of the manual retry control
pub const RETRY_LABEL: &str = "Retry";

/// Which quota window a section shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// 5-hour session window
    Session,
    /// Weekly aggregate window
    Weekly,
    /// Extra usage (overage) window
    Extra,
}

impl SectionKind {
    /// Section heading
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Session => "Current session",
            SectionKind::Weekly => "Weekly limits",
            SectionKind::Extra => "Extra usage",
        }
    }
}

/// One rendered usage window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSection {
    pub kind: SectionKind,
    /// e.g. "Current session"
    pub label: &'static str,
    /// e.g. "Resets in 1 hr 0 min"
    pub reset_text: String,
    /// e.g. "50% used"
    pub usage_text: String,
    /// Filled width of the bar, 0.0..=100.0
    pub bar_fill_percent: f64,
    pub severity: Severity,
    /// Extra line under the bar (overage disabled reason)
    pub note: Option<String>,
}

impl UsageSection {
    fn build(
        kind: SectionKind,
        utilization: f64,
        reset_time: f64,
        note: Option<String>,
        now: f64,
    ) -> Self {
        Self {
            kind,
            label: kind.label(),
            reset_text: format!("Resets in {}", format_reset_duration(reset_time, now)),
            usage_text: format!("{} used", format_utilization_percent(utilization)),
            bar_fill_percent: bar_fill_percent(utilization),
            severity: Severity::from_utilization(utilization),
            note,
        }
    }
}

/// Everything the dashboard can look like
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    /// Render nothing
    Hidden,
    /// First snapshot still on its way
    Loading { text: &'static str },
    /// Host reported an error; offer a retry
    Failed {
        title: &'static str,
        message: String,
        retry_label: &'static str,
    },
    /// Snapshot on screen
    Usage {
        title: &'static str,
        sections: Vec<UsageSection>,
    },
}

impl DashboardView {
    /// Derive the view for `state` at epoch time `now`
    pub fn from_state(state: &ViewState, now: f64) -> Self {
        match state {
            ViewState::Unauthenticated => DashboardView::Hidden,
            ViewState::Loading { stale: None } => DashboardView::Loading { text: LOADING_TEXT },
            ViewState::Loading {
                stale: Some(snapshot),
            }
            | ViewState::Ready(snapshot) => Self::usage(snapshot, now),
            ViewState::Failed(message) => DashboardView::Failed {
                title: FAILED_TITLE,
                message: message.clone(),
                retry_label: RETRY_LABEL,
            },
        }
    }

    fn usage(snapshot: &RateLimitSnapshot, now: f64) -> Self {
        let mut sections = vec![UsageSection::build(
            SectionKind::Session,
            snapshot.five_hour.utilization,
            snapshot.five_hour.reset_time,
            None,
            now,
        )];

        if let Some(ref weekly) = snapshot.weekly_unified {
            sections.push(UsageSection::build(
                SectionKind::Weekly,
                weekly.utilization,
                weekly.reset_time,
                None,
                now,
            ));
        }

        if let Some(ref overage) = snapshot.overage {
            sections.push(UsageSection::build(
                SectionKind::Extra,
                overage.utilization,
                overage.reset_time,
                overage.disabled_reason.clone().filter(|r| !r.is_empty()),
                now,
            ));
        }

        DashboardView::Usage {
            title: PANEL_TITLE,
            sections,
        }
    }

    /// Sections on screen (empty unless showing usage)
    pub fn sections(&self) -> &[UsageSection] {
        match self {
            DashboardView::Usage { sections, .. } => sections,
            _ => &[],
        }
    }

    /// Error message on screen, if any
    pub fn error_message(&self) -> Option<&str> {
        match self {
            DashboardView::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether a retry control is offered
    pub fn offers_retry(&self) -> bool {
        matches!(self, DashboardView::Failed { .. })
    }
}
