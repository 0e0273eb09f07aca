//! Tri-state view model for the dashboard.

use crate::protocol::RateLimitsResponse;
use crate::usage::RateLimitSnapshot;

/// Shown when the host answers with neither `error` nor `values`
pub const EMPTY_RESPONSE_MESSAGE: &str = "Rate limit response contained no data";

/// What the dashboard currently knows
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    /// Not signed in: nothing requested, nothing held
    #[default]
    Unauthenticated,
    /// A request is outstanding. `stale` is the previous snapshot when a
    /// refresh was issued while one was on screen.
    Loading { stale: Option<RateLimitSnapshot> },
    /// Latest snapshot from the host
    Ready(RateLimitSnapshot),
    /// Last request failed; any snapshot was discarded
    Failed(String),
}

impl ViewState {
    /// Snapshot currently held (fresh or stale)
    pub fn snapshot(&self) -> Option<&RateLimitSnapshot> {
        match self {
            ViewState::Ready(snapshot) => Some(snapshot),
            ViewState::Loading { stale } => stale.as_ref(),
            _ => None,
        }
    }

    /// Error message currently held
    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Whether a request is outstanding
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    /// State after a request has been sent
    pub fn begin_request(self) -> ViewState {
        let stale = match self {
            ViewState::Ready(snapshot) => Some(snapshot),
            ViewState::Loading { stale } => stale,
            ViewState::Unauthenticated | ViewState::Failed(_) => None,
        };
        ViewState::Loading { stale }
    }

    /// State after a response arrived. The previous state is replaced
    /// wholesale; an error never keeps the old snapshot around.
    pub fn apply_response(response: RateLimitsResponse) -> ViewState {
        if let Some(error) = response.error_text() {
            return ViewState::Failed(error.to_string());
        }
        match response.values {
            Some(values) => ViewState::Ready(values),
            None => ViewState::Failed(EMPTY_RESPONSE_MESSAGE.to_string()),
        }
    }
}
