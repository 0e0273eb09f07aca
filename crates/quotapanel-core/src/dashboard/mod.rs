//! Rate-limit status dashboard.
//!
//! [`RateLimitDashboard`] is the mounted component: it owns a channel
//! subscription, sends `requestClaudeCodeRateLimits` when the user becomes
//! authenticated or asks for a retry, and folds responses into a
//! [`ViewState`]. [`DashboardView`] is what it renders to.

mod component;
mod state;
mod view;

pub use component::RateLimitDashboard;
pub use state::{ViewState, EMPTY_RESPONSE_MESSAGE};
pub use view::{
    DashboardView, SectionKind, UsageSection, FAILED_TITLE, LOADING_TEXT, PANEL_TITLE,
    RETRY_LABEL,
};
