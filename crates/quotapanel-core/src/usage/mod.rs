//! Rate-limit usage data and its presentation helpers.
//!
//! Snapshots are computed entirely by the host; this module only models
//! them and turns them into display text.

pub mod clock;
pub mod format;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use format::{
    bar_fill_percent, format_reset_duration, format_utilization_percent, Severity,
};
pub use types::{OverageWindow, RateLimitSnapshot, UsageWindow};
