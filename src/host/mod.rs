//! Simulated host process.
//!
//! Stands in for the privileged editor host so the panel can run on its
//! own: it answers `requestClaudeCodeRateLimits` over the channel with
//! replies scripted by a [`Scenario`].

mod scenario;
mod simulator;

pub use scenario::Scenario;
pub use simulator::SimulatedHost;
