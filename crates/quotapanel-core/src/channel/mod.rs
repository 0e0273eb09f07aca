//! Shared webview channel between the panel and its host.
//!
//! The channel is process-wide and carries traffic for many unrelated
//! features. Components register for inbound messages with
//! [`MessageBus::subscribe()`] and get a [`Subscription`] guard back; the
//! registration lives exactly as long as the guard.

mod bus;

pub use bus::{ChannelError, HostEndpoint, MessageBus, Subscription, INBOUND_CHANNEL_CAPACITY};
