//! Publish/subscribe bus backing the webview channel.

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, trace, warn};

use crate::protocol::{InboundMessage, OutboundMessage};

/// Inbound messages buffered per subscriber before it starts lagging
pub const INBOUND_CHANNEL_CAPACITY: usize = 256;

/// Errors raised by the channel
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The host side of the channel has been dropped
    #[error("host is not connected")]
    HostDisconnected,
}

/// Panel-side handle to the shared channel.
///
/// Cheap to clone; every clone posts to the same host and hands out
/// subscriptions to the same inbound stream.
#[derive(Clone)]
pub struct MessageBus {
    inbound: broadcast::Sender<InboundMessage>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

/// Host-side end of the channel
pub struct HostEndpoint {
    inbound: broadcast::Sender<InboundMessage>,
    outbound: mpsc::UnboundedReceiver<OutboundMessage>,
}

/// Scoped registration for inbound messages.
///
/// Dropping the subscription unregisters it; nothing else needs to be
/// called on teardown.
pub struct Subscription {
    rx: broadcast::Receiver<InboundMessage>,
}

impl MessageBus {
    /// Create a connected bus/host pair
    pub fn new() -> (MessageBus, HostEndpoint) {
        let (inbound, _) = broadcast::channel(INBOUND_CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let bus = MessageBus {
            inbound: inbound.clone(),
            outbound: outbound_tx,
        };
        let host = HostEndpoint {
            inbound,
            outbound: outbound_rx,
        };
        (bus, host)
    }

    /// Post a message to the host. Fire-and-forget: no reply is awaited.
    pub fn post_message(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        debug!("Posting {} to host", message.type_tag());
        self.outbound
            .send(message)
            .map_err(|_| ChannelError::HostDisconnected)
    }

    /// Register for inbound messages
    pub fn subscribe(&self) -> Subscription {
        let rx = self.inbound.subscribe();
        debug!(
            "Channel subscription acquired ({} live)",
            self.inbound.receiver_count()
        );
        Subscription { rx }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inbound.receiver_count()
    }
}

impl HostEndpoint {
    /// Wait for the next message posted by the panel.
    ///
    /// Returns `None` once every [`MessageBus`] clone has been dropped.
    pub async fn recv(&mut self) -> Option<OutboundMessage> {
        self.outbound.recv().await
    }

    /// Take a posted message without waiting
    pub fn try_recv(&mut self) -> Option<OutboundMessage> {
        self.outbound.try_recv().ok()
    }

    /// Deliver a message to every live subscription.
    ///
    /// Returns how many subscriptions received it (0 when nobody listens,
    /// which is not an error).
    pub fn dispatch(&self, message: InboundMessage) -> usize {
        trace!("Dispatching {:?}", message.type_tag());
        self.inbound.send(message).unwrap_or(0)
    }
}

impl Subscription {
    /// Next queued message, without waiting
    pub fn try_next(&mut self) -> Option<InboundMessage> {
        loop {
            match self.rx.try_recv() {
                Ok(message) => return Some(message),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Channel subscription lagged, {} messages dropped", skipped);
                }
                Err(_) => return None,
            }
        }
    }

    /// Wait for the next message. Returns `None` once the host is gone.
    pub async fn next(&mut self) -> Option<InboundMessage> {
        loop {
            match self.rx.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Channel subscription lagged, {} messages dropped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!("Channel subscription released");
    }
}
