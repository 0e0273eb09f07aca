//! The mounted rate-limit dashboard component.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::channel::{MessageBus, Subscription};
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::usage::Clock;

use super::state::ViewState;
use super::view::DashboardView;

/// Rate-limit status synchronization component.
///
/// Every handler runs to completion on the caller's task, so transitions
/// never interleave. Requests carry no correlation id: when several are in
/// flight, whichever response arrives last is what the dashboard shows.
pub struct RateLimitDashboard {
    bus: MessageBus,
    subscription: Subscription,
    clock: Arc<dyn Clock>,
    authenticated: bool,
    state: ViewState,
}

impl RateLimitDashboard {
    /// Mount the component: subscribe to the channel, start unauthenticated.
    ///
    /// Nothing is requested until [`on_authenticated_change(true)`] is called.
    ///
    /// [`on_authenticated_change(true)`]: Self::on_authenticated_change
    pub fn mount(bus: MessageBus, clock: Arc<dyn Clock>) -> Self {
        let subscription = bus.subscribe();
        debug!("Rate-limit dashboard mounted");
        Self {
            bus,
            subscription,
            clock,
            authenticated: false,
            state: ViewState::Unauthenticated,
        }
    }

    /// Unmount the component, releasing its channel subscription.
    ///
    /// Any request still in flight is abandoned; its response will find no
    /// listener.
    pub fn unmount(self) {
        debug!("Rate-limit dashboard unmounted (state: {:?})", self.state);
    }

    /// Current view state
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Last authentication flag seen
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// React to the externally owned authentication flag.
    ///
    /// Going false clears everything and sends nothing. Going true clears
    /// any error and requests a snapshot. Repeating the current value is a
    /// no-op.
    pub fn on_authenticated_change(&mut self, is_authenticated: bool) {
        if is_authenticated == self.authenticated {
            return;
        }
        self.authenticated = is_authenticated;

        if is_authenticated {
            debug!("Authenticated, requesting rate limits");
            self.request_refresh();
        } else {
            debug!("Signed out, clearing rate limits");
            self.state = ViewState::Unauthenticated;
        }
    }

    /// Ask the host for a fresh snapshot.
    ///
    /// Safe to call repeatedly; earlier requests are not cancelled. While
    /// unauthenticated this only clears state.
    pub fn request_refresh(&mut self) {
        if !self.authenticated {
            self.state = ViewState::Unauthenticated;
            return;
        }

        self.state = std::mem::take(&mut self.state).begin_request();

        if let Err(e) = self.bus.post_message(OutboundMessage::RequestRateLimits) {
            warn!("Could not request rate limits: {}", e);
            self.state = ViewState::Failed(e.to_string());
        }
    }

    /// The user-facing retry control
    pub fn retry(&mut self) {
        debug!("Retrying rate-limit request");
        self.request_refresh();
    }

    /// Fold one inbound channel message into the view state.
    ///
    /// Returns whether the state changed. Messages of other types are
    /// ignored, as is any rate-limit response that arrives while signed out.
    pub fn on_channel_message(&mut self, message: &InboundMessage) -> bool {
        let response = match message.decode_rate_limits() {
            Ok(Some(response)) => Ok(response),
            Ok(None) => {
                trace!("Ignoring channel message {:?}", message.type_tag());
                return false;
            }
            Err(e) => Err(e),
        };

        if !self.authenticated {
            debug!("Dropping rate-limit response received while signed out");
            return false;
        }

        let next = match response {
            Ok(response) => {
                if let Some(error) = response.error_text() {
                    warn!("Host reported rate-limit error: {}", error);
                }
                ViewState::apply_response(response)
            }
            Err(e) => {
                warn!("{}", e);
                ViewState::Failed(e.to_string())
            }
        };

        if next == self.state {
            return false;
        }
        debug!(
            "Rate-limit view: {} -> {}",
            state_name(&self.state),
            state_name(&next)
        );
        self.state = next;
        true
    }

    /// Drain every queued inbound message. Returns whether anything changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Some(message) = self.subscription.try_next() {
            changed |= self.on_channel_message(&message);
        }
        changed
    }

    /// Wait for the next inbound message and apply it.
    ///
    /// Returns `None` once the channel is closed.
    pub async fn next_update(&mut self) -> Option<bool> {
        let message = self.subscription.next().await?;
        Some(self.on_channel_message(&message))
    }

    /// Render the current state at the clock's current time
    pub fn render(&self) -> DashboardView {
        self.render_at(self.clock.now_epoch_secs())
    }

    /// Render the current state at epoch time `now`
    pub fn render_at(&self, now: f64) -> DashboardView {
        DashboardView::from_state(&self.state, now)
    }
}

fn state_name(state: &ViewState) -> &'static str {
    match state {
        ViewState::Unauthenticated => "unauthenticated",
        ViewState::Loading { .. } => "loading",
        ViewState::Ready(_) => "ready",
        ViewState::Failed(_) => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::HostEndpoint;
    use crate::dashboard::{DashboardView, EMPTY_RESPONSE_MESSAGE, LOADING_TEXT};
    use crate::usage::{ManualClock, RateLimitSnapshot, UsageWindow};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    const NOW: f64 = 1_700_000_000.0;

    fn mounted() -> (RateLimitDashboard, HostEndpoint) {
        let (bus, host) = MessageBus::new();
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(NOW));
        (RateLimitDashboard::mount(bus, clock), host)
    }

    fn drain_requests(host: &mut HostEndpoint) -> usize {
        let mut count = 0;
        while let Some(msg) = host.try_recv() {
            assert_eq!(msg, OutboundMessage::RequestRateLimits);
            count += 1;
        }
        count
    }

    fn session_response(utilization: f64) -> InboundMessage {
        InboundMessage::rate_limits(&RateLimitSnapshot::session_only(utilization, NOW + 3600.0))
            .unwrap()
    }

    #[test]
    fn test_mount_sends_nothing() {
        let (dashboard, mut host) = mounted();
        assert_eq!(dashboard.state(), &ViewState::Unauthenticated);
        assert_eq!(dashboard.render(), DashboardView::Hidden);
        assert_eq!(drain_requests(&mut host), 0);
    }

    #[test]
    fn test_authenticate_then_receive_values() {
        let (mut dashboard, mut host) = mounted();

        dashboard.on_authenticated_change(true);
        assert_eq!(drain_requests(&mut host), 1);
        assert_eq!(dashboard.render(), DashboardView::Loading { text: LOADING_TEXT });

        host.dispatch(InboundMessage::new(json!({
            "type": "claudeCodeRateLimits",
            "values": { "fiveHour": { "utilization": 0.5, "resetTime": NOW + 3600.0 } }
        })));
        assert!(dashboard.pump());

        let view = dashboard.render();
        let sections = view.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label, "Current session");
        assert_eq!(sections[0].bar_fill_percent, 50.0);
        assert_eq!(sections[0].usage_text, "50% used");
        assert_eq!(sections[0].reset_text, "Resets in 1 hr 0 min");
        assert!(view.error_message().is_none());
    }

    #[test]
    fn test_error_then_retry() {
        let (mut dashboard, mut host) = mounted();
        dashboard.on_authenticated_change(true);
        drain_requests(&mut host);

        host.dispatch(InboundMessage::rate_limits_error(
            "rate limit service unavailable",
        ));
        dashboard.pump();

        let view = dashboard.render();
        assert_eq!(view.error_message(), Some("rate limit service unavailable"));
        assert!(view.offers_retry());

        dashboard.retry();
        assert_eq!(drain_requests(&mut host), 1);
        assert_eq!(dashboard.state(), &ViewState::Loading { stale: None });
        assert_eq!(dashboard.render(), DashboardView::Loading { text: LOADING_TEXT });
    }

    #[test]
    fn test_error_discards_previous_snapshot() {
        let (mut dashboard, host) = mounted();
        dashboard.on_authenticated_change(true);
        host.dispatch(session_response(0.3));
        dashboard.pump();
        assert!(dashboard.state().snapshot().is_some());

        host.dispatch(InboundMessage::rate_limits_error("down"));
        dashboard.pump();
        assert_eq!(dashboard.state(), &ViewState::Failed("down".to_string()));
        assert!(dashboard.state().snapshot().is_none());
    }

    #[test]
    fn test_sign_out_clears_and_stops_requests() {
        let (mut dashboard, mut host) = mounted();
        dashboard.on_authenticated_change(true);
        host.dispatch(session_response(0.3));
        dashboard.pump();
        drain_requests(&mut host);

        dashboard.on_authenticated_change(false);
        assert_eq!(dashboard.state(), &ViewState::Unauthenticated);
        assert_eq!(dashboard.render(), DashboardView::Hidden);

        dashboard.request_refresh();
        dashboard.retry();
        assert_eq!(drain_requests(&mut host), 0);
        assert_eq!(dashboard.render(), DashboardView::Hidden);
    }

    #[test]
    fn test_late_response_after_sign_out_is_dropped() {
        let (mut dashboard, host) = mounted();
        dashboard.on_authenticated_change(true);
        dashboard.on_authenticated_change(false);

        host.dispatch(session_response(0.9));
        host.dispatch(InboundMessage::rate_limits_error("late"));
        assert!(!dashboard.pump());
        assert_eq!(dashboard.state(), &ViewState::Unauthenticated);
    }

    #[test]
    fn test_reauthenticate_requests_again() {
        let (mut dashboard, mut host) = mounted();
        dashboard.on_authenticated_change(true);
        dashboard.on_authenticated_change(false);
        dashboard.on_authenticated_change(true);
        assert_eq!(drain_requests(&mut host), 2);
        assert!(dashboard.state().is_loading());
    }

    #[test]
    fn test_repeated_authenticated_flag_is_noop() {
        let (mut dashboard, mut host) = mounted();
        dashboard.on_authenticated_change(true);
        dashboard.on_authenticated_change(true);
        assert_eq!(drain_requests(&mut host), 1);

        dashboard.on_authenticated_change(false);
        dashboard.on_authenticated_change(false);
        assert_eq!(drain_requests(&mut host), 0);
    }

    #[test]
    fn test_refresh_while_ready_keeps_snapshot_visible() {
        let (mut dashboard, mut host) = mounted();
        dashboard.on_authenticated_change(true);
        host.dispatch(session_response(0.3));
        dashboard.pump();

        dashboard.request_refresh();
        assert_eq!(drain_requests(&mut host), 2);
        assert!(dashboard.state().is_loading());
        assert_eq!(dashboard.render().sections()[0].usage_text, "30% used");

        host.dispatch(session_response(0.6));
        dashboard.pump();
        assert_eq!(dashboard.render().sections()[0].usage_text, "60% used");
        assert!(!dashboard.state().is_loading());
    }

    #[test]
    fn test_last_response_wins() {
        let (mut dashboard, mut host) = mounted();
        dashboard.on_authenticated_change(true);
        dashboard.request_refresh();
        dashboard.request_refresh();
        assert_eq!(drain_requests(&mut host), 3);

        host.dispatch(session_response(0.7));
        host.dispatch(InboundMessage::rate_limits_error("stale failure"));
        host.dispatch(session_response(0.2));
        dashboard.pump();

        assert_eq!(
            dashboard.state(),
            &ViewState::Ready(RateLimitSnapshot::session_only(0.2, NOW + 3600.0))
        );
    }

    #[test]
    fn test_unrelated_messages_are_ignored() {
        let (mut dashboard, host) = mounted();
        dashboard.on_authenticated_change(true);

        host.dispatch(InboundMessage::new(json!({ "type": "state", "values": 1 })));
        host.dispatch(InboundMessage::new(json!({ "error": "untagged" })));
        host.dispatch(InboundMessage::new(json!("not even an object")));
        assert!(!dashboard.pump());
        assert_eq!(dashboard.state(), &ViewState::Loading { stale: None });
    }

    #[test]
    fn test_empty_response_surfaces_error() {
        let (mut dashboard, host) = mounted();
        dashboard.on_authenticated_change(true);

        host.dispatch(InboundMessage::rate_limits_empty());
        assert!(dashboard.pump());
        assert_eq!(dashboard.render().error_message(), Some(EMPTY_RESPONSE_MESSAGE));
    }

    #[test]
    fn test_malformed_response_surfaces_error() {
        let (mut dashboard, host) = mounted();
        dashboard.on_authenticated_change(true);

        host.dispatch(InboundMessage::new(json!({
            "type": "claudeCodeRateLimits",
            "values": { "fiveHour": "full" }
        })));
        dashboard.pump();
        let message = dashboard.state().error().unwrap();
        assert!(message.starts_with("malformed `claudeCodeRateLimits` message"));
    }

    #[test]
    fn test_request_without_host_fails_locally() {
        let (bus, host) = MessageBus::new();
        drop(host);
        let mut dashboard = RateLimitDashboard::mount(bus, Arc::new(ManualClock::new(NOW)));

        dashboard.on_authenticated_change(true);
        assert_eq!(
            dashboard.state(),
            &ViewState::Failed("host is not connected".to_string())
        );
        assert!(dashboard.render().offers_retry());
    }

    #[test]
    fn test_unmount_releases_subscription() {
        let (bus, mut host) = MessageBus::new();
        let mut dashboard =
            RateLimitDashboard::mount(bus.clone(), Arc::new(ManualClock::new(NOW)));
        dashboard.on_authenticated_change(true);
        assert_eq!(bus.subscriber_count(), 1);

        dashboard.unmount();
        assert_eq!(bus.subscriber_count(), 0);
        // the in-flight request is still delivered, its answer goes nowhere
        assert_eq!(drain_requests(&mut host), 1);
        assert_eq!(host.dispatch(session_response(0.1)), 0);
    }

    #[test]
    fn test_render_follows_clock() {
        let (bus, host) = MessageBus::new();
        let clock = Arc::new(ManualClock::new(NOW));
        let mut dashboard = RateLimitDashboard::mount(bus, clock.clone());
        dashboard.on_authenticated_change(true);
        host.dispatch(InboundMessage::rate_limits(&RateLimitSnapshot {
            five_hour: UsageWindow::new(0.1, NOW + 7500.0),
            weekly_unified: None,
            overage: None,
        })
        .unwrap());
        dashboard.pump();

        assert_eq!(dashboard.render().sections()[0].reset_text, "Resets in 2 hr 5 min");
        clock.advance(7500.0);
        assert_eq!(dashboard.render().sections()[0].reset_text, "Resets in now");
    }

    #[tokio::test]
    async fn test_next_update_waits_for_response() {
        let (mut dashboard, mut host) = mounted();
        dashboard.on_authenticated_change(true);

        let responder = tokio::spawn(async move {
            let request = host.recv().await.unwrap();
            assert_eq!(request, OutboundMessage::RequestRateLimits);
            host.dispatch(session_response(0.25));
            host
        });

        assert_eq!(dashboard.next_update().await, Some(true));
        assert_eq!(dashboard.render().sections()[0].usage_text, "25% used");
        drop(responder.await.unwrap());
    }

    #[derive(Debug, Clone)]
    enum Event {
        SignIn,
        SignOut,
        Refresh,
        Values(u8),
        Error,
        Empty,
        Unrelated,
    }

    fn event_strategy() -> impl Strategy<Value = Event> {
        prop_oneof![
            Just(Event::SignIn),
            Just(Event::SignOut),
            Just(Event::Refresh),
            (0u8..120).prop_map(Event::Values),
            Just(Event::Error),
            Just(Event::Empty),
            Just(Event::Unrelated),
        ]
    }

    proptest! {
        #[test]
        fn test_event_sequences_never_show_snapshot_with_error(
            events in prop::collection::vec(event_strategy(), 1..200)
        ) {
            let (mut dashboard, mut host) = mounted();

            for event in events {
                match event {
                    Event::SignIn => dashboard.on_authenticated_change(true),
                    Event::SignOut => dashboard.on_authenticated_change(false),
                    Event::Refresh => dashboard.request_refresh(),
                    Event::Values(percent) => {
                        host.dispatch(session_response(f64::from(percent) / 100.0));
                    }
                    Event::Error => {
                        host.dispatch(InboundMessage::rate_limits_error("boom"));
                    }
                    Event::Empty => {
                        host.dispatch(InboundMessage::rate_limits_empty());
                    }
                    Event::Unrelated => {
                        host.dispatch(InboundMessage::new(json!({ "type": "other" })));
                    }
                }
                dashboard.pump();

                let view = dashboard.render();
                prop_assert!(view.sections().is_empty() || view.error_message().is_none());
                prop_assert!(
                    !(dashboard.state().snapshot().is_some() && dashboard.state().error().is_some())
                );

                if !dashboard.is_authenticated() {
                    prop_assert_eq!(view, DashboardView::Hidden);
                    prop_assert_eq!(drain_requests(&mut host), 0);
                }
                drain_requests(&mut host);
            }
        }
    }
}
