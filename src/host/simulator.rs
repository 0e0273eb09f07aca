use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use quotapanel_core::channel::HostEndpoint;
use quotapanel_core::protocol::OutboundMessage;
use quotapanel_core::usage::Clock;

use super::scenario::Scenario;

/// Host side of the channel, answering from a [`Scenario`]
pub struct SimulatedHost {
    endpoint: HostEndpoint,
    scenario: Scenario,
    latency: Duration,
    clock: Arc<dyn Clock>,
}

impl SimulatedHost {
    /// Create a host that replies after `latency`
    pub fn new(
        endpoint: HostEndpoint,
        scenario: Scenario,
        latency: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            endpoint,
            scenario,
            latency,
            clock,
        }
    }

    /// Spawn the host loop. It ends once every `MessageBus` clone is dropped.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        info!(
            "Simulated host started (scenario: {}, latency: {:?})",
            self.scenario, self.latency
        );
        let mut served: u64 = 0;

        while let Some(message) = self.endpoint.recv().await {
            match message {
                OutboundMessage::RequestRateLimits => {
                    if !self.latency.is_zero() {
                        tokio::time::sleep(self.latency).await;
                    }
                    match self.scenario.respond(served, self.clock.now_epoch_secs()) {
                        Ok(reply) => {
                            let listeners = self.endpoint.dispatch(reply);
                            debug!(
                                "Answered rate-limit request #{} ({} listener(s))",
                                served, listeners
                            );
                        }
                        Err(e) => warn!("Failed to build rate-limit reply: {}", e),
                    }
                    served += 1;
                }
                OutboundMessage::OpenExternal { url } => {
                    info!("Host asked to open external link: {}", url);
                }
            }
        }

        debug!("Simulated host stopped after {} request(s)", served);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotapanel_core::channel::MessageBus;
    use quotapanel_core::dashboard::{RateLimitDashboard, ViewState};
    use quotapanel_core::usage::ManualClock;

    const NOW: f64 = 1_700_000_000.0;

    fn spawn_host(scenario: Scenario) -> (MessageBus, JoinHandle<()>, Arc<dyn Clock>) {
        let (bus, endpoint) = MessageBus::new();
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(NOW));
        let handle = SimulatedHost::new(endpoint, scenario, Duration::ZERO, clock.clone()).start();
        (bus, handle, clock)
    }

    async fn next_update(dashboard: &mut RateLimitDashboard) -> bool {
        tokio::time::timeout(Duration::from_secs(5), dashboard.next_update())
            .await
            .expect("host did not answer")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_dashboard_receives_snapshot() {
        let (bus, _handle, clock) = spawn_host(Scenario::Busy);
        let mut dashboard = RateLimitDashboard::mount(bus, clock);

        dashboard.on_authenticated_change(true);
        assert!(next_update(&mut dashboard).await);

        let view = dashboard.render_at(NOW);
        assert_eq!(view.sections().len(), 3);
        assert_eq!(view.sections()[0].usage_text, "83% used");
    }

    #[tokio::test]
    async fn test_error_scenario_then_retry() {
        let (bus, _handle, clock) = spawn_host(Scenario::Flaky);
        let mut dashboard = RateLimitDashboard::mount(bus, clock);

        dashboard.on_authenticated_change(true);
        assert!(next_update(&mut dashboard).await);
        assert!(matches!(dashboard.state(), ViewState::Failed(_)));

        dashboard.retry();
        assert!(next_update(&mut dashboard).await);
        assert!(matches!(dashboard.state(), ViewState::Ready(_)));
    }

    #[tokio::test]
    async fn test_host_stops_when_bus_dropped() {
        let (bus, handle, _clock) = spawn_host(Scenario::Healthy);
        bus.post_message(OutboundMessage::OpenExternal {
            url: "https://example.com".to_string(),
        })
        .unwrap();
        drop(bus);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("host did not stop")
            .unwrap();
    }
}
