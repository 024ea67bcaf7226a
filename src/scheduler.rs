use crate::admin::AdminFlag;
use crate::manager::ManagerHandle;
use crate::probe::Probe;
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// The periodic loop that picks one peer per tick and launches a probe
/// against it (spec §4.2). Never waits for the probe to finish - probes run
/// concurrently with subsequent ticks, and there is no global concurrency
/// cap.
pub struct Scheduler {
    manager: ManagerHandle,
    transport: Arc<dyn Transport>,
    alive: AdminFlag,
    self_address: String,
    metadata: Option<Vec<u8>>,
    ping_interval: Duration,
    probe_timeout: Duration,
}

impl Scheduler {
    pub fn new(
        manager: ManagerHandle,
        transport: Arc<dyn Transport>,
        alive: AdminFlag,
        self_address: impl Into<String>,
        metadata: Option<Vec<u8>>,
        ping_interval: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            manager,
            transport,
            alive,
            self_address: self_address.into(),
            metadata,
            ping_interval,
            probe_timeout,
        }
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.ping_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    async fn tick(&self) {
        if !self.alive.is_alive() {
            return;
        }

        match self.manager.next_target().await {
            Ok(Some(target)) => {
                let probe = Probe::new(
                    self.self_address.clone(),
                    self.metadata.clone(),
                    target,
                    self.transport.clone(),
                    self.manager.clone(),
                    self.probe_timeout,
                );
                tokio::spawn(probe.run());
            }
            Ok(None) => {
                tracing::trace!("no live targets this tick, skipping");
            }
            Err(e) => {
                tracing::error!(error = %e, "state manager unreachable, skipping tick");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;
    use crate::record::{BasicRecord, Status};
    use crate::transport::{PingRequest, PingResponse};
    use async_trait::async_trait;

    struct AckingTransport;

    #[async_trait]
    impl Transport for AckingTransport {
        async fn send_ping(
            &self,
            _target: &str,
            _request: PingRequest,
        ) -> crate::error::Result<PingResponse> {
            Ok(PingResponse {
                ack: true,
                nodes: vec![],
            })
        }
    }

    #[tokio::test]
    async fn tick_is_a_noop_when_dead() {
        let (manager, handle) = Manager::new("self:1", 3, None);
        tokio::spawn(manager.run());
        handle
            .add(BasicRecord::new("peer:1", Status::Alive))
            .await
            .unwrap();

        let alive = AdminFlag::new(false);
        let scheduler = Scheduler::new(
            handle.clone(),
            Arc::new(AckingTransport),
            alive,
            "self:1",
            None,
            Duration::from_millis(10),
            Duration::from_millis(5),
        );
        scheduler.tick().await;

        // With no probe spawned, every record is still unpicked from the
        // gossip selector's perspective.
        assert_eq!(handle.pick_members().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tick_skips_cleanly_when_no_live_targets() {
        let (manager, handle) = Manager::new("self:1", 3, None);
        tokio::spawn(manager.run());

        let alive = AdminFlag::new(true);
        let scheduler = Scheduler::new(
            handle,
            Arc::new(AckingTransport),
            alive,
            "self:1",
            None,
            Duration::from_millis(10),
            Duration::from_millis(5),
        );
        scheduler.tick().await; // must not panic or hang
    }
}
