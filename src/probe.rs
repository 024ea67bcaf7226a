use crate::manager::ManagerHandle;
use crate::record::{BasicRecord, Status};
use crate::transport::{PingRequest, Transport};
use std::sync::Arc;
use std::time::Duration;

/// One client-side probe round-trip (spec §4.3). Runs once, never retries
/// within its own lifetime - a flapping peer is reclassified the next time
/// the Scheduler happens to pick it again.
pub struct Probe {
    self_address: String,
    metadata: Option<Vec<u8>>,
    target: String,
    transport: Arc<dyn Transport>,
    manager: ManagerHandle,
    probe_timeout: Duration,
}

impl Probe {
    pub fn new(
        self_address: impl Into<String>,
        metadata: Option<Vec<u8>>,
        target: impl Into<String>,
        transport: Arc<dyn Transport>,
        manager: ManagerHandle,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            self_address: self_address.into(),
            metadata,
            target: target.into(),
            transport,
            manager,
            probe_timeout,
        }
    }

    pub async fn run(self) {
        let nodes = self.manager.pick_members().await.unwrap_or_default();
        let request = PingRequest {
            address: self.self_address.clone(),
            metadata: self.metadata.clone(),
            nodes,
        };

        let outcome = tokio::time::timeout(
            self.probe_timeout,
            self.transport.send_ping(&self.target, request),
        )
        .await;

        match outcome {
            Ok(Ok(response)) => {
                for node in response.nodes {
                    let _ = self.manager.update(node).await;
                }
                // Live evidence of the target itself: any live-evidence path
                // for a known address is treated as Eval(Alive), never
                // Add/Update, so it can't resurrect a Failed record without
                // also resetting its send_count (spec §9).
                let _ = self
                    .manager
                    .eval(BasicRecord::new(self.target.clone(), Status::Alive))
                    .await;
            }
            Ok(Err(e)) => {
                tracing::debug!(target = %self.target, error = %e, "probe transport error, treating as timeout");
                self.declare_failed().await;
            }
            Err(_elapsed) => {
                tracing::debug!(target = %self.target, timeout = ?self.probe_timeout, "probe timed out");
                self.declare_failed().await;
            }
        }
    }

    async fn declare_failed(&self) {
        let _ = self
            .manager
            .fail(BasicRecord::new(self.target.clone(), Status::Failed))
            .await;
    }
}
