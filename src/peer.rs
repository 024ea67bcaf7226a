use crate::admin::AdminFlag;
use crate::manager::ManagerHandle;
use crate::record::{BasicRecord, Status};
use crate::transport::{PingRequest, PingResponse};

/// The server side of the probe protocol (spec §4.4): merges inbound gossip,
/// folds live evidence of the sender into the table, and replies with this
/// node's own piggyback list. `PeerHandler` is transport-agnostic - callers
/// register it with whatever `Transport` they use.
pub struct PeerHandler {
    manager: ManagerHandle,
    self_address: String,
    metadata: Option<Vec<u8>>,
    alive: AdminFlag,
}

impl PeerHandler {
    pub fn new(
        manager: ManagerHandle,
        self_address: impl Into<String>,
        metadata: Option<Vec<u8>>,
        alive: AdminFlag,
    ) -> Self {
        Self {
            manager,
            self_address: self_address.into(),
            metadata,
            alive,
        }
    }

    /// Returns `None` while the node is administratively killed, simulating
    /// a crashed process that refuses new connections without tearing down
    /// the listener (spec §4.4, §4.6).
    pub async fn handle(&self, request: PingRequest) -> Option<PingResponse> {
        if !self.alive.is_alive() {
            return None;
        }

        for node in request.nodes {
            let _ = self.manager.update(node).await;
        }

        if !request.address.is_empty() && request.address != self.self_address {
            // "If known, Eval(Alive); if unknown, Add" (spec §4.4) is
            // implemented as Add-then-Eval rather than a separate lookup:
            // Add is a no-op on a known address, and Eval is a no-op on an
            // unknown one, so composing them reaches exactly the same
            // outcome without adding a sixth manager message kind.
            let sender = BasicRecord::new(request.address.clone(), Status::Alive)
                .with_metadata(request.metadata.clone());
            let _ = self.manager.add(sender.clone()).await;
            let _ = self.manager.eval(sender).await;
        }

        let nodes = self.manager.pick_members().await.unwrap_or_default();
        Some(PingResponse { ack: true, nodes })
    }
}
