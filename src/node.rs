use crate::admin::AdminFlag;
use crate::config::Config;
use crate::error::Result;
use crate::manager::{Manager, ManagerHandle};
use crate::peer::PeerHandler;
use crate::record::{BasicRecord, LocalRecord, Status};
use crate::scheduler::Scheduler;
use crate::transport::Transport;
use std::sync::Arc;

/// One participating process. Owns the State Manager's mailbox handle and
/// the administrative liveness flag; wires up the Scheduler as a background
/// task. The Peer Handler is exposed for the caller to register with
/// whatever `Transport` implementation it's running (spec §6: construction
/// takes host, port, an optional seed, and an optional event sink).
pub struct Node {
    address: String,
    manager: ManagerHandle,
    alive: AdminFlag,
    peer_handler: Arc<PeerHandler>,
}

impl Node {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        seed: Option<String>,
        metadata: Option<Vec<u8>>,
        config: Config,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let address = format!("{}:{}", host.into(), port);
        let (manager, manager_handle) =
            Manager::new(address.clone(), config.send_cap, config.event_sink.clone());
        tokio::spawn(manager.run());

        let alive = AdminFlag::new(true);
        let peer_handler = Arc::new(PeerHandler::new(
            manager_handle.clone(),
            address.clone(),
            metadata.clone(),
            alive.clone(),
        ));

        let scheduler = Scheduler::new(
            manager_handle.clone(),
            transport,
            alive.clone(),
            address.clone(),
            metadata,
            config.ping_interval,
            config.probe_timeout,
        );
        tokio::spawn(scheduler.run());

        // Empty seeds are tolerated (I3): this is how a bootstrap node with
        // no prior cluster to join is constructed.
        if let Some(seed_address) = seed.filter(|s| !s.is_empty()) {
            let handle = manager_handle.clone();
            tokio::spawn(async move {
                let _ = handle.add(BasicRecord::new(seed_address, Status::Alive)).await;
            });
        }

        Self {
            address,
            manager: manager_handle,
            alive,
            peer_handler,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Register this with a `Transport`'s server side to accept inbound
    /// probes.
    pub fn peer_handler(&self) -> Arc<PeerHandler> {
        self.peer_handler.clone()
    }

    pub fn kill(&self) {
        self.alive.kill();
    }

    pub fn revive(&self) {
        self.alive.revive();
    }

    pub fn is_alive(&self) -> bool {
        self.alive.is_alive()
    }

    pub async fn members(&self) -> Result<Vec<LocalRecord>> {
        self.manager.snapshot().await
    }

    /// Exposes the Gossip Selector directly, for callers (and tests) that
    /// need to observe send_cap exhaustion rather than just table contents.
    pub async fn pick_members(&self) -> Result<Vec<BasicRecord>> {
        self.manager.pick_members().await
    }
}
