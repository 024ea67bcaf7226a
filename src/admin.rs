use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The node's administrative liveness flag (spec §4.6). Shared between the
/// Scheduler (stops probing while dead) and the Peer Handler (declines
/// inbound requests while dead) without giving either a way to mutate the
/// Member Table.
#[derive(Clone)]
pub struct AdminFlag(Arc<AtomicBool>);

impl AdminFlag {
    pub fn new(alive: bool) -> Self {
        Self(Arc::new(AtomicBool::new(alive)))
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn revive(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
