use crate::record::BasicRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The probe RPC request (spec §6): sender's address, opaque metadata, and
/// the piggyback list produced by the Gossip Selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingRequest {
    pub address: String,
    pub metadata: Option<Vec<u8>>,
    pub nodes: Vec<BasicRecord>,
}

/// The probe RPC response: an ack and the responder's own piggyback list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub ack: bool,
    pub nodes: Vec<BasicRecord>,
}

/// The boundary the core consumes and never implements concretely for
/// production use (spec §1's "out of scope: the transport"). Any
/// request/response channel that can carry a `PingRequest` to `target` and
/// bring back a `PingResponse` (or fail) satisfies this - stream socket,
/// datagram-with-ack, or in-process channel are all conforming.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_ping(&self, target: &str, request: PingRequest) -> crate::error::Result<PingResponse>;
}

/// An in-process transport for running several nodes inside one test or one
/// demo process. Not a production transport - a stand-in so the scenarios in
/// spec §8 are exercisable without a real socket.
pub mod local {
    use super::*;
    use crate::error::CoreError;
    use crate::peer::PeerHandler;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// A shared in-process "network": a registry from address to the
    /// `PeerHandler` currently listening there.
    #[derive(Clone, Default)]
    pub struct LocalNetwork {
        routes: Arc<RwLock<HashMap<String, Arc<PeerHandler>>>>,
    }

    impl LocalNetwork {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn register(&self, address: impl Into<String>, handler: Arc<PeerHandler>) {
            self.routes.write().await.insert(address.into(), handler);
        }

        pub async fn unregister(&self, address: &str) {
            self.routes.write().await.remove(address);
        }
    }

    /// A `Transport` over a `LocalNetwork`: looks up the target's handler
    /// and calls it directly, as if it were the other end of a socket.
    pub struct LocalTransport {
        network: LocalNetwork,
    }

    impl LocalTransport {
        pub fn new(network: LocalNetwork) -> Self {
            Self { network }
        }
    }

    #[async_trait]
    impl Transport for LocalTransport {
        async fn send_ping(
            &self,
            target: &str,
            request: PingRequest,
        ) -> crate::error::Result<PingResponse> {
            let handler = { self.network.routes.read().await.get(target).cloned() };
            let handler = handler
                .ok_or_else(|| CoreError::Transport(format!("no route to {target}")))?;

            handler
                .handle(request)
                .await
                .ok_or_else(|| CoreError::Transport(format!("{target} refused connection")))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn dial_to_unregistered_address_is_a_transport_error() {
            let network = LocalNetwork::new();
            let transport = LocalTransport::new(network);
            let request = PingRequest {
                address: "a".into(),
                metadata: None,
                nodes: vec![],
            };
            assert!(transport.send_ping("nowhere:1", request).await.is_err());
        }
    }
}
