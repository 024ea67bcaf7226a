//! swimcore - a gossip-style cluster membership and failure-detection
//! engine, loosely modeled on the SWIM family. Each node maintains a live
//! view of its peers, exchanges periodic probes, infers failure from missing
//! replies, and piggybacks membership deltas on probes so that cluster-wide
//! knowledge converges without central coordination.
//!
//! The transport, persistence, and application-level metadata semantics are
//! external collaborators - see [`transport::Transport`].

pub mod admin;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod node;
pub mod peer;
pub mod probe;
pub mod record;
pub mod scheduler;
pub mod table;
pub mod transport;

pub use config::Config;
pub use error::{CoreError, Result};
pub use events::Event;
pub use node::Node;
pub use record::{BasicRecord, LocalRecord, Status};
pub use transport::local::{LocalNetwork, LocalTransport};
pub use transport::{PingRequest, PingResponse, Transport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
