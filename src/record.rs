use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A member's inferred liveness. `Suspected` is carried on the wire for
/// forward compatibility but the current core never assigns it - promotion
/// is direct `Alive -> Failed` on probe timeout (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Alive,
    Suspected,
    Failed,
}

/// The record exchanged over the wire, in a ping request's piggyback list,
/// a ping reply, or a gossip merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRecord {
    pub address: String,
    pub status: Status,
    pub metadata: Option<Vec<u8>>,
}

impl BasicRecord {
    pub fn new(address: impl Into<String>, status: Status) -> Self {
        Self {
            address: address.into(),
            status,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Option<Vec<u8>>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A node's private bookkeeping for one peer: the wire record plus the
/// gossip retransmission counter (I4/I5) and a last-contact timestamp kept
/// purely for observability, never consulted by protocol logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRecord {
    pub record: BasicRecord,
    pub send_count: u32,
    pub last_contact: SystemTime,
}

impl LocalRecord {
    pub fn new(record: BasicRecord) -> Self {
        Self {
            record,
            send_count: 0,
            last_contact: SystemTime::now(),
        }
    }

    pub fn address(&self) -> &str {
        &self.record.address
    }

    pub fn status(&self) -> Status {
        self.record.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_local_record_starts_at_zero_send_count() {
        let local = LocalRecord::new(BasicRecord::new("10.0.0.1:7000", Status::Alive));
        assert_eq!(local.send_count, 0);
        assert_eq!(local.status(), Status::Alive);
        assert_eq!(local.address(), "10.0.0.1:7000");
    }
}
