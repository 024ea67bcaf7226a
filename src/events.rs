/// Fan-out from the State Manager to an external observer. Fire-and-forget:
/// a missing or full sink never blocks the manager (spec §4.1, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Join {
        address: String,
        metadata: Option<Vec<u8>>,
    },
    Fail {
        address: String,
        metadata: Option<Vec<u8>>,
    },
}
