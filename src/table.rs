use crate::record::{BasicRecord, LocalRecord, Status};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::time::SystemTime;

/// The authoritative view of the cluster, as seen by one node. Every mutating
/// method here assumes it is called from inside the State Manager's single
/// serialized loop (I1) - `MemberTable` itself holds no lock, because it is
/// never touched concurrently.
pub struct MemberTable {
    self_address: String,
    members: HashMap<String, LocalRecord>,
    cursor: Vec<String>,
    cursor_pos: usize,
}

impl MemberTable {
    pub fn new(self_address: impl Into<String>) -> Self {
        Self {
            self_address: self_address.into(),
            members: HashMap::new(),
            cursor: Vec::new(),
            cursor_pos: 0,
        }
    }

    fn is_self(&self, address: &str) -> bool {
        address == self.self_address
    }

    fn admissible(&self, address: &str) -> bool {
        !address.is_empty() && !self.is_self(address)
    }

    /// `Add`: insert a brand-new address. Returns `true` only when a new
    /// record was actually created - callers use this to decide whether a
    /// `Join` event fires (spec: "emitted once per successful Add").
    pub fn add(&mut self, record: BasicRecord) -> bool {
        if !self.admissible(&record.address) || self.members.contains_key(&record.address) {
            return false;
        }
        let address = record.address.clone();
        self.members.insert(address, LocalRecord::new(record));
        self.mark_stale();
        true
    }

    /// `Update`: overwrite status (and refresh metadata) for a known
    /// address, or insert it fresh if unknown. A status transition resets
    /// `send_count` per I4; an unchanged status is a no-op beyond metadata
    /// refresh.
    pub fn update(&mut self, record: BasicRecord) {
        if !self.admissible(&record.address) {
            return;
        }
        match self.members.get_mut(&record.address) {
            Some(local) => {
                let status_changed = local.record.status != record.status;
                local.record.status = record.status;
                if record.metadata.is_some() {
                    local.record.metadata = record.metadata;
                }
                if status_changed {
                    local.send_count = 0;
                    local.last_contact = SystemTime::now();
                    self.mark_stale();
                }
            }
            None => {
                let address = record.address.clone();
                self.members.insert(address, LocalRecord::new(record));
                self.mark_stale();
            }
        }
    }

    /// `Eval`: only acts on a known, non-self address, and only when the
    /// incoming status differs from what's stored. Unknown addresses are
    /// ignored silently (spec §7).
    pub fn eval(&mut self, record: BasicRecord) {
        if !self.admissible(&record.address) {
            return;
        }
        if let Some(local) = self.members.get_mut(&record.address) {
            if local.record.status != record.status {
                local.record.status = record.status;
                if record.metadata.is_some() {
                    local.record.metadata = record.metadata;
                }
                local.send_count = 0;
                local.last_contact = SystemTime::now();
                self.mark_stale();
            }
        }
    }

    /// `Fail`: unconditionally overwrite (or insert) with `Failed` and a
    /// reset send_count. Unlike `Add`, every processed `Fail` message emits
    /// an event - the caller is expected to emit unconditionally.
    pub fn fail(&mut self, address: &str, metadata: Option<Vec<u8>>) {
        if !self.admissible(address) {
            return;
        }
        let local = self
            .members
            .entry(address.to_string())
            .or_insert_with(|| LocalRecord::new(BasicRecord::new(address, Status::Failed)));
        local.record.status = Status::Failed;
        if metadata.is_some() {
            local.record.metadata = metadata;
        }
        local.send_count = 0;
        local.last_contact = SystemTime::now();
        self.mark_stale();
    }

    /// The Gossip Selector: returns every record under `send_cap`,
    /// incrementing `send_count` as a side effect of selection (I5), so the
    /// network-wide copy count of any one record is bounded independent of
    /// how many probes succeed or fail.
    pub fn pick_members(&mut self, send_cap: u32) -> Vec<BasicRecord> {
        let mut out = Vec::new();
        for local in self.members.values_mut() {
            if local.send_count < send_cap {
                out.push(local.record.clone());
                local.send_count += 1;
            }
        }
        out
    }

    /// Serves the next probe target from a shuffled cursor over the live
    /// set, reshuffling on exhaustion or staleness. Returns `None` rather
    /// than blocking when no live member exists.
    pub fn next_target(&mut self, rng: &mut impl Rng) -> Option<String> {
        loop {
            if self.cursor_pos >= self.cursor.len() {
                self.reshuffle(rng);
                if self.cursor.is_empty() {
                    return None;
                }
            }
            let candidate = self.cursor[self.cursor_pos].clone();
            self.cursor_pos += 1;
            if matches!(self.members.get(&candidate), Some(l) if l.status() == Status::Alive) {
                return Some(candidate);
            }
            // candidate went stale (failed) since the last shuffle; keep
            // walking the cursor, which will reshuffle once exhausted.
        }
    }

    fn reshuffle(&mut self, rng: &mut impl Rng) {
        self.cursor = self
            .members
            .iter()
            .filter(|(_, l)| l.status() == Status::Alive)
            .map(|(addr, _)| addr.clone())
            .collect();
        self.cursor.shuffle(rng);
        self.cursor_pos = 0;
    }

    /// Forces the next `next_target` call to reshuffle rather than continue
    /// draining a cursor that may no longer reflect current membership.
    fn mark_stale(&mut self) {
        self.cursor_pos = self.cursor.len();
    }

    pub fn snapshot(&self) -> Vec<LocalRecord> {
        self.members.values().cloned().collect()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.members.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
