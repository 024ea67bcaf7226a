use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::record::{BasicRecord, LocalRecord};
use crate::table::MemberTable;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

/// The five message kinds the State Manager services (spec §4.1), plus
/// `PickMembers` - the Gossip Selector is required to run under the same
/// serialization (§4.5, §9), so it is handled in this loop rather than as a
/// concurrent snapshot-and-increment - and a `Snapshot` query, since the
/// manager is explicitly responsible for servicing reads (§2) and nothing
/// outside it may touch the table (I1).
enum Command {
    Add(BasicRecord),
    Update(BasicRecord),
    Eval(BasicRecord),
    Fail(BasicRecord),
    NextTarget(oneshot::Sender<Option<String>>),
    PickMembers(oneshot::Sender<Vec<BasicRecord>>),
    Snapshot(oneshot::Sender<Vec<LocalRecord>>),
}

/// A cloneable handle onto the State Manager's mailbox. This is the only way
/// any other component touches the Member Table.
#[derive(Clone)]
pub struct ManagerHandle {
    tx: mpsc::Sender<Command>,
}

impl ManagerHandle {
    fn closed() -> CoreError {
        CoreError::Transport("state manager mailbox closed".to_string())
    }

    pub async fn add(&self, record: BasicRecord) -> Result<()> {
        self.tx
            .send(Command::Add(record))
            .await
            .map_err(|_| Self::closed())
    }

    pub async fn update(&self, record: BasicRecord) -> Result<()> {
        self.tx
            .send(Command::Update(record))
            .await
            .map_err(|_| Self::closed())
    }

    pub async fn eval(&self, record: BasicRecord) -> Result<()> {
        self.tx
            .send(Command::Eval(record))
            .await
            .map_err(|_| Self::closed())
    }

    pub async fn fail(&self, record: BasicRecord) -> Result<()> {
        self.tx
            .send(Command::Fail(record))
            .await
            .map_err(|_| Self::closed())
    }

    pub async fn next_target(&self) -> Result<Option<String>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::NextTarget(reply_tx))
            .await
            .map_err(|_| Self::closed())?;
        reply_rx.await.map_err(|_| Self::closed())
    }

    pub async fn pick_members(&self) -> Result<Vec<BasicRecord>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::PickMembers(reply_tx))
            .await
            .map_err(|_| Self::closed())?;
        reply_rx.await.map_err(|_| Self::closed())
    }

    pub async fn snapshot(&self) -> Result<Vec<LocalRecord>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply_tx))
            .await
            .map_err(|_| Self::closed())?;
        reply_rx.await.map_err(|_| Self::closed())
    }
}

/// The single-owner serialized loop that mediates every mutation of the
/// Member Table (I1). Spawn `Manager::run` once per node and talk to it only
/// through the `ManagerHandle` it hands back.
pub struct Manager {
    rx: mpsc::Receiver<Command>,
    table: MemberTable,
    send_cap: u32,
    event_tx: Option<mpsc::Sender<Event>>,
    rng: StdRng,
}

impl Manager {
    /// The source uses a mailbox depth of 1 (spec §5); senders block briefly
    /// under burst rather than ever dropping a message.
    const MAILBOX_DEPTH: usize = 1;

    pub fn new(
        self_address: impl Into<String>,
        send_cap: u32,
        event_tx: Option<mpsc::Sender<Event>>,
    ) -> (Self, ManagerHandle) {
        let (tx, rx) = mpsc::channel(Self::MAILBOX_DEPTH);
        let manager = Self {
            rx,
            table: MemberTable::new(self_address),
            send_cap,
            event_tx,
            rng: StdRng::from_os_rng(),
        };
        (manager, ManagerHandle { tx })
    }

    pub async fn run(mut self) {
        while let Some(cmd) = self.rx.recv().await {
            self.handle(cmd);
        }
        tracing::debug!("state manager mailbox closed, stopping");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Add(record) => {
                let address = record.address.clone();
                let metadata = record.metadata.clone();
                if self.table.add(record) {
                    tracing::info!(%address, "member joined");
                    self.emit(Event::Join { address, metadata });
                }
            }
            Command::Update(record) => self.table.update(record),
            Command::Eval(record) => self.table.eval(record),
            Command::Fail(record) => {
                let address = record.address.clone();
                let metadata = record.metadata.clone();
                self.table.fail(&address, metadata.clone());
                tracing::warn!(%address, "member failed");
                self.emit(Event::Fail { address, metadata });
            }
            Command::NextTarget(reply) => {
                let target = self.table.next_target(&mut self.rng);
                let _ = reply.send(target);
            }
            Command::PickMembers(reply) => {
                let picked = self.table.pick_members(self.send_cap);
                let _ = reply.send(picked);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.table.snapshot());
            }
        }
    }

    /// Non-blocking emission: a missing or saturated sink is dropped, never
    /// stalling the manager's loop (spec §4.1, §7).
    fn emit(&self, event: Event) {
        if let Some(tx) = &self.event_tx {
            if let Err(e) = tx.try_send(event) {
                tracing::trace!(error = %e, "event sink full or closed, dropping event");
            }
        }
    }
}
