use crate::session::Message;
use derive_more::Display;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{channel, error::TrySendError, Receiver, Sender};
use tracing::warn;

static NEXT: AtomicU64 = AtomicU64::new(0);

/// A handle to a live connection.
///
/// Cloning a peer yields another handle to the same connection.
#[derive(Debug, Display, Clone)]
#[display(fmt = "peer#{}", id)]
pub struct Peer {
    id: u64,
    tx: Sender<Message>,
}

impl Peer {
    /// The number of messages a connection may fall behind by.
    pub const BACKLOG: usize = 256;

    /// A new peer and the receiving end of its outbound queue.
    pub fn new() -> (Self, Receiver<Message>) {
        Self::with_backlog(Self::BACKLOG)
    }

    /// A new peer whose outbound queue holds at most `backlog` messages.
    pub fn with_backlog(backlog: usize) -> (Self, Receiver<Message>) {
        let (tx, rx) = channel(backlog);
        let id = NEXT.fetch_add(1, Ordering::Relaxed);
        (Peer { id, tx }, rx)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the connection still accepts messages.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queues a message, returning whether it was accepted.
    ///
    /// A connection that has fallen [`BACKLOG`](`Self::BACKLOG`) messages behind is
    /// treated as if it were closed.
    pub fn send(&self, msg: Message) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Closed(_)) => false,
            Err(TrySendError::Full(_)) => {
                warn!(peer = self.id, "dropping message for lagging connection");
                false
            }
        }
    }
}

impl PartialEq for Peer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Peer {}

impl Hash for Peer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}
