//! Connection lifecycle and the client's mutable state.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::traits::EventSourceConnection;

/// Observable lifecycle of a [`crate::StreamClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no retry pending
    Disconnected,
    /// Connection created, waiting for the transport to report open
    Connecting,
    /// Transport reported open
    Connected,
    /// Previous connection failed; retry `attempt` is scheduled
    Reconnecting { attempt: u32 },
    /// Retry budget spent; only an explicit `connect()` starts over
    Exhausted,
}

impl ConnectionState {
    /// Returns a short label suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting { .. } => "reconnecting",
            ConnectionState::Exhausted => "exhausted",
        }
    }
}

/// The live transport handle plus the task pumping its events.
pub(crate) struct ActiveConnection {
    pub(crate) id: u64,
    pub(crate) connection: Arc<dyn EventSourceConnection>,
    pub(crate) pump: JoinHandle<()>,
}

impl ActiveConnection {
    /// Close the transport and stop its pump task.
    pub(crate) fn shutdown(self) {
        self.connection.close();
        self.pump.abort();
    }
}

/// Mutable state owned by the client, guarded by one mutex.
#[derive(Default)]
pub(crate) struct ClientState {
    pub(crate) connection: Option<ActiveConnection>,
    pub(crate) reconnect_attempts: u32,
    pub(crate) pending_reconnect: Option<JoinHandle<()>>,
    next_id: u64,
}

impl ClientState {
    /// Hand out an id for a new connection.
    pub(crate) fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// True while connection `id` is the one the client holds.
    pub(crate) fn is_current(&self, id: u64) -> bool {
        self.connection.as_ref().is_some_and(|active| active.id == id)
    }

    /// Abort a scheduled reconnect. Returns true if one was pending.
    pub(crate) fn cancel_pending_reconnect(&mut self) -> bool {
        match self.pending_reconnect.take() {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        }
    }
}
