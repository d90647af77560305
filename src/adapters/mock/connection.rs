//! Mock event-stream transport for testing.
//!
//! Provides a connection factory that records every connection it opens and
//! hands out [`MockConnection`] handles that tests drive by injecting
//! transport events.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::adapters::close_signal::CloseSignal;
use crate::error::TransportError;
use crate::traits::{ConnectionFactory, EventSourceConnection, TransportEvent};

/// Mock connection driven by the test.
///
/// Clones share the same underlying channel and close flag, so the copy kept
/// by the test observes what the client does with its copy.
///
/// # Example
///
/// ```ignore
/// use ssewire::adapters::mock::MockConnectionFactory;
///
/// let factory = MockConnectionFactory::new();
/// // ... client.connect() ...
/// let conn = factory.latest().unwrap();
/// conn.emit_open();
/// conn.emit_message(r#"{"type":"chat","text":"hi"}"#);
/// conn.emit_error(TransportError::ServerClosed);
/// ```
#[derive(Clone)]
pub struct MockConnection {
    endpoint: String,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: Arc<AsyncMutex<mpsc::UnboundedReceiver<TransportEvent>>>,
    close_signal: Arc<CloseSignal>,
}

impl MockConnection {
    /// Create a connection for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            endpoint: endpoint.into(),
            events_tx,
            events_rx: Arc::new(AsyncMutex::new(events_rx)),
            close_signal: Arc::new(CloseSignal::new()),
        }
    }

    /// The endpoint this connection was opened for.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Inject a transport event.
    pub fn emit(&self, event: TransportEvent) {
        // Ignore send errors (reader gone)
        let _ = self.events_tx.send(event);
    }

    /// Report the stream as open.
    pub fn emit_open(&self) {
        self.emit(TransportEvent::Open);
    }

    /// Deliver one raw message body.
    pub fn emit_message(&self, data: impl Into<String>) {
        self.emit(TransportEvent::Message(data.into()));
    }

    /// Report a transport error.
    pub fn emit_error(&self, error: TransportError) {
        self.emit(TransportEvent::Error(error));
    }
}

#[async_trait]
impl EventSourceConnection for MockConnection {
    async fn next_event(&self) -> Option<TransportEvent> {
        if self.close_signal.is_closed() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.close_signal.closed() => None,
            event = async { self.events_rx.lock().await.recv().await } => event,
        }
    }

    fn close(&self) {
        self.close_signal.close();
    }

    fn is_closed(&self) -> bool {
        self.close_signal.is_closed()
    }
}

#[derive(Default)]
struct FactoryState {
    connections: Vec<MockConnection>,
    failure: Option<TransportError>,
    failed_attempts: usize,
}

/// Mock connection factory.
///
/// Records every connection it opens. Can be switched into a failing mode to
/// simulate construction failures.
#[derive(Clone, Default)]
pub struct MockConnectionFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl MockConnectionFactory {
    /// Create a factory that opens connections successfully.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make subsequent `open` calls fail with `error` (`None` restores success).
    pub fn set_failure(&self, error: Option<TransportError>) {
        self.lock().failure = error;
    }

    /// Number of connections successfully opened.
    pub fn open_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Number of `open` calls rejected in failing mode.
    pub fn failed_attempts(&self) -> usize {
        self.lock().failed_attempts
    }

    /// Number of opened connections that have not been closed.
    pub fn live_count(&self) -> usize {
        self.lock()
            .connections
            .iter()
            .filter(|conn| !conn.is_closed())
            .count()
    }

    /// Connection opened at position `index`.
    pub fn connection(&self, index: usize) -> Option<MockConnection> {
        self.lock().connections.get(index).cloned()
    }

    /// Most recently opened connection.
    pub fn latest(&self) -> Option<MockConnection> {
        self.lock().connections.last().cloned()
    }
}

impl ConnectionFactory for MockConnectionFactory {
    fn open(&self, endpoint: &str) -> Result<Arc<dyn EventSourceConnection>, TransportError> {
        let mut state = self.lock();
        if let Some(err) = state.failure.clone() {
            state.failed_attempts += 1;
            return Err(err);
        }

        let connection = MockConnection::new(endpoint);
        state.connections.push(connection.clone());
        Ok(Arc::new(connection))
    }
}
