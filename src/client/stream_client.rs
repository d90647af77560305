//! Reconnecting SSE client.
//!
//! [`StreamClient`] owns at most one live connection to `{base_url}/sse`.
//! Each connection is driven by a spawned pump task that turns transport
//! events into callbacks:
//!
//! - *open* resets the retry counter and calls `on_connect`
//! - *message* is parsed as JSON; keep-alives are dropped, parse failures
//!   go to the diagnostic sink, everything else reaches `on_message`
//! - *error* calls `on_error`, then either schedules a reconnect after the
//!   fixed interval or, with the budget spent, gives up
//!
//! State is guarded by a single mutex that is never held across an `.await`
//! or while user code runs. Every pump and timer checks that its connection
//! is still the current one before touching state, so a superseded
//! connection can never undo a newer `connect` or `disconnect`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::state::{ActiveConnection, ClientState, ConnectionState};
use crate::adapters::{ReqwestConnectionFactory, TracingSink};
use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError};
use crate::message::{self, Dispatch};
use crate::traits::{
    ConnectionFactory, DiagnosticLevel, DiagnosticSink, EventSourceConnection, TransportEvent,
};

/// Reconnecting client for a single SSE endpoint.
///
/// Must be used from within a tokio runtime: `connect` spawns the tasks that
/// drive the connection. Dropping the client disconnects it.
///
/// # Example
///
/// ```ignore
/// use ssewire::{ClientConfig, StreamClient};
///
/// let config = ClientConfig::new("http://localhost:8000")
///     .with_on_message(|payload| println!("{}", payload));
/// let client = StreamClient::new(config)?;
/// client.connect();
/// ```
pub struct StreamClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    endpoint: String,
    factory: Arc<dyn ConnectionFactory>,
    sink: Arc<dyn DiagnosticSink>,
    state: Mutex<ClientState>,
    state_tx: watch::Sender<ConnectionState>,
}

/// What a transport error led to, decided under the state lock.
enum ErrorOutcome {
    /// The failed connection had already been replaced or dropped
    Stale,
    Retry { attempt: u32 },
    Exhausted,
    /// Auto-reconnect is off
    Stopped,
}

impl StreamClient {
    /// Create a client that connects over HTTP and logs through `tracing`.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let factory = ReqwestConnectionFactory::new().with_headers(config.headers.clone());
        Self::with_dependencies(config, Arc::new(factory), Arc::new(TracingSink::new()))
    }

    /// Create a client with an injected transport and diagnostic sink.
    pub fn with_dependencies(
        config: ClientConfig,
        factory: Arc<dyn ConnectionFactory>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let endpoint = config.endpoint();
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                endpoint,
                factory,
                sink,
                state: Mutex::new(ClientState::default()),
                state_tx,
            }),
        })
    }

    /// Open a connection, closing the current one first.
    ///
    /// Also cancels a scheduled reconnect. Failures to build the connection
    /// are reported to the diagnostic sink and leave the client disconnected.
    pub fn connect(&self) {
        self.inner.connect();
    }

    /// Close the live connection and cancel any scheduled reconnect.
    ///
    /// No-op when already disconnected. The retry counter is kept.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    /// Automatic reconnects made since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.lock_state().reconnect_attempts
    }

    /// Check if the transport currently reports open.
    pub fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }

    /// Check if a connection handle is held (open or still connecting).
    pub fn has_connection(&self) -> bool {
        self.inner.lock_state().connection.is_some()
    }

    /// Check if an automatic reconnect is scheduled.
    pub fn has_pending_reconnect(&self) -> bool {
        self.inner.lock_state().pending_reconnect.is_some()
    }

    /// Get the current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Full URL of the event stream.
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.inner.disconnect();
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }

    fn connect(self: &Arc<Self>) {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                self.report_construction_failure(&TransportError::NoRuntime);
                return;
            }
        };

        let mut state = self.lock_state();

        if let Some(previous) = state.connection.take() {
            debug!("Closing SSE connection {} before reconnecting", previous.id);
            previous.shutdown();
        }
        state.cancel_pending_reconnect();

        let connection = match self.factory.open(&self.endpoint) {
            Ok(connection) => connection,
            Err(err) => {
                self.set_state(ConnectionState::Disconnected);
                drop(state);
                self.report_construction_failure(&err);
                return;
            }
        };

        // The pump blocks on the state lock until the handle is stored below
        let id = state.allocate_id();
        let pump = runtime.spawn(Arc::clone(self).pump(id, Arc::clone(&connection)));
        state.connection = Some(ActiveConnection {
            id,
            connection,
            pump,
        });
        self.set_state(ConnectionState::Connecting);
        drop(state);

        debug!("SSE connection {} opening to {}", id, self.endpoint);
    }

    fn disconnect(&self) {
        let (closed, cancelled) = {
            let mut state = self.lock_state();
            let cancelled = state.cancel_pending_reconnect();
            let closed = match state.connection.take() {
                Some(active) => {
                    active.shutdown();
                    true
                }
                None => false,
            };
            if closed || cancelled {
                self.set_state(ConnectionState::Disconnected);
            }
            (closed, cancelled)
        };

        if closed {
            debug!("SSE connection to {} closed", self.endpoint);
        }
        if cancelled {
            debug!("Cancelled pending SSE reconnect");
        }
    }

    async fn pump(self: Arc<Self>, id: u64, connection: Arc<dyn EventSourceConnection>) {
        while let Some(event) = connection.next_event().await {
            match event {
                TransportEvent::Open => self.handle_open(id),
                TransportEvent::Message(data) => self.handle_message(&data),
                TransportEvent::Error(err) => {
                    self.handle_error(id, err);
                    return;
                }
            }
        }
        self.handle_end(id);
    }

    fn handle_open(&self, id: u64) {
        {
            let mut state = self.lock_state();
            if !state.is_current(id) {
                return;
            }
            state.reconnect_attempts = 0;
            self.set_state(ConnectionState::Connected);
        }

        self.sink.log(
            DiagnosticLevel::Info,
            &format!("SSE connection established to {}", self.endpoint),
        );
        match &self.config.on_connect {
            Some(callback) => callback(),
            None => self.sink.log(DiagnosticLevel::Info, "SSE connected"),
        }
    }

    fn handle_message(&self, data: &str) {
        match message::classify(data) {
            Ok(Dispatch::KeepAlive) => {}
            Ok(Dispatch::Deliver(payload)) => self.deliver(&payload),
            Err(err) => self.sink.log(
                DiagnosticLevel::Error,
                &format!("Error parsing SSE message: {}", err),
            ),
        }
    }

    fn deliver(&self, payload: &Value) {
        match &self.config.on_message {
            Some(callback) => callback(payload),
            None => self.sink.log(
                DiagnosticLevel::Info,
                &format!("SSE message received: {}", payload),
            ),
        }
    }

    fn handle_error(self: &Arc<Self>, id: u64, error: TransportError) {
        match &self.config.on_error {
            Some(callback) => callback(&error),
            None => self
                .sink
                .log(DiagnosticLevel::Error, &format!("SSE error: {}", error)),
        }

        let outcome = {
            let mut state = self.lock_state();
            if !state.is_current(id) {
                ErrorOutcome::Stale
            } else {
                // This runs on the pump task itself: close, don't abort
                if let Some(active) = state.connection.take() {
                    active.connection.close();
                }

                if self.config.auto_reconnect
                    && state.reconnect_attempts < self.config.max_reconnect_attempts
                {
                    state.reconnect_attempts += 1;
                    let attempt = state.reconnect_attempts;
                    state.pending_reconnect = Some(self.schedule_reconnect());
                    self.set_state(ConnectionState::Reconnecting { attempt });
                    ErrorOutcome::Retry { attempt }
                } else if state.reconnect_attempts >= self.config.max_reconnect_attempts {
                    self.set_state(ConnectionState::Exhausted);
                    ErrorOutcome::Exhausted
                } else {
                    self.set_state(ConnectionState::Disconnected);
                    ErrorOutcome::Stopped
                }
            }
        };

        match outcome {
            ErrorOutcome::Retry { attempt } => self.sink.log(
                DiagnosticLevel::Info,
                &format!(
                    "SSE connection error. Reconnecting in {:?} (attempt {} of {})...",
                    self.config.reconnect_interval, attempt, self.config.max_reconnect_attempts
                ),
            ),
            ErrorOutcome::Exhausted => self.sink.log(
                DiagnosticLevel::Error,
                "Max SSE reconnection attempts reached",
            ),
            ErrorOutcome::Stopped => {
                debug!("SSE connection error with auto-reconnect disabled; staying disconnected")
            }
            ErrorOutcome::Stale => {}
        }
    }

    fn handle_end(&self, id: u64) {
        let mut state = self.lock_state();
        if state.is_current(id) {
            state.connection = None;
            self.set_state(ConnectionState::Disconnected);
        }
    }

    fn schedule_reconnect(self: &Arc<Self>) -> JoinHandle<()> {
        let client = Arc::downgrade(self);
        let delay = self.config.reconnect_interval;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = client.upgrade() {
                inner.fire_reconnect();
            }
        })
    }

    fn fire_reconnect(self: &Arc<Self>) {
        // Detach this timer's own handle so connect() does not abort it
        self.lock_state().pending_reconnect = None;
        self.connect();
    }

    fn report_construction_failure(&self, error: &TransportError) {
        self.sink.log(
            DiagnosticLevel::Error,
            &format!("Failed to create SSE connection: {}", error),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockConnectionFactory, RecordingSink};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn settle() {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }

    fn client_with(config: ClientConfig) -> (StreamClient, MockConnectionFactory, RecordingSink) {
        let factory = MockConnectionFactory::new();
        let sink = RecordingSink::new();
        let client = StreamClient::with_dependencies(
            config,
            Arc::new(factory.clone()),
            Arc::new(sink.clone()),
        )
        .unwrap();
        (client, factory, sink)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = StreamClient::with_dependencies(
            ClientConfig::default().with_reconnect_interval(Duration::ZERO),
            Arc::new(MockConnectionFactory::new()),
            Arc::new(RecordingSink::new()),
        );
        assert!(matches!(result, Err(ConfigError::ZeroReconnectInterval)));
    }

    #[test]
    fn test_connect_without_runtime_is_logged() {
        let (client, factory, sink) = client_with(ClientConfig::default());
        client.connect();

        assert_eq!(factory.open_count(), 0);
        assert!(!client.has_connection());
        assert_eq!(sink.count_containing("No tokio runtime"), 1);
    }

    #[tokio::test]
    async fn test_open_resets_attempts_and_calls_on_connect() {
        let connects = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connects);
        let (client, factory, _sink) = client_with(
            ClientConfig::new("http://chat.test").with_on_connect(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        client.connect();
        assert_eq!(client.connection_state(), ConnectionState::Connecting);
        assert_eq!(factory.latest().unwrap().endpoint(), "http://chat.test/sse");

        factory.latest().unwrap().emit_open();
        settle().await;

        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert!(client.is_connected());
        assert_eq!(client.reconnect_attempts(), 0);
    }

    #[tokio::test]
    async fn test_default_callbacks_write_to_sink() {
        let (client, factory, sink) = client_with(
            ClientConfig::default().with_auto_reconnect(false),
        );

        client.connect();
        let conn = factory.latest().unwrap();
        conn.emit_open();
        conn.emit_message(r#"{"type":"chat","text":"hi"}"#);
        conn.emit_error(TransportError::ServerClosed);
        settle().await;

        assert_eq!(sink.count_containing("SSE connected"), 1);
        assert_eq!(sink.count_containing("SSE message received"), 1);
        assert_eq!(sink.count_containing("SSE error: Server closed"), 1);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert!(!client.has_pending_reconnect());
    }

    #[tokio::test]
    async fn test_message_forwarded_verbatim() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink_vec = Arc::clone(&received);
        let (client, factory, _sink) = client_with(
            ClientConfig::default()
                .with_on_message(move |payload| sink_vec.lock().unwrap().push(payload.clone())),
        );

        client.connect();
        let conn = factory.latest().unwrap();
        conn.emit_open();
        conn.emit_message(r#"{"type":"ping"}"#);
        conn.emit_message(r#"{"type":"chat","text":"hi"}"#);
        settle().await;

        assert_eq!(
            *received.lock().unwrap(),
            vec![json!({"type": "chat", "text": "hi"})]
        );
    }

    #[tokio::test]
    async fn test_drop_disconnects() {
        let (client, factory, _sink) = client_with(ClientConfig::default());
        client.connect();
        let conn = factory.latest().unwrap();

        drop(client);
        assert!(conn.is_closed());
    }
}
