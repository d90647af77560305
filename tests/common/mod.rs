//! Common test utilities for integration tests.
//!
//! Provides a recorder that captures every client callback, a constructor
//! that wires a [`StreamClient`] to the in-memory mocks, and a helper that
//! lets spawned tasks run.
//!
//! # Example
//!
//! ```ignore
//! let recorder = CallbackRecorder::new();
//! let (client, factory, sink) = mock_client(recorder.install(ClientConfig::default()));
//! client.connect();
//! factory.latest().unwrap().emit_open();
//! settle().await;
//! assert_eq!(recorder.connect_count(), 1);
//! ```

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use ssewire::adapters::mock::{MockConnectionFactory, RecordingSink};
use ssewire::{ClientConfig, StreamClient, TransportError};

/// Captures everything the client reports through its callbacks.
#[derive(Clone, Default)]
pub struct CallbackRecorder {
    messages: Arc<Mutex<Vec<Value>>>,
    connects: Arc<Mutex<usize>>,
    errors: Arc<Mutex<Vec<TransportError>>>,
}

impl CallbackRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register all three callbacks on `config`.
    pub fn install(&self, config: ClientConfig) -> ClientConfig {
        let messages = Arc::clone(&self.messages);
        let connects = Arc::clone(&self.connects);
        let errors = Arc::clone(&self.errors);

        config
            .with_on_message(move |payload| messages.lock().unwrap().push(payload.clone()))
            .with_on_connect(move || *connects.lock().unwrap() += 1)
            .with_on_error(move |err| errors.lock().unwrap().push(err.clone()))
    }

    pub fn messages(&self) -> Vec<Value> {
        self.messages.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        *self.connects.lock().unwrap()
    }

    pub fn errors(&self) -> Vec<TransportError> {
        self.errors.lock().unwrap().clone()
    }
}

/// Build a client on top of the mock transport and a recording sink.
pub fn mock_client(config: ClientConfig) -> (StreamClient, MockConnectionFactory, RecordingSink) {
    let factory = MockConnectionFactory::new();
    let sink = RecordingSink::new();
    let client =
        StreamClient::with_dependencies(config, Arc::new(factory.clone()), Arc::new(sink.clone()))
            .expect("valid test config");
    (client, factory, sink)
}

/// Config with a short retry interval for timer tests.
pub fn fast_retry_config(max_attempts: u32) -> ClientConfig {
    ClientConfig::new("http://chat.test")
        .with_reconnect_interval(Duration::from_millis(100))
        .with_max_reconnect_attempts(max_attempts)
}

/// Yield enough times for spawned pump and timer tasks to make progress.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Advance paused time past one retry interval, then settle.
pub async fn wait_for_retry(interval: Duration) {
    tokio::time::sleep(interval + Duration::from_millis(10)).await;
    settle().await;
}
