//! Event-stream connection trait abstraction.
//!
//! Provides the transport seam for [`crate::StreamClient`]: a factory opens a
//! connection for an endpoint, and the connection yields [`TransportEvent`]s
//! until it errors or is closed. Production code uses the reqwest adapter;
//! tests substitute [`crate::adapters::mock::MockConnectionFactory`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;

/// Events a transport reports to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The stream is open and ready to deliver messages
    Open,
    /// One message body, exactly as received
    Message(String),
    /// The transport failed; no further events follow
    Error(TransportError),
}

/// A single live connection to a push endpoint.
///
/// # Example
///
/// ```ignore
/// use ssewire::traits::{EventSourceConnection, TransportEvent};
///
/// async fn drain<C: EventSourceConnection + ?Sized>(conn: &C) {
///     while let Some(event) = conn.next_event().await {
///         match event {
///             TransportEvent::Open => println!("open"),
///             TransportEvent::Message(data) => println!("{}", data),
///             TransportEvent::Error(err) => eprintln!("{}", err),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait EventSourceConnection: Send + Sync {
    /// Wait for the next transport event.
    ///
    /// Returns `None` once the connection is closed or after an
    /// [`TransportEvent::Error`] has been reported.
    async fn next_event(&self) -> Option<TransportEvent>;

    /// Close the connection. Pending and future `next_event` calls return
    /// `None`. Closing twice is a no-op.
    fn close(&self);

    /// Whether [`EventSourceConnection::close`] has been called.
    fn is_closed(&self) -> bool;
}

/// Builds connections for an endpoint.
///
/// `open` must not block on the network: failures it reports are
/// construction failures (bad URL, bad header). Network failures surface
/// later as [`TransportEvent::Error`].
pub trait ConnectionFactory: Send + Sync {
    /// Create a connection to `endpoint`.
    fn open(&self, endpoint: &str) -> Result<Arc<dyn EventSourceConnection>, TransportError>;
}
