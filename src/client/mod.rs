//! Reconnecting SSE client.
//!
//! - `stream_client` - [`StreamClient`], connect/disconnect and retry policy
//! - `state` - [`ConnectionState`] and the client's internal state

mod state;
mod stream_client;

pub use state::ConnectionState;
pub use stream_client::StreamClient;
