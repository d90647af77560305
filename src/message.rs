//! Payload parsing and keep-alive filtering.
//!
//! Every message body is JSON carrying a `type` discriminator. A body whose
//! `type` is `"ping"` is a server keep-alive and never reaches application
//! code; everything else is forwarded verbatim.

use serde_json::Value;

/// Field that carries the message discriminator.
pub const DISCRIMINATOR_FIELD: &str = "type";

/// Discriminator value reserved for keep-alive messages.
pub const KEEPALIVE_MARKER: &str = "ping";

/// What the client should do with a successfully parsed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Keep-alive; drop silently
    KeepAlive,
    /// Forward to the message callback
    Deliver(Value),
}

/// Parse a raw message body as JSON.
pub fn parse_payload(data: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(data)
}

/// Discriminator of a parsed payload, if it has a string one.
pub fn message_type(payload: &Value) -> Option<&str> {
    payload.get(DISCRIMINATOR_FIELD).and_then(Value::as_str)
}

/// True when the payload is a keep-alive.
pub fn is_keepalive(payload: &Value) -> bool {
    message_type(payload) == Some(KEEPALIVE_MARKER)
}

/// Parse a raw body and decide whether it reaches the message callback.
pub fn classify(data: &str) -> Result<Dispatch, serde_json::Error> {
    let payload = parse_payload(data)?;
    if is_keepalive(&payload) {
        Ok(Dispatch::KeepAlive)
    } else {
        Ok(Dispatch::Deliver(payload))
    }
}
