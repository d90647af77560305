//! SSE line and frame types

use thiserror::Error;

/// Event name dispatched when a frame carries no `event:` field.
pub const DEFAULT_EVENT_NAME: &str = "message";

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event name declaration (e.g., "event: update")
    Event(String),
    /// Data payload (e.g., "data: {\"type\": \"chat\"}")
    Data(String),
    /// Event id (e.g., "id: 42")
    Id(String),
    /// Reconnection time hint in milliseconds (raw value)
    Retry(String),
    /// Empty line - signals end of event
    Empty,
    /// Comment line (starts with ':'), used by servers as keep-alive
    Comment(String),
    /// Field name the protocol does not define
    Unknown(String),
}

/// A complete event as framed on the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SseFrame {
    /// Value of the `event:` field, if any
    pub event: Option<String>,
    /// Data lines joined with `\n`
    pub data: String,
}

impl SseFrame {
    /// Event name, falling back to `message` when none (or an empty one)
    /// was sent.
    pub fn event_name(&self) -> &str {
        self.event
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_EVENT_NAME)
    }

    /// True for frames delivered to a plain message handler, i.e. frames
    /// without an event name or explicitly named `message`.
    pub fn is_message(&self) -> bool {
        self.event_name() == DEFAULT_EVENT_NAME
    }
}

/// Errors that can occur while decoding an SSE byte stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseParseError {
    /// A line grew past the decoder's limit without a terminator
    #[error("SSE line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_event_name_defaults_to_message() {
        let frame = SseFrame {
            data: "{}".to_string(),
            ..Default::default()
        };
        assert_eq!(frame.event_name(), "message");
        assert!(frame.is_message());
    }

    #[test]
    fn test_named_frame_is_not_message() {
        let frame = SseFrame {
            event: Some("presence".to_string()),
            data: "{}".to_string(),
            ..Default::default()
        };
        assert_eq!(frame.event_name(), "presence");
        assert!(!frame.is_message());

        let explicit = SseFrame {
            event: Some("message".to_string()),
            ..Default::default()
        };
        assert!(explicit.is_message());
    }

    #[test]
    fn test_empty_event_name_is_message() {
        let frame = SseFrame {
            event: Some(String::new()),
            data: "{}".to_string(),
        };
        assert_eq!(frame.event_name(), "message");
        assert!(frame.is_message());
    }

    #[test]
    fn test_sse_parse_error_display() {
        let err = SseParseError::LineTooLong { limit: 1024 };
        assert_eq!(err.to_string(), "SSE line exceeds 1024 bytes");
    }
}
