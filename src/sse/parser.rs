//! SSE stream parsing logic
//!
//! Contains the line classifier and the stateful [`SseParser`] that
//! accumulates fields until an empty line dispatches a frame.

use crate::sse::events::{SseFrame, SseLine};

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    // A line without a colon is a field name with an empty value
    let (field, value) = match line.split_once(':') {
        Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
        None => (line, ""),
    };

    match field {
        "event" => SseLine::Event(value.to_string()),
        "data" => SseLine::Data(value.to_string()),
        "id" => SseLine::Id(value.to_string()),
        "retry" => SseLine::Retry(value.to_string()),
        _ => SseLine::Unknown(field.to_string()),
    }
}

/// Stateful SSE parser that accumulates lines and emits complete frames
#[derive(Debug, Default)]
pub struct SseParser {
    /// Current event name being accumulated
    current_event: Option<String>,
    /// Accumulated data lines (SSE allows multiple data: lines)
    data_buffer: Vec<String>,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line (without its terminator) to the parser.
    ///
    /// Returns `Some(frame)` when the line completes a frame that carries
    /// data, `None` otherwise.
    pub fn feed_line(&mut self, line: &str) -> Option<SseFrame> {
        match parse_sse_line(line) {
            SseLine::Event(name) => {
                self.current_event = Some(name);
                None
            }
            SseLine::Data(data) => {
                self.data_buffer.push(data);
                None
            }
            SseLine::Empty => self.try_emit_frame(),
            // No Last-Event-ID resume; retry timing belongs to the client
            SseLine::Id(_) | SseLine::Retry(_) => None,
            SseLine::Comment(_) | SseLine::Unknown(_) => None,
        }
    }

    /// Emit the accumulated frame, if it carries any data
    fn try_emit_frame(&mut self) -> Option<SseFrame> {
        let event = self.current_event.take();

        if self.data_buffer.is_empty() {
            return None;
        }

        let data = self.data_buffer.join("\n");
        self.data_buffer.clear();

        Some(SseFrame { event, data })
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.current_event = None;
        self.data_buffer.clear();
    }
}
