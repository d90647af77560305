//! SSE (Server-Sent Events) wire framing
//!
//! SSE format consists of:
//! - `event: <name>` - event name line
//! - `data: <payload>` - data payload line(s)
//! - `id: <id>` / `retry: <ms>` - accepted and ignored
//! - Empty line - signals end of event
//! - Lines starting with `:` - comments, used as keep-alives (ignored)
//!
//! # Module structure
//! - `events` - Line and frame types (SseLine, SseFrame, SseParseError)
//! - `parser` - Line classification and the stateful SseParser
//! - `decoder` - Byte-chunk decoding on top of the parser

mod decoder;
mod events;
mod parser;

// Re-export public types
pub use decoder::{SseDecoder, DEFAULT_MAX_LINE_BYTES};
pub use events::{SseFrame, SseLine, SseParseError, DEFAULT_EVENT_NAME};
pub use parser::{parse_sse_line, SseParser};
