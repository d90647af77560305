//! Byte-level SSE decoding.
//!
//! Network chunks do not respect line boundaries, and a multi-byte UTF-8
//! character can be split across two chunks. [`SseDecoder`] buffers raw
//! bytes, cuts complete lines, and only then decodes them before handing
//! them to the [`SseParser`]. Invalid UTF-8 is replaced with U+FFFD, the
//! way an event-stream reader decodes it.

use crate::sse::events::{SseFrame, SseParseError};
use crate::sse::parser::SseParser;

/// Default limit for a single unterminated line (1 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Incremental decoder turning byte chunks into [`SseFrame`]s.
#[derive(Debug)]
pub struct SseDecoder {
    parser: SseParser,
    buffer: Vec<u8>,
    /// Start of the first line not yet handed to the parser
    read_pos: usize,
    max_line_bytes: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseDecoder {
    /// Create a decoder with the default line limit.
    pub fn new() -> Self {
        Self::with_max_line_bytes(DEFAULT_MAX_LINE_BYTES)
    }

    /// Create a decoder with a custom line limit.
    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            parser: SseParser::new(),
            buffer: Vec::new(),
            read_pos: 0,
            max_line_bytes,
        }
    }

    /// Append a chunk received from the network.
    pub fn push(&mut self, chunk: &[u8]) {
        // Consumed lines are dropped once per chunk, not once per line
        if self.read_pos > 0 {
            self.buffer.drain(..self.read_pos);
            self.read_pos = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Pull the next complete frame out of the buffered bytes.
    ///
    /// Returns `None` when more input is needed. `LineTooLong` discards the
    /// buffer along with the frame being accumulated.
    pub fn next_frame(&mut self) -> Option<Result<SseFrame, SseParseError>> {
        while let Some(offset) = self.buffer[self.read_pos..]
            .iter()
            .position(|&b| b == b'\n')
        {
            let start = self.read_pos;
            let mut end = start + offset;
            self.read_pos = end + 1;
            if end > start && self.buffer[end - 1] == b'\r' {
                end -= 1;
            }

            let line = String::from_utf8_lossy(&self.buffer[start..end]);
            if let Some(frame) = self.parser.feed_line(&line) {
                return Some(Ok(frame));
            }
        }

        if self.buffer.len() - self.read_pos > self.max_line_bytes {
            self.reset();
            return Some(Err(SseParseError::LineTooLong {
                limit: self.max_line_bytes,
            }));
        }

        None
    }

    /// Drop all buffered bytes and any partially accumulated frame.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.read_pos = 0;
        self.parser.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(decoder: &mut SseDecoder) -> Vec<Result<SseFrame, SseParseError>> {
        std::iter::from_fn(|| decoder.next_frame()).collect()
    }

    #[test]
    fn test_decodes_frames_from_single_chunk() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: {\"type\":\"chat\"}\n\n: keep-alive\n\ndata: {\"type\":\"ping\"}\n\n");

        let frames = drain(&mut decoder);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref().unwrap().data, "{\"type\":\"chat\"}");
        assert_eq!(frames[1].as_ref().unwrap().data, "{\"type\":\"ping\"}");
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: {\"type\":\"ch");
        assert!(decoder.next_frame().is_none());

        decoder.push(b"at\"}\n");
        assert!(decoder.next_frame().is_none());

        decoder.push(b"\n");
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.data, "{\"type\":\"chat\"}");
    }

    #[test]
    fn test_many_frames_across_pushes() {
        let mut decoder = SseDecoder::new();
        let mut seen = Vec::new();
        for i in 0..50 {
            decoder.push(format!("data: {}\n\n", i).as_bytes());
            if i % 7 == 0 {
                seen.extend(drain(&mut decoder).into_iter().map(|f| f.unwrap().data));
            }
        }
        seen.extend(drain(&mut decoder).into_iter().map(|f| f.unwrap().data));

        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let text = "data: {\"text\":\"héllo\"}\n\n".as_bytes();
        // Split inside the two-byte 'é'
        let split = text.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut decoder = SseDecoder::new();
        decoder.push(&text[..split]);
        assert!(decoder.next_frame().is_none());
        decoder.push(&text[split..]);

        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.data, "{\"text\":\"héllo\"}");
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"event: update\r\ndata: 1\r\n\r\n");

        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.event.as_deref(), Some("update"));
        assert_eq!(frame.data, "1");
    }

    #[test]
    fn test_invalid_utf8_in_single_line_frame_is_replaced() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: {\"type\":\"chat\",\"text\":\"a\xffb\"}\n\n");

        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.data, "{\"type\":\"chat\",\"text\":\"a\u{FFFD}b\"}");
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn test_invalid_utf8_keeps_every_line_of_multiline_frame() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: {\"type\":\"chat\",\ndata: \"text\":\"\xff\",\ndata: \"n\":1}\n\n");

        let frames = drain(&mut decoder);
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].as_ref().unwrap().data,
            "{\"type\":\"chat\",\n\"text\":\"\u{FFFD}\",\n\"n\":1}"
        );
    }

    #[test]
    fn test_line_too_long() {
        let mut decoder = SseDecoder::with_max_line_bytes(16);
        decoder.push(b"data: 0123456789abcdef");

        assert_eq!(
            decoder.next_frame(),
            Some(Err(SseParseError::LineTooLong { limit: 16 }))
        );
        assert!(decoder.next_frame().is_none());

        decoder.push(b"data: short\n\n");
        assert_eq!(decoder.next_frame().unwrap().unwrap().data, "short");
    }

    #[test]
    fn test_line_too_long_discards_partial_frame() {
        let mut decoder = SseDecoder::with_max_line_bytes(16);
        decoder.push(b"data: first\ndata: 0123456789abcdef");

        assert_eq!(
            decoder.next_frame(),
            Some(Err(SseParseError::LineTooLong { limit: 16 }))
        );

        decoder.push(b"data: second\n\n");
        assert_eq!(decoder.next_frame().unwrap().unwrap().data, "second");
    }

    #[test]
    fn test_reset_discards_partial_input() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: partial\n");
        assert!(decoder.next_frame().is_none());

        decoder.reset();
        decoder.push(b"\n");
        assert!(decoder.next_frame().is_none());
    }
}
