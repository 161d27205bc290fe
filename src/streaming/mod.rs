//! Server-sent event line handling
//!
//! The completion API frames its stream as server-sent events. Network reads
//! do not respect line boundaries, so bytes are buffered here until whole
//! `data:` lines are available.

/// Buffer for accumulating incomplete SSE lines across chunk boundaries.
///
/// # Example
/// ```
/// use flightdesk::streaming::SseLineBuffer;
///
/// let mut buffer = SseLineBuffer::new();
///
/// assert!(buffer.feed(b"data: {\"content\":\"Ho").is_empty());
/// assert_eq!(buffer.feed(b"la\"}\n\n"), vec!["data: {\"content\":\"Hola\"}"]);
/// ```
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    /// Bytes after the last newline seen so far
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feed bytes and return every line completed by them.
    ///
    /// Line terminators (`\n` or `\r\n`) are stripped and blank separator
    /// lines are skipped. Bytes are only decoded once a line is complete, so
    /// a multi-byte character split across reads is decoded intact.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(newline_pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=newline_pos).collect();
            let line = decode_line(&raw[..raw.len() - 1]);
            if !line.is_empty() {
                lines.push(line);
            }
        }

        lines
    }

    /// Whether a partial line is waiting for more bytes
    pub fn has_incomplete(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take the trailing partial line at end of stream, if any.
    ///
    /// Some servers omit the final newline; the caller decides whether the
    /// remainder is usable.
    pub fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.pending);
        let line = decode_line(&raw);
        (!line.is_empty()).then_some(line)
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
