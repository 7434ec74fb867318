// Incremental text/event-stream frame parser.
//
// Reassembles the SSE wire format from arbitrary byte chunks and yields
// one payload string per complete frame (the joined `data:` lines). The
// backend uses comment lines as keepalives; those, and the `event:` /
// `id:` / `retry:` fields it never sends, are consumed here and never
// surface to the caller.

use bytes::Bytes;

/// Parser state carried across chunks of the response body.
#[derive(Debug, Default)]
pub(crate) struct SseParser {
    /// Bytes of the current incomplete line.
    buffer: Vec<u8>,
    /// Accumulated `data:` content of the frame in progress.
    data: String,
}

impl SseParser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect any payloads completed by it.
    pub(crate) fn feed(&mut self, chunk: &Bytes) -> Vec<String> {
        let mut payloads = Vec::new();

        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let mut line = &line[..line.len() - 1];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }

            if let Some(payload) = self.process_line(line) {
                payloads.push(payload);
            }
        }

        payloads
    }

    /// Handle one line; returns a payload when a blank line closes a frame.
    fn process_line(&mut self, line: &[u8]) -> Option<String> {
        // Blank line terminates the frame.
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            return Some(std::mem::take(&mut self.data));
        }

        // Comment line -- the backend's keepalive.
        if line.starts_with(b":") {
            tracing::trace!("stream keepalive");
            return None;
        }

        let Ok(text) = std::str::from_utf8(line) else {
            tracing::debug!("dropping non-UTF-8 stream line");
            return None;
        };

        let (field, value) = match text.find(':') {
            Some(pos) => {
                let (field, rest) = text.split_at(pos);
                let value = rest[1..].strip_prefix(' ').unwrap_or(&rest[1..]);
                (field, value)
            }
            None => (text, ""),
        };

        match field {
            "data" => {
                // Multiple data lines in one frame are joined with newlines.
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(value);
            }
            "event" | "id" | "retry" => {
                tracing::trace!(field, value, "ignoring stream field");
            }
            _ => {
                tracing::trace!(field, "unknown stream field");
            }
        }

        None
    }
}
