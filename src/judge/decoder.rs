//! Incremental event-stream decoder
//!
//! Bytes arrive in arbitrary chunks. Only complete lines are interpreted, so a
//! chunk boundary inside a multi-byte UTF-8 sequence or a `\r\n` pair never
//! changes the result. A frame is dispatched on the blank line that ends it.

use super::message::JudgeMessage;

/// Failure to turn one event frame into a [`JudgeMessage`]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("event data is not valid UTF-8")]
    InvalidUtf8,

    #[error("malformed judge message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report has {subtasks} subtask verdicts but {tests} test groups")]
    InconsistentReport { subtasks: usize, tests: usize },

    #[error("stream ended inside an unterminated event")]
    Truncated,
}

pub type Decoded = Result<JudgeMessage, DecodeError>;

/// Event-stream frame decoder producing judge messages in arrival order
#[derive(Debug, Default)]
pub struct EventDecoder {
    /// Bytes not yet terminated by a line ending
    pending: Vec<u8>,
    /// `data` lines of the frame being assembled
    data: String,
    has_data: bool,
    invalid_utf8: bool,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every message completed by it
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Decoded> {
        self.pending.extend_from_slice(chunk);

        let mut decoded = Vec::new();
        let mut consumed = 0;

        while let Some((line_len, terminator_len)) = next_line(&self.pending[consumed..]) {
            let line = consumed..consumed + line_len;
            consumed += line_len + terminator_len;

            // Borrow split: copy the line out before mutating frame state
            let line = self.pending[line].to_vec();
            if let Some(message) = self.process_line(&line) {
                decoded.push(message);
            }
        }

        self.pending.drain(..consumed);
        decoded
    }

    /// Flush state at end of input
    ///
    /// A frame missing its closing blank line is reported as
    /// [`DecodeError::Truncated`] instead of being dispatched.
    pub fn finish(&mut self) -> Option<Decoded> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            let line = rest.strip_suffix(b"\r").unwrap_or(&rest);
            if let Some(message) = self.process_line(line) {
                return Some(message);
            }
        }

        if self.has_data || self.invalid_utf8 {
            self.reset_frame();
            return Some(Err(DecodeError::Truncated));
        }

        None
    }

    fn process_line(&mut self, line: &[u8]) -> Option<Decoded> {
        if line.is_empty() {
            return self.dispatch();
        }

        // Comment line, used by servers as keep-alive
        if line[0] == b':' {
            return None;
        }

        let (field, value) = match line.iter().position(|&b| b == b':') {
            Some(colon) => {
                let value = &line[colon + 1..];
                (&line[..colon], value.strip_prefix(b" ").unwrap_or(value))
            }
            None => (line, &[][..]),
        };

        if field != b"data" {
            return None;
        }

        match std::str::from_utf8(value) {
            Ok(value) => {
                if self.has_data {
                    self.data.push('\n');
                }
                self.data.push_str(value);
                self.has_data = true;
            }
            Err(_) => self.invalid_utf8 = true,
        }

        None
    }

    fn dispatch(&mut self) -> Option<Decoded> {
        if self.invalid_utf8 {
            self.reset_frame();
            return Some(Err(DecodeError::InvalidUtf8));
        }

        if !self.has_data {
            return None;
        }

        let data = std::mem::take(&mut self.data);
        self.reset_frame();
        Some(decode_payload(&data))
    }

    fn reset_frame(&mut self) {
        self.data.clear();
        self.has_data = false;
        self.invalid_utf8 = false;
    }
}

/// Decode the `data` payload of one frame
pub fn decode_payload(data: &str) -> Decoded {
    let message: JudgeMessage = serde_json::from_str(data)?;

    if let JudgeMessage::Done { report } = &message {
        report
            .check()
            .map_err(|(subtasks, tests)| DecodeError::InconsistentReport { subtasks, tests })?;
    }

    Ok(message)
}

/// Locate the first line ending in `buf`
///
/// Returns the line length and the terminator length. A trailing `\r` is not
/// treated as a terminator yet, since the next chunk may start with `\n`.
fn next_line(buf: &[u8]) -> Option<(usize, usize)> {
    let at = buf.iter().position(|&b| b == b'\n' || b == b'\r')?;

    if buf[at] == b'\n' {
        return Some((at, 1));
    }

    match buf.get(at + 1) {
        Some(b'\n') => Some((at, 2)),
        Some(_) => Some((at, 1)),
        None => None,
    }
}
