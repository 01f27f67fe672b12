//! Stdin byte buffering.
//!
//! Raw reads can end in the middle of a UTF-8 character, an escape sequence
//! or a bracketed paste. [`StdinBuffer`] holds such tails back until they are
//! complete (or until a short timeout passes, so a lone ESC still arrives as
//! the escape key).

use std::time::{Duration, Instant};

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

pub struct StdinBuffer {
    pending: Vec<u8>,
    timeout: Duration,
    flush_deadline: Option<Instant>,
}

impl StdinBuffer {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            pending: Vec::new(),
            timeout: Duration::from_millis(timeout_ms),
            flush_deadline: None,
        }
    }

    /// Append freshly read bytes and return whatever is ready to dispatch.
    pub fn process(&mut self, data: &[u8], now: Instant) -> Option<String> {
        self.pending.extend_from_slice(data);
        self.flush_deadline = None;

        let (mut text, utf8_tail) = match std::str::from_utf8(&self.pending) {
            Ok(text) => (text.to_string(), Vec::new()),
            Err(err) if err.error_len().is_none() => {
                let valid = err.valid_up_to();
                (
                    String::from_utf8_lossy(&self.pending[..valid]).into_owned(),
                    self.pending[valid..].to_vec(),
                )
            }
            Err(_) => (String::from_utf8_lossy(&self.pending).into_owned(), Vec::new()),
        };
        self.pending.clear();

        let held = held_tail_start(&text).map(|start| text.split_off(start));
        if let Some(held) = held {
            self.pending.extend_from_slice(held.as_bytes());
        }
        self.pending.extend_from_slice(&utf8_tail);
        if !self.pending.is_empty() {
            self.flush_deadline = Some(now + self.timeout);
        }

        (!text.is_empty()).then_some(text)
    }

    /// Release held bytes once the timeout has passed.
    pub fn flush_due(&mut self, now: Instant) -> Option<String> {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Poll timeout for the input thread: until the flush deadline, or `default_ms`.
    pub fn next_timeout_ms(&self, now: Instant, default_ms: i32) -> i32 {
        match self.flush_deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(now).as_millis();
                (remaining as i32).clamp(0, default_ms)
            }
            None => default_ms,
        }
    }

    pub fn flush(&mut self) -> Option<String> {
        self.flush_deadline = None;
        if self.pending.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(text)
    }
}

/// Byte index where an incomplete trailing sequence begins, if any.
fn held_tail_start(text: &str) -> Option<usize> {
    if let Some(start) = text.rfind(PASTE_START) {
        if !text[start..].contains(PASTE_END) {
            return Some(start);
        }
    }

    let start = text.rfind('\x1b')?;
    let tail = &text[start..];
    let incomplete = match tail.as_bytes() {
        [0x1b] => true,
        [0x1b, b'O'] => true,
        [0x1b, b'[', rest @ ..] => !rest.iter().any(|byte| (0x40..=0x7e).contains(byte)),
        _ => false,
    };
    incomplete.then_some(start)
}
