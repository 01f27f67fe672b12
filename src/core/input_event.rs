//! Structured input events produced by the runtime.

use crate::core::input::parse_key;

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    Other(u16),
}

/// Input event delivered to components.
///
/// Notes:
/// - `raw` is the exact sequence received from the terminal when applicable.
/// - `key_id` is the normalized identifier produced by [`parse_key`].
/// - Mouse coordinates are zero-based cells relative to the receiving component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key {
        raw: String,
        key_id: String,
    },
    Text {
        raw: String,
        text: String,
    },
    Paste {
        raw: String,
        text: String,
    },
    Mouse {
        raw: String,
        button: MouseButton,
        pressed: bool,
        column: usize,
        row: usize,
    },
    Resize {
        columns: u16,
        rows: u16,
    },
    UnknownRaw {
        raw: String,
    },
}

impl InputEvent {
    pub fn key_id(&self) -> Option<&str> {
        match self {
            InputEvent::Key { key_id, .. } => Some(key_id),
            _ => None,
        }
    }

    /// Copy of a mouse event shifted into a child's coordinate space.
    ///
    /// Returns `None` for non-mouse events and for points left of or above the
    /// child origin.
    pub fn translated(&self, origin_row: usize, origin_col: usize) -> Option<InputEvent> {
        let InputEvent::Mouse {
            raw,
            button,
            pressed,
            column,
            row,
        } = self
        else {
            return None;
        };
        Some(InputEvent::Mouse {
            raw: raw.clone(),
            button: *button,
            pressed: *pressed,
            column: column.checked_sub(origin_col)?,
            row: row.checked_sub(origin_row)?,
        })
    }
}

/// Decode a chunk of terminal input into events.
///
/// Bracketed pastes are delivered whole; everything else is split into escape
/// sequences, single control bytes and runs of printable text.
pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let mut remaining = data;
    while !remaining.is_empty() {
        let Some(start) = remaining.find(PASTE_START) else {
            parse_non_paste(remaining, &mut events);
            break;
        };

        parse_non_paste(&remaining[..start], &mut events);

        let after_start = &remaining[start + PASTE_START.len()..];
        let Some(end_rel) = after_start.find(PASTE_END) else {
            events.push(InputEvent::UnknownRaw {
                raw: remaining[start..].to_string(),
            });
            break;
        };

        let raw_end = start + PASTE_START.len() + end_rel + PASTE_END.len();
        events.push(InputEvent::Paste {
            raw: remaining[start..raw_end].to_string(),
            text: after_start[..end_rel].to_string(),
        });
        remaining = &remaining[raw_end..];
    }
    events
}

fn parse_non_paste(data: &str, events: &mut Vec<InputEvent>) {
    for token in split_sequences(data) {
        events.push(classify(token));
    }
}

fn classify(token: &str) -> InputEvent {
    if is_text(token) {
        return InputEvent::Text {
            raw: token.to_string(),
            text: token.to_string(),
        };
    }
    if let Some(mouse) = parse_sgr_mouse(token) {
        return mouse;
    }
    if let Some(key_id) = parse_key(token) {
        return InputEvent::Key {
            raw: token.to_string(),
            key_id,
        };
    }
    InputEvent::UnknownRaw {
        raw: token.to_string(),
    }
}

fn is_text(token: &str) -> bool {
    !token.is_empty() && token.chars().all(is_printable)
}

fn is_printable(ch: char) -> bool {
    !ch.is_control()
}

/// Split raw input into individually decodable tokens.
pub fn split_sequences(data: &str) -> Vec<&str> {
    let bytes = data.as_bytes();
    let mut tokens = Vec::new();
    let mut idx = 0;
    while idx < data.len() {
        let len = if bytes[idx] == 0x1b {
            escape_len(bytes, idx)
        } else if let Some(ch) = data[idx..].chars().next() {
            if is_printable(ch) {
                data[idx..]
                    .char_indices()
                    .find(|(_, ch)| !is_printable(*ch))
                    .map(|(offset, _)| offset)
                    .unwrap_or(data.len() - idx)
            } else {
                ch.len_utf8()
            }
        } else {
            break;
        };
        tokens.push(&data[idx..idx + len]);
        idx += len;
    }
    tokens
}

fn escape_len(bytes: &[u8], start: usize) -> usize {
    match bytes.get(start + 1) {
        None | Some(0x1b) => 1,
        Some(b'[') => {
            let mut idx = start + 2;
            while idx < bytes.len() {
                if (0x40..=0x7e).contains(&bytes[idx]) {
                    return idx + 1 - start;
                }
                idx += 1;
            }
            bytes.len() - start
        }
        Some(b'O') if start + 2 < bytes.len() => 3,
        Some(next) => {
            // Alt-prefixed character; keep multi-byte UTF-8 intact.
            let width = match *next {
                0x00..=0x7f => 1,
                0xc0..=0xdf => 2,
                0xe0..=0xef => 3,
                _ => 4,
            };
            (1 + width).min(bytes.len() - start)
        }
    }
}

/// Decode an SGR mouse report: `ESC [ < b ; x ; y (M|m)`.
fn parse_sgr_mouse(token: &str) -> Option<InputEvent> {
    let body = token.strip_prefix("\x1b[<")?;
    let pressed = match body.chars().last()? {
        'M' => true,
        'm' => false,
        _ => return None,
    };
    let mut fields = body[..body.len() - 1].split(';');
    let code: u16 = fields.next()?.parse().ok()?;
    let column: usize = fields.next()?.parse().ok()?;
    let row: usize = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }

    // Bits 2..4 carry shift/alt/ctrl; bit 5 marks motion.
    let base = code & !(4 | 8 | 16 | 32);
    let button = match base {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        64 => MouseButton::WheelUp,
        65 => MouseButton::WheelDown,
        other => MouseButton::Other(other),
    };

    Some(InputEvent::Mouse {
        raw: token.to_string(),
        button,
        pressed,
        column: column.saturating_sub(1),
        row: row.saturating_sub(1),
    })
}
