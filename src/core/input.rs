//! Key parsing for legacy (xterm-style) terminal input.
//!
//! Key ids are lowercase strings such as `"enter"`, `"ctrl+k"`, `"shift+up"` or
//! `"alt+backspace"`. Modifiers are always normalized to `ctrl+alt+shift+` order.

const MOD_SHIFT: u8 = 1;
const MOD_ALT: u8 = 2;
const MOD_CTRL: u8 = 4;

/// Parse a single key sequence into a normalized key id.
///
/// Returns `None` for printable text and for sequences that are not keys.
pub fn parse_key(data: &str) -> Option<String> {
    match data {
        "\x1b" => return Some("escape".to_string()),
        "\r" | "\n" | "\x1bOM" => return Some("enter".to_string()),
        "\x1b\r" => return Some("alt+enter".to_string()),
        "\t" => return Some("tab".to_string()),
        "\x1b[Z" => return Some("shift+tab".to_string()),
        "\x7f" | "\x08" => return Some("backspace".to_string()),
        "\x1b\x7f" | "\x1b\x08" => return Some("alt+backspace".to_string()),
        "\x00" => return Some("ctrl+space".to_string()),
        _ => {}
    }

    let bytes = data.as_bytes();
    if bytes.len() == 1 {
        let byte = bytes[0];
        if (1..=26).contains(&byte) {
            let letter = (b'a' + byte - 1) as char;
            return Some(format!("ctrl+{letter}"));
        }
        return None;
    }

    if let Some(rest) = data.strip_prefix("\x1b[").or_else(|| data.strip_prefix("\x1bO")) {
        return parse_csi_key(rest);
    }

    if let Some(rest) = data.strip_prefix('\x1b') {
        let mut chars = rest.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if !ch.is_control() {
                return Some(format!("alt+{}", ch.to_ascii_lowercase()));
            }
        }
    }

    None
}

fn parse_csi_key(rest: &str) -> Option<String> {
    let final_char = rest.chars().last()?;
    let params = &rest[..rest.len() - final_char.len_utf8()];
    let mut fields = params.split(';');
    let first = fields.next().unwrap_or("");
    let modifier = fields
        .next()
        .and_then(|value| value.parse::<u8>().ok())
        .map(|value| value.saturating_sub(1))
        .unwrap_or(0);

    let key = match final_char {
        'A' => "up",
        'B' => "down",
        'C' => "right",
        'D' => "left",
        'H' => "home",
        'F' => "end",
        '~' => match first {
            "1" | "7" => "home",
            "2" => "insert",
            "3" => "delete",
            "4" | "8" => "end",
            "5" => "pageup",
            "6" => "pagedown",
            _ => return None,
        },
        _ => return None,
    };

    Some(with_modifiers(key, modifier))
}

fn with_modifiers(key: &str, modifier: u8) -> String {
    let mut id = String::new();
    if modifier & MOD_CTRL != 0 {
        id.push_str("ctrl+");
    }
    if modifier & MOD_ALT != 0 {
        id.push_str("alt+");
    }
    if modifier & MOD_SHIFT != 0 {
        id.push_str("shift+");
    }
    id.push_str(key);
    id
}

/// Normalize a user-facing key id (`"Ctrl+K"`, `"shift+ctrl+pageUp"`) into the
/// form produced by [`parse_key`].
pub fn normalize_key_id(key_id: &str) -> Option<String> {
    let lowered = key_id.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }
    let mut parts: Vec<&str> = lowered.split('+').collect();
    let key = match parts.pop() {
        Some("") => {
            // A trailing '+' means the key itself is '+', e.g. "ctrl++".
            parts.pop();
            "+"
        }
        Some(key) => key,
        None => return None,
    };

    let mut modifier = 0u8;
    for part in parts {
        match part {
            "ctrl" | "control" => modifier |= MOD_CTRL,
            "alt" | "meta" | "option" => modifier |= MOD_ALT,
            "shift" => modifier |= MOD_SHIFT,
            "" => {}
            _ => return None,
        }
    }

    let key = match key {
        "esc" => "escape",
        "return" => "enter",
        "pgup" => "pageup",
        "pgdn" | "pgdown" => "pagedown",
        "del" => "delete",
        other => other,
    };

    Some(with_modifiers(key, modifier))
}

/// Whether a parsed key id matches a (possibly unnormalized) binding.
pub fn key_id_matches(parsed: &str, binding: &str) -> bool {
    normalize_key_id(binding).is_some_and(|binding| binding == parsed)
}

/// Whether raw terminal `data` is the key described by `key_id`.
pub fn matches_key(data: &str, key_id: &str) -> bool {
    parse_key(data).is_some_and(|parsed| key_id_matches(&parsed, key_id))
}
