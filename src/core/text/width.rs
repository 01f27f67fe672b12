//! Grapheme width and visible width helpers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_WIDTH: usize = 4;

/// Length in bytes of the escape sequence starting at `pos`, if any.
///
/// Recognizes CSI (`ESC [ ... final`), OSC/APC (terminated by BEL or `ESC \`)
/// and SS3 (`ESC O x`).
pub fn ansi_sequence_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }
    match bytes.get(pos + 1)? {
        b'[' => {
            let mut idx = pos + 2;
            while idx < bytes.len() {
                if (0x40..=0x7e).contains(&bytes[idx]) {
                    return Some(idx + 1 - pos);
                }
                idx += 1;
            }
            None
        }
        b']' | b'_' => {
            let mut idx = pos + 2;
            while idx < bytes.len() {
                if bytes[idx] == 0x07 {
                    return Some(idx + 1 - pos);
                }
                if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
                    return Some(idx + 2 - pos);
                }
                idx += 1;
            }
            None
        }
        b'O' if pos + 2 < bytes.len() => Some(3),
        _ => None,
    }
}

/// Remove escape sequences, keeping only printable text.
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = ansi_sequence_len(input, idx) {
            idx += len;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    UnicodeWidthStr::width(grapheme)
}

/// Terminal column width of `input`, ignoring escape sequences.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }
    strip_ansi(input).graphemes(true).map(grapheme_width).sum()
}
