//! Truncation, padding and styling helpers.

use unicode_segmentation::UnicodeSegmentation;

use super::width::{ansi_sequence_len, grapheme_width, visible_width};

const ANSI_RESET: &str = "\x1b[0m";

fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

pub fn bold(text: &str) -> String {
    ansi_wrap(text, "\x1b[1m", "\x1b[22m")
}

pub fn dim(text: &str) -> String {
    ansi_wrap(text, "\x1b[2m", "\x1b[22m")
}

pub fn reverse(text: &str) -> String {
    ansi_wrap(text, "\x1b[7m", "\x1b[27m")
}

pub fn green(text: &str) -> String {
    ansi_wrap(text, "\x1b[32m", "\x1b[39m")
}

pub fn magenta(text: &str) -> String {
    ansi_wrap(text, "\x1b[35m", "\x1b[39m")
}

pub fn cyan(text: &str) -> String {
    ansi_wrap(text, "\x1b[36m", "\x1b[39m")
}

pub fn yellow(text: &str) -> String {
    ansi_wrap(text, "\x1b[33m", "\x1b[39m")
}

/// Cut `text` to at most `max_width` columns, appending `ellipsis` when cut.
///
/// Escape sequences are preserved; a reset is emitted before the ellipsis so
/// styles cannot bleed past the cut. With `pad`, the result is right-padded
/// with spaces to exactly `max_width` columns.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str, pad: bool) -> String {
    if max_width == 0 {
        return String::new();
    }

    let text_width = visible_width(text);
    if text_width <= max_width {
        if pad {
            return format!("{text}{}", " ".repeat(max_width - text_width));
        }
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    let target_width = max_width.saturating_sub(ellipsis_width);
    if target_width == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut truncated = String::new();
    let mut current_width = 0;
    let mut idx = 0;
    'outer: while idx < text.len() {
        if let Some(len) = ansi_sequence_len(text, idx) {
            truncated.push_str(&text[idx..idx + len]);
            idx += len;
            continue;
        }
        let run_end = next_ansi_or_end(text, idx);
        for grapheme in text[idx..run_end].graphemes(true) {
            let width = grapheme_width(grapheme);
            if current_width + width > target_width {
                break 'outer;
            }
            truncated.push_str(grapheme);
            current_width += width;
        }
        idx = run_end;
    }

    let mut result = String::with_capacity(truncated.len() + ellipsis.len() + ANSI_RESET.len());
    result.push_str(&truncated);
    result.push_str(ANSI_RESET);
    result.push_str(ellipsis);

    if pad {
        let result_width = visible_width(&result);
        if result_width < max_width {
            result.push_str(&" ".repeat(max_width - result_width));
        }
    }

    result
}

/// Fit `text` into exactly `width` columns.
pub fn fit_to_width(text: &str, width: usize) -> String {
    truncate_to_width(text, width, "…", true)
}

/// Drop the first `columns` visible columns of `text`.
///
/// Escape sequences inside the dropped part are discarded; a wide grapheme cut
/// in half becomes a space.
pub fn skip_columns(text: &str, columns: usize) -> String {
    let mut out = String::new();
    let mut skipped = 0;
    let mut idx = 0;
    while idx < text.len() {
        if let Some(len) = ansi_sequence_len(text, idx) {
            if skipped >= columns {
                out.push_str(&text[idx..idx + len]);
            }
            idx += len;
            continue;
        }
        let run_end = next_ansi_or_end(text, idx);
        for grapheme in text[idx..run_end].graphemes(true) {
            if skipped >= columns {
                out.push_str(grapheme);
                continue;
            }
            skipped += grapheme_width(grapheme);
            if skipped > columns {
                out.push_str(&" ".repeat(skipped - columns));
            }
        }
        idx = run_end;
    }
    out
}

fn next_ansi_or_end(input: &str, mut idx: usize) -> usize {
    while idx < input.len() {
        if ansi_sequence_len(input, idx).is_some() {
            break;
        }
        match input[idx..].chars().next() {
            Some(ch) => idx += ch.len_utf8(),
            None => break,
        }
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::{fit_to_width, skip_columns, truncate_to_width};
    use crate::core::text::width::visible_width;

    #[test]
    fn truncate_returns_original_when_shorter() {
        assert_eq!(truncate_to_width("hello", 6, "...", false), "hello");
    }

    #[test]
    fn truncate_adds_ellipsis_and_reset() {
        let truncated = truncate_to_width("hello", 4, "...", false);
        assert_eq!(truncated, "h\x1b[0m...");
        assert_eq!(visible_width(&truncated), 4);
    }

    #[test]
    fn truncate_preserves_ansi_prefix() {
        let truncated = truncate_to_width("\x1b[31mhello", 4, "...", false);
        assert_eq!(truncated, "\x1b[31mh\x1b[0m...");
    }

    #[test]
    fn truncate_pads_when_requested() {
        assert_eq!(truncate_to_width("hi", 4, "...", true), "hi  ");
    }

    #[test]
    fn fit_always_produces_exact_width() {
        assert_eq!(visible_width(&fit_to_width("short", 10)), 10);
        assert_eq!(visible_width(&fit_to_width("a considerably longer line", 10)), 10);
    }

    #[test]
    fn skip_columns_keeps_the_tail() {
        assert_eq!(skip_columns("hello world", 6), "world");
        assert_eq!(skip_columns("\x1b[1mab\x1b[22mcd", 3), "d");
        assert_eq!(skip_columns("ab\x1b[2mcd\x1b[22m", 2), "\x1b[2mcd\x1b[22m");
        assert_eq!(skip_columns("a界b", 2), " b");
        assert_eq!(skip_columns("ab", 5), "");
    }
}
