use crate::core::text::width::visible_width;

/// Zero-width APC sequence a focused widget embeds where the hardware cursor
/// belongs. Stripped by the runtime before the frame is diffed.
pub const CURSOR_MARKER: &str = "\x1b_cb:c\x07";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub row: usize,
    pub col: usize,
}

/// Find the last cursor marker within the visible `height` rows, remove it and
/// return its position.
pub(crate) fn extract_cursor_marker(lines: &mut [String], height: usize) -> Option<CursorPos> {
    let visible = lines.len().min(height);
    for row in (0..visible).rev() {
        let line = &lines[row];
        if let Some(index) = line.find(CURSOR_MARKER) {
            let col = visible_width(&line[..index]);
            let mut updated = String::with_capacity(line.len() - CURSOR_MARKER.len());
            updated.push_str(&line[..index]);
            updated.push_str(&line[index + CURSOR_MARKER.len()..]);
            lines[row] = updated;
            return Some(CursorPos { row, col });
        }
    }
    None
}

/// Remove every cursor marker from `lines`.
pub(crate) fn strip_cursor_markers(lines: &mut [String]) {
    for line in lines.iter_mut() {
        if line.contains(CURSOR_MARKER) {
            *line = line.replace(CURSOR_MARKER, "");
        }
    }
}
