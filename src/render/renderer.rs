//! Full-screen diff renderer.
//!
//! The runtime draws on the alternate screen, so every frame maps one-to-one
//! onto terminal rows. Only rows whose content changed are rewritten.

use crate::core::cursor::CursorPos;
use crate::core::output::TerminalCmd;
use crate::core::text::utils::truncate_to_width;
use crate::render::Frame;

const LINE_RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\x1b[2K";
const CLEAR_SCREEN: &str = "\x1b[2J";
const SYNC_START: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";

#[derive(Debug, Default)]
pub struct DiffRenderer {
    previous_lines: Vec<String>,
    previous_width: usize,
    previous_height: usize,
    previous_cursor: Option<Option<CursorPos>>,
    force_full_redraw_next: bool,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_full_redraw_next(&mut self) {
        self.force_full_redraw_next = true;
    }

    pub fn previous_lines(&self) -> &[String] {
        &self.previous_lines
    }

    /// Forget everything drawn so far; the next frame is a full redraw.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn render(&mut self, frame: Frame, width: usize, height: usize) -> Vec<TerminalCmd> {
        let (lines, cursor) = frame.into_parts();
        let lines = normalize_lines(lines, width, height);
        let cursor = cursor.filter(|pos| pos.row < height && width > 0).map(|pos| CursorPos {
            row: pos.row,
            col: pos.col.min(width - 1),
        });

        let full = std::mem::take(&mut self.force_full_redraw_next)
            || self.previous_lines.is_empty()
            || self.previous_width != width
            || self.previous_height != height;

        let mut cmds = Vec::new();
        if full {
            tracing::trace!(width, height, "full redraw");
            cmds.push(TerminalCmd::BytesStatic(SYNC_START));
            cmds.push(TerminalCmd::HideCursor);
            cmds.push(TerminalCmd::BytesStatic(CLEAR_SCREEN));
            for (row, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                cmds.push(TerminalCmd::MoveTo { row, col: 0 });
                cmds.push(TerminalCmd::Bytes(line.clone()));
            }
            cmds.push(TerminalCmd::BytesStatic(SYNC_END));
        } else {
            let changed: Vec<usize> = (0..height)
                .filter(|&row| self.previous_lines.get(row) != lines.get(row))
                .collect();
            if !changed.is_empty() {
                cmds.push(TerminalCmd::BytesStatic(SYNC_START));
                cmds.push(TerminalCmd::HideCursor);
                for row in changed {
                    cmds.push(TerminalCmd::MoveTo { row, col: 0 });
                    cmds.push(TerminalCmd::BytesStatic(CLEAR_LINE));
                    cmds.push(TerminalCmd::Bytes(lines[row].clone()));
                }
                cmds.push(TerminalCmd::BytesStatic(SYNC_END));
            }
        }

        let content_written = !cmds.is_empty();
        if content_written || self.previous_cursor != Some(cursor) {
            match cursor {
                Some(pos) => {
                    cmds.push(TerminalCmd::MoveTo {
                        row: pos.row,
                        col: pos.col,
                    });
                    cmds.push(TerminalCmd::ShowCursor);
                }
                None => cmds.push(TerminalCmd::HideCursor),
            }
        }

        self.previous_lines = lines;
        self.previous_width = width;
        self.previous_height = height;
        self.previous_cursor = Some(cursor);
        cmds
    }
}

/// Clip to `height` rows, pad missing rows, cut each row to `width` columns and
/// terminate styled rows with a reset.
fn normalize_lines(lines: Vec<String>, width: usize, height: usize) -> Vec<String> {
    let mut out: Vec<String> = lines
        .into_iter()
        .take(height)
        .map(|line| {
            let mut line = truncate_to_width(&line, width, "", false);
            if line.contains('\x1b') && !line.ends_with(LINE_RESET) {
                line.push_str(LINE_RESET);
            }
            line
        })
        .collect();
    out.resize(height, String::new());
    out
}
