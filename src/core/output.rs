//! Typed terminal output commands and a single output gate.
//!
//! Invariant: all terminal writes flow through `OutputGate::flush(..)`.

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw bytes/control sequences to be written to the terminal.
    Bytes(String),
    BytesStatic(&'static str),

    HideCursor,
    ShowCursor,
    /// Move the hardware cursor to a zero-based screen cell.
    MoveTo { row: usize, col: usize },

    AltScreenEnter,
    AltScreenLeave,
    BracketedPasteEnable,
    BracketedPasteDisable,
    MouseEnable,
    MouseDisable,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    /// Flush buffered commands as a single terminal write.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let mut buffer = String::new();
        for cmd in self.cmds.drain(..) {
            match cmd {
                TerminalCmd::Bytes(data) => buffer.push_str(&data),
                TerminalCmd::BytesStatic(data) => buffer.push_str(data),
                TerminalCmd::HideCursor => buffer.push_str("\x1b[?25l"),
                TerminalCmd::ShowCursor => buffer.push_str("\x1b[?25h"),
                TerminalCmd::MoveTo { row, col } => {
                    buffer.push_str(&format!("\x1b[{};{}H", row + 1, col + 1));
                }
                TerminalCmd::AltScreenEnter => buffer.push_str("\x1b[?1049h"),
                TerminalCmd::AltScreenLeave => buffer.push_str("\x1b[?1049l"),
                TerminalCmd::BracketedPasteEnable => buffer.push_str("\x1b[?2004h"),
                TerminalCmd::BracketedPasteDisable => buffer.push_str("\x1b[?2004l"),
                TerminalCmd::MouseEnable => buffer.push_str("\x1b[?1000h\x1b[?1006h"),
                TerminalCmd::MouseDisable => buffer.push_str("\x1b[?1006l\x1b[?1000l"),
            }
        }
        term.write(&buffer);
    }
}
