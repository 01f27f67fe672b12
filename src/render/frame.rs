//! Typed render model handed from the runtime to the renderer.

use crate::core::cursor::CursorPos;

/// One full screen worth of rendered lines plus the hardware cursor.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Frame {
    lines: Vec<String>,
    cursor: Option<CursorPos>,
}

impl Frame {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<CursorPos>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> Option<CursorPos> {
        self.cursor
    }

    pub fn into_parts(self) -> (Vec<String>, Option<CursorPos>) {
        (self.lines, self.cursor)
    }
}

impl From<Vec<String>> for Frame {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use crate::core::cursor::CursorPos;

    #[test]
    fn frame_carries_lines_and_cursor() {
        let frame = Frame::from(vec!["a".to_string(), "b".to_string()])
            .with_cursor(Some(CursorPos { row: 1, col: 0 }));
        assert_eq!(frame.lines().len(), 2);
        let (lines, cursor) = frame.into_parts();
        assert_eq!(lines, vec!["a", "b"]);
        assert_eq!(cursor, Some(CursorPos { row: 1, col: 0 }));
    }
}
