//! Input widget.

use crate::core::component::{Component, Focusable};
use crate::core::cursor::CursorPos;
use crate::core::input_event::InputEvent;
use crate::core::keybindings::{EditorAction, EditorKeybindingsManager};
use crate::core::suggestion::TextBuffer;
use crate::core::text::width::visible_width;

/// Single-line input component with horizontal scrolling.
///
/// Line breaks are stripped from typed and pasted text. Submit and cancel are
/// left to the owner, which sees the same key events first.
pub struct Input {
    buffer: TextBuffer,
    focused: bool,
    last_cursor_pos: Option<CursorPos>,
    prompt: String,
    placeholder: String,
    keybindings: EditorKeybindingsManager,
}

impl Input {
    pub fn new(keybindings: EditorKeybindingsManager) -> Self {
        Self {
            buffer: TextBuffer::new(""),
            focused: false,
            last_cursor_pos: None,
            prompt: "> ".to_string(),
            placeholder: String::new(),
            keybindings,
        }
    }

    pub fn value(&self) -> &str {
        self.buffer.text()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.buffer = TextBuffer::new(value);
        self.buffer.move_doc_end();
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Dimmed hint shown while the value is empty.
    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
    }

    fn insert_text(&mut self, text: &str) {
        let cleaned = text.replace(['\r', '\n'], "");
        if !cleaned.is_empty() {
            self.buffer.insert_str(&cleaned);
        }
    }

    fn handle_key(&mut self, key_id: &str) {
        let kb = &self.keybindings;
        let buffer = &mut self.buffer;
        if kb.matches(key_id, EditorAction::DeleteCharBackward) {
            buffer.delete_backward();
        } else if kb.matches(key_id, EditorAction::DeleteCharForward) {
            buffer.delete_forward();
        } else if kb.matches(key_id, EditorAction::DeleteWordBackward) {
            buffer.delete_word_backward();
        } else if kb.matches(key_id, EditorAction::DeleteToLineStart) {
            buffer.delete_to_line_start();
        } else if kb.matches(key_id, EditorAction::CursorLeft) {
            buffer.move_left(false);
        } else if kb.matches(key_id, EditorAction::CursorRight) {
            buffer.move_right(false);
        } else if kb.matches(key_id, EditorAction::CursorLineStart) {
            buffer.move_line_start(false);
        } else if kb.matches(key_id, EditorAction::CursorLineEnd) {
            buffer.move_line_end(false);
        } else if kb.matches(key_id, EditorAction::CursorWordLeft) {
            buffer.move_word_left();
        } else if kb.matches(key_id, EditorAction::CursorWordRight) {
            buffer.move_word_right();
        }
    }
}

impl Component for Input {
    fn render(&mut self, width: usize) -> Vec<String> {
        self.last_cursor_pos = None;

        let prompt = &self.prompt;
        let prompt_width = visible_width(prompt);
        let available_width = width.saturating_sub(prompt_width);
        if available_width == 0 {
            return vec![prompt.to_string()];
        }

        if self.buffer.len_chars() == 0 && !self.focused && !self.placeholder.is_empty() {
            let hint: String = self.placeholder.chars().take(available_width).collect();
            let padding = " ".repeat(available_width.saturating_sub(visible_width(&hint)));
            return vec![format!("{prompt}\x1b[2m{hint}\x1b[22m{padding}")];
        }

        let chars: Vec<char> = self.buffer.text().chars().collect();
        let cursor = self.buffer.head().min(chars.len());

        // Keep one column free for the caret cell when it sits past the end.
        let scroll_width = if cursor == chars.len() {
            available_width.saturating_sub(1).max(1)
        } else {
            available_width
        };
        let start = if chars.len() < available_width || cursor < scroll_width / 2 {
            0
        } else if cursor > chars.len().saturating_sub(scroll_width / 2) {
            chars.len().saturating_sub(scroll_width)
        } else {
            cursor.saturating_sub(scroll_width / 2)
        };
        let end = (start + scroll_width).min(chars.len()).max(cursor.min(chars.len()));

        let before: String = chars[start..cursor].iter().collect();
        let at_cursor = chars.get(cursor).filter(|_| cursor < end).copied();
        let after: String = match at_cursor {
            Some(_) => chars[cursor + 1..end].iter().collect(),
            None => String::new(),
        };

        if self.focused {
            let col = prompt_width.saturating_add(visible_width(&before));
            self.last_cursor_pos = Some(CursorPos { row: 0, col });
        }

        let cursor_cell = match at_cursor {
            Some(ch) => format!("\x1b[7m{ch}\x1b[27m"),
            None => "\x1b[7m \x1b[27m".to_string(),
        };
        let text_with_cursor = format!("{before}{cursor_cell}{after}");
        let padding = " ".repeat(available_width.saturating_sub(visible_width(&text_with_cursor)));
        vec![format!("{prompt}{text_with_cursor}{padding}")]
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        self.last_cursor_pos
    }

    fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Text { text, .. } | InputEvent::Paste { text, .. } => {
                self.insert_text(text)
            }
            InputEvent::Key { key_id, .. } => self.handle_key(key_id),
            _ => {}
        }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for Input {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::Input;
    use crate::core::component::{Component, Focusable};
    use crate::core::cursor::CursorPos;
    use crate::core::input_event::parse_input_events;
    use crate::core::keybindings::EditorKeybindingsManager;
    use crate::core::text::width::strip_ansi;

    fn send(input: &mut Input, data: &str) {
        for event in parse_input_events(data) {
            input.handle_event(&event);
        }
    }

    #[test]
    fn input_edits_and_moves_cursor() {
        let mut input = Input::new(EditorKeybindingsManager::default());
        send(&mut input, "hello");
        assert_eq!(input.value(), "hello");

        send(&mut input, "\x1b[D");
        send(&mut input, "\x1b[D");
        send(&mut input, "X");
        assert_eq!(input.value(), "helXlo");

        send(&mut input, "\x7f");
        assert_eq!(input.value(), "hello");

        send(&mut input, "\x01");
        send(&mut input, "\x1b[3~");
        assert_eq!(input.value(), "ello");
    }

    #[test]
    fn input_paste_drops_line_breaks_and_delete_word() {
        let mut input = Input::new(EditorKeybindingsManager::default());
        send(&mut input, "\x1b[200~hello\nworld\x1b[201~");
        assert_eq!(input.value(), "helloworld");

        send(&mut input, " there");
        send(&mut input, "\x17");
        assert_eq!(input.value(), "helloworld ");
    }

    #[test]
    fn input_has_prompt_and_reports_cursor_when_focused() {
        let mut input = Input::new(EditorKeybindingsManager::default());
        input.set_value("ab");
        let lines = input.render(10);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("> "));
        assert_eq!(input.cursor_pos(), None);

        input.set_focused(true);
        input.render(10);
        assert_eq!(input.cursor_pos(), Some(CursorPos { row: 0, col: 4 }));
    }

    #[test]
    fn long_values_scroll_to_keep_cursor_visible() {
        let mut input = Input::new(EditorKeybindingsManager::default());
        input.set_prompt("");
        input.set_value("abcdefghij");
        let lines = input.render(5);
        assert_eq!(strip_ansi(&lines[0]), "ghij ");
    }

    #[test]
    fn placeholder_shows_until_focused() {
        let mut input = Input::new(EditorKeybindingsManager::default());
        input.set_placeholder("name");
        let lines = input.render(12);
        assert_eq!(strip_ansi(&lines[0]), "> name      ");

        input.set_focused(true);
        let lines = input.render(12);
        assert_eq!(strip_ansi(&lines[0]), format!("> {}", " ".repeat(10)));
    }
}
