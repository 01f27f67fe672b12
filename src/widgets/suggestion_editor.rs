//! Multi-line script editor with an inline keyword/object suggestion overlay.
//!
//! Two hotkeys open the overlay over the text area's top-left corner. Picking
//! a candidate (keyboard or mouse) splices it over the selection captured at
//! the last selection change, closes the overlay, and schedules a one-shot
//! restore that refocuses the editor with the caret after the inserted text
//! once the next frame has been drawn.

use crate::core::component::{Component, Focusable};
use crate::core::cursor::CURSOR_MARKER;
use crate::core::input_event::{InputEvent, MouseButton};
use crate::core::keybindings::{EditorAction, EditorKeybindingsManager};
use crate::core::suggestion::{
    OverlayKey, OverlayOutcome, OverlayState, Selection, SuggestionCatalog, SuggestionOverlay,
    TextBuffer, Transition,
};
use crate::core::text::utils::{dim, fit_to_width, skip_columns, truncate_to_width};
use crate::core::text::width::grapheme_width;
use crate::runtime::RenderHandle;
use crate::widgets::suggestion_list::{SuggestionList, SuggestionListTheme};

const WHEEL_STEP: usize = 3;
const OVERLAY_MAX_VISIBLE: usize = 8;

/// Bindings the text area handles itself, in priority order.
const BUFFER_ACTIONS: [EditorAction; 21] = [
    EditorAction::CursorUp,
    EditorAction::CursorDown,
    EditorAction::CursorLeft,
    EditorAction::CursorRight,
    EditorAction::CursorWordLeft,
    EditorAction::CursorWordRight,
    EditorAction::CursorLineStart,
    EditorAction::CursorLineEnd,
    EditorAction::CursorDocStart,
    EditorAction::CursorDocEnd,
    EditorAction::ExtendLeft,
    EditorAction::ExtendRight,
    EditorAction::ExtendUp,
    EditorAction::ExtendDown,
    EditorAction::ExtendLineStart,
    EditorAction::ExtendLineEnd,
    EditorAction::DeleteCharBackward,
    EditorAction::DeleteCharForward,
    EditorAction::DeleteWordBackward,
    EditorAction::DeleteToLineStart,
    EditorAction::NewLine,
];

/// Where the overlay landed in the last frame, in editor-local cells.
#[derive(Debug, Clone, Copy)]
struct OverlayArea {
    rows: usize,
    col: usize,
    width: usize,
}

pub struct SuggestionEditor {
    buffer: TextBuffer,
    overlay: SuggestionOverlay,
    state: OverlayState,
    last_selection: Selection,
    keybindings: EditorKeybindingsManager,
    list: SuggestionList,
    focused: bool,
    mounted: bool,
    pending_restore: Option<usize>,
    render_handle: Option<RenderHandle>,
    visible_rows: Option<usize>,
    scroll_top: usize,
    follow_caret: bool,
    gutter_width: usize,
    overlay_area: Option<OverlayArea>,
}

impl SuggestionEditor {
    /// Create an unmounted editor holding `initial_text` with the caret at 0.
    pub fn new(catalog: SuggestionCatalog, initial_text: impl Into<String>) -> Self {
        Self {
            buffer: TextBuffer::new(initial_text),
            overlay: SuggestionOverlay::new(catalog),
            state: OverlayState::Closed,
            last_selection: Selection::default(),
            keybindings: EditorKeybindingsManager::default(),
            list: SuggestionList::new(OVERLAY_MAX_VISIBLE, SuggestionListTheme::default()),
            focused: false,
            mounted: false,
            pending_restore: None,
            render_handle: None,
            visible_rows: None,
            scroll_top: 0,
            follow_caret: true,
            gutter_width: 0,
            overlay_area: None,
        }
    }

    pub fn set_keybindings(&mut self, keybindings: EditorKeybindingsManager) {
        self.keybindings = keybindings;
    }

    pub fn set_list_theme(&mut self, theme: SuggestionListTheme) {
        self.list = SuggestionList::new(OVERLAY_MAX_VISIBLE, theme);
    }

    /// Handle used to ask for a frame after deferred work changes state.
    pub fn set_render_handle(&mut self, handle: Option<RenderHandle>) {
        self.render_handle = handle;
    }

    /// Fix the number of rows rendered. `None` renders every line.
    pub fn set_visible_rows(&mut self, rows: Option<usize>) {
        self.visible_rows = rows;
    }

    pub fn mount(&mut self) {
        self.mounted = true;
        tracing::debug!("suggestion editor mounted");
    }

    /// Stop reacting to input and drop any pending focus restore.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.pending_restore = None;
        tracing::debug!("suggestion editor unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Live selection of the text area.
    pub fn selection(&self) -> Selection {
        self.buffer.selection()
    }

    /// Selection captured at the most recent selection change.
    pub fn last_selection(&self) -> Selection {
        self.last_selection
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.state
    }

    pub fn has_pending_restore(&self) -> bool {
        self.pending_restore.is_some()
    }

    /// Replace the live selection, as a pointer drag or a host would.
    pub fn set_selection(&mut self, selection: Selection) {
        self.buffer.set_selection(selection);
        self.on_selection_change();
    }

    /// Capture the live selection as the insertion target.
    pub fn on_selection_change(&mut self) {
        self.last_selection = self.buffer.selection();
    }

    /// Splice `text` over the last captured selection and close the overlay.
    ///
    /// The caret is put back after the inserted text by the deferred restore
    /// that runs in [`Component::after_render`].
    pub fn insert_at_cursor(&mut self, text: &str) {
        let range = self.last_selection.clamped(self.buffer.len_chars());
        let caret = self.buffer.replace_range(range, text);
        self.state = OverlayState::Closed;
        self.last_selection = Selection::caret(caret);
        self.pending_restore = Some(caret);
        self.follow_caret = true;
        tracing::debug!(start = range.start, end = range.end, caret, "inserted suggestion");
        self.request_render();
    }

    fn request_render(&self) {
        if let Some(handle) = &self.render_handle {
            handle.request_render();
        }
    }

    fn overlay_key(&self, key_id: &str) -> OverlayKey {
        let kb = &self.keybindings;
        if kb.matches(key_id, EditorAction::OpenKeywords) {
            return OverlayKey::OpenKeywords;
        }
        if kb.matches(key_id, EditorAction::OpenObjects) {
            return OverlayKey::OpenObjects;
        }
        if !self.state.is_open() {
            return OverlayKey::Other;
        }
        if kb.matches(key_id, EditorAction::OverlayUp) {
            OverlayKey::Up
        } else if kb.matches(key_id, EditorAction::OverlayDown) {
            OverlayKey::Down
        } else if kb.matches(key_id, EditorAction::OverlayConfirm) {
            OverlayKey::Confirm
        } else if kb.matches(key_id, EditorAction::OverlayCancel) {
            OverlayKey::Cancel
        } else {
            OverlayKey::Other
        }
    }

    /// Adopt the new overlay state. Returns the outcome for the caller to act on.
    fn apply(&mut self, transition: Transition) -> OverlayOutcome {
        if transition.state != self.state {
            tracing::debug!(from = ?self.state, to = ?transition.state, "overlay transition");
        }
        self.state = transition.state;
        match transition.outcome {
            OverlayOutcome::Insert(text) => {
                self.insert_at_cursor(&text);
                OverlayOutcome::Consumed
            }
            outcome => outcome,
        }
    }

    fn handle_key(&mut self, key_id: &str) {
        let key = self.overlay_key(key_id);
        let transition = self.overlay.handle_key(self.state, key);
        if self.apply(transition) == OverlayOutcome::Ignored {
            self.edit(key_id);
        }
    }

    /// Run a plain text-area key binding against the buffer.
    fn edit(&mut self, key_id: &str) {
        let Some(action) = BUFFER_ACTIONS
            .iter()
            .copied()
            .find(|action| self.keybindings.matches(key_id, *action))
        else {
            return;
        };

        let before = self.buffer.selection();
        let buffer = &mut self.buffer;
        match action {
            EditorAction::CursorUp => buffer.move_up(false),
            EditorAction::CursorDown => buffer.move_down(false),
            EditorAction::CursorLeft => buffer.move_left(false),
            EditorAction::CursorRight => buffer.move_right(false),
            EditorAction::CursorWordLeft => buffer.move_word_left(),
            EditorAction::CursorWordRight => buffer.move_word_right(),
            EditorAction::CursorLineStart => buffer.move_line_start(false),
            EditorAction::CursorLineEnd => buffer.move_line_end(false),
            EditorAction::CursorDocStart => buffer.move_doc_start(),
            EditorAction::CursorDocEnd => buffer.move_doc_end(),
            EditorAction::ExtendLeft => buffer.move_left(true),
            EditorAction::ExtendRight => buffer.move_right(true),
            EditorAction::ExtendUp => buffer.move_up(true),
            EditorAction::ExtendDown => buffer.move_down(true),
            EditorAction::ExtendLineStart => buffer.move_line_start(true),
            EditorAction::ExtendLineEnd => buffer.move_line_end(true),
            EditorAction::DeleteCharBackward => {
                buffer.delete_backward();
            }
            EditorAction::DeleteCharForward => {
                buffer.delete_forward();
            }
            EditorAction::DeleteWordBackward => {
                buffer.delete_word_backward();
            }
            EditorAction::DeleteToLineStart => {
                buffer.delete_to_line_start();
            }
            EditorAction::NewLine => {
                buffer.insert_str("\n");
            }
            _ => return,
        }

        self.follow_caret = true;
        if self.buffer.selection() != before {
            self.on_selection_change();
        }
    }

    fn type_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.buffer.insert_str(text);
        self.follow_caret = true;
        self.on_selection_change();
    }

    fn handle_mouse(&mut self, button: MouseButton, pressed: bool, column: usize, row: usize) {
        if !pressed {
            return;
        }
        match button {
            MouseButton::WheelUp => {
                self.scroll_top = self.scroll_top.saturating_sub(WHEEL_STEP);
                self.follow_caret = false;
            }
            MouseButton::WheelDown => {
                let max_top = self.buffer.line_count().saturating_sub(1);
                self.scroll_top = (self.scroll_top + WHEEL_STEP).min(max_top);
                self.follow_caret = false;
            }
            MouseButton::Left => {
                if let Some(area) = self.overlay_area.filter(|_| self.state.is_open()) {
                    let inside =
                        row < area.rows && column >= area.col && column < area.col + area.width;
                    if inside {
                        if let Some(index) = self.list.hit_test(row) {
                            let transition = self.overlay.select_index(self.state, index);
                            self.apply(transition);
                        }
                        return;
                    }
                }
                self.place_caret(column, row);
            }
            _ => {}
        }
    }

    fn place_caret(&mut self, column: usize, row: usize) {
        let line = self.scroll_top + row;
        let target = column.saturating_sub(self.gutter_width);
        let line_text = self.buffer.text().split('\n').nth(line).unwrap_or("");
        let mut col = 0;
        let mut width = 0;
        for ch in line_text.chars() {
            let mut encoded = [0u8; 4];
            let ch_width = grapheme_width(ch.encode_utf8(&mut encoded));
            if width + ch_width > target {
                break;
            }
            width += ch_width;
            col += 1;
        }
        let offset = self.buffer.offset_at(line, col);
        self.buffer.set_caret(offset);
        self.focused = true;
        self.follow_caret = false;
        self.on_selection_change();
    }

    fn scroll_to_caret(&mut self, rows: usize) {
        let (caret_line, _) = self.buffer.line_col(self.buffer.head());
        if caret_line < self.scroll_top {
            self.scroll_top = caret_line;
        } else if rows > 0 && caret_line >= self.scroll_top + rows {
            self.scroll_top = caret_line + 1 - rows;
        }
    }

    fn render_line(&self, line_start: usize, line: &str) -> String {
        let selection = self.buffer.selection();
        let head = self.buffer.head();
        let mut out = String::new();
        let mut offset = line_start;
        for ch in line.chars() {
            if self.focused && offset == head {
                out.push_str(CURSOR_MARKER);
                if selection.is_empty() {
                    out.push_str(&format!("\x1b[7m{ch}\x1b[27m"));
                    offset += 1;
                    continue;
                }
            }
            if offset >= selection.start && offset < selection.end {
                out.push_str(&format!("\x1b[7m{ch}\x1b[27m"));
            } else {
                out.push(ch);
            }
            offset += 1;
        }
        if self.focused && offset == head {
            out.push_str(CURSOR_MARKER);
            out.push_str("\x1b[7m \x1b[27m");
        }
        out
    }
}

impl Component for SuggestionEditor {
    fn render(&mut self, width: usize) -> Vec<String> {
        let line_count = self.buffer.line_count();
        let rows = self.visible_rows.unwrap_or(line_count);
        if self.follow_caret {
            self.scroll_to_caret(rows);
        }
        self.scroll_top = self.scroll_top.min(line_count.saturating_sub(1));

        let digits = line_count.to_string().len().max(2);
        self.gutter_width = digits + 1;
        let text_width = width.saturating_sub(self.gutter_width);

        let mut line_starts = Vec::with_capacity(line_count);
        let mut start = 0;
        for line in self.buffer.text().split('\n') {
            line_starts.push((start, line));
            start += line.chars().count() + 1;
        }

        let mut lines = Vec::with_capacity(rows);
        for index in self.scroll_top..self.scroll_top + rows {
            let Some((line_start, line)) = line_starts.get(index) else {
                lines.push(String::new());
                continue;
            };
            let gutter = dim(&format!("{:>digits$} ", index + 1));
            let content =
                truncate_to_width(&self.render_line(*line_start, line), text_width, "", false);
            lines.push(format!("{gutter}{content}"));
        }

        self.overlay_area = None;
        if let OverlayState::Open { kind, highlighted } = self.state {
            let items = self.overlay.catalog().set(kind).clone();
            self.list.show(kind, items, highlighted);
            let list_width = self.list.preferred_width().min(text_width);
            let list_lines = self.list.render(list_width);
            if self.visible_rows.is_none() && lines.len() < list_lines.len() {
                lines.resize(list_lines.len(), String::new());
            }
            let covered = list_lines.len().min(lines.len());
            for (row, list_line) in list_lines.into_iter().take(covered).enumerate() {
                let underneath = skip_columns(&lines[row], self.gutter_width + list_width);
                let gutter = if self.scroll_top + row < line_count {
                    dim(&format!("{:>digits$} ", self.scroll_top + row + 1))
                } else {
                    " ".repeat(self.gutter_width)
                };
                lines[row] = format!(
                    "{gutter}{}{underneath}",
                    fit_to_width(&list_line, list_width)
                );
            }
            self.overlay_area = Some(OverlayArea {
                rows: covered,
                col: self.gutter_width,
                width: list_width,
            });
        }

        lines
    }

    fn handle_event(&mut self, event: &InputEvent) {
        if !self.mounted {
            return;
        }
        match event {
            InputEvent::Key { key_id, .. } => self.handle_key(key_id),
            InputEvent::Text { text, .. } => self.type_text(text),
            InputEvent::Paste { text, .. } => {
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                self.type_text(&text);
            }
            InputEvent::Mouse {
                button,
                pressed,
                column,
                row,
                ..
            } => self.handle_mouse(*button, *pressed, *column, *row),
            _ => {}
        }
    }

    fn set_terminal_rows(&mut self, rows: usize) {
        if self.visible_rows.is_some() {
            self.visible_rows = Some(rows);
        }
    }

    fn after_render(&mut self) {
        let Some(caret) = self.pending_restore.take() else {
            return;
        };
        if !self.mounted {
            return;
        }
        self.focused = true;
        self.buffer.set_caret(caret);
        self.follow_caret = true;
        self.on_selection_change();
        tracing::debug!(caret, "restored editor focus after insertion");
        self.request_render();
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for SuggestionEditor {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}
