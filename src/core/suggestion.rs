//! Text buffer and suggestion overlay state for the inline suggestion editor.
//!
//! Everything here is pure: the widget in `widgets::suggestion_editor` owns the
//! values and feeds key presses through [`SuggestionOverlay::handle_key`].
//! All offsets are character offsets, never byte offsets.

use std::sync::Arc;

/// Selection range with `start <= end`. A caret is an empty selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Build a selection from two endpoints in any order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Clamp both endpoints to `len`.
    pub fn clamped(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

/// Mutable text plus a directed selection (`anchor` stays put while `head`
/// follows the caret).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    anchor: usize,
    head: usize,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor: 0,
            head: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn selection(&self) -> Selection {
        Selection::new(self.anchor, self.head)
    }

    /// Caret position (the moving end of the selection).
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn set_selection(&mut self, selection: Selection) {
        let selection = selection.clamped(self.len_chars());
        self.anchor = selection.start;
        self.head = selection.end;
    }

    pub fn set_caret(&mut self, offset: usize) {
        self.set_selection(Selection::caret(offset));
    }

    /// Replace the characters in `range` with `text` and return the offset just
    /// past the inserted text. The caret is moved there.
    pub fn replace_range(&mut self, range: Selection, text: &str) -> usize {
        let range = range.clamped(self.len_chars());
        let start = self.byte_index(range.start);
        let end = self.byte_index(range.end);
        self.text.replace_range(start..end, text);
        let caret = range.start + text.chars().count();
        self.anchor = caret;
        self.head = caret;
        caret
    }

    /// Type `text` over the live selection.
    pub fn insert_str(&mut self, text: &str) -> usize {
        self.replace_range(self.selection(), text)
    }

    /// Delete the selection, or the character before the caret.
    pub fn delete_backward(&mut self) -> bool {
        let selection = self.selection();
        if !selection.is_empty() {
            self.replace_range(selection, "");
            return true;
        }
        if selection.start == 0 {
            return false;
        }
        self.replace_range(Selection::new(selection.start - 1, selection.start), "");
        true
    }

    /// Delete the selection, or the character after the caret.
    pub fn delete_forward(&mut self) -> bool {
        let selection = self.selection();
        if !selection.is_empty() {
            self.replace_range(selection, "");
            return true;
        }
        if selection.end >= self.len_chars() {
            return false;
        }
        self.replace_range(Selection::new(selection.end, selection.end + 1), "");
        true
    }

    pub fn delete_word_backward(&mut self) -> bool {
        let selection = self.selection();
        if !selection.is_empty() {
            return self.delete_backward();
        }
        let target = self.word_left_of(selection.start);
        if target == selection.start {
            return false;
        }
        self.replace_range(Selection::new(target, selection.start), "");
        true
    }

    pub fn delete_to_line_start(&mut self) -> bool {
        let caret = self.head;
        let start = self.line_start_of(caret);
        if start == caret {
            return self.delete_backward();
        }
        self.replace_range(Selection::new(start, caret), "");
        true
    }

    pub fn move_left(&mut self, extend: bool) {
        let selection = self.selection();
        let target = if !extend && !selection.is_empty() {
            selection.start
        } else {
            self.head.saturating_sub(1)
        };
        self.move_to(target, extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        let selection = self.selection();
        let target = if !extend && !selection.is_empty() {
            selection.end
        } else {
            (self.head + 1).min(self.len_chars())
        };
        self.move_to(target, extend);
    }

    pub fn move_up(&mut self, extend: bool) {
        let (line, col) = self.line_col(self.head);
        let target = if line == 0 {
            0
        } else {
            self.offset_at(line - 1, col)
        };
        self.move_to(target, extend);
    }

    pub fn move_down(&mut self, extend: bool) {
        let (line, col) = self.line_col(self.head);
        let target = if line + 1 >= self.line_count() {
            self.len_chars()
        } else {
            self.offset_at(line + 1, col)
        };
        self.move_to(target, extend);
    }

    pub fn move_line_start(&mut self, extend: bool) {
        self.move_to(self.line_start_of(self.head), extend);
    }

    pub fn move_line_end(&mut self, extend: bool) {
        self.move_to(self.line_end_of(self.head), extend);
    }

    pub fn move_word_left(&mut self) {
        self.move_to(self.word_left_of(self.head), false);
    }

    pub fn move_word_right(&mut self) {
        self.move_to(self.word_right_of(self.head), false);
    }

    pub fn move_doc_start(&mut self) {
        self.move_to(0, false);
    }

    pub fn move_doc_end(&mut self) {
        self.move_to(self.len_chars(), false);
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Zero-based `(line, column)` of a character offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for ch in self.text.chars().take(offset) {
            if ch == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// Character offset of `(line, column)`, clamped to the line's length.
    pub fn offset_at(&self, line: usize, col: usize) -> usize {
        let mut offset = 0;
        for (index, text) in self.text.split('\n').enumerate() {
            let len = text.chars().count();
            if index == line {
                return offset + col.min(len);
            }
            offset += len + 1;
        }
        self.len_chars()
    }

    fn move_to(&mut self, target: usize, extend: bool) {
        let target = target.min(self.len_chars());
        self.head = target;
        if !extend {
            self.anchor = target;
        }
    }

    fn byte_index(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    fn chars(&self) -> Vec<char> {
        self.text.chars().collect()
    }

    fn line_start_of(&self, offset: usize) -> usize {
        let chars = self.chars();
        let mut idx = offset.min(chars.len());
        while idx > 0 && chars[idx - 1] != '\n' {
            idx -= 1;
        }
        idx
    }

    fn line_end_of(&self, offset: usize) -> usize {
        let chars = self.chars();
        let mut idx = offset.min(chars.len());
        while idx < chars.len() && chars[idx] != '\n' {
            idx += 1;
        }
        idx
    }

    fn word_left_of(&self, offset: usize) -> usize {
        let chars = self.chars();
        let mut idx = offset.min(chars.len());
        while idx > 0 && chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        while idx > 0 && !chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        idx
    }

    fn word_right_of(&self, offset: usize) -> usize {
        let chars = self.chars();
        let mut idx = offset.min(chars.len());
        while idx < chars.len() && chars[idx].is_whitespace() {
            idx += 1;
        }
        while idx < chars.len() && !chars[idx].is_whitespace() {
            idx += 1;
        }
        idx
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    Keyword,
    Object,
}

impl SuggestionKind {
    pub fn title(self) -> &'static str {
        match self {
            SuggestionKind::Keyword => "Keywords (↑↓ to navigate, Enter to select)",
            SuggestionKind::Object => "Objects (↑↓ to navigate, Enter to select)",
        }
    }
}

/// Immutable ordered candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionSet {
    items: Arc<[String]>,
}

impl SuggestionSet {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionCatalog {
    pub keywords: SuggestionSet,
    pub objects: SuggestionSet,
}

impl SuggestionCatalog {
    pub fn new(keywords: SuggestionSet, objects: SuggestionSet) -> Self {
        Self { keywords, objects }
    }

    pub fn set(&self, kind: SuggestionKind) -> &SuggestionSet {
        match kind {
            SuggestionKind::Keyword => &self.keywords,
            SuggestionKind::Object => &self.objects,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayState {
    #[default]
    Closed,
    Open {
        kind: SuggestionKind,
        highlighted: usize,
    },
}

impl OverlayState {
    pub fn is_open(&self) -> bool {
        matches!(self, OverlayState::Open { .. })
    }

    pub fn kind(&self) -> Option<SuggestionKind> {
        match self {
            OverlayState::Open { kind, .. } => Some(*kind),
            OverlayState::Closed => None,
        }
    }
}

/// Key presses the overlay cares about, already resolved from keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKey {
    OpenKeywords,
    OpenObjects,
    Up,
    Down,
    Confirm,
    Cancel,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    /// The key was not handled; the text area should see it.
    Ignored,
    /// The key was swallowed by the overlay.
    Consumed,
    /// Insert the candidate at the last known selection. The overlay is closed.
    Insert(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: OverlayState,
    pub outcome: OverlayOutcome,
}

impl Transition {
    fn to(state: OverlayState, outcome: OverlayOutcome) -> Self {
        Self { state, outcome }
    }
}

/// Overlay state machine over a fixed catalog.
#[derive(Debug, Clone, Default)]
pub struct SuggestionOverlay {
    catalog: SuggestionCatalog,
}

impl SuggestionOverlay {
    pub fn new(catalog: SuggestionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SuggestionCatalog {
        &self.catalog
    }

    /// Apply `key` to `state`.
    pub fn handle_key(&self, state: OverlayState, key: OverlayKey) -> Transition {
        match (state, key) {
            (_, OverlayKey::OpenKeywords) => Transition::to(
                OverlayState::Open {
                    kind: SuggestionKind::Keyword,
                    highlighted: 0,
                },
                OverlayOutcome::Consumed,
            ),
            (_, OverlayKey::OpenObjects) => Transition::to(
                OverlayState::Open {
                    kind: SuggestionKind::Object,
                    highlighted: 0,
                },
                OverlayOutcome::Consumed,
            ),
            (OverlayState::Closed, _) | (_, OverlayKey::Other) => {
                Transition::to(state, OverlayOutcome::Ignored)
            }
            (OverlayState::Open { .. }, OverlayKey::Cancel) => {
                Transition::to(OverlayState::Closed, OverlayOutcome::Consumed)
            }
            (OverlayState::Open { kind, highlighted }, OverlayKey::Down) => {
                let len = self.catalog.set(kind).len();
                if len == 0 {
                    return Transition::to(state, OverlayOutcome::Consumed);
                }
                Transition::to(
                    OverlayState::Open {
                        kind,
                        highlighted: (highlighted + 1) % len,
                    },
                    OverlayOutcome::Consumed,
                )
            }
            (OverlayState::Open { kind, highlighted }, OverlayKey::Up) => {
                let len = self.catalog.set(kind).len();
                if len == 0 {
                    return Transition::to(state, OverlayOutcome::Consumed);
                }
                Transition::to(
                    OverlayState::Open {
                        kind,
                        highlighted: (highlighted + len - 1) % len,
                    },
                    OverlayOutcome::Consumed,
                )
            }
            (OverlayState::Open { kind, highlighted }, OverlayKey::Confirm) => {
                self.pick(state, kind, highlighted)
            }
        }
    }

    /// Pointer selection of row `index`: highlight it, then confirm.
    pub fn select_index(&self, state: OverlayState, index: usize) -> Transition {
        match state {
            OverlayState::Open { kind, .. } if index < self.catalog.set(kind).len() => {
                self.pick(state, kind, index)
            }
            _ => Transition::to(state, OverlayOutcome::Ignored),
        }
    }

    fn pick(&self, state: OverlayState, kind: SuggestionKind, index: usize) -> Transition {
        match self.catalog.set(kind).get(index) {
            Some(candidate) => Transition::to(
                OverlayState::Closed,
                OverlayOutcome::Insert(candidate.to_string()),
            ),
            None => Transition::to(state, OverlayOutcome::Consumed),
        }
    }
}
