//! CheckList widget.

use crate::core::component::{Component, Focusable};
use crate::core::text::utils::{bold, cyan, dim, green, reverse, truncate_to_width};
use crate::core::text::width::visible_width;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckItem {
    pub id: usize,
    pub label: String,
    pub detail: Option<String>,
    pub checked: bool,
    /// Marks the item the owner currently has open.
    pub active: bool,
}

impl CheckItem {
    pub fn new(id: usize, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            detail: None,
            checked: false,
            active: false,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

pub struct CheckListTheme {
    pub title: Box<dyn Fn(&str, bool) -> String>,
    pub cursor_row: Box<dyn Fn(&str) -> String>,
    pub active: Box<dyn Fn(&str) -> String>,
    pub detail: Box<dyn Fn(&str) -> String>,
    pub empty: Box<dyn Fn(&str) -> String>,
}

impl Default for CheckListTheme {
    fn default() -> Self {
        Self {
            title: Box::new(|text, focused| {
                if focused {
                    bold(&cyan(text))
                } else {
                    bold(text)
                }
            }),
            cursor_row: Box::new(reverse),
            active: Box::new(|text| bold(&green(text))),
            detail: Box::new(dim),
            empty: Box::new(dim),
        }
    }
}

/// Titled list of checkbox rows with a movable cursor.
///
/// Row 0 is the title. Item rows scroll to keep the cursor visible when the
/// list is given fewer rows than it has items.
pub struct CheckList {
    title: String,
    empty_text: String,
    items: Vec<CheckItem>,
    cursor: usize,
    scroll_top: usize,
    max_visible: Option<usize>,
    focused: bool,
    theme: CheckListTheme,
}

impl CheckList {
    pub fn new(title: impl Into<String>, theme: CheckListTheme) -> Self {
        Self {
            title: title.into(),
            empty_text: "(empty)".to_string(),
            items: Vec::new(),
            cursor: 0,
            scroll_top: 0,
            max_visible: None,
            focused: false,
            theme,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_empty_text(&mut self, text: impl Into<String>) {
        self.empty_text = text.into();
    }

    /// Replace the rows, keeping the cursor on the same index where possible.
    pub fn set_items(&mut self, items: Vec<CheckItem>) {
        self.items = items;
        self.clamp_cursor();
    }

    pub fn items(&self) -> &[CheckItem] {
        &self.items
    }

    /// Limit the number of item rows rendered. `None` renders all.
    pub fn set_max_visible(&mut self, rows: Option<usize>) {
        self.max_visible = rows.map(|rows| rows.max(1));
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index;
        self.clamp_cursor();
    }

    pub fn cursor_item(&self) -> Option<&CheckItem> {
        self.items.get(self.cursor)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    /// Item index rendered at `row` of the last frame.
    pub fn hit_test(&self, row: usize) -> Option<usize> {
        let index = self.scroll_top + row.checked_sub(1)?;
        let (_, end) = self.visible_range();
        (index < end).then_some(index)
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
    }

    fn visible_range(&self) -> (usize, usize) {
        let rows = self.max_visible.unwrap_or(self.items.len());
        let end = (self.scroll_top + rows).min(self.items.len());
        (self.scroll_top, end)
    }

    fn scroll_to_cursor(&mut self) {
        let Some(rows) = self.max_visible else {
            self.scroll_top = 0;
            return;
        };
        if self.cursor < self.scroll_top {
            self.scroll_top = self.cursor;
        } else if self.cursor >= self.scroll_top + rows {
            self.scroll_top = self.cursor + 1 - rows;
        }
        self.scroll_top = self.scroll_top.min(self.items.len().saturating_sub(rows));
    }

    fn render_item(&self, width: usize, index: usize, item: &CheckItem) -> String {
        let checkbox = if item.checked { "[x]" } else { "[ ]" };
        let label = if item.active {
            (self.theme.active)(&item.label)
        } else {
            item.label.clone()
        };
        let mut row = format!("{checkbox} {label}");
        if let Some(detail) = item.detail.as_deref().filter(|detail| !detail.is_empty()) {
            row.push_str("  ");
            row.push_str(&(self.theme.detail)(detail));
        }
        let row = truncate_to_width(&row, width, "…", false);
        if self.focused && index == self.cursor {
            let padding = " ".repeat(width.saturating_sub(visible_width(&row)));
            (self.theme.cursor_row)(&format!("{row}{padding}"))
        } else {
            row
        }
    }
}

impl Component for CheckList {
    fn render(&mut self, width: usize) -> Vec<String> {
        self.scroll_to_cursor();

        let title = truncate_to_width(&self.title, width, "…", false);
        let mut lines = vec![(self.theme.title)(&title, self.focused)];

        if self.items.is_empty() {
            let empty = truncate_to_width(&self.empty_text, width, "…", false);
            lines.push((self.theme.empty)(&empty));
            return lines;
        }

        let (start, end) = self.visible_range();
        for (index, item) in self.items.iter().enumerate().take(end).skip(start) {
            lines.push(self.render_item(width, index, item));
        }
        lines
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for CheckList {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}
