//! Suggestion overlay list.

use crate::core::component::Component;
use crate::core::suggestion::{SuggestionKind, SuggestionSet};
use crate::core::text::utils::{bold, dim, reverse, truncate_to_width};
use crate::core::text::width::visible_width;

const SELECTED_PREFIX: &str = "▸ ";
const UNSELECTED_PREFIX: &str = "  ";
const PREFIX_WIDTH: usize = 2;

pub struct SuggestionListTheme {
    pub title: Box<dyn Fn(&str) -> String>,
    pub selected_text: Box<dyn Fn(&str) -> String>,
    pub scroll_info: Box<dyn Fn(&str) -> String>,
    pub no_match: Box<dyn Fn(&str) -> String>,
}

impl Default for SuggestionListTheme {
    fn default() -> Self {
        Self {
            title: Box::new(bold),
            selected_text: Box::new(reverse),
            scroll_info: Box::new(dim),
            no_match: Box::new(dim),
        }
    }
}

/// Renders the active suggestion set under its title and maps rows back to
/// candidate indices.
///
/// Row 0 is always the title. Candidate rows follow, windowed around the
/// highlighted entry when the set is longer than `max_visible`.
pub struct SuggestionList {
    kind: SuggestionKind,
    items: SuggestionSet,
    highlighted: usize,
    max_visible: usize,
    theme: SuggestionListTheme,
}

impl SuggestionList {
    pub fn new(max_visible: usize, theme: SuggestionListTheme) -> Self {
        Self {
            kind: SuggestionKind::Keyword,
            items: SuggestionSet::default(),
            highlighted: 0,
            max_visible: max_visible.max(1),
            theme,
        }
    }

    /// Point the list at `items` with `highlighted` selected.
    pub fn show(&mut self, kind: SuggestionKind, items: SuggestionSet, highlighted: usize) {
        self.kind = kind;
        self.items = items;
        self.highlighted = highlighted;
    }

    pub fn kind(&self) -> SuggestionKind {
        self.kind
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Width the list needs to show its title and longest candidate unclipped.
    pub fn preferred_width(&self) -> usize {
        let title = visible_width(self.kind.title());
        let widest = self
            .items
            .iter()
            .map(|item| visible_width(item) + PREFIX_WIDTH)
            .max()
            .unwrap_or(0);
        title.max(widest)
    }

    /// Half-open range of candidate indices currently on screen.
    pub fn visible_range(&self) -> (usize, usize) {
        let len = self.items.len();
        let max_visible = self.max_visible.min(len);
        if len <= max_visible {
            return (0, len);
        }
        let max_start = len - max_visible;
        let start = self.highlighted.saturating_sub(max_visible / 2).min(max_start);
        (start, start + max_visible)
    }

    /// Candidate index rendered at `row` (relative to the list's first line).
    pub fn hit_test(&self, row: usize) -> Option<usize> {
        let (start, end) = self.visible_range();
        let index = start + row.checked_sub(1)?;
        (index < end).then_some(index)
    }

    fn render_item(&self, width: usize, index: usize, item: &str) -> String {
        let max_width = width.saturating_sub(PREFIX_WIDTH);
        let value = truncate_to_width(item, max_width, "", false);
        if index == self.highlighted {
            (self.theme.selected_text)(&format!("{SELECTED_PREFIX}{value}"))
        } else {
            format!("{UNSELECTED_PREFIX}{value}")
        }
    }
}

impl Component for SuggestionList {
    fn render(&mut self, width: usize) -> Vec<String> {
        let title = truncate_to_width(self.kind.title(), width, "", false);
        let mut lines = vec![(self.theme.title)(&title)];

        if self.items.is_empty() {
            let empty = truncate_to_width("  (no suggestions)", width, "", false);
            lines.push((self.theme.no_match)(&empty));
            return lines;
        }

        let (start, end) = self.visible_range();
        for (index, item) in self.items.iter().enumerate().take(end).skip(start) {
            lines.push(self.render_item(width, index, item));
        }

        if start > 0 || end < self.items.len() {
            let scroll_text = format!("  ({}/{})", self.highlighted + 1, self.items.len());
            let truncated = truncate_to_width(&scroll_text, width, "", false);
            lines.push((self.theme.scroll_info)(&truncated));
        }

        lines
    }
}
