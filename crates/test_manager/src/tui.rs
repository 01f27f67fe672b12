use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use casebook::core::text::utils::{bold, dim, green, magenta, reverse, skip_columns};
use casebook::{
    fit_to_width, truncate_to_width, visible_width, CheckItem, CheckList, CheckListTheme,
    Component, CursorPos, EditorAction, EditorKeybindingsManager, Focusable, Input, InputEvent,
    MouseButton, Notification, SuggestionEditor,
};
use time::OffsetDateTime;

use crate::app::{
    App, BulkAction, CreateKind, Dialog, EditorCommand, HostOps, ListPane, NavTarget, Pane,
};
use crate::model::{suggestion_catalog, ItemId, TestCase, INITIAL_SCRIPT};
use crate::runtime::RuntimeController;

const SIDEBAR_MAX_WIDTH: usize = 28;
const CASES_MAX_WIDTH: usize = 36;
const EDITOR_HEADER_ROWS: usize = 2;
const DIALOG_WIDTH: usize = 44;
const DESCRIPTION_PREVIEW_CHARS: usize = 50;
const CHECKBOX_COLUMNS: usize = 3;
const DEFAULT_ROWS: usize = 24;

const EDITOR_TITLE: &str = "Test Case Editor";
const EDITOR_HINT: &str = "Press Ctrl+K for keywords, Ctrl+O for objects";
const STATUS_HINT: &str = "tab pane · space check · enter open · n new · x run · s stop · \
d delete · l lock · 1-4 nav · ctrl+r run tests · ctrl+s save · ctrl+q quit";
const DIALOG_HINT: &str = "enter create · esc cancel";
const QUICK_REFERENCE: [(&str, &str); 5] = [
    ("Ctrl+K", "for keywords"),
    ("Ctrl+O", "for objects"),
    ("↑↓", "to navigate list"),
    ("Enter", "to select"),
    ("Esc", "to close"),
];
/// Editor rows that must stay visible before the quick reference is shown.
const MIN_EDITOR_ROWS: usize = 4;

/// Column split of the last frame.
#[derive(Debug, Clone, Copy, Default)]
struct Layout {
    sidebar: usize,
    cases_col: usize,
    cases: usize,
    editor_col: usize,
    editor: usize,
    body_rows: usize,
}

impl Layout {
    fn new(width: usize, rows: usize) -> Self {
        let sidebar = (width / 4).min(SIDEBAR_MAX_WIDTH);
        let cases = (width / 3).min(CASES_MAX_WIDTH);
        let cases_col = sidebar + 1;
        let editor_col = cases_col + cases + 1;
        Self {
            sidebar,
            cases_col,
            cases,
            editor_col,
            editor: width.saturating_sub(editor_col),
            body_rows: rows.saturating_sub(1),
        }
    }

    fn pane_at(&self, column: usize) -> Option<Pane> {
        if column < self.sidebar {
            Some(Pane::Sidebar)
        } else if column >= self.cases_col && column < self.cases_col + self.cases {
            Some(Pane::Cases)
        } else if column >= self.editor_col {
            Some(Pane::Editor)
        } else {
            None
        }
    }
}

/// Three-pane root: test set sidebar, case list and script editor, plus the
/// modal create dialog.
pub struct AppComponent {
    app: Arc<Mutex<App>>,
    host: RuntimeController,
    keybindings: EditorKeybindingsManager,
    sidebar: CheckList,
    cases: CheckList,
    editor: SuggestionEditor,
    dialog_input: Input,
    focus: Pane,
    focused: bool,
    rows: usize,
    layout: Layout,
    nav_top: usize,
    reveal: Option<(ListPane, ItemId)>,
    cursor_pos: Option<CursorPos>,
}

impl AppComponent {
    pub fn new(app: Arc<Mutex<App>>, host: RuntimeController) -> Self {
        let keybindings = EditorKeybindingsManager::default();

        let mut editor = SuggestionEditor::new(suggestion_catalog(), INITIAL_SCRIPT);
        editor.set_keybindings(keybindings.clone());
        editor.set_render_handle(Some(host.render_handle()));
        editor.set_visible_rows(Some(1));
        editor.mount();

        let mut sidebar = CheckList::new("Test Manager", CheckListTheme::default());
        sidebar.set_empty_text("No test sets");
        let cases = CheckList::new("Test Cases", CheckListTheme::default());

        Self {
            app,
            host,
            dialog_input: Input::new(keybindings.clone()),
            keybindings,
            sidebar,
            cases,
            editor,
            focus: Pane::Sidebar,
            focused: false,
            rows: DEFAULT_ROWS,
            layout: Layout::default(),
            nav_top: 0,
            reveal: None,
            cursor_pos: None,
        }
    }

    /// Replace the editing bindings, including the suggestion hotkeys.
    pub fn set_keybindings(&mut self, keybindings: EditorKeybindingsManager) {
        self.editor.set_keybindings(keybindings.clone());
        self.dialog_input = Input::new(keybindings.clone());
        self.keybindings = keybindings;
    }

    pub fn focused_pane(&self) -> Pane {
        self.focus
    }

    pub fn editor(&self) -> &SuggestionEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut SuggestionEditor {
        &mut self.editor
    }

    fn with_app_mut<R>(&self, f: impl FnOnce(&mut App, &mut dyn HostOps) -> R) -> R {
        let mut app = lock_unpoisoned(&self.app);
        let mut host = self.host.clone();
        f(&mut app, &mut host)
    }

    fn dialog_open(&self) -> bool {
        lock_unpoisoned(&self.app).dialog.is_some()
    }

    fn set_focus(&mut self, pane: Pane) {
        self.focus = pane;
        let dialog_open = self.dialog_open();
        self.apply_focus(dialog_open);
    }

    fn apply_focus(&mut self, dialog_open: bool) {
        let panes = self.focused && !dialog_open;
        self.sidebar.set_focused(panes && self.focus == Pane::Sidebar);
        self.cases.set_focused(panes && self.focus == Pane::Cases);
        self.editor.set_focused(panes && self.focus == Pane::Editor);
        self.dialog_input.set_focused(self.focused && dialog_open);
    }

    fn list_pane(&self) -> Option<ListPane> {
        match self.focus {
            Pane::Sidebar => Some(ListPane::TestSets),
            Pane::Cases => Some(ListPane::TestCases),
            Pane::Editor => None,
        }
    }

    fn list_mut(&mut self, pane: ListPane) -> &mut CheckList {
        match pane {
            ListPane::TestSets => &mut self.sidebar,
            ListPane::TestCases => &mut self.cases,
        }
    }

    fn cursor_id(&mut self, pane: ListPane) -> Option<ItemId> {
        self.list_mut(pane).cursor_item().map(|item| item.id)
    }

    fn handle_key(&mut self, key_id: &str, event: &InputEvent) {
        match key_id {
            "ctrl+q" => return self.with_app_mut(|app, host| app.on_quit(host)),
            "tab" => return self.set_focus(self.focus.next()),
            "shift+tab" => return self.set_focus(self.focus.previous()),
            "ctrl+r" => return self.editor_command(EditorCommand::RunTests),
            "ctrl+s" => return self.editor_command(EditorCommand::Save),
            _ => {}
        }

        if self.editor.overlay_state().is_open() && self.is_overlay_key(key_id) {
            self.editor.handle_event(event);
            return;
        }

        let hotkey = self.keybindings.matches(key_id, EditorAction::OpenKeywords)
            || self.keybindings.matches(key_id, EditorAction::OpenObjects);
        if hotkey {
            self.set_focus(Pane::Editor);
            self.editor.handle_event(event);
            return;
        }

        let Some(pane) = self.list_pane() else {
            self.editor.handle_event(event);
            return;
        };
        match key_id {
            "up" => self.list_mut(pane).move_up(),
            "down" => self.list_mut(pane).move_down(),
            "enter" => self.activate(pane),
            _ => {}
        }
    }

    /// Keys the open suggestion list owns whichever pane has focus.
    fn is_overlay_key(&self, key_id: &str) -> bool {
        [
            EditorAction::OverlayUp,
            EditorAction::OverlayDown,
            EditorAction::OverlayConfirm,
            EditorAction::OverlayCancel,
        ]
        .into_iter()
        .any(|action| self.keybindings.matches(key_id, action))
    }

    fn handle_list_command(&mut self, pane: ListPane, command: char) {
        let now = Instant::now();
        match command {
            ' ' => {
                if let Some(id) = self.cursor_id(pane) {
                    self.with_app_mut(|app, host| app.toggle_checked(pane, id, host));
                }
            }
            'n' => self.open_dialog(match pane {
                ListPane::TestSets => CreateKind::TestSet,
                ListPane::TestCases => CreateKind::TestCase,
            }),
            'x' => self.bulk(pane, BulkAction::Execute, now),
            's' => self.bulk(pane, BulkAction::Stop, now),
            'd' => self.bulk(pane, BulkAction::Delete, now),
            'l' => self.bulk(pane, BulkAction::Lock, now),
            '1'..='4' if pane == ListPane::TestSets => {
                let index = command as usize - '1' as usize;
                if let Some(target) = NavTarget::ALL.get(index).copied() {
                    self.with_app_mut(|app, host| app.open_nav(target, now, host));
                }
            }
            _ => {}
        }
    }

    fn bulk(&mut self, pane: ListPane, action: BulkAction, now: Instant) {
        self.with_app_mut(|app, host| app.run_bulk_action(pane, action, now, host));
    }

    fn editor_command(&mut self, command: EditorCommand) {
        let now = Instant::now();
        self.with_app_mut(|app, host| app.run_editor_command(command, now, host));
    }

    fn activate(&mut self, pane: ListPane) {
        let Some(id) = self.cursor_id(pane) else {
            return;
        };
        self.with_app_mut(|app, host| match pane {
            ListPane::TestSets => app.select_test_set(id, host),
            ListPane::TestCases => app.select_test_case(id, host),
        });
    }

    fn open_dialog(&mut self, kind: CreateKind) {
        let opened = self.with_app_mut(|app, host| {
            app.open_create_dialog(kind, host);
            app.dialog.is_some()
        });
        if !opened {
            return;
        }
        self.dialog_input.set_value("");
        self.dialog_input.set_placeholder(kind.placeholder());
        self.apply_focus(true);
    }

    fn handle_dialog_event(&mut self, event: &InputEvent) {
        match event.key_id() {
            Some("ctrl+q") => return self.with_app_mut(|app, host| app.on_quit(host)),
            Some("enter") => return self.confirm_dialog(),
            Some("escape") => {
                self.with_app_mut(|app, host| app.cancel_dialog(host));
                return self.apply_focus(false);
            }
            _ => {}
        }
        if matches!(event, InputEvent::Mouse { .. } | InputEvent::Resize { .. }) {
            return;
        }
        self.dialog_input.handle_event(event);
        let name = self.dialog_input.value().to_string();
        lock_unpoisoned(&self.app).set_dialog_name(name);
    }

    fn confirm_dialog(&mut self) {
        let name = self.dialog_input.value().to_string();
        let created = self.with_app_mut(|app, host| {
            let kind = app.dialog.as_ref().map(|dialog| dialog.kind)?;
            app.set_dialog_name(name);
            let id = app.confirm_dialog(OffsetDateTime::now_utc(), host)?;
            Some((kind, id))
        });
        let Some((kind, id)) = created else {
            return;
        };
        self.reveal = Some(match kind {
            CreateKind::TestSet => (ListPane::TestSets, id),
            CreateKind::TestCase => (ListPane::TestCases, id),
        });
        self.apply_focus(false);
    }

    fn handle_mouse(&mut self, event: &InputEvent) {
        let InputEvent::Mouse {
            button,
            pressed,
            column,
            row,
            ..
        } = event
        else {
            return;
        };
        let Some(pane) = self.layout.pane_at(*column) else {
            return;
        };
        let left_press = *button == MouseButton::Left && *pressed;

        if pane == Pane::Editor {
            let Some(local) = event.translated(EDITOR_HEADER_ROWS, self.layout.editor_col) else {
                return;
            };
            if left_press {
                self.set_focus(Pane::Editor);
            }
            self.editor.handle_event(&local);
            return;
        }
        if !left_press {
            return;
        }

        self.set_focus(pane);
        let (list_pane, local_col) = match pane {
            Pane::Sidebar => (ListPane::TestSets, *column),
            _ => (ListPane::TestCases, column - self.layout.cases_col),
        };
        if let Some(index) = self.list_mut(list_pane).hit_test(*row) {
            self.list_mut(list_pane).set_cursor(index);
            if local_col < CHECKBOX_COLUMNS {
                self.handle_list_command(list_pane, ' ');
            } else {
                self.activate(list_pane);
            }
            return;
        }
        if list_pane == ListPane::TestSets {
            let nav = row
                .checked_sub(self.nav_top)
                .and_then(|index| NavTarget::ALL.get(index).copied());
            if let Some(target) = nav {
                let now = Instant::now();
                self.with_app_mut(|app, host| app.open_nav(target, now, host));
            }
        }
    }

    fn sync_lists(&mut self, app: &App) {
        let sets = app
            .test_sets
            .iter()
            .map(|set| {
                CheckItem::new(set.id, set.name.clone())
                    .checked(app.is_checked(ListPane::TestSets, set.id))
                    .active(app.selected_set == Some(set.id))
            })
            .collect();
        self.sidebar.set_items(sets);

        match app.selected_test_set() {
            Some(set) => {
                self.cases.set_title(set.name.clone());
                self.cases.set_empty_text("No test cases");
                let items = set
                    .test_cases
                    .iter()
                    .map(|case| case_item(app, case))
                    .collect();
                self.cases.set_items(items);
            }
            None => {
                self.cases.set_title("Test Cases");
                self.cases.set_empty_text("Select a test set to view cases");
                self.cases.set_items(Vec::new());
            }
        }

        if let Some((pane, id)) = self.reveal.take() {
            let list = self.list_mut(pane);
            if let Some(index) = list.items().iter().position(|item| item.id == id) {
                list.set_cursor(index);
            }
        }
    }

    fn render_sidebar(&mut self, app: &App) -> Vec<String> {
        let width = self.layout.sidebar;
        let body = self.layout.body_rows;
        // Title, blank separator, nav entries and the notification row.
        let reserved = 1 + 1 + NavTarget::ALL.len() + 1;
        self.sidebar
            .set_max_visible(Some(body.saturating_sub(reserved).max(1)));

        let mut lines = self.sidebar.render(width);
        lines.push(String::new());
        self.nav_top = lines.len();
        for (index, target) in NavTarget::ALL.iter().enumerate() {
            let entry = format!("{} {}", index + 1, target.label());
            lines.push(dim(&truncate_to_width(&entry, width, "…", false)));
        }
        finish_pane(lines, body, width, app.notification(Pane::Sidebar))
    }

    fn render_cases(&mut self, app: &App) -> Vec<String> {
        let width = self.layout.cases;
        let body = self.layout.body_rows;
        self.cases.set_max_visible(Some(body.saturating_sub(2).max(1)));
        let lines = self.cases.render(width);
        finish_pane(lines, body, width, app.notification(Pane::Cases))
    }

    fn render_editor(&mut self, app: &App) -> Vec<String> {
        let width = self.layout.editor;
        let body = self.layout.body_rows;
        let title = match app.selected_test_case() {
            Some(case) => format!("{EDITOR_TITLE} · {} ({})", case.name, case.status.label()),
            None => EDITOR_TITLE.to_string(),
        };
        let mut lines = vec![
            bold(&truncate_to_width(&title, width, "…", false)),
            dim(&truncate_to_width(EDITOR_HINT, width, "…", false)),
        ];
        let footer = quick_reference(width);
        let available = body.saturating_sub(EDITOR_HEADER_ROWS + 1);
        let footer = if available >= footer.len() + MIN_EDITOR_ROWS {
            footer
        } else {
            Vec::new()
        };
        let rows = available.saturating_sub(footer.len()).max(1);
        self.editor.set_visible_rows(Some(rows));
        let mut editor_lines = self.editor.render(width);
        editor_lines.resize(rows, String::new());
        lines.extend(editor_lines);
        lines.extend(footer);
        finish_pane(lines, body, width, app.notification(Pane::Editor))
    }

    fn render_dialog(&mut self, lines: &mut [String], dialog: &Dialog, width: usize) {
        let box_width = DIALOG_WIDTH.min(width.saturating_sub(2));
        if box_width < 8 || lines.len() < 4 {
            return;
        }
        let inner = box_width - 4;
        let input_line = self
            .dialog_input
            .render(inner)
            .into_iter()
            .next()
            .unwrap_or_default();

        let heading = truncate_to_width(
            &format!("─ {} ", dialog.kind.title()),
            box_width - 2,
            "",
            false,
        );
        let fill = "─".repeat(box_width - 2 - visible_width(&heading));
        let frame = [
            format!("┌{heading}{fill}┐"),
            format!("│ {} │", fit_to_width(&input_line, inner)),
            format!("│ {} │", fit_to_width(&dim(DIALOG_HINT), inner)),
            format!("└{}┘", "─".repeat(box_width - 2)),
        ];

        let top = (lines.len() - frame.len()) / 2;
        let left = (width - box_width) / 2;
        for (offset, boxed) in frame.iter().enumerate() {
            let line = &lines[top + offset];
            let before = truncate_to_width(line, left, "", true);
            let after = skip_columns(line, left + box_width);
            lines[top + offset] = format!("{before}{boxed}{after}");
        }

        self.cursor_pos = self.dialog_input.cursor_pos().map(|pos| CursorPos {
            row: top + 1 + pos.row,
            col: left + 2 + pos.col,
        });
    }
}

fn quick_reference(width: usize) -> Vec<String> {
    let mut lines = vec![bold("Quick Reference")];
    for (index, (key, action)) in QUICK_REFERENCE.iter().enumerate() {
        let action = match index {
            0 => format!("{action} ({})", green("green")),
            1 => format!("{action} ({})", magenta("purple")),
            _ => action.to_string(),
        };
        let entry = format!("{} {action}", reverse(&format!(" {key} ")));
        lines.push(truncate_to_width(&entry, width, "…", false));
    }
    lines
}

fn case_item(app: &App, case: &TestCase) -> CheckItem {
    let preview: String = case
        .description
        .chars()
        .take(DESCRIPTION_PREVIEW_CHARS)
        .collect();
    CheckItem::new(case.id, case.name.clone())
        .with_detail(format!("{preview}..."))
        .checked(app.is_checked(ListPane::TestCases, case.id))
        .active(app.selected_case == Some(case.id))
}

/// Pad or cut a pane to `body` rows with its notification on the last row.
fn finish_pane(
    mut lines: Vec<String>,
    body: usize,
    width: usize,
    notification: Option<&Notification>,
) -> Vec<String> {
    let notice = notification.map(|note| note.clone().render(width).concat());
    let content_rows = body.saturating_sub(usize::from(notice.is_some()));
    lines.truncate(content_rows);
    lines.resize(content_rows, String::new());
    lines.extend(notice.filter(|_| body > 0));
    lines
}

impl Component for AppComponent {
    fn render(&mut self, width: usize) -> Vec<String> {
        let now = Instant::now();
        let app = self.with_app_mut(|app, host| {
            app.expire_notifications(now);
            if let Some(deadline) = app.next_expiry() {
                host.request_render_at(deadline);
            }
            app.clone()
        });

        self.layout = Layout::new(width, self.rows);
        self.sync_lists(&app);
        let sidebar = self.render_sidebar(&app);
        let cases = self.render_cases(&app);
        let editor = self.render_editor(&app);

        let separator = dim("│");
        let mut lines = Vec::with_capacity(self.layout.body_rows + 1);
        for ((left, middle), right) in sidebar.iter().zip(&cases).zip(&editor) {
            lines.push(format!(
                "{}{separator}{}{separator}{right}",
                fit_to_width(left, self.layout.sidebar),
                fit_to_width(middle, self.layout.cases),
            ));
        }
        lines.push(dim(&truncate_to_width(STATUS_HINT, width, "…", false)));

        self.cursor_pos = None;
        if let Some(dialog) = app.dialog.as_ref() {
            self.render_dialog(&mut lines, dialog, width);
        }
        lines
    }

    fn handle_event(&mut self, event: &InputEvent) {
        if self.dialog_open() {
            self.handle_dialog_event(event);
            return;
        }
        match event {
            InputEvent::Key { key_id, .. } => self.handle_key(key_id, event),
            InputEvent::Text { text, .. } => match self.list_pane() {
                Some(pane) => {
                    for command in text.chars() {
                        self.handle_list_command(pane, command);
                    }
                }
                None => self.editor.handle_event(event),
            },
            InputEvent::Paste { .. } if self.focus == Pane::Editor => {
                self.editor.handle_event(event);
            }
            InputEvent::Mouse { .. } => self.handle_mouse(event),
            _ => {}
        }
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        self.cursor_pos
    }

    fn set_terminal_rows(&mut self, rows: usize) {
        self.rows = rows;
    }

    fn after_render(&mut self) {
        self.editor.after_render();
        if self.editor.is_focused() && self.focus != Pane::Editor {
            self.focus = Pane::Editor;
            self.sidebar.set_focused(false);
            self.cases.set_focused(false);
        }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for AppComponent {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        let dialog_open = self.dialog_open();
        self.apply_focus(dialog_open);
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
