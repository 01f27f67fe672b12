mod support;

use std::cell::RefCell;
use std::rc::Rc;

use casebook::{
    Component, ComponentRc, Focusable, InputEvent, Selection, SuggestionCatalog, SuggestionEditor,
    SuggestionSet, TUI,
};
use support::{clear_output, inject_input, lock_unpoisoned, rendered_output, SharedTerminal};

/// Root that forwards to an editor the test keeps a handle on.
struct EditorRoot(Rc<RefCell<SuggestionEditor>>);

impl Component for EditorRoot {
    fn render(&mut self, width: usize) -> Vec<String> {
        self.0.borrow_mut().render(width)
    }

    fn handle_event(&mut self, event: &InputEvent) {
        self.0.borrow_mut().handle_event(event);
    }

    fn after_render(&mut self) {
        self.0.borrow_mut().after_render();
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for EditorRoot {
    fn set_focused(&mut self, focused: bool) {
        self.0.borrow_mut().set_focused(focused);
    }

    fn is_focused(&self) -> bool {
        self.0.borrow().is_focused()
    }
}

fn editor(text: &str) -> Rc<RefCell<SuggestionEditor>> {
    let catalog = SuggestionCatalog::new(
        SuggestionSet::new(["click", "type"]),
        SuggestionSet::new(["loginButton"]),
    );
    let mut editor = SuggestionEditor::new(catalog, text);
    editor.mount();
    Rc::new(RefCell::new(editor))
}

fn runtime(
    editor: &Rc<RefCell<SuggestionEditor>>,
) -> (TUI<SharedTerminal>, std::sync::Arc<std::sync::Mutex<support::TerminalTrace>>) {
    let (terminal, trace) = SharedTerminal::new(60, 6);
    let root: ComponentRc = Rc::new(RefCell::new(Box::new(EditorRoot(Rc::clone(editor)))));
    let tui = TUI::new(terminal, root);
    editor
        .borrow_mut()
        .set_render_handle(Some(tui.render_handle()));
    (tui, trace)
}

#[test]
fn focused_editor_positions_hardware_cursor_at_caret() {
    let editor = editor("go ");
    editor.borrow_mut().set_selection(Selection::caret(3));
    let (mut tui, trace) = runtime(&editor);

    tui.start().expect("start");
    tui.run_blocking_once();

    // Gutter " 1 " is three columns wide.
    let output = rendered_output(&trace);
    assert!(output.contains("\x1b[1;7H"), "cursor not placed: {output:?}");
    assert!(!output.contains(casebook::CURSOR_MARKER));
    tui.stop().expect("stop");
}

#[test]
fn hotkey_then_enter_inserts_and_restores_after_next_frame() {
    let editor = editor("go ");
    editor.borrow_mut().set_selection(Selection::caret(3));
    let (mut tui, trace) = runtime(&editor);
    tui.start().expect("start");
    tui.run_blocking_once();

    inject_input(&trace, "\x0b");
    tui.run_blocking_once();
    assert!(rendered_output(&trace).contains("Keywords (↑↓ to navigate, Enter to select)"));

    clear_output(&trace);
    inject_input(&trace, "\r");
    tui.run_blocking_once();
    {
        let editor = editor.borrow();
        assert_eq!(editor.text(), "go click");
        assert_eq!(editor.selection(), Selection::caret(8));
        assert!(!editor.has_pending_restore());
        assert!(editor.is_focused());
    }
    assert!(rendered_output(&trace).contains("click"));

    // The restore asked for one more frame.
    tui.run_blocking_once();
    tui.stop().expect("stop");
    let trace = lock_unpoisoned(&trace);
    assert_eq!(trace.start_calls, 1);
    assert_eq!(trace.stop_calls, 1);
}

#[test]
fn stop_restores_terminal_modes() {
    let editor = editor("");
    let (mut tui, trace) = runtime(&editor);
    tui.start().expect("start");
    tui.run_blocking_once();
    clear_output(&trace);

    tui.stop().expect("stop");
    assert!(rendered_output(&trace).ends_with("\x1b[?25h\x1b[?1049l"));
    assert!(!tui.is_running());
}
