use casebook::{
    parse_input_events, Component, EditorAction, EditorKeybindingsConfig,
    EditorKeybindingsManager, Focusable, OverlayKey, OverlayOutcome, OverlayState, Selection,
    SuggestionCatalog, SuggestionEditor, SuggestionKind, SuggestionOverlay, SuggestionSet,
};
use pretty_assertions::assert_eq;

const CTRL_K: &str = "\x0b";
const CTRL_O: &str = "\x0f";
const UP: &str = "\x1b[A";
const DOWN: &str = "\x1b[B";
const ENTER: &str = "\r";
const ESCAPE: &str = "\x1b";

fn catalog() -> SuggestionCatalog {
    SuggestionCatalog::new(
        SuggestionSet::new(["click", "type", "verify", "wait"]),
        SuggestionSet::new(["loginButton", "usernameField", "passwordField"]),
    )
}

fn mounted(text: &str) -> SuggestionEditor {
    let mut editor = SuggestionEditor::new(catalog(), text);
    editor.mount();
    editor
}

fn send(editor: &mut SuggestionEditor, data: &str) {
    for event in parse_input_events(data) {
        editor.handle_event(&event);
    }
}

fn open(kind: SuggestionKind, highlighted: usize) -> OverlayState {
    OverlayState::Open { kind, highlighted }
}

#[test]
fn keyword_hotkey_replaces_open_object_overlay_for_any_highlight() {
    for presses in 0..3 {
        let mut editor = mounted("");
        send(&mut editor, CTRL_O);
        for _ in 0..presses {
            send(&mut editor, DOWN);
        }
        assert_eq!(editor.overlay_state(), open(SuggestionKind::Object, presses));

        send(&mut editor, CTRL_K);
        assert_eq!(editor.overlay_state(), open(SuggestionKind::Keyword, 0));
    }
}

#[test]
fn full_cycle_of_down_or_up_returns_to_start() {
    let overlay = SuggestionOverlay::new(catalog());
    let len = overlay.catalog().keywords.len();
    for start in 0..len {
        for key in [OverlayKey::Down, OverlayKey::Up] {
            let mut state = open(SuggestionKind::Keyword, start);
            for _ in 0..len {
                state = overlay.handle_key(state, key).state;
            }
            assert_eq!(state, open(SuggestionKind::Keyword, start));
        }
    }

    let mut editor = mounted("");
    send(&mut editor, CTRL_O);
    send(&mut editor, &UP.repeat(3));
    assert_eq!(editor.overlay_state(), open(SuggestionKind::Object, 0));
}

#[test]
fn insertion_replaces_selected_range() {
    let mut editor = mounted("abc");
    editor.set_selection(Selection::new(1, 2));
    editor.insert_at_cursor("XYZ");
    assert_eq!(editor.text(), "aXYZc");
    assert_eq!(editor.last_selection(), Selection::caret(4));

    editor.render(40);
    editor.after_render();
    assert_eq!(editor.selection(), Selection::caret(4));
}

#[test]
fn insertion_at_caret_keeps_surrounding_text() {
    let mut editor = mounted("hello world");
    editor.set_selection(Selection::caret(5));
    editor.insert_at_cursor("!");
    assert_eq!(editor.text(), "hello! world");
    assert_eq!(editor.last_selection(), Selection::caret(6));

    editor.render(40);
    editor.after_render();
    assert_eq!(editor.selection(), Selection::caret(6));
    assert!(editor.is_focused());
}

#[test]
fn escape_closes_overlay_without_touching_buffer() {
    let text = "# Steps\nclick loginButton\n";
    let mut editor = mounted(text);
    editor.set_selection(Selection::new(2, 7));
    send(&mut editor, CTRL_K);
    send(&mut editor, DOWN);
    send(&mut editor, ESCAPE);

    assert_eq!(editor.overlay_state(), OverlayState::Closed);
    assert_eq!(editor.text().as_bytes(), text.as_bytes());
    assert_eq!(editor.selection(), Selection::new(2, 7));
}

#[test]
fn enter_on_empty_set_is_a_no_op() {
    let empty = SuggestionCatalog::new(SuggestionSet::new(Vec::<String>::new()), catalog().objects);
    let mut editor = SuggestionEditor::new(empty, "abc");
    editor.mount();
    editor.set_selection(Selection::caret(3));

    send(&mut editor, CTRL_K);
    send(&mut editor, ENTER);
    send(&mut editor, DOWN);

    assert_eq!(editor.overlay_state(), open(SuggestionKind::Keyword, 0));
    assert_eq!(editor.text(), "abc");
    assert!(!editor.has_pending_restore());

    let overlay = SuggestionOverlay::new(SuggestionCatalog::default());
    let transition = overlay.handle_key(open(SuggestionKind::Object, 0), OverlayKey::Confirm);
    assert_eq!(transition.state, open(SuggestionKind::Object, 0));
    assert_eq!(transition.outcome, OverlayOutcome::Consumed);
}

#[test]
fn typing_while_open_edits_buffer_under_visible_overlay() {
    let mut editor = mounted("");
    send(&mut editor, CTRL_K);
    send(&mut editor, "ab");
    assert_eq!(editor.text(), "ab");
    assert_eq!(editor.overlay_state(), open(SuggestionKind::Keyword, 0));

    send(&mut editor, ENTER);
    assert_eq!(editor.text(), "abclick");
    assert_eq!(editor.overlay_state(), OverlayState::Closed);
}

#[test]
fn restore_is_skipped_after_unmount() {
    let mut editor = mounted("abc");
    editor.set_selection(Selection::caret(1));
    send(&mut editor, CTRL_K);
    send(&mut editor, ENTER);
    assert!(editor.has_pending_restore());

    editor.unmount();
    editor.render(40);
    editor.after_render();
    assert!(!editor.is_focused());
    assert!(!editor.has_pending_restore());

    send(&mut editor, CTRL_K);
    assert_eq!(editor.overlay_state(), OverlayState::Closed);
}

#[test]
fn mouse_click_on_overlay_row_inserts_candidate() {
    let mut editor = mounted("a\nb\nc\nd\ne");
    editor.set_selection(Selection::caret(1));
    send(&mut editor, CTRL_O);
    editor.render(80);

    // Row 0 is the title; row 3 holds the third object.
    send(&mut editor, "\x1b[<0;8;4M");
    assert_eq!(editor.text(), "apasswordField\nb\nc\nd\ne");
    assert_eq!(editor.overlay_state(), OverlayState::Closed);

    editor.after_render();
    assert_eq!(editor.selection(), Selection::caret(14));
}

#[test]
fn custom_hotkeys_open_overlay() {
    let mut config = EditorKeybindingsConfig::new();
    config.set(EditorAction::OpenKeywords, "alt+k");
    let mut editor = mounted("");
    editor.set_keybindings(EditorKeybindingsManager::new(config));

    send(&mut editor, CTRL_K);
    assert_eq!(editor.overlay_state(), OverlayState::Closed);
    send(&mut editor, "\x1bk");
    assert_eq!(editor.overlay_state(), open(SuggestionKind::Keyword, 0));
}
