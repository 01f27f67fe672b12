#![allow(unused_imports)]

use casebook::{
    fit_to_width, init_logging, is_focusable, key_id_matches, matches_key, normalize_key_id,
    parse_input_events, parse_key, truncate_to_width, visible_width, CasebookError, CheckItem,
    CheckList, CheckListTheme, Component, ComponentRc, CursorPos, EditorAction,
    EditorKeybindingsConfig, EditorKeybindingsManager, EnvConfig, Focusable, Frame, Input,
    InputEvent, KeyBinding, KeyId, MouseButton, Notification, OverlayKey, OverlayOutcome,
    OverlayState, ProcessTerminal, RenderHandle, Result, Selection, StdinBuffer,
    SuggestionCatalog, SuggestionEditor, SuggestionKind, SuggestionList, SuggestionListTheme,
    SuggestionOverlay, SuggestionSet, Terminal, TextBuffer, Transition, TUI,
    CURSOR_MARKER, DEFAULT_EDITOR_KEYBINDINGS,
};

#[test]
fn public_api_exports_compile() {}
