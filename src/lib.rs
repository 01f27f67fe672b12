//! Terminal toolkit behind the casebook test-case manager.
//!
//! Invariant: single output gate. Only `core::output::OutputGate::flush(..)` writes to the
//! terminal.
//!
//! # Public API Overview
//! - Compose widgets under a root [`Component`] and drive it with [`TUI`].
//! - Parse/inspect input with key and event helpers.
//! - Edit scripts with [`SuggestionEditor`], which inserts keyword/object candidates at the
//!   last known cursor position.
//! - Use text and width helpers for ANSI-safe formatting.
//!
//! # Runtime Alias
//! [`TUI`] is a type alias for `runtime::tui::TuiRuntime<T>`.

#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod platform;
pub mod render;
pub mod runtime;
pub mod widgets;

pub use crate::config::EnvConfig;
pub use crate::error::{CasebookError, Result};
pub use crate::logging::init_logging;

/// Built-in UI components.
pub use crate::widgets::{
    CheckItem, CheckList, CheckListTheme, Input, Notification, SuggestionEditor, SuggestionList,
    SuggestionListTheme,
};

/// Suggestion overlay state machine and text buffer.
pub use crate::core::suggestion::{
    OverlayKey, OverlayOutcome, OverlayState, Selection, SuggestionCatalog, SuggestionKind,
    SuggestionOverlay, SuggestionSet, TextBuffer, Transition,
};

/// Keybinding configuration and default mappings.
pub use crate::core::keybindings::{
    EditorAction, EditorKeybindingsConfig, EditorKeybindingsManager, KeyBinding, KeyId,
    DEFAULT_EDITOR_KEYBINDINGS,
};

/// Keyboard input parsing and matching helpers.
pub use crate::core::input::{key_id_matches, matches_key, normalize_key_id, parse_key};
pub use crate::core::input_event::{parse_input_events, InputEvent, MouseButton};

/// Input buffering for chunked terminal streams.
pub use crate::platform::stdin_buffer::StdinBuffer;

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::Terminal;
pub use crate::platform::process_terminal::ProcessTerminal;

/// Runtime component traits and cursor marker helper.
pub use crate::core::component::{Component, Focusable};
pub use crate::core::cursor::{CursorPos, CURSOR_MARKER};
/// Render-layer frame type.
pub use crate::render::Frame;
/// Runtime handles.
pub use crate::runtime::{ComponentRc, RenderHandle};

/// Alias for the main runtime type.
pub type TUI<T> = crate::runtime::tui::TuiRuntime<T>;

/// Returns whether a component exposes focus behavior via [`Focusable`].
pub fn is_focusable(component: &mut dyn Component) -> bool {
    component.as_focusable().is_some()
}

/// ANSI-aware truncation helpers.
pub use crate::core::text::utils::{fit_to_width, truncate_to_width};
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
