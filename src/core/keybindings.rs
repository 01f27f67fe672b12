//! Editor keybindings.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::core::input::key_id_matches;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    CursorWordLeft,
    CursorWordRight,
    CursorLineStart,
    CursorLineEnd,
    CursorDocStart,
    CursorDocEnd,
    ExtendLeft,
    ExtendRight,
    ExtendUp,
    ExtendDown,
    ExtendLineStart,
    ExtendLineEnd,
    DeleteCharBackward,
    DeleteCharForward,
    DeleteWordBackward,
    DeleteToLineStart,
    NewLine,
    OpenKeywords,
    OpenObjects,
    OverlayUp,
    OverlayDown,
    OverlayConfirm,
    OverlayCancel,
}

pub type KeyId = String;

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(str::to_string).collect())
    }
}

/// User overrides applied on top of [`DEFAULT_EDITOR_KEYBINDINGS`].
#[derive(Debug, Clone, Default)]
pub struct EditorKeybindingsConfig {
    entries: HashMap<EditorAction, KeyBinding>,
}

impl EditorKeybindingsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: Into<KeyBinding>>(&mut self, action: EditorAction, keys: K) {
        self.entries.insert(action, keys.into());
    }
}

pub static DEFAULT_EDITOR_KEYBINDINGS: LazyLock<HashMap<EditorAction, Vec<KeyId>>> =
    LazyLock::new(|| {
        use EditorAction::*;

        let keys = |ids: &[&str]| ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
        let mut map = HashMap::new();
        map.insert(CursorUp, keys(&["up"]));
        map.insert(CursorDown, keys(&["down"]));
        map.insert(CursorLeft, keys(&["left", "ctrl+b"]));
        map.insert(CursorRight, keys(&["right", "ctrl+f"]));
        map.insert(CursorWordLeft, keys(&["alt+left", "ctrl+left", "alt+b"]));
        map.insert(CursorWordRight, keys(&["alt+right", "ctrl+right", "alt+f"]));
        map.insert(CursorLineStart, keys(&["home", "ctrl+a"]));
        map.insert(CursorLineEnd, keys(&["end", "ctrl+e"]));
        map.insert(CursorDocStart, keys(&["ctrl+home"]));
        map.insert(CursorDocEnd, keys(&["ctrl+end"]));
        map.insert(ExtendLeft, keys(&["shift+left"]));
        map.insert(ExtendRight, keys(&["shift+right"]));
        map.insert(ExtendUp, keys(&["shift+up"]));
        map.insert(ExtendDown, keys(&["shift+down"]));
        map.insert(ExtendLineStart, keys(&["shift+home"]));
        map.insert(ExtendLineEnd, keys(&["shift+end"]));
        map.insert(DeleteCharBackward, keys(&["backspace"]));
        map.insert(DeleteCharForward, keys(&["delete", "ctrl+d"]));
        map.insert(DeleteWordBackward, keys(&["ctrl+w", "alt+backspace"]));
        map.insert(DeleteToLineStart, keys(&["ctrl+u"]));
        map.insert(NewLine, keys(&["enter"]));
        map.insert(OpenKeywords, keys(&["ctrl+k"]));
        map.insert(OpenObjects, keys(&["ctrl+o"]));
        map.insert(OverlayUp, keys(&["up"]));
        map.insert(OverlayDown, keys(&["down"]));
        map.insert(OverlayConfirm, keys(&["enter"]));
        map.insert(OverlayCancel, keys(&["escape"]));
        map
    });

#[derive(Debug, Clone)]
pub struct EditorKeybindingsManager {
    action_to_keys: HashMap<EditorAction, Vec<KeyId>>,
}

impl Default for EditorKeybindingsManager {
    fn default() -> Self {
        Self::new(EditorKeybindingsConfig::default())
    }
}

impl EditorKeybindingsManager {
    pub fn new(config: EditorKeybindingsConfig) -> Self {
        let mut manager = Self {
            action_to_keys: HashMap::new(),
        };
        manager.build_maps(&config);
        manager
    }

    fn build_maps(&mut self, config: &EditorKeybindingsConfig) {
        self.action_to_keys = DEFAULT_EDITOR_KEYBINDINGS.clone();
        for (action, binding) in &config.entries {
            let key_list = match binding {
                KeyBinding::Single(key) => vec![key.clone()],
                KeyBinding::Multiple(keys) => keys.clone(),
            };
            self.action_to_keys.insert(*action, key_list);
        }
    }

    /// Whether the parsed `key_id` of an input event triggers `action`.
    pub fn matches(&self, key_id: &str, action: EditorAction) -> bool {
        self.action_to_keys
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|key| key_id_matches(key_id, key)))
    }

    pub fn get_keys(&self, action: EditorAction) -> Vec<KeyId> {
        self.action_to_keys.get(&action).cloned().unwrap_or_default()
    }

    pub fn set_config(&mut self, config: EditorKeybindingsConfig) {
        self.build_maps(&config);
    }
}
