//! Component and Focusable traits.

use crate::core::cursor::CursorPos;
use crate::core::input_event::InputEvent;

/// Renderable component interface.
pub trait Component {
    /// Render to a list of lines at the given width.
    fn render(&mut self, width: usize) -> Vec<String>;

    /// Handle input events.
    fn handle_event(&mut self, _event: &InputEvent) {}

    /// Optional cursor position metadata for this component's last render.
    ///
    /// The position is relative to the lines returned from `render()`. When this
    /// returns `None` the runtime falls back to the cursor marker, if any.
    fn cursor_pos(&self) -> Option<CursorPos> {
        None
    }

    /// Provide the current terminal row count.
    fn set_terminal_rows(&mut self, _rows: usize) {}

    /// Work deferred until the frame produced by `render()` has been written.
    ///
    /// Called once per render pass. State changes made here are picked up by
    /// the next frame; implementations that change visible state should request
    /// a render themselves.
    fn after_render(&mut self) {}

    /// Optional focusable behavior.
    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }
}

/// Focusable behavior for components that track focus.
pub trait Focusable {
    fn set_focused(&mut self, focused: bool);
    fn is_focused(&self) -> bool;
}
