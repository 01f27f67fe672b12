//! Core interfaces and types.

pub mod component;
pub mod cursor;
pub mod input;
pub mod input_event;
pub mod keybindings;
pub mod output;
pub mod suggestion;
pub mod terminal;
pub mod text;
