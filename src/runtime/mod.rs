//! Runtime loop and render scheduling.

pub mod tui;

pub use tui::{ComponentRc, RenderHandle, TuiRuntime};
