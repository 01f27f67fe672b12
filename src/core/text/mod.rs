//! Text helpers (ANSI-aware width calculation, truncation, padding).
//!
//! Pure string in/string out helpers shared by widgets and the renderer.

pub mod utils;
pub mod width;
