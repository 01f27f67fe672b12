//! Terminal test-case manager.
//!
//! Three panes share the screen: the test set sidebar, the case list of the
//! selected set, and a script editor whose `Ctrl+K` / `Ctrl+O` overlays insert
//! step keywords and page objects at the caret.
//!
//! ## Environment
//!
//! - `CASEBOOK_LOG` / `CASEBOOK_LOG_JSON`: log file and JSON switch
//! - `CASEBOOK_WRITE_LOG`: mirror of every terminal write
//! - `CASEBOOK_NOTIFY_MS`: notification lifetime (default 3000)
//! - `CASEBOOK_MOUSE=0`: disable mouse reporting
//!
//! Catalog state lives in memory for the lifetime of the process.

pub mod app;
pub mod model;
pub mod runtime;
pub mod tui;
