//! Platform-specific terminal integrations.

#[cfg(unix)]
pub mod hooks;
pub mod process_terminal;
pub mod stdin_buffer;

#[cfg(unix)]
pub use hooks::{install_panic_hook, install_signal_handlers, PanicHookGuard, SignalHookGuard};
pub use process_terminal::ProcessTerminal;
