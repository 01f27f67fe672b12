//! Terminal trait.

/// Minimal terminal interface used by the runtime.
pub trait Terminal {
    /// Start the terminal with input and resize handlers.
    ///
    /// `on_input` receives decoded input chunks (one key sequence, text run, or
    /// bracketed paste per call); `on_resize` fires when the window size changes.
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()>;

    /// Stop the terminal and restore its previous mode.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Drain stdin before exiting so buffered keys do not leak into the shell.
    fn drain_input(&mut self, max_ms: u64, idle_ms: u64);

    /// Write output to the terminal.
    fn write(&mut self, data: &str);

    /// Terminal dimensions.
    fn columns(&self) -> u16;
    fn rows(&self) -> u16;
}
