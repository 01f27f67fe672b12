//! Full-screen runtime: terminal lifecycle, input dispatch and rendering.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Instant;

use crate::core::component::Component;
use crate::core::cursor::{extract_cursor_marker, strip_cursor_markers};
use crate::core::input_event::{parse_input_events, InputEvent};
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::terminal::Terminal;
use crate::error::{CasebookError, Result};
use crate::render::renderer::DiffRenderer;
use crate::render::Frame;

const STOP_DRAIN_MAX_MS: u64 = 1000;
const STOP_DRAIN_IDLE_MS: u64 = 50;

pub type ComponentRc = Rc<RefCell<Box<dyn Component>>>;

#[derive(Default)]
struct RuntimeWakeState {
    pending_inputs: Vec<String>,
    pending_resize: bool,
    render_requested: bool,
    render_deadline: Option<Instant>,
    stop_requested: bool,
}

impl RuntimeWakeState {
    fn has_work(&self) -> bool {
        self.stop_requested
            || self.pending_resize
            || self.render_requested
            || !self.pending_inputs.is_empty()
    }
}

/// Cross-thread wake state shared with the terminal callbacks and render handles.
#[derive(Default)]
struct RuntimeWake {
    state: Mutex<RuntimeWakeState>,
    cvar: Condvar,
}

impl RuntimeWake {
    fn lock(&self) -> MutexGuard<'_, RuntimeWakeState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Block until there is work or a render deadline passes.
    ///
    /// Returns `false` once a stop was requested.
    fn wait_for_event(&self) -> bool {
        let mut state = self.lock();
        loop {
            if state.has_work() {
                break;
            }
            match state.render_deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.render_deadline = None;
                        state.render_requested = true;
                        break;
                    }
                    state = match self.cvar.wait_timeout(state, deadline - now) {
                        Ok((state, _)) => state,
                        Err(poisoned) => poisoned.into_inner().0,
                    };
                }
                None => {
                    state = self
                        .cvar
                        .wait(state)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                }
            }
        }
        !state.stop_requested
    }

    fn enqueue_input(&self, data: String) {
        let mut state = self.lock();
        state.pending_inputs.push(data);
        self.cvar.notify_one();
    }

    fn signal_resize(&self) {
        let mut state = self.lock();
        state.pending_resize = true;
        self.cvar.notify_one();
    }

    fn request_render(&self) {
        let mut state = self.lock();
        state.render_requested = true;
        self.cvar.notify_one();
    }

    fn request_render_at(&self, deadline: Instant) {
        let mut state = self.lock();
        state.render_deadline = Some(match state.render_deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self.cvar.notify_one();
    }

    fn request_stop(&self) {
        let mut state = self.lock();
        state.stop_requested = true;
        self.cvar.notify_all();
    }

    fn stop_requested(&self) -> bool {
        self.lock().stop_requested
    }

    fn take_pending_resize(&self) -> bool {
        std::mem::take(&mut self.lock().pending_resize)
    }

    fn drain_inputs(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().pending_inputs)
    }

    fn take_render_requested(&self) -> bool {
        let mut state = self.lock();
        if let Some(deadline) = state.render_deadline {
            if Instant::now() >= deadline {
                state.render_deadline = None;
                state.render_requested = true;
            }
        }
        std::mem::take(&mut state.render_requested)
    }

    fn reset_for_start(&self) {
        *self.lock() = RuntimeWakeState::default();
    }
}

/// Cloneable, thread-safe handle for scheduling renders and stopping the loop.
#[derive(Clone)]
pub struct RenderHandle {
    wake: Arc<RuntimeWake>,
}

impl RenderHandle {
    pub fn request_render(&self) {
        self.wake.request_render();
    }

    /// Wake the runtime no later than `deadline` and render.
    ///
    /// Several pending deadlines collapse into the earliest one; each render
    /// pass lets components reschedule.
    pub fn request_render_at(&self, deadline: Instant) {
        self.wake.request_render_at(deadline);
    }

    pub fn request_stop(&self) {
        self.wake.request_stop();
    }

    pub fn stop_requested(&self) -> bool {
        self.wake.stop_requested()
    }
}

pub struct TuiRuntime<T: Terminal> {
    terminal: T,
    output: OutputGate,
    root: ComponentRc,
    renderer: DiffRenderer,
    mouse: bool,
    stopped: bool,
    wake: Arc<RuntimeWake>,
    #[cfg(all(unix, not(test)))]
    signal_hook_guard: Option<crate::platform::SignalHookGuard>,
    #[cfg(all(unix, not(test)))]
    panic_hook_guard: Option<crate::platform::PanicHookGuard>,
}

impl<T: Terminal> TuiRuntime<T> {
    pub fn new(terminal: T, root: ComponentRc) -> Self {
        Self::with_root(terminal, |_| root)
    }

    /// Build the root with access to the runtime's render handle.
    ///
    /// Roots that schedule their own frames (timers, deferred restores) need
    /// the handle before the runtime exists.
    pub fn with_root(terminal: T, build_root: impl FnOnce(RenderHandle) -> ComponentRc) -> Self {
        let wake = Arc::new(RuntimeWake::default());
        let root = build_root(RenderHandle {
            wake: Arc::clone(&wake),
        });
        Self {
            terminal,
            output: OutputGate::new(),
            root,
            renderer: DiffRenderer::new(),
            mouse: true,
            stopped: true,
            wake,
            #[cfg(all(unix, not(test)))]
            signal_hook_guard: None,
            #[cfg(all(unix, not(test)))]
            panic_hook_guard: None,
        }
    }

    /// Toggle SGR mouse reporting. Takes effect on the next `start()`.
    pub fn set_mouse_enabled(&mut self, enabled: bool) {
        self.mouse = enabled;
    }

    pub fn render_handle(&self) -> RenderHandle {
        RenderHandle {
            wake: Arc::clone(&self.wake),
        }
    }

    pub fn root(&self) -> ComponentRc {
        Rc::clone(&self.root)
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn is_running(&self) -> bool {
        !self.stopped && !self.wake.stop_requested()
    }

    pub fn start(&mut self) -> Result<()> {
        self.output.clear();
        self.wake.reset_for_start();
        self.renderer.reset();
        self.stopped = false;

        #[cfg(all(unix, not(test)))]
        self.install_cleanup_hooks();

        let wake_input = Arc::clone(&self.wake);
        let wake_resize = Arc::clone(&self.wake);
        if let Err(err) = self.terminal.start(
            Box::new(move |data| wake_input.enqueue_input(data)),
            Box::new(move || wake_resize.signal_resize()),
        ) {
            self.stopped = true;
            #[cfg(all(unix, not(test)))]
            self.uninstall_cleanup_hooks();
            return Err(CasebookError::io("starting the terminal", err));
        }

        self.output.push(TerminalCmd::AltScreenEnter);
        self.output.push(TerminalCmd::HideCursor);
        self.output.push(TerminalCmd::BracketedPasteEnable);
        if self.mouse {
            self.output.push(TerminalCmd::MouseEnable);
        }
        self.output.flush(&mut self.terminal);

        if let Some(focusable) = self.root.borrow_mut().as_focusable() {
            focusable.set_focused(true);
        }
        self.wake.request_render();
        tracing::info!(
            columns = self.terminal.columns(),
            rows = self.terminal.rows(),
            mouse = self.mouse,
            "runtime started"
        );
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.wake.request_stop();
        if self.mouse {
            self.output.push(TerminalCmd::MouseDisable);
        }
        self.output.push(TerminalCmd::BracketedPasteDisable);
        self.output.push(TerminalCmd::ShowCursor);
        self.output.push(TerminalCmd::AltScreenLeave);
        self.output.flush(&mut self.terminal);
        self.terminal
            .drain_input(STOP_DRAIN_MAX_MS, STOP_DRAIN_IDLE_MS);
        let result = self.terminal.stop();
        self.stopped = true;
        #[cfg(all(unix, not(test)))]
        self.uninstall_cleanup_hooks();
        tracing::info!("runtime stopped");
        result.map_err(|err| CasebookError::io("restoring the terminal", err))
    }

    #[cfg(all(unix, not(test)))]
    fn install_cleanup_hooks(&mut self) {
        let mouse = self.mouse;
        let cleanup = move || {
            let mut terminal = crate::platform::process_terminal::HookTerminal::new();
            restore_screen(&mut terminal, mouse);
        };
        match crate::platform::install_signal_handlers(cleanup.clone()) {
            Ok(guard) => self.signal_hook_guard = Some(guard),
            Err(err) => tracing::warn!(error = %err, "signal cleanup hook unavailable"),
        }
        self.panic_hook_guard = Some(crate::platform::install_panic_hook(cleanup));
    }

    #[cfg(all(unix, not(test)))]
    fn uninstall_cleanup_hooks(&mut self) {
        self.signal_hook_guard = None;
        self.panic_hook_guard = None;
    }

    /// Block until input, a resize, a render request or a render deadline is
    /// available, then process it once.
    ///
    /// Callers loop on this while [`TuiRuntime::is_running`] holds.
    pub fn run_blocking_once(&mut self) {
        if self.stopped {
            return;
        }
        if !self.wake.wait_for_event() {
            return;
        }
        self.run_once();
    }

    /// Process all queued work without blocking.
    pub fn run_once(&mut self) {
        if self.stopped {
            return;
        }

        if self.wake.take_pending_resize() {
            let event = InputEvent::Resize {
                columns: self.terminal.columns(),
                rows: self.terminal.rows(),
            };
            self.root.borrow_mut().handle_event(&event);
            self.renderer.request_full_redraw_next();
            self.wake.request_render();
        }

        for data in self.wake.drain_inputs() {
            self.handle_input(&data);
        }

        if self.wake.take_render_requested() {
            self.render_now();
        }
    }

    /// Decode raw input and dispatch it to the root component.
    pub fn handle_input(&mut self, data: &str) {
        let events = parse_input_events(data);
        if events.is_empty() {
            return;
        }
        {
            let mut root = self.root.borrow_mut();
            for event in &events {
                tracing::trace!(?event, "dispatch");
                root.handle_event(event);
            }
        }
        self.wake.request_render();
    }

    /// Render a frame, flush it, then run deferred after-render work.
    pub fn render_now(&mut self) {
        let width = self.terminal.columns() as usize;
        let height = self.terminal.rows() as usize;

        let (mut lines, cursor) = {
            let mut root = self.root.borrow_mut();
            root.set_terminal_rows(height);
            let lines = root.render(width);
            (lines, root.cursor_pos())
        };
        let marker = extract_cursor_marker(&mut lines, height);
        strip_cursor_markers(&mut lines);
        let cursor = cursor.or(marker);

        let cmds = self
            .renderer
            .render(Frame::new(lines).with_cursor(cursor), width, height);
        self.output.extend(cmds);
        self.output.flush(&mut self.terminal);

        self.root.borrow_mut().after_render();
    }
}

impl<T: Terminal> Drop for TuiRuntime<T> {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = self.stop();
        }));
    }
}

/// Best-effort screen restore for crash paths. Safe to emit more than once.
#[cfg(all(unix, not(test)))]
fn restore_screen<T: Terminal>(terminal: &mut T, mouse: bool) {
    let mut output = OutputGate::new();
    if mouse {
        output.push(TerminalCmd::MouseDisable);
    }
    output.push(TerminalCmd::BracketedPasteDisable);
    output.push(TerminalCmd::ShowCursor);
    output.push(TerminalCmd::AltScreenLeave);
    output.flush(terminal);
}

#[cfg(test)]
mod tests {
    use super::{ComponentRc, TuiRuntime};
    use crate::core::component::{Component, Focusable};
    use crate::core::cursor::CURSOR_MARKER;
    use crate::core::input_event::InputEvent;
    use crate::core::terminal::Terminal;
    use crate::error::CasebookError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    type InputHandler = Box<dyn FnMut(String) + Send>;

    #[derive(Default)]
    struct Trace {
        output: String,
        stops: usize,
        fail_start: bool,
        on_input: Option<InputHandler>,
    }

    struct TestTerminal {
        trace: Arc<Mutex<Trace>>,
    }

    impl Terminal for TestTerminal {
        fn start(
            &mut self,
            on_input: Box<dyn FnMut(String) + Send>,
            _on_resize: Box<dyn FnMut() + Send>,
        ) -> std::io::Result<()> {
            let mut trace = self.trace.lock().unwrap();
            if trace.fail_start {
                return Err(std::io::Error::other("not a tty"));
            }
            trace.on_input = Some(on_input);
            Ok(())
        }
        fn stop(&mut self) -> std::io::Result<()> {
            self.trace.lock().unwrap().stops += 1;
            Ok(())
        }
        fn drain_input(&mut self, _max_ms: u64, _idle_ms: u64) {}
        fn write(&mut self, data: &str) {
            self.trace.lock().unwrap().output.push_str(data);
        }
        fn columns(&self) -> u16 {
            20
        }
        fn rows(&self) -> u16 {
            4
        }
    }

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
        focused: bool,
    }

    struct Recorder {
        log: Rc<RefCell<Log>>,
    }

    impl Component for Recorder {
        fn render(&mut self, _width: usize) -> Vec<String> {
            self.log.borrow_mut().calls.push("render".to_string());
            vec![format!("ab{CURSOR_MARKER}c")]
        }

        fn handle_event(&mut self, event: &InputEvent) {
            let entry = match event {
                InputEvent::Key { key_id, .. } => format!("key:{key_id}"),
                InputEvent::Text { text, .. } => format!("text:{text}"),
                InputEvent::Mouse { column, row, .. } => format!("mouse:{column},{row}"),
                other => format!("{other:?}"),
            };
            self.log.borrow_mut().calls.push(entry);
        }

        fn after_render(&mut self) {
            self.log.borrow_mut().calls.push("after_render".to_string());
        }

        fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
            Some(self)
        }
    }

    impl Focusable for Recorder {
        fn set_focused(&mut self, focused: bool) {
            self.log.borrow_mut().focused = focused;
        }
        fn is_focused(&self) -> bool {
            self.log.borrow().focused
        }
    }

    fn runtime() -> (TuiRuntime<TestTerminal>, Arc<Mutex<Trace>>, Rc<RefCell<Log>>) {
        let trace = Arc::new(Mutex::new(Trace::default()));
        let log = Rc::new(RefCell::new(Log::default()));
        let root: ComponentRc = Rc::new(RefCell::new(Box::new(Recorder {
            log: Rc::clone(&log),
        })));
        let terminal = TestTerminal {
            trace: Arc::clone(&trace),
        };
        (TuiRuntime::new(terminal, root), trace, log)
    }

    fn inject(trace: &Arc<Mutex<Trace>>, data: &str) {
        let mut trace = trace.lock().unwrap();
        let handler = trace.on_input.as_mut().expect("input handler registered");
        handler(data.to_string());
    }

    #[test]
    fn start_enters_alt_screen_and_focuses_root() {
        let (mut tui, trace, log) = runtime();
        tui.start().expect("start");
        let output = trace.lock().unwrap().output.clone();
        assert!(output.starts_with("\x1b[?1049h\x1b[?25l\x1b[?2004h\x1b[?1000h\x1b[?1006h"));
        assert!(log.borrow().focused);
        tui.stop().expect("stop");
    }

    #[test]
    fn mouse_reporting_can_be_disabled() {
        let (mut tui, trace, _log) = runtime();
        tui.set_mouse_enabled(false);
        tui.start().expect("start");
        tui.stop().expect("stop");
        let output = trace.lock().unwrap().output.clone();
        assert!(!output.contains("\x1b[?1000h"));
        assert!(!output.contains("\x1b[?1000l"));
    }

    #[test]
    fn input_is_dispatched_then_rendered_then_after_render_runs() {
        let (mut tui, trace, log) = runtime();
        tui.start().expect("start");
        tui.run_blocking_once();
        log.borrow_mut().calls.clear();

        inject(&trace, "x\x0b\x1b[<0;3;2M");
        tui.run_blocking_once();
        assert_eq!(
            log.borrow().calls,
            vec![
                "text:x".to_string(),
                "key:ctrl+k".to_string(),
                "mouse:2,1".to_string(),
                "render".to_string(),
                "after_render".to_string(),
            ]
        );
        tui.stop().expect("stop");
    }

    #[test]
    fn cursor_marker_is_stripped_and_positions_cursor() {
        let (mut tui, trace, _log) = runtime();
        tui.start().expect("start");
        tui.run_blocking_once();
        let output = trace.lock().unwrap().output.clone();
        assert!(!output.contains(CURSOR_MARKER));
        assert!(output.contains("abc"));
        assert!(output.ends_with("\x1b[1;3H\x1b[?25h"));
        tui.stop().expect("stop");
    }

    #[test]
    fn render_deadline_wakes_the_loop() {
        let (mut tui, _trace, log) = runtime();
        tui.start().expect("start");
        tui.run_blocking_once();
        log.borrow_mut().calls.clear();

        let started = Instant::now();
        tui.render_handle()
            .request_render_at(started + Duration::from_millis(30));
        tui.run_blocking_once();
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(log.borrow().calls, vec!["render", "after_render"]);
        tui.stop().expect("stop");
    }

    #[test]
    fn request_stop_ends_the_loop_and_stop_restores_terminal() {
        let (mut tui, trace, _log) = runtime();
        tui.start().expect("start");
        assert!(tui.is_running());
        tui.render_handle().request_stop();
        assert!(!tui.is_running());
        tui.run_blocking_once();
        tui.stop().expect("stop");
        tui.stop().expect("second stop is a no-op");
        let trace = trace.lock().unwrap();
        assert_eq!(trace.stops, 1);
        assert!(trace.output.ends_with("\x1b[?1006l\x1b[?1000l\x1b[?2004l\x1b[?25h\x1b[?1049l"));
    }

    #[test]
    fn terminal_start_failure_is_reported_as_io_error() {
        let (mut tui, trace, _log) = runtime();
        trace.lock().unwrap().fail_start = true;
        let err = tui.start().expect_err("start fails");
        assert!(matches!(
            err,
            CasebookError::Io {
                operation: "starting the terminal",
                ..
            }
        ));
        assert_eq!(err.to_string(), "I/O error while starting the terminal: not a tty");
        assert!(!tui.is_running());
        assert!(trace.lock().unwrap().output.is_empty());
        tui.stop().expect("stop after failed start is a no-op");
    }

    #[test]
    fn with_root_shares_the_runtime_wake() {
        let trace = Arc::new(Mutex::new(Trace::default()));
        let log = Rc::new(RefCell::new(Log::default()));
        let captured = Rc::new(RefCell::new(None));
        let terminal = TestTerminal {
            trace: Arc::clone(&trace),
        };
        let mut tui = TuiRuntime::with_root(terminal, |handle| {
            *captured.borrow_mut() = Some(handle);
            let root: ComponentRc = Rc::new(RefCell::new(Box::new(Recorder {
                log: Rc::clone(&log),
            })));
            root
        });
        tui.start().expect("start");
        tui.run_blocking_once();
        log.borrow_mut().calls.clear();

        let handle = captured.borrow_mut().take().expect("handle captured");
        handle.request_render();
        tui.run_blocking_once();
        assert_eq!(log.borrow().calls, vec!["render", "after_render"]);

        handle.request_stop();
        assert!(!tui.is_running());
        tui.stop().expect("stop");
    }
}
