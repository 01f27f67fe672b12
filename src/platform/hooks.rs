//! Crash cleanup hooks.
//!
//! While the runtime owns the terminal, SIGINT/SIGTERM and panics must still
//! leave the screen usable. Both hooks run the cleanup at most once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use signal_hook::iterator::Signals;

fn run_cleanup_once<F>(cleanup: &F, ran: &AtomicBool)
where
    F: Fn() + ?Sized,
{
    if !ran.swap(true, Ordering::SeqCst) {
        cleanup();
    }
}

/// Stops the signal thread when dropped.
pub struct SignalHookGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Install a SIGINT/SIGTERM cleanup hook.
pub fn install_signal_handlers<F>(cleanup: F) -> std::io::Result<SignalHookGuard>
where
    F: Fn() + Send + Sync + 'static,
{
    let mut signals = Signals::new([libc::SIGINT, libc::SIGTERM])?;
    let handle = signals.handle();
    let ran = AtomicBool::new(false);

    let thread = thread::spawn(move || {
        for _ in signals.forever() {
            run_cleanup_once(&cleanup, &ran);
        }
    });

    Ok(SignalHookGuard {
        handle,
        thread: Some(thread),
    })
}

/// Disarms the panic cleanup when dropped.
///
/// The wrapping hook stays installed and delegates to the previous hook; only
/// the cleanup is switched off.
pub struct PanicHookGuard {
    active: Arc<AtomicBool>,
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Install a panic hook that runs `cleanup` once, then delegates to the
/// previously installed hook.
pub fn install_panic_hook<F>(cleanup: F) -> PanicHookGuard
where
    F: Fn() + Send + Sync + 'static,
{
    let active = Arc::new(AtomicBool::new(true));
    let hook_active = Arc::clone(&active);
    let ran = AtomicBool::new(false);
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if hook_active.load(Ordering::SeqCst) {
            run_cleanup_once(&cleanup, &ran);
        }
        previous(info);
    }));
    PanicHookGuard { active }
}

#[cfg(test)]
mod tests {
    use super::run_cleanup_once;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn cleanup_runs_once() {
        let calls = AtomicUsize::new(0);
        let ran = AtomicBool::new(false);
        let cleanup = || {
            calls.fetch_add(1, Ordering::SeqCst);
        };
        run_cleanup_once(&cleanup, &ran);
        run_cleanup_once(&cleanup, &ran);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
