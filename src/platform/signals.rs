//! SIGINT/SIGTERM cleanup hook.
//!
//! The progress display hides the cursor while it runs. If the process is interrupted the
//! cursor must come back before the default signal action terminates the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Signal handler guard. Dropping it unregisters the hook and joins its thread.
pub struct SignalHookGuard {
    #[cfg(unix)]
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run_cleanup_once<F>(cleanup: &Arc<F>, ran: &AtomicBool)
where
    F: Fn() + Send + Sync + 'static + ?Sized,
{
    if !ran.swap(true, Ordering::SeqCst) {
        cleanup();
    }
}

/// Run `cleanup` once on SIGINT/SIGTERM, then apply the signal's default action.
#[cfg(unix)]
pub fn install_signal_handlers<F>(cleanup: F) -> std::io::Result<SignalHookGuard>
where
    F: Fn() + Send + Sync + 'static,
{
    let cleanup = Arc::new(cleanup);
    let ran = Arc::new(AtomicBool::new(false));
    let mut signals = Signals::new([libc::SIGINT, libc::SIGTERM])?;
    let handle = signals.handle();

    let thread = thread::Builder::new()
        .name("tape-progress-signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                run_cleanup_once(&cleanup, &ran);
                let _ = signal_hook::low_level::emulate_default_handler(signal);
            }
        })?;

    Ok(SignalHookGuard {
        handle,
        thread: Some(thread),
    })
}

#[cfg(not(unix))]
pub fn install_signal_handlers<F>(_cleanup: F) -> std::io::Result<SignalHookGuard>
where
    F: Fn() + Send + Sync + 'static,
{
    Ok(SignalHookGuard { thread: None })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{install_signal_handlers, run_cleanup_once};

    #[test]
    fn cleanup_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let cleanup = Arc::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        let ran = AtomicBool::new(false);

        run_cleanup_once(&cleanup, &ran);
        run_cleanup_once(&cleanup, &ran);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guard_drop_unregisters_without_running_cleanup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let guard = install_signal_handlers(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("install signal hook");
        drop(guard);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
