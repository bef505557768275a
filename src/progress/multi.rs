//! Multi-task progress display.
//!
//! [`MultiProgress`] owns the ordered task list and a background render thread that repaints
//! one line per task (plus an error line per failed task) in place, using cursor-relative
//! movement instead of clearing the screen.
//!
//! Lock order: worker -> output -> registry -> one task at a time. The registry lock is only
//! held while cloning task references, so `add_bar`/`get_bar` never wait on a slow frame, and
//! producers only ever take their own task's lock.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

use super::estimate::EstimateConfig;
use super::geometry::{self, Geometry};
use super::layout;
use super::spinner::ProgressSpinner;
use crate::config::EnvConfig;
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::terminal::Terminal;
use crate::logging;
use crate::platform::process_terminal::ProcessTerminal;
use crate::platform::signals::{install_signal_handlers, SignalHookGuard};

pub const DEFAULT_RENDER_INTERVAL: Duration = Duration::from_millis(250);
pub const MIN_RENDER_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct MultiProgressOptions {
    /// Delay between background frames.
    pub render_interval: Duration,
    /// Expected size and duration applied to every task.
    pub estimate: EstimateConfig,
    /// Fixed display width; the terminal is queried when unset.
    pub width: Option<usize>,
    /// Print the resolved width and its source to stderr.
    pub debug: bool,
    /// Show the cursor again on SIGINT/SIGTERM while rendering.
    pub restore_cursor_on_signal: bool,
}

impl Default for MultiProgressOptions {
    fn default() -> Self {
        Self {
            render_interval: DEFAULT_RENDER_INTERVAL,
            estimate: EstimateConfig::default(),
            width: None,
            debug: false,
            restore_cursor_on_signal: false,
        }
    }
}

impl MultiProgressOptions {
    pub fn from_env(config: &EnvConfig) -> Self {
        Self {
            width: config.columns,
            debug: config.debug,
            ..Self::default()
        }
    }

    /// Delay between background frames, never shorter than [`MIN_RENDER_INTERVAL`].
    pub fn with_render_interval(mut self, interval: Duration) -> Self {
        self.render_interval = interval.max(MIN_RENDER_INTERVAL);
        self
    }

    pub fn with_estimate(mut self, estimate: EstimateConfig) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn restore_cursor_on_signal(mut self, enabled: bool) -> Self {
        self.restore_cursor_on_signal = enabled;
        self
    }
}

#[derive(Default)]
struct Registry {
    by_id: HashMap<String, Arc<ProgressSpinner>>,
    order: Vec<Arc<ProgressSpinner>>,
    started: bool,
    stopped: bool,
}

struct Output<T> {
    terminal: T,
    gate: OutputGate,
    /// Lines printed by the previous frame; the next frame starts that many rows up.
    last_line_count: usize,
}

struct Shared<T> {
    registry: Mutex<Registry>,
    output: Mutex<Output<T>>,
    width: usize,
}

impl<T: Terminal> Shared<T> {
    fn lock_registry(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .expect("progress registry lock poisoned")
    }

    fn lock_output(&self) -> MutexGuard<'_, Output<T>> {
        self.output.lock().expect("progress output lock poisoned")
    }

    fn ordered_tasks(&self) -> Vec<Arc<ProgressSpinner>> {
        self.lock_registry().order.clone()
    }

    fn emit(&self, cmds: impl IntoIterator<Item = TerminalCmd>) {
        let mut output = self.lock_output();
        let Output { terminal, gate, .. } = &mut *output;
        gate.extend(cmds);
        gate.flush(terminal);
    }

    /// Repaint the progress region. `show_cursor` ends the frame by restoring the cursor.
    fn render_frame(&self, show_cursor: bool) {
        let mut output = self.lock_output();
        self.draw(&mut output, show_cursor);
    }

    fn draw(&self, output: &mut Output<T>, show_cursor: bool) {
        let tasks = self.ordered_tasks();
        let now = Instant::now();
        let wall = SystemTime::now();

        let previous = output.last_line_count;
        let mut cmds = vec![TerminalCmd::MoveUp(previous)];
        let mut line_count = 0;
        for task in &tasks {
            let snapshot = task.snapshot_at(now);
            for line in layout::render_lines(&snapshot, self.width, wall) {
                cmds.push(TerminalCmd::CarriageReturn);
                cmds.push(TerminalCmd::ClearLine);
                cmds.push(TerminalCmd::Bytes(line));
                cmds.push(TerminalCmd::Newline);
                line_count += 1;
            }
        }

        if line_count < previous {
            let extra = previous - line_count;
            for _ in 0..extra {
                cmds.push(TerminalCmd::ClearLine);
                cmds.push(TerminalCmd::Newline);
            }
            cmds.push(TerminalCmd::MoveUp(extra));
        }
        if show_cursor {
            cmds.push(TerminalCmd::ShowCursor);
        }

        let Output { terminal, gate, .. } = &mut *output;
        gate.extend(cmds);
        gate.flush(terminal);
        output.last_line_count = line_count;
        tracing::trace!(lines = line_count, previous, "frame rendered");
    }
}

#[derive(Default)]
struct Worker {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    signal_guard: Option<SignalHookGuard>,
}

/// Live multi-line progress display for a set of concurrently running tasks.
///
/// One instance per display session. Tasks are rendered in the order they were added.
pub struct MultiProgress<T: Terminal + Send + 'static = ProcessTerminal> {
    shared: Arc<Shared<T>>,
    worker: Mutex<Worker>,
    options: MultiProgressOptions,
    geometry: Geometry,
}

impl MultiProgress<ProcessTerminal> {
    /// Display on stdout, configured from the environment.
    pub fn new() -> Self {
        let config = EnvConfig::from_env();
        logging::init(&config);
        let terminal =
            ProcessTerminal::new().with_write_log(config.write_log.as_ref().map(PathBuf::from));
        let options = MultiProgressOptions::from_env(&config).restore_cursor_on_signal(true);
        Self::with_terminal(terminal, options)
    }
}

impl Default for MultiProgress<ProcessTerminal> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Terminal + Send + 'static> MultiProgress<T> {
    pub fn with_terminal(terminal: T, options: MultiProgressOptions) -> Self {
        let geometry = geometry::resolve_width(options.width, &terminal);
        geometry::report(&geometry, options.debug, io::stderr().lock());

        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::default()),
                output: Mutex::new(Output {
                    terminal,
                    gate: OutputGate::new(),
                    last_line_count: 0,
                }),
                width: geometry.width,
            }),
            worker: Mutex::new(Worker::default()),
            options,
            geometry,
        }
    }

    fn lock_worker(&self) -> MutexGuard<'_, Worker> {
        self.worker.lock().expect("progress worker lock poisoned")
    }

    /// Register a new pending task and return it.
    ///
    /// If `id` is already registered the existing task is returned unchanged and
    /// `description` is ignored; an id always maps to exactly one line.
    pub fn add_bar(
        &self,
        id: impl Into<String>,
        description: impl Into<String>,
    ) -> Arc<ProgressSpinner> {
        let id = id.into();
        let mut registry = self.shared.lock_registry();
        if let Some(existing) = registry.by_id.get(&id) {
            tracing::warn!(id = %id, "duplicate progress id; reusing existing task");
            return Arc::clone(existing);
        }

        let task = Arc::new(ProgressSpinner::new(description, self.options.estimate));
        registry.by_id.insert(id, Arc::clone(&task));
        registry.order.push(Arc::clone(&task));
        task
    }

    pub fn get_bar(&self, id: &str) -> Option<Arc<ProgressSpinner>> {
        self.shared.lock_registry().by_id.get(id).cloned()
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> Vec<Arc<ProgressSpinner>> {
        self.shared.ordered_tasks()
    }

    pub fn len(&self) -> usize {
        self.shared.lock_registry().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn options(&self) -> &MultiProgressOptions {
        &self.options
    }

    pub fn is_started(&self) -> bool {
        self.shared.lock_registry().started
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock_registry().stopped
    }

    /// Hide the cursor, reserve one row per task and start the render thread.
    ///
    /// No-op when already started or after [`MultiProgress::stop`].
    pub fn start(&self) {
        let mut worker = self.lock_worker();
        let baseline = {
            let mut registry = self.shared.lock_registry();
            if registry.started || registry.stopped {
                return;
            }
            registry.started = true;
            registry.order.len()
        };

        {
            let mut output = self.shared.lock_output();
            let Output {
                terminal,
                gate,
                last_line_count,
            } = &mut *output;
            gate.push(TerminalCmd::HideCursor);
            for _ in 0..baseline {
                gate.push(TerminalCmd::Newline);
            }
            gate.flush(terminal);
            *last_line_count = baseline;
        }

        if self.options.restore_cursor_on_signal {
            let shared = Arc::clone(&self.shared);
            match install_signal_handlers(move || shared.emit([TerminalCmd::ShowCursor])) {
                Ok(guard) => worker.signal_guard = Some(guard),
                Err(err) => tracing::warn!(error = %err, "cursor restore hook unavailable"),
            }
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let interval = self.options.render_interval.max(MIN_RENDER_INTERVAL);
        let spawned = thread::Builder::new()
            .name("tape-progress-render".to_string())
            .spawn(move || {
                loop {
                    shared.render_frame(false);
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!("render thread exited");
            });

        match spawned {
            Ok(handle) => {
                worker.stop_tx = Some(stop_tx);
                worker.thread = Some(handle);
                tracing::debug!(
                    tasks = baseline,
                    width = self.geometry.width,
                    interval_ms = interval.as_millis() as u64,
                    "progress display started"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "render thread unavailable; only the final frame will be drawn");
            }
        }
    }

    /// Stop rendering, finish every incomplete task, draw the final frame and show the cursor.
    ///
    /// Idempotent. Once this returns no background frame is drawn again.
    pub fn stop(&self) {
        let mut worker = self.lock_worker();
        {
            let mut registry = self.shared.lock_registry();
            if registry.stopped {
                return;
            }
            registry.stopped = true;
        }

        drop(worker.stop_tx.take());
        if let Some(handle) = worker.thread.take() {
            if handle.join().is_err() {
                tracing::warn!("render thread panicked");
            }
        }

        let mut forced = 0usize;
        for task in self.shared.ordered_tasks() {
            if task.finish_if_incomplete() {
                forced += 1;
            }
        }

        self.shared.render_frame(true);
        drop(worker.signal_guard.take());
        tracing::debug!(forced, "progress display stopped");
    }

    /// Draw one frame immediately on the calling thread. Ignored after `stop`.
    pub fn render_now(&self) {
        let mut output = self.shared.lock_output();
        if self.shared.lock_registry().stopped {
            return;
        }
        self.shared.draw(&mut output, false);
    }
}

impl<T: Terminal + Send + 'static> Drop for MultiProgress<T> {
    fn drop(&mut self) {
        let running = {
            let registry = self.shared.lock_registry();
            registry.started && !registry.stopped
        };
        if running {
            self.stop();
        }
    }
}
