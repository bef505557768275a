//! Per-task progress state.
//!
//! Each [`ProgressSpinner`] carries its own lock. Producers mutate it from any thread; the
//! render thread takes the same lock only long enough to copy a [`TaskSnapshot`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::estimate::{estimate, failure_snapshot, EstimateConfig};
use super::status::TaskStatus;
use super::writer::SpinnerWriter;

/// Bytes credited by [`ProgressSpinner::increment`].
pub const INCREMENT_BYTES: u64 = 1024;

#[derive(Debug)]
struct TaskState {
    status: TaskStatus,
    bytes_written: u64,
    final_progress: f64,
    start_time: Instant,
    end_time: Option<Instant>,
    error: Option<String>,
}

impl TaskState {
    fn new(now: Instant) -> Self {
        Self {
            status: TaskStatus::Pending,
            bytes_written: 0,
            final_progress: 0.0,
            start_time: now,
            end_time: None,
            error: None,
        }
    }

    fn elapsed(&self, now: Instant) -> Duration {
        self.end_time
            .unwrap_or(now)
            .saturating_duration_since(self.start_time)
    }

    fn finish(&mut self, status: TaskStatus, progress: f64) {
        self.status = status;
        self.final_progress = progress;
        self.end_time = Some(Instant::now());
    }
}

/// Consistent copy of one task, taken under its lock.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    pub description: Arc<str>,
    pub status: TaskStatus,
    pub bytes_written: u64,
    /// Percentage in `[0, 100]`.
    pub progress: f64,
    pub elapsed: Duration,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct ProgressSpinner {
    description: Arc<str>,
    estimate: EstimateConfig,
    state: Mutex<TaskState>,
}

impl ProgressSpinner {
    pub fn new(description: impl Into<String>, estimate: EstimateConfig) -> Self {
        Self {
            description: Arc::from(description.into()),
            estimate,
            state: Mutex::new(TaskState::new(Instant::now())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TaskState> {
        self.state.lock().expect("task state lock poisoned")
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn estimate_config(&self) -> EstimateConfig {
        self.estimate
    }

    /// Mark the task running and restart its timer.
    ///
    /// Calling this on a finished task re-arms it: the end time, error and progress snapshot
    /// are cleared. The byte counter is kept.
    pub fn start(&self) {
        let mut state = self.lock();
        state.status = TaskStatus::Running;
        state.start_time = Instant::now();
        state.end_time = None;
        state.error = None;
        state.final_progress = 0.0;
    }

    /// Finish successfully at 100%, whatever came before.
    pub fn complete(&self) {
        self.lock().finish(TaskStatus::Success, 100.0);
    }

    /// Finish as failed, keeping the progress reached so far.
    pub fn fail(&self, message: impl Into<String>) {
        let mut state = self.lock();
        let snapshot = failure_snapshot(state.bytes_written, state.final_progress, &self.estimate);
        state.error = Some(message.into());
        state.finish(TaskStatus::Failed, snapshot);
    }

    pub fn skip(&self) {
        self.lock().finish(TaskStatus::Skipped, 0.0);
    }

    /// Credit [`INCREMENT_BYTES`] of activity.
    pub fn increment(&self) {
        self.add_bytes(INCREMENT_BYTES);
    }

    pub fn add_bytes(&self, bytes: u64) {
        let mut state = self.lock();
        state.bytes_written = state.bytes_written.saturating_add(bytes);
    }

    /// True while the task is `Pending` or `Running`.
    pub fn is_incomplete(&self) -> bool {
        !self.lock().status.is_terminal()
    }

    /// Force a successful finish unless the task already reached a terminal state.
    ///
    /// Returns whether the status changed.
    pub fn finish_if_incomplete(&self) -> bool {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.finish(TaskStatus::Success, 100.0);
        true
    }

    #[deprecated(note = "use `finish_if_incomplete`; `stop` never cancelled anything")]
    pub fn stop(&self) {
        self.finish_if_incomplete();
    }

    pub fn status(&self) -> TaskStatus {
        self.lock().status
    }

    pub fn bytes_written(&self) -> u64 {
        self.lock().bytes_written
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Set once the task reaches a terminal state.
    pub fn end_time(&self) -> Option<Instant> {
        self.lock().end_time
    }

    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed(Instant::now())
    }

    /// Current progress percentage. Never lower than a previously reported value while the
    /// task is running.
    pub fn progress(&self) -> f64 {
        self.snapshot().progress
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.snapshot_at(Instant::now())
    }

    /// Run the estimator as of `now` and copy the task's fields.
    pub fn snapshot_at(&self, now: Instant) -> TaskSnapshot {
        let mut state = self.lock();
        let elapsed = state.elapsed(now);
        let progress = estimate(
            state.status,
            state.bytes_written,
            elapsed,
            state.final_progress,
            &self.estimate,
        );
        if progress > state.final_progress && !state.status.is_terminal() {
            state.final_progress = progress;
        }

        TaskSnapshot {
            description: Arc::clone(&self.description),
            status: state.status,
            bytes_written: state.bytes_written,
            progress,
            elapsed,
            error: state.error.clone(),
        }
    }

    /// Byte sink that credits everything written to it to this task.
    pub fn writer(self: &Arc<Self>) -> SpinnerWriter {
        SpinnerWriter::new(Arc::clone(self))
    }
}
