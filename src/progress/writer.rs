//! `io::Write` adapter that turns output volume into task progress.

use std::io;
use std::sync::Arc;

use super::spinner::ProgressSpinner;

/// Credits every byte written to the wrapped task and discards the payload.
///
/// Point a child process's stdout or stderr copy loop at this to show activity without
/// printing the child's output over the progress region.
#[derive(Debug, Clone)]
pub struct SpinnerWriter {
    task: Arc<ProgressSpinner>,
}

impl SpinnerWriter {
    pub fn new(task: Arc<ProgressSpinner>) -> Self {
        Self { task }
    }

    pub fn task(&self) -> &Arc<ProgressSpinner> {
        &self.task
    }
}

impl io::Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.task.add_bytes(buf.len() as u64);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
