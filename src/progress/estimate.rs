//! Percentage estimation from observed bytes or elapsed time.
//!
//! A running task never reaches 100% on its own: byte-driven estimates stop at
//! [`RUNNING_CAP`], time-driven guesses at the lower [`TIME_ESTIMATE_CAP`]. Only an explicit
//! completion reports 100.

use std::time::Duration;

use super::status::TaskStatus;

pub const RUNNING_CAP: f64 = 95.0;
pub const TIME_ESTIMATE_CAP: f64 = 90.0;

pub const DEFAULT_TOTAL_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_COMPLETION_TIME: Duration = Duration::from_secs(30);

/// Expected size and duration of one task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateConfig {
    pub total_bytes: u64,
    pub completion_time: Duration,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            total_bytes: DEFAULT_TOTAL_BYTES,
            completion_time: DEFAULT_COMPLETION_TIME,
        }
    }
}

impl EstimateConfig {
    /// Uncapped share of the expected byte total, in percent.
    pub fn bytes_percent(&self, bytes_written: u64) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        bytes_written as f64 / self.total_bytes as f64 * 100.0
    }

    /// Uncapped share of the expected duration, in percent.
    pub fn time_percent(&self, elapsed: Duration) -> f64 {
        if self.completion_time.is_zero() {
            return 100.0;
        }
        elapsed.as_secs_f64() / self.completion_time.as_secs_f64() * 100.0
    }
}

/// Progress for a task in `status`, never below `previous`.
///
/// Terminal statuses report `previous` verbatim: it holds the value fixed at the transition.
pub fn estimate(
    status: TaskStatus,
    bytes_written: u64,
    elapsed: Duration,
    previous: f64,
    config: &EstimateConfig,
) -> f64 {
    match status {
        TaskStatus::Success | TaskStatus::Failed | TaskStatus::Skipped => previous,
        TaskStatus::Pending => 0.0,
        TaskStatus::Running => {
            let computed = if bytes_written > 0 {
                config.bytes_percent(bytes_written).min(RUNNING_CAP)
            } else {
                config.time_percent(elapsed).min(TIME_ESTIMATE_CAP)
            };
            computed.max(previous)
        }
    }
}

/// Snapshot stored when a task fails: byte-driven progress capped at 100, never below what
/// was already shown.
pub fn failure_snapshot(bytes_written: u64, previous: f64, config: &EstimateConfig) -> f64 {
    config.bytes_percent(bytes_written).min(100.0).max(previous)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{estimate, failure_snapshot, EstimateConfig, RUNNING_CAP, TIME_ESTIMATE_CAP};
    use crate::progress::status::TaskStatus;

    fn config() -> EstimateConfig {
        EstimateConfig::default()
    }

    #[test]
    fn pending_is_zero() {
        let value = estimate(
            TaskStatus::Pending,
            4096,
            Duration::from_secs(5),
            0.0,
            &config(),
        );
        assert_eq!(value, 0.0);
    }

    #[test]
    fn running_bytes_half_of_estimate() {
        let value = estimate(
            TaskStatus::Running,
            5_000_000,
            Duration::from_secs(1),
            0.0,
            &config(),
        );
        assert!((45.0..=55.0).contains(&value), "got {value}");
    }

    #[test]
    fn running_bytes_capped() {
        let value = estimate(
            TaskStatus::Running,
            u64::MAX / 2,
            Duration::ZERO,
            0.0,
            &config(),
        );
        assert_eq!(value, RUNNING_CAP);
    }

    #[test]
    fn running_time_estimate_capped_lower() {
        let value = estimate(
            TaskStatus::Running,
            0,
            Duration::from_secs(3600),
            0.0,
            &config(),
        );
        assert_eq!(value, TIME_ESTIMATE_CAP);
    }

    #[test]
    fn running_time_estimate_scales_with_elapsed() {
        let value = estimate(
            TaskStatus::Running,
            0,
            Duration::from_secs(15),
            0.0,
            &config(),
        );
        assert!((value - 50.0).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn running_never_drops_below_previous() {
        // A time-based guess of 80% followed by the first byte must not fall back to ~0%.
        let value = estimate(
            TaskStatus::Running,
            1,
            Duration::from_secs(1),
            80.0,
            &config(),
        );
        assert_eq!(value, 80.0);
    }

    #[test]
    fn terminal_returns_stored_value() {
        for status in [TaskStatus::Success, TaskStatus::Failed, TaskStatus::Skipped] {
            let value = estimate(status, 1 << 40, Duration::from_secs(999), 42.5, &config());
            assert_eq!(value, 42.5);
        }
    }

    #[test]
    fn monotonic_over_growing_inputs() {
        let config = config();
        let mut previous = 0.0;
        let mut bytes = 0u64;
        for step in 0..200u64 {
            if step % 3 == 0 {
                bytes += 97_000;
            }
            let value = estimate(
                TaskStatus::Running,
                bytes,
                Duration::from_millis(step * 250),
                previous,
                &config,
            );
            assert!(value >= previous, "step {step}: {value} < {previous}");
            assert!(value <= 100.0);
            previous = value;
        }
    }

    #[test]
    fn failure_snapshot_caps_at_hundred() {
        let config = config();
        assert_eq!(
            failure_snapshot(config.total_bytes * 3, 0.0, &config),
            100.0
        );
        assert_eq!(failure_snapshot(0, 37.0, &config), 37.0);
    }

    #[test]
    fn zero_sized_estimates_do_not_divide_by_zero() {
        let config = EstimateConfig {
            total_bytes: 0,
            completion_time: Duration::ZERO,
        };
        assert_eq!(
            estimate(TaskStatus::Running, 10, Duration::ZERO, 0.0, &config),
            RUNNING_CAP
        );
        assert_eq!(
            estimate(TaskStatus::Running, 0, Duration::ZERO, 0.0, &config),
            TIME_ESTIMATE_CAP
        );
    }
}
