//! Spinner animation clock.
//!
//! The frame is a pure function of wall-clock time, so every caller sees the same glyph for
//! the same instant without sharing any state.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
pub const FRAME_INTERVAL: Duration = Duration::from_millis(80);

pub fn frame_index(at: SystemTime) -> usize {
    let nanos = at
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos();
    ((nanos / FRAME_INTERVAL.as_nanos()) % SPINNER_FRAMES.len() as u128) as usize
}

pub fn frame_at(at: SystemTime) -> &'static str {
    SPINNER_FRAMES[frame_index(at)]
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::{frame_at, frame_index, FRAME_INTERVAL, SPINNER_FRAMES};

    #[test]
    fn frames_advance_per_interval() {
        let base = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let first = frame_index(base);
        let next = frame_index(base + FRAME_INTERVAL);
        assert_eq!(next, (first + 1) % SPINNER_FRAMES.len());
    }

    #[test]
    fn same_instant_same_frame() {
        let at = UNIX_EPOCH + Duration::from_millis(123_456_789);
        assert_eq!(frame_at(at), frame_at(at));
    }

    #[test]
    fn wraps_after_full_cycle() {
        let base = UNIX_EPOCH + Duration::from_millis(40);
        let cycle = FRAME_INTERVAL * SPINNER_FRAMES.len() as u32;
        assert_eq!(frame_index(base), frame_index(base + cycle));
    }

    #[test]
    fn epoch_is_first_frame() {
        assert_eq!(frame_index(UNIX_EPOCH), 0);
        assert_eq!(frame_index(UNIX_EPOCH - Duration::from_secs(5)), 0);
    }
}
