//! Line layout for the progress display.
//!
//! Everything here is a pure function of a [`TaskSnapshot`], the terminal width and (for the
//! spinner glyph) a timestamp.
//!
//! Full layout, at least [`MIN_FULL_WIDTH`] columns:
//!
//! ```text
//! ⠹ install serde                  [━━━━━━━━━━━╸──────────────────]  37%   4.2s
//! ```
//!
//! Compact layout drops the bar and shrinks the description column. On very narrow terminals
//! the elapsed time and then the percentage are dropped too, so a line never wraps.

use std::time::{Duration, SystemTime};

use super::clock::frame_at;
use super::spinner::TaskSnapshot;
use super::status::TaskStatus;
use crate::core::text::ansi::strip_ansi;
use crate::core::text::utils::truncate_to_width;
use crate::core::text::width::visible_width;
use crate::style;

pub const MIN_FULL_WIDTH: usize = 70;
pub const MIN_BAR_WIDTH: usize = 15;
pub const MAX_BAR_WIDTH: usize = 30;
pub const MAX_DESCRIPTION_WIDTH: usize = 30;

/// Columns used by everything but the bar in full layout: icon and space (2), description
/// and space (31), brackets (2), space and percentage (5), space and elapsed time (8), right
/// margin (2).
pub const FIXED_OVERHEAD: usize = 50;

const ELLIPSIS: &str = "...";
const ELAPSED_WIDTH: usize = 7;
const ERROR_INDENT: &str = "    ";

const BAR_HEAVY: char = '━';
const BAR_LIGHT: char = '─';
const BAR_MARKER: char = '╸';
const BAR_BROKEN: char = '╍';

pub fn is_compact(total_width: usize) -> bool {
    total_width < MIN_FULL_WIDTH
}

/// Bar width for a terminal `total_width` columns wide.
pub fn bar_width(total_width: usize) -> usize {
    total_width
        .saturating_sub(FIXED_OVERHEAD)
        .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
}

fn filled_cells(progress: f64, width: usize) -> usize {
    let fraction = (progress / 100.0).clamp(0.0, 1.0);
    ((fraction * width as f64).floor() as usize).min(width)
}

/// Bar glyphs for `status` at `progress` percent.
///
/// The result is always exactly `width` single-column characters.
pub fn format_bar_content(status: TaskStatus, progress: f64, width: usize) -> String {
    let mut bar = String::with_capacity(width * 3);
    match status {
        TaskStatus::Success => bar.extend(std::iter::repeat(BAR_HEAVY).take(width)),
        TaskStatus::Failed => {
            let filled = filled_cells(progress, width);
            bar.extend(std::iter::repeat(BAR_BROKEN).take(filled));
            bar.extend(std::iter::repeat(BAR_LIGHT).take(width - filled));
        }
        TaskStatus::Running => {
            let filled = filled_cells(progress, width);
            if filled >= width {
                bar.extend(std::iter::repeat(BAR_HEAVY).take(width));
            } else {
                bar.extend(std::iter::repeat(BAR_HEAVY).take(filled));
                bar.push(BAR_MARKER);
                bar.extend(std::iter::repeat(BAR_LIGHT).take(width - filled - 1));
            }
        }
        TaskStatus::Pending | TaskStatus::Skipped => {
            bar.extend(std::iter::repeat(BAR_LIGHT).take(width));
        }
    }
    bar
}

/// First line of `text` with escape sequences removed.
fn plain_first_line(text: &str) -> String {
    strip_ansi(text.lines().next().unwrap_or(""))
}

/// Description cut to `max_width` columns (with an ellipsis) or padded out to it.
///
/// Escape sequences in the description are dropped; the status color is applied separately.
pub fn format_description(description: &str, max_width: usize) -> String {
    truncate_to_width(&plain_first_line(description), max_width, ELLIPSIS, true)
}

/// Right-aligned percentage, always four columns.
pub fn format_percent(progress: f64) -> String {
    format!("{:>3}%", progress.clamp(0.0, 100.0).floor() as u32)
}

/// Elapsed seconds with one decimal, or blanks for statuses that never ran.
pub fn format_elapsed(status: TaskStatus, elapsed: Duration) -> String {
    if status.shows_elapsed() {
        format!("{:>width$.1}s", elapsed.as_secs_f64(), width = ELAPSED_WIDTH - 1)
    } else {
        " ".repeat(ELAPSED_WIDTH)
    }
}

fn status_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => style::DIM,
        TaskStatus::Running => style::CYAN,
        TaskStatus::Success => style::GREEN,
        TaskStatus::Failed => style::RED,
        TaskStatus::Skipped => style::GRAY,
    }
}

/// Colored status glyph. Running tasks animate through the spinner clock.
pub fn status_icon(status: TaskStatus, at: SystemTime) -> String {
    let glyph = match status {
        TaskStatus::Pending => style::CIRCLE,
        TaskStatus::Running => frame_at(at),
        TaskStatus::Success => style::CHECK,
        TaskStatus::Failed => style::CROSS,
        TaskStatus::Skipped => style::DASH,
    };
    style::paint(status_color(status), glyph)
}

/// One display line for `snapshot` on a `total_width` column terminal.
pub fn format_line(snapshot: &TaskSnapshot, total_width: usize, at: SystemTime) -> String {
    let icon = status_icon(snapshot.status, at);
    let percent = format_percent(snapshot.progress);
    let elapsed = format_elapsed(snapshot.status, snapshot.elapsed);

    if is_compact(total_width) {
        return format_compact_line(
            &icon,
            &snapshot.description,
            &percent,
            &elapsed,
            total_width,
        );
    }

    let description = format_description(&snapshot.description, MAX_DESCRIPTION_WIDTH);
    let bar = format_bar_content(snapshot.status, snapshot.progress, bar_width(total_width));
    let bar = style::paint(status_color(snapshot.status), &bar);
    format!("{icon} {description} [{bar}] {percent} {elapsed}")
}

/// Compact line that fits in `total_width` columns.
///
/// The description shrinks first (down to nothing), then the elapsed time is dropped, then
/// the percentage. One column is kept free as a right margin whenever the description shows.
fn format_compact_line(
    icon: &str,
    description: &str,
    percent: &str,
    elapsed: &str,
    total_width: usize,
) -> String {
    let icon_width = visible_width(icon);
    if icon_width > total_width {
        return String::new();
    }

    let tails = [
        format!(" {percent} {elapsed}"),
        format!(" {percent}"),
        String::new(),
    ];
    let tail = tails
        .into_iter()
        .find(|tail| icon_width + visible_width(tail) <= total_width)
        .unwrap_or_default();

    let room = (total_width - icon_width - visible_width(&tail)).saturating_sub(1);
    if room < 2 {
        return format!("{icon}{tail}");
    }
    let description = format_description(description, (room - 1).min(MAX_DESCRIPTION_WIDTH));
    format!("{icon} {description}{tail}")
}

/// Indented failure reason shown under a failed task, never wider than `total_width`.
pub fn format_error_line(message: &str, total_width: usize) -> String {
    let arrow = format!("{} ", style::ARROW);
    let indent_width = ERROR_INDENT.len().min(total_width.saturating_sub(3));
    let available = total_width.saturating_sub(indent_width + visible_width(&arrow));
    if available == 0 {
        return String::new();
    }
    let text = truncate_to_width(&plain_first_line(message), available, ELLIPSIS, false);
    format!(
        "{}{}",
        &ERROR_INDENT[..indent_width],
        style::paint(style::RED, &format!("{arrow}{text}"))
    )
}

/// All lines `snapshot` occupies: the task line plus an error line for failures that carry
/// a message.
pub fn render_lines(snapshot: &TaskSnapshot, total_width: usize, at: SystemTime) -> Vec<String> {
    let mut lines = vec![format_line(snapshot, total_width, at)];
    if snapshot.status == TaskStatus::Failed {
        if let Some(message) = snapshot.error.as_deref().filter(|msg| !msg.is_empty()) {
            lines.push(format_error_line(message, total_width));
        }
    }
    lines
}
