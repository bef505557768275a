//! Color and glyph palette shared by the progress display.
//!
//! Values are plain ANSI strings and symbols; the renderer treats them as opaque text.

pub const RESET: &str = "\x1b[0m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const CYAN: &str = "\x1b[36m";
pub const GRAY: &str = "\x1b[90m";

pub const CHECK: &str = "\u{2714}";
pub const CROSS: &str = "\u{2718}";
pub const CIRCLE: &str = "\u{25cb}";
pub const DASH: &str = "-";
pub const ARROW: &str = "\u{21b3}";

/// Wrap `text` in `color` and a trailing reset.
pub fn paint(color: &str, text: &str) -> String {
    format!("{color}{text}{RESET}")
}
