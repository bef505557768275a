//! Text helpers (ANSI skipping, column widths, truncation).
//!
//! These helpers are pure (string in/string out) so the layout engine can measure lines that
//! already carry color codes.

pub mod ansi;
pub mod utils;
pub mod width;
