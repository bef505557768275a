//! Display width resolution.

use std::fmt;
use std::io::Write;

use crate::core::terminal::Terminal;

pub const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthSource {
    /// Explicit override (environment or options).
    Override,
    /// Size reported by the terminal.
    Terminal,
    /// Nothing usable; [`DEFAULT_WIDTH`].
    Default,
}

impl fmt::Display for WidthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Override => "override",
            Self::Terminal => "terminal",
            Self::Default => "default",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub source: WidthSource,
}

/// Override first, then the terminal's reported size, then [`DEFAULT_WIDTH`].
pub fn resolve_width<T: Terminal + ?Sized>(
    width_override: Option<usize>,
    terminal: &T,
) -> Geometry {
    if let Some(width) = width_override.filter(|width| *width > 0) {
        return Geometry {
            width,
            source: WidthSource::Override,
        };
    }
    if let Some(columns) = terminal.columns().filter(|columns| *columns > 0) {
        return Geometry {
            width: usize::from(columns),
            source: WidthSource::Terminal,
        };
    }
    Geometry {
        width: DEFAULT_WIDTH,
        source: WidthSource::Default,
    }
}

/// Log the resolved width, and with `debug` also write it as one line to `out`.
pub fn report<W: Write>(geometry: &Geometry, debug: bool, mut out: W) {
    tracing::debug!(width = geometry.width, source = %geometry.source, "resolved display width");
    if debug {
        if let Err(err) = writeln!(out, "{}", debug_line(geometry)) {
            tracing::warn!(error = %err, "width diagnostic not written");
        }
    }
}

pub fn debug_line(geometry: &Geometry) -> String {
    format!(
        "[tape_progress] terminal width: {} (source: {})",
        geometry.width, geometry.source
    )
}
