//! Flicker-free multi-task progress display for terminals.
//!
//! Invariant: single output gate. Only `core::output::OutputGate::flush(..)` writes to the
//! terminal.
//!
//! # Public API Overview
//! - Create a display with [`MultiProgress::new`] (stdout, environment config) or
//!   [`MultiProgress::with_terminal`] (any [`Terminal`]).
//! - Register tasks with [`MultiProgress::add_bar`]; drive each [`ProgressSpinner`] from any
//!   thread, or hand a [`SpinnerWriter`] to code that produces output.
//! - [`MultiProgress::start`] begins repainting in place; [`MultiProgress::stop`] finishes
//!   every incomplete task and draws the final frame.
//! - Use text and width helpers for ANSI-safe formatting.

#![allow(clippy::derivable_impls)]

pub mod config;
pub mod logging;
pub mod style;

pub mod core;
pub mod platform;
pub mod progress;

/// Progress display, tasks and their state.
pub use crate::progress::{
    EstimateConfig, Geometry, MultiProgress, MultiProgressOptions, ProgressSpinner, SpinnerWriter,
    TaskSnapshot, TaskStatus, WidthSource,
};

/// Environment-driven configuration.
pub use crate::config::EnvConfig;

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::Terminal;
pub use crate::platform::process_terminal::ProcessTerminal;

/// ANSI-aware truncation helper.
pub use crate::core::text::utils::truncate_to_width;
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
