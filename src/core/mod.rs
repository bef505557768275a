//! Core interfaces and types.

pub mod output;
pub mod terminal;
pub mod text;
