//! Platform-specific terminal integrations.

pub mod process_terminal;
pub mod signals;

pub use process_terminal::ProcessTerminal;
pub use signals::{install_signal_handlers, SignalHookGuard};
