//! `tracing` setup for the progress display.
//!
//! The display owns the terminal, so log output always goes to a file named by
//! `TAPE_PROGRESS_LOG`. Without it no subscriber is installed and the `tracing` macros are
//! no-ops. `RUST_LOG` takes precedence over the default filter.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::EnvConfig;

const DEFAULT_FILTER: &str = "tape_progress=debug";

static INIT: Once = Once::new();

/// Install the file subscriber described by `config`.
///
/// Safe to call multiple times; only the first call takes effect. Returns whether a
/// subscriber was installed by this call.
pub fn init(config: &EnvConfig) -> bool {
    let Some(path) = config.log_file.as_deref() else {
        return false;
    };

    let mut installed = false;
    INIT.call_once(|| {
        let file = match open_log_file(Path::new(path)) {
            Ok(file) => file,
            Err(err) => {
                eprintln!("tape_progress: cannot open log file {path}: {err}");
                return;
            }
        };

        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_filter(filter);

        installed = tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .is_ok();
    });
    installed
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
