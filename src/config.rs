//! Environment configuration.

use std::env;

pub const COLUMNS_ENV: &str = "TAPE_PROGRESS_COLUMNS";
pub const DEBUG_ENV: &str = "TAPE_PROGRESS_DEBUG";
pub const WRITE_LOG_ENV: &str = "TAPE_PROGRESS_WRITE_LOG";
pub const LOG_FILE_ENV: &str = "TAPE_PROGRESS_LOG";

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// Display width override. Only positive integers are accepted.
    pub columns: Option<usize>,
    /// Print the resolved width and its source to stderr at construction.
    pub debug: bool,
    /// Mirror every terminal write into this file.
    pub write_log: Option<String>,
    /// Destination for `tracing` output.
    pub log_file: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            columns: env_usize_opt(COLUMNS_ENV),
            debug: env_flag(DEBUG_ENV),
            write_log: env_string_opt(WRITE_LOG_ENV),
            log_file: env_string_opt(LOG_FILE_ENV),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_usize_opt(key: &str) -> Option<usize> {
    env_string_opt(key)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
}

#[cfg(test)]
pub(crate) mod test_env {
    use std::env;
    use std::sync::{Mutex, OnceLock};

    pub(crate) struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }
}

#[cfg(test)]
mod tests {
    use super::test_env::{env_lock, set_env_guard};
    use super::{EnvConfig, COLUMNS_ENV, DEBUG_ENV, LOG_FILE_ENV, WRITE_LOG_ENV};

    #[test]
    fn env_defaults_are_empty() {
        let _lock = env_lock();
        let _g1 = set_env_guard(COLUMNS_ENV, None);
        let _g2 = set_env_guard(DEBUG_ENV, None);
        let _g3 = set_env_guard(WRITE_LOG_ENV, None);
        let _g4 = set_env_guard(LOG_FILE_ENV, None);

        let config = EnvConfig::from_env();
        assert!(config.columns.is_none());
        assert!(!config.debug);
        assert!(config.write_log.is_none());
        assert!(config.log_file.is_none());
    }

    #[test]
    fn env_values_are_read() {
        let _lock = env_lock();
        let _g1 = set_env_guard(COLUMNS_ENV, Some("120"));
        let _g2 = set_env_guard(DEBUG_ENV, Some("1"));
        let _g3 = set_env_guard(WRITE_LOG_ENV, Some("/tmp/progress.bytes"));
        let _g4 = set_env_guard(LOG_FILE_ENV, Some("/tmp/progress.log"));

        let config = EnvConfig::from_env();
        assert_eq!(config.columns, Some(120));
        assert!(config.debug);
        assert_eq!(config.write_log.as_deref(), Some("/tmp/progress.bytes"));
        assert_eq!(config.log_file.as_deref(), Some("/tmp/progress.log"));
    }

    #[test]
    fn invalid_columns_are_ignored() {
        let _lock = env_lock();
        for value in ["0", "-4", "wide", "  "] {
            let _g = set_env_guard(COLUMNS_ENV, Some(value));
            assert!(EnvConfig::from_env().columns.is_none(), "value {value:?}");
        }
    }

    #[test]
    fn debug_requires_literal_one() {
        let _lock = env_lock();
        let _g = set_env_guard(DEBUG_ENV, Some("true"));
        assert!(!EnvConfig::from_env().debug);
    }
}
