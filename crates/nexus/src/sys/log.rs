//! Logger subsystem
//!
//! One logger per process, configured once through [`Logger::init`]. It
//! installs an `env_logger` backend behind the `log` facade whose output goes
//! both to stderr and to a log file, one line per record:
//!
//! ```text
//! [2024-05-01T12:00:00Z] [INFO] Window subsystem running
//! ```
//!
//! The level comes from [`LoggerConfig::level`] and can be overridden at run
//! time with the `NEXUS_LOG` environment variable (same syntax as `RUST_LOG`).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub use log::{debug, error, info, trace, warn};

use crate::assert::contract_violation;
use crate::outcome::{Error, Outcome};

crate::error_codes! {
    /// Failure codes of [`Logger::init`]
    pub enum LoggerErrorCode in "logger" {
        /// A logger was already initialized in this process
        AlreadyInitialized = 1 => "logger subsystem already initialized",
        /// The log file could not be opened
        FailedToOpenLogFile = 2 => "failed to open log file",
        /// Another `log` backend is installed
        BackendAlreadySet = 3 => "another log backend is already installed",
        /// The configured level is not a valid level filter
        InvalidLevel = 4 => "invalid log level",
    }
}

/// Environment variable that overrides the configured filter
pub const LOG_ENV: &str = "NEXUS_LOG";

/// Log at error level with a `CRITICAL` marker
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::log::error!("CRITICAL: {}", format_args!($($arg)+))
    };
}

/// Logger settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Logger name, reported at startup
    pub name: String,
    /// Log file path
    pub path: PathBuf,
    /// Level filter: `off`, `error`, `warn`, `info`, `debug` or `trace`
    pub level: String,
    /// Append to an existing file instead of truncating it
    pub append: bool,
}

impl LoggerConfig {
    /// Settings with the given name and file, trace level, truncating
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            level: "trace".to_string(),
            append: false,
        }
    }

    /// Set the level filter
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Append to the log file instead of truncating it
    #[must_use]
    pub const fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    fn level_filter(&self) -> Outcome<LevelFilter> {
        self.level.parse::<LevelFilter>().map_err(|_| {
            Error::with_message(LoggerErrorCode::InvalidLevel, self.level.clone())
        })
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new("nexus", "nexus.log")
    }
}

/// Console + file writer handed to `env_logger`
struct DualSink {
    file: File,
}

impl Write for DualSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A closed stderr must not stop the file from being written
        let _ = io::stderr().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}

#[derive(Debug)]
struct LoggerInner {
    name: String,
    path: PathBuf,
    level: LevelFilter,
}

/// Shared handle to the process logger
///
/// Cloning is cheap; every clone refers to the same instance.
#[derive(Debug, Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

impl Logger {
    /// Initialize with a name and a log file, at trace level
    pub fn init(name: &str, path: impl AsRef<Path>) -> Outcome<Self> {
        Self::init_with(&LoggerConfig::new(name, path.as_ref()))
    }

    /// Initialize from settings
    ///
    /// Fails with [`LoggerErrorCode::AlreadyInitialized`] on every call after
    /// the first successful one, leaving the existing logger untouched.
    pub fn init_with(config: &LoggerConfig) -> Outcome<Self> {
        let level = config.level_filter()?;

        let mut slot = LOGGER.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(Error::new(LoggerErrorCode::AlreadyInitialized));
        }

        let open_failed = |e: io::Error| {
            Error::with_message(
                LoggerErrorCode::FailedToOpenLogFile,
                format!("{}: {e}", config.path.display()),
            )
        };
        // Existing contents survive until the backend is installed
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)
            .map_err(open_failed)?;
        let truncate_handle = file.try_clone().map_err(open_failed)?;

        env_logger::Builder::new()
            .filter_level(level)
            .parse_env(LOG_ENV)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{}] [{}] {}",
                    buf.timestamp_seconds(),
                    record.level(),
                    record.args()
                )
            })
            .target(env_logger::Target::Pipe(Box::new(DualSink { file })))
            .try_init()
            .map_err(|e| Error::with_message(LoggerErrorCode::BackendAlreadySet, e.to_string()))?;

        if !config.append {
            if let Err(e) = truncate_handle.set_len(0) {
                log::warn!("Could not truncate {}: {e}", config.path.display());
            }
        }

        let logger = Self {
            inner: Arc::new(LoggerInner {
                name: config.name.clone(),
                path: config.path.clone(),
                level,
            }),
        };
        *slot = Some(logger.clone());
        drop(slot);

        log::info!(
            "Logger '{}' initialized, writing to {}",
            config.name,
            config.path.display()
        );
        Ok(logger)
    }

    /// The process logger
    ///
    /// Calling this before a successful [`Logger::init`] is a contract
    /// violation.
    pub fn get() -> Self {
        Self::try_get()
            .unwrap_or_else(|| contract_violation("Logger::get", "logger subsystem not initialized"))
    }

    /// The process logger, if initialized
    pub fn try_get() -> Option<Self> {
        LOGGER
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether [`Logger::init`] has succeeded in this process
    pub fn is_initialized() -> bool {
        Self::try_get().is_some()
    }

    /// Whether two handles refer to the same logger
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Logger name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Log file path
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Configured level filter
    pub fn level(&self) -> LevelFilter {
        self.inner.level
    }

    /// Flush buffered records to both sinks
    pub fn flush(&self) {
        log::logger().flush();
    }
}
