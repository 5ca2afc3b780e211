//! # Logger
//!
//! Installs the global `tracing` subscriber for Vista binaries: an [`EnvFilter`] built from a
//! base level plus optional directives, a compact console layer, and an optional non-blocking
//! rolling file layer (plain or JSON lines).
//!
//! `RUST_LOG` still wins over the configured base level when no directives are given.
//!
//! ## Example
//!
//! ```rust
//! # use vista_logger::Logger;
//! let _logger = Logger::builder()
//!     .name("vista-server")
//!     .level("debug")
//!     .directives("hyper=warn")
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerOptions {
    level: String,
    directives: Option<String>,
    console: bool,
    directory: Option<PathBuf>,
    json: bool,
    rotation: Rotation,
    max_files: usize,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            directives: None,
            console: true,
            directory: None,
            json: false,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}

/// Configures and installs the global subscriber. A name is required before [`init`](LoggerBuilder::init).
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName> {
    options: LoggerOptions,
    name: N,
}

impl LoggerBuilder<NoName> {
    /// Names the log files (`<name>.<date>.log`).
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { name: WithName(name.into()), options: self.options }
    }
}

impl<N: Sealed> LoggerBuilder<N> {
    /// Base level (`trace`, `debug`, `info`, `warn`, `error`, `off`).
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.options.level = level.into();
        self
    }

    /// Extra `EnvFilter` directives, e.g. `vista_access=trace,hyper=warn`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.options.directives = Some(directives.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.options.console = enabled;
        self
    }

    /// Enables rolling file output into `directory`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.options.directory = Some(directory.into());
        self
    }

    /// Writes file output as JSON lines. Console output stays compact text.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.options.json = enabled;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.options.rotation = rotation;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.options.max_files = max;
        self
    }
}

impl LoggerBuilder<WithName> {
    /// Installs the global subscriber.
    ///
    /// The returned [`Logger`] owns the file writer's worker guard; keep it alive until
    /// shutdown or buffered lines are lost.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an unknown level, bad directives or no
    /// enabled output; [`LoggerError::Appender`] if the log directory is unusable;
    /// [`LoggerError::Subscriber`] if a global subscriber is already set.
    pub fn init(self) -> Result<Logger, LoggerError> {
        validate(&self.options, &self.name.0)?;

        let filter = build_env_filter(&self.options)?;
        let mut layers = Vec::new();

        if self.options.console {
            layers.push(layer().compact().with_ansi(true).with_target(true).boxed());
        }

        let guard = if let Some(directory) = &self.options.directory {
            fs::create_dir_all(directory).map_err(|e| LoggerError::Internal {
                message: e.to_string().into(),
                context: Some(format!("Failed to create log directory: {}", directory.display()).into()),
            })?;

            let appender = RollingFileAppender::builder()
                .rotation(self.options.rotation.clone())
                .filename_prefix(&self.name.0)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(self.options.max_files)
                .build(directory)?;

            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = layer().with_writer(writer).with_ansi(false);

            layers.push(if self.options.json { file_layer.json().boxed() } else { file_layer.boxed() });
            Some(guard)
        } else {
            None
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        tracing::debug!(name = %self.name.0, level = %self.options.level, "Logger installed");

        Ok(Logger { guard })
    }
}

/// Keeps the background file writer alive. Drop it only on shutdown.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { options: LoggerOptions::default(), name: NoName }
    }

    /// Whether file output (and therefore a worker thread) is active.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

fn validate(options: &LoggerOptions, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if !options.console && options.directory.is_none() {
        return Err(LoggerError::InvalidConfiguration {
            message: "No logging output enabled. Enable console or set a log directory.".into(),
            context: None,
        });
    }

    if options.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(options: &LoggerOptions) -> Result<EnvFilter, LoggerError> {
    let level = LevelFilter::from_str(options.level.trim()).map_err(|e| {
        LoggerError::InvalidConfiguration {
            message: format!("Unknown log level '{}': {e}", options.level).into(),
            context: None,
        }
    })?;

    let builder = EnvFilter::builder().with_default_directive(level.into());

    options.directives.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |directives| {
            builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid filter directives '{directives}': {e}").into(),
                context: None,
            })
        },
    )
}
