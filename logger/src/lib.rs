//! Logger construction on top of `env_logger`.
//!
//! ```no_run
//! use kit_logger::{Format, LoggerBuilder};
//!
//! LoggerBuilder::new()
//!     .format(Format::Json)
//!     .level(log::LevelFilter::Info)
//!     .init()
//!     .expect("logger already installed");
//!
//! log::info!(port = 8080; "listening");
//! ```

mod format;

use std::io::Write;
use std::str::FromStr;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Output format of each log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    Json,
    #[default]
    Text,
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "text" => Ok(Format::Text),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format {0:?}, expected \"json\" or \"text\"")]
pub struct UnknownFormat(String);

/// Options for building a logger. Defaults: text format, `Debug` level,
/// stdout, no call-site information.
pub struct LoggerBuilder {
    level: LevelFilter,
    filters: Option<String>,
    add_caller: bool,
    writer: Option<Box<dyn Write + Send + 'static>>,
    format: Format,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            level: LevelFilter::Debug,
            filters: None,
            add_caller: false,
            writer: None,
            format: Format::Text,
        }
    }

    /// Sends log lines to `writer` instead of stdout.
    pub fn writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Per-module directives in `RUST_LOG` syntax, applied after `level`.
    pub fn filters(mut self, directives: impl Into<String>) -> Self {
        self.filters = Some(directives.into());
        self
    }

    /// Adds the `file:line` of the call site to every line.
    pub fn add_caller(mut self) -> Self {
        self.add_caller = true;
        self
    }

    pub fn build(self) -> env_logger::Logger {
        let mut builder = Builder::new();
        builder.filter_level(self.level);

        if let Some(directives) = &self.filters {
            builder.parse_filters(directives);
        }

        match self.writer {
            Some(writer) => builder.target(Target::Pipe(writer)),
            None => builder.target(Target::Stdout),
        };

        let add_caller = self.add_caller;
        match self.format {
            Format::Json => builder.format(move |buf, record| format::json(buf, record, add_caller)),
            Format::Text => builder.format(move |buf, record| format::text(buf, record, add_caller)),
        };

        builder.build()
    }

    /// Builds the logger and installs it as the global `log` backend.
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let logger = self.build();
        let max_level = logger.filter();

        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
