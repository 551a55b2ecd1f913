use std::path::Path;
use std::time::Duration;

use kit_http::Server;
use kit_logger::{Format, LoggerBuilder};
use log::LevelFilter;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "DEMO_";
pub const ENV_FILE: &str = ".env";

/// Settings read from `DEMO_*` variables, e.g. `DEMO_SERVER_PORT` or
/// `DEMO_SERVER_TIMEOUT_READ`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub server: ServerSettings,
    pub log: LogSettings,
    pub password: PasswordSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub timeout: TimeoutSettings,
    pub body: BodySettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: kit_http::server::DEFAULT_HOST.to_string(),
            port: kit_http::server::DEFAULT_PORT,
            timeout: TimeoutSettings::default(),
            body: BodySettings::default(),
        }
    }
}

/// Timeouts in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub read: u64,
    pub write: u64,
    pub idle: u64,
    pub shutdown: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            read: kit_http::server::DEFAULT_READ_TIMEOUT.as_secs(),
            write: kit_http::server::DEFAULT_WRITE_TIMEOUT.as_secs(),
            idle: kit_http::server::DEFAULT_IDLE_TIMEOUT.as_secs(),
            shutdown: kit_http::server::DEFAULT_SHUTDOWN_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BodySettings {
    /// Largest accepted request body, in bytes.
    pub limit: usize,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            limit: kit_http::request::DEFAULT_BODY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: String,
    /// `RUST_LOG`-style directives layered on top of `level`.
    pub filters: Option<String>,
    pub caller: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            filters: None,
            caller: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordSettings {
    /// bcrypt work factor.
    pub cost: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl DemoConfig {
    pub fn load(env_file: impl AsRef<Path>) -> kit_config::Result<Self> {
        kit_config::read_from_env(env_file, ENV_PREFIX)
    }

    pub fn logger(&self) -> anyhow::Result<LoggerBuilder> {
        let level: LevelFilter = self.log.level.parse()?;
        let format: Format = self.log.format.parse()?;

        let mut builder = LoggerBuilder::new().level(level).format(format);
        if let Some(filters) = &self.log.filters {
            builder = builder.filters(filters.as_str());
        }
        if self.log.caller {
            builder = builder.add_caller();
        }
        Ok(builder)
    }

    /// Applies the server settings on top of `server`.
    pub fn configure_server(&self, server: Server) -> Server {
        let timeout = &self.server.timeout;
        server
            .with_host_port(self.server.host.as_str(), self.server.port)
            .with_read_timeout(Duration::from_secs(timeout.read))
            .with_write_timeout(Duration::from_secs(timeout.write))
            .with_idle_timeout(Duration::from_secs(timeout.idle))
            .with_shutdown_timeout(Duration::from_secs(timeout.shutdown))
    }
}
