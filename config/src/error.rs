use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error loading config from {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Error collecting config sources: {0}")]
    Load(#[source] config::ConfigError),

    #[error("Error unmarshalling config: {0}")]
    Deserialize(#[source] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
