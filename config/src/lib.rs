//! Environment-driven configuration loading.
//!
//! [`read_from_env`] layers variables from an optional dotenv file and the
//! process environment, turns `SERVER_HOST` style keys into nested
//! `server.host` paths and deserializes the result into any `serde` type.

mod error;
mod source;

use std::path::Path;

use serde::de::DeserializeOwned;

pub use error::{ConfigError, Result};
pub use source::EnvSource;

/// Loads `T` from `env_file` (optional) and the process environment.
///
/// Only variables starting with `prefix` are considered; the prefix is
/// trimmed, the rest lowercased and every `_` becomes a nesting level.
/// Process variables win over the file.
pub fn read_from_env<T>(env_file: impl AsRef<Path>, prefix: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let env_file = env_file.as_ref();

    let file_vars = read_env_file(env_file)?;
    let file_source = EnvSource::new(prefix, file_vars).with_origin(env_file.display().to_string());
    let os_source = EnvSource::new(prefix, process_vars()).with_origin("environment");

    log::debug!(
        "Loading configuration from {} and the process environment (prefix: {:?})",
        env_file.display(),
        prefix
    );

    let layered = config::Config::builder()
        .add_source(file_source)
        .add_source(os_source)
        .build()
        .map_err(ConfigError::Load)?;

    layered.try_deserialize().map_err(ConfigError::Deserialize)
}

/// The process environment, minus variables that are not valid UTF-8.
fn process_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (Ok(key), Err(_)) => {
                log::debug!("Skipping env var {} with a non UTF-8 value", key);
                None
            }
            (Err(key), _) => {
                log::debug!("Skipping env var {:?} with a non UTF-8 name", key);
                None
            }
        })
        .collect()
}

/// Parses a dotenv file without exporting it into the process environment.
/// A missing file yields no variables.
fn read_env_file(path: &Path) -> Result<Vec<(String, String)>> {
    let to_error = |source: dotenvy::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(err) if err.not_found() => {
            log::debug!("No env file at {}, skipping", path.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(to_error(err)),
    };

    iter.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(to_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_env_file_is_empty() {
        let vars = read_env_file(Path::new("definitely/not/here.env")).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_env_file_is_parsed_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SERVER_HOST=localhost").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "SERVER_PORT=9090").unwrap();

        let vars = read_env_file(file.path()).unwrap();
        assert_eq!(
            vars,
            vec![
                ("SERVER_HOST".to_string(), "localhost".to_string()),
                ("SERVER_PORT".to_string(), "9090".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_env_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SERVER_HOST='unterminated").unwrap();

        let err = read_env_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }
}
