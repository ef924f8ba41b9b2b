use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use log::info;
use roster_core::{default_log_level, ReadFailurePolicy, StoreKind};

use crate::error::ServerError;

const DEFAULT_PORT: &str = "5001";
const DEFAULT_STORE: &str = "json";
const DEFAULT_DATA_PATH: &str = "data/db.json";
const DEFAULT_READ_FAILURE: &str = "recover";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub store: StoreKind,
    pub data_path: PathBuf,
    pub read_failure: ReadFailurePolicy,
    pub log_level: String,
    /// Always absolute; relative values are resolved against the working directory.
    pub log_dir: PathBuf,
}

impl ServerConfig {
    pub fn load() -> Result<Self, ServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let log_dir: PathBuf = try_load(&lookup, "ROSTER_LOG_DIR", DEFAULT_LOG_DIR)?;

        Ok(Self {
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            store: try_load(&lookup, "ROSTER_STORE", DEFAULT_STORE)?,
            data_path: try_load(&lookup, "ROSTER_DATA_PATH", DEFAULT_DATA_PATH)?,
            read_failure: try_load(&lookup, "ROSTER_READ_FAILURE", DEFAULT_READ_FAILURE)?,
            log_level: try_load(&lookup, "ROSTER_LOG_LEVEL", default_log_level())?,
            log_dir: absolute(log_dir)?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ServerError>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("event=config_default module=config key={key} value={default}");
        default.to_string()
    });

    raw.parse().map_err(|err: T::Err| ServerError::Config {
        key: key.to_string(),
        message: err.to_string(),
    })
}

fn absolute(path: PathBuf) -> Result<PathBuf, ServerError> {
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::ServerConfig;
    use crate::error::ServerError;
    use roster_core::{ReadFailurePolicy, StoreKind};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.store, StoreKind::Json);
        assert_eq!(config.data_path, PathBuf::from("data/db.json"));
        assert_eq!(config.read_failure, ReadFailurePolicy::RecoverEmpty);
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn variables_override_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("ROSTER_STORE", "sqlite"),
            ("ROSTER_DATA_PATH", "/srv/roster.sqlite3"),
            ("ROSTER_READ_FAILURE", "fail"),
            ("ROSTER_LOG_DIR", "/var/log/roster"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.data_path, PathBuf::from("/srv/roster.sqlite3"));
        assert_eq!(config.read_failure, ReadFailurePolicy::Fail);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/roster"));
    }

    #[test]
    fn invalid_values_are_errors_not_panics() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, ServerError::Config { ref key, .. } if key == "PORT"));

        let err = ServerConfig::from_lookup(lookup(&[("ROSTER_STORE", "redis")])).unwrap_err();
        assert!(err.to_string().contains("ROSTER_STORE"));
    }
}
