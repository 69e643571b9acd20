use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub sqlite_path: String,
    /// `None` means any origin is accepted.
    pub cors_origin: Option<String>,
    pub db_pool_size: u32,
    pub db_busy_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            server_port: parse_or(&lookup, "SERVER_PORT", 5001)?,
            sqlite_path: lookup("SQLITE_PATH")
                .unwrap_or_else(|| "./data/lessonbook.db".to_string()),
            cors_origin: lookup("CORS_ORIGIN").filter(|o| !o.is_empty()),
            db_pool_size: parse_or(&lookup, "DB_POOL_SIZE", 10)?,
            db_busy_timeout_ms: parse_or(&lookup, "DB_BUSY_TIMEOUT_MS", 5_000)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.server_port, 5001);
        assert_eq!(config.sqlite_path, "./data/lessonbook.db");
        assert!(config.cors_origin.is_none());
        assert_eq!(config.db_pool_size, 10);
        assert_eq!(config.db_busy_timeout_ms, 5_000);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_with(&[
            ("SERVER_PORT", "8080"),
            ("SQLITE_PATH", "/tmp/x.db"),
            ("CORS_ORIGIN", "http://localhost:3000"),
            ("DB_POOL_SIZE", "2"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.sqlite_path, "/tmp/x.db");
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.db_pool_size, 2);
    }

    #[test]
    fn empty_cors_origin_means_any() {
        let config = config_with(&[("CORS_ORIGIN", "")]).unwrap();
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_with(&[("SERVER_PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }
}
