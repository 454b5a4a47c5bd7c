use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Which [`crate::meals::MealStore`] adapter backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown store backend {:?}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is Postgres.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub cookie_secure: bool,
    /// `tracing_subscriber` directive string, from `RUST_LOG`.
    pub log_filter: String,
    /// One JSON object per event instead of human-readable lines.
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            store_backend: StoreBackend::Postgres,
            database_url: None,
            db_max_connections: 10,
            cookie_secure: false,
            log_filter: "dietlog=debug,axum=info,tower_http=info".into(),
            json_logs: false,
        }
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: ToString,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key, e.to_string())),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let store_backend = parsed(&lookup, "STORE_BACKEND", defaults.store_backend)?;
        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL"));
        }
        Ok(Self {
            host: lookup("APP_HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "APP_PORT", defaults.port)?,
            store_backend,
            database_url,
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            cookie_secure: parsed(&lookup, "COOKIE_SECURE", defaults.cookie_secure)?,
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
            json_logs: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(matches!(config(&[]), Err(ConfigError::MissingVar("DATABASE_URL"))));
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/dietlog")]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.db_max_connections, 10);
        assert!(!cfg.cookie_secure);
        assert_eq!(cfg.log_filter, "dietlog=debug,axum=info,tower_http=info");
        assert!(!cfg.json_logs);
    }

    #[test]
    fn logging_settings_come_from_env() {
        let cfg = config(&[
            ("STORE_BACKEND", "memory"),
            ("RUST_LOG", "dietlog=trace"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(cfg.log_filter, "dietlog=trace");
        assert!(cfg.json_logs);

        let cfg = config(&[("STORE_BACKEND", "memory"), ("LOG_FORMAT", "pretty")]).unwrap();
        assert!(!cfg.json_logs);
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let cfg = config(&[("STORE_BACKEND", "memory"), ("APP_PORT", "3000"), ("COOKIE_SECURE", "true")])
            .unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::Memory);
        assert_eq!(cfg.port, 3000);
        assert!(cfg.cookie_secure);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = config(&[("STORE_BACKEND", "memory"), ("APP_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("APP_PORT", _)));
        let err = config(&[("STORE_BACKEND", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("STORE_BACKEND", _)));
    }
}
