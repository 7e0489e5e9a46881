use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

/// Application configuration, loaded from files and environment variables
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    pub database_url: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub db_connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub db_idle_timeout_secs: u64,

    #[serde(default = "default_acquire_timeout")]
    pub db_acquire_timeout_secs: u64,

    /// Comma-separated list of allowed CORS origins. Unset means permissive.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    100
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_acquire_timeout() -> u64 {
    8
}

impl AppConfig {
    /// Builds a config programmatically, mainly for tests.
    pub fn new(database_url: &str, host: &str, port: u16, environment: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            host: host.to_string(),
            port,
            environment: environment.to_string(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            db_max_connections: default_max_connections(),
            db_min_connections: default_min_connections(),
            db_connect_timeout_secs: default_connect_timeout(),
            db_idle_timeout_secs: default_idle_timeout(),
            db_acquire_timeout_secs: default_acquire_timeout(),
            cors_allowed_origins: None,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Loads configuration from `config/default.toml`, an environment-specific
/// overlay, and `APP__`-prefixed environment variables, in that order.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

/// Initializes the tracing subscriber. `json` switches the output format
/// for log aggregation in deployed environments.
pub fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "kstores_api={level},tower_http=info,sea_orm=warn"
        ))
    });

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_defaults() {
        let cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 8080, "test");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.auto_migrate);
        assert_eq!(cfg.server_addr(), "127.0.0.1:8080");
        assert!(!cfg.is_development());
    }
}
