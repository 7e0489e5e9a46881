use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::AppConfig;

pub mod search;

pub type DbPool = DatabaseConnection;

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            max_connections: 100,
            min_connections: 5,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    establish_connection_with_config(database_url, DbConfig::default()).await
}

pub async fn establish_connection_with_config(
    database_url: &str,
    config: DbConfig,
) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(database_url.to_string());
    opts.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .acquire_timeout(config.acquire_timeout)
        .sqlx_logging(false);

    let db = Database::connect(opts).await?;
    info!("Database connection established");
    Ok(db)
}

pub async fn establish_connection_from_app_config(
    cfg: &AppConfig,
) -> Result<DatabaseConnection, DbErr> {
    establish_connection_with_config(&cfg.database_url, DbConfig::from(cfg)).await
}

/// Applies all pending migrations
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    crate::migrator::Migrator::up(db, None).await?;
    info!("Database migrations applied");
    Ok(())
}

pub async fn check_connection(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.ping().await
}
