use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use configs::DatabaseConfig;

use crate::errors::ModelError;

/// Open a pooled connection using the `[database]` section of a service config.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    cfg.validate().map_err(|e| ModelError::Config(e.to_string()))?;

    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);

    let db = Database::connect(opts).await?;
    tracing::debug!(max = cfg.max_connections, min = cfg.min_connections, "database pool ready");
    Ok(db)
}

pub async fn test_connection(db: &DatabaseConnection) -> Result<(), ModelError> {
    db.ping().await?;
    Ok(())
}
