use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;

/// Opens the shared pool, checks the store answers, and creates the `todos`
/// table if it does not exist yet.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(connect_options(cfg))
        .await
        .context("failed to open database pool")?;

    db.ping().await.context("database ping failed")?;
    info!(
        max_connections = cfg.max_connections,
        min_idle = cfg.min_idle,
        "database connection established"
    );

    info!("syncing database schema from entities");
    db.get_schema_registry("todo_api::db::entities::*")
        .sync(&db)
        .await
        .context("failed to sync database schema")?;
    Ok(db)
}

pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .sqlx_logging(false);
    options
}

#[cfg(test)]
mod tests {
    use super::connect_options;
    use crate::config::DatabaseConfig;

    #[test]
    fn pool_options_follow_config() {
        let mut cfg = DatabaseConfig::new("postgres://localhost/todos");
        cfg.max_connections = 7;
        cfg.min_idle = 2;

        let options = connect_options(&cfg);

        assert_eq!(options.get_url(), "postgres://localhost/todos");
        assert_eq!(options.get_max_connections(), Some(7));
        assert_eq!(options.get_min_connections(), Some(2));
    }
}
