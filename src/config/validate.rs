use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.request_timeout_secs == 0 {
        errors.push("general.request_timeout_secs must be > 0".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.max_connections == 0 {
            errors.push("database.max_connections must be > 0".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }

        if database.max_lifetime_secs == 0 {
            errors.push("database.max_lifetime_secs must be > 0".to_string());
        }

        if database.connect_timeout_secs == 0 {
            errors.push("database.connect_timeout_secs must be > 0".to_string());
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::config::{AppConfig, DatabaseConfig};

    #[test]
    fn accepts_defaults() {
        validate(&AppConfig::default()).expect("defaults should be valid");
    }

    #[test]
    fn reports_every_violation_at_once() {
        let mut database = DatabaseConfig::new("  ");
        database.max_connections = 2;
        database.min_idle = 5;
        let mut cfg = AppConfig {
            database: Some(database),
            ..AppConfig::default()
        };
        cfg.general.request_timeout_secs = 0;

        let message = validate(&cfg).expect_err("config should be rejected").to_string();

        assert!(message.contains("general.request_timeout_secs must be > 0"));
        assert!(message.contains("database.url must not be empty"));
        assert!(message.contains("database.min_idle (5) must be <= database.max_connections (2)"));
    }
}
