use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable must be set"))?;

        let max_connections: u32 = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let min_connections: u32 = env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        Ok(Self {
            url,
            max_connections,
            min_connections,
        })
    }

    /// In-memory SQLite lives inside a single connection, so the pool is pinned to one.
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite") && self.url.contains(":memory:")
    }

    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        let mut opt = ConnectOptions::new(self.url.clone());
        if self.is_in_memory() {
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(self.max_connections)
                .min_connections(self.min_connections);
        }
        opt.connect_timeout(Duration::from_secs(5))
            .sqlx_logging(true);

        Database::connect(opt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            max_connections: 10,
            min_connections: 1,
        }
    }

    #[test]
    fn detects_in_memory_sqlite() {
        assert!(config("sqlite::memory:").is_in_memory());
        assert!(!config("sqlite://ranker.db?mode=rwc").is_in_memory());
        assert!(!config("postgres://localhost/ranker").is_in_memory());
    }
}
