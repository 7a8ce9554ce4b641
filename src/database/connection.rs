/// Database connection pool and schema auto-sync
///
/// One pool per process, created at startup and handed to the storage layer.
/// The engine is chosen by `DB_DRIVER`; every query goes through sqlx's `Any`
/// driver so the rest of the crate is engine-agnostic.

use super::driver::Driver;
use super::schema::TableSchema;
use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::{any::AnyPoolOptions, AnyPool};

/// Connected database: pool plus the dialect used to render SQL for it
#[derive(Debug, Clone)]
pub struct Database {
    /// Shared connection pool
    pool: AnyPool,
    /// Dialect of the connected engine
    driver: Driver,
}

impl Database {
    /// Connect to the configured engine
    ///
    /// In-memory SQLite is pinned to one never-expiring connection; every new
    /// connection would otherwise see its own empty database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let driver = config.driver;
        let url = driver.connection_url(&config.dsn);
        tracing::info!("🗄️ Connecting to {} database", driver);

        let options = if driver.is_in_memory(&url) {
            AnyPoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new().max_connections(10)
        };

        let pool = options
            .connect(&url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to database ({}): {}", driver, e))?;

        tracing::info!("✅ Database connection established ({})", driver);

        Ok(Self { pool, driver })
    }

    /// Create missing tables and indexes, in the given order
    ///
    /// Referenced tables must come before the tables that point at them.
    pub async fn sync_schema(&self, tables: &[TableSchema]) -> Result<()> {
        for table in tables {
            sqlx::query(&table.create_table_sql(self.driver))
                .execute(&self.pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create table '{}': {}", table.name, e))?;

            for statement in table.create_index_sql(self.driver) {
                sqlx::query(&statement).execute(&self.pool).await?;
            }
            tracing::debug!("📋 Table ready: {}", table.name);
        }

        tracing::info!("✅ Schema auto-sync complete ({} tables)", tables.len());
        Ok(())
    }

    /// Cheap round-trip used by the health endpoint
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }
}
