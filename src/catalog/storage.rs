/// Persistence gateway for catalog entities
///
/// Generic CRUD over every `Entity`: find, find-by-id, create, save, delete
/// and reference existence checks. Each call is a single statement; nothing
/// here opens a transaction.

use super::mapping::Entity;
use super::types::{Brand, Category, Product, SqlValue};
use crate::database::{Database, Driver};
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use sqlx::any::AnyArguments;
use sqlx::query::Query;
use sqlx::{Any, Row};

/// Offset/limit window for collection reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// sqlx-backed catalog storage
///
/// Cheap to clone: the pool inside is reference counted.
#[derive(Debug, Clone)]
pub struct CatalogStorage {
    db: Database,
}

type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

fn bind(query: AnyQuery<'_>, value: SqlValue) -> AnyQuery<'_> {
    match value {
        SqlValue::Int(v) => query.bind(v),
        SqlValue::Float(v) => query.bind(v),
        SqlValue::Text(v) => query.bind(v),
    }
}

fn now() -> SqlValue {
    SqlValue::Text(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

impl CatalogStorage {
    /// Create new storage instance over a connected database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create the catalog tables if missing
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS). Brands and
    /// categories go first because products reference them.
    pub async fn init_schema(&self) -> Result<()> {
        self.db
            .sync_schema(&[Brand::TABLE, Category::TABLE, Product::TABLE])
            .await
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn driver(&self) -> Driver {
        self.db.driver()
    }

    /// List records ordered by id, optionally windowed
    pub async fn find<E: Entity>(&self, page: Option<Page>) -> Result<Vec<E>> {
        let mut sql = format!("{} ORDER BY {}", E::select_sql(), E::ID_COLUMN);
        if let Some(page) = page {
            // Integers only, so inlining them is injection-safe
            sql.push_str(&format!(" LIMIT {} OFFSET {}", page.limit, page.offset));
        }

        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;
        rows.iter()
            .map(|row| E::from_row(row).map_err(anyhow::Error::from))
            .collect()
    }

    /// Retrieve a record by id
    pub async fn find_by_id<E: Entity>(&self, id: i64) -> Result<Option<E>> {
        let sql = format!(
            "{} WHERE {} = {}",
            E::select_sql(),
            E::ID_COLUMN,
            self.driver().placeholder(1)
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(E::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Insert a new record and return it as stored
    ///
    /// The identifier and both timestamps are assigned here.
    pub async fn create<E: Entity>(&self, input: &E::Input) -> Result<E> {
        let driver = self.driver();
        let mut columns: Vec<&str> = E::WRITABLE.to_vec();
        columns.extend(["created_at", "updated_at"]);

        let stamp = now();
        let mut values = E::values(input);
        values.push(stamp.clone());
        values.push(stamp);

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE.name,
            columns.join(", "),
            driver.placeholders(1, columns.len())
        );

        let id: i64 = if driver.supports_returning() {
            sql.push_str(" RETURNING id");
            let query = values.into_iter().fold(sqlx::query(&sql), bind);
            query.fetch_one(self.db.pool()).await?.try_get("id")?
        } else {
            let query = values.into_iter().fold(sqlx::query(&sql), bind);
            let result = query.execute(self.db.pool()).await?;
            result
                .last_insert_id()
                .ok_or_else(|| anyhow::anyhow!("{} did not report the inserted id", driver))?
        };

        tracing::debug!("📝 Inserted {} row {}", E::TABLE.name, id);

        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("{} row {} vanished after insert", E::TABLE.name, id))
    }

    /// Replace the mutable fields of an existing record
    ///
    /// Returns `None` when no row has this id.
    pub async fn save<E: Entity>(&self, id: i64, input: &E::Input) -> Result<Option<E>> {
        let driver = self.driver();
        let mut assignments: Vec<String> = E::WRITABLE
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = {}", column, driver.placeholder(i + 1)))
            .collect();
        let next = assignments.len() + 1;
        assignments.push(format!("updated_at = {}", driver.placeholder(next)));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = {}",
            E::TABLE.name,
            assignments.join(", "),
            driver.placeholder(next + 1)
        );

        let mut values = E::values(input);
        values.push(now());
        values.push(SqlValue::Int(id));

        let query = values.into_iter().fold(sqlx::query(&sql), bind);
        let result = query.execute(self.db.pool()).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    /// Delete a record by id
    ///
    /// Returns whether a row was removed.
    pub async fn delete<E: Entity>(&self, id: i64) -> Result<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE id = {}",
            E::TABLE.name,
            self.driver().placeholder(1)
        );

        let result = sqlx::query(&sql).bind(id).execute(self.db.pool()).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether `table` has a row with this id (foreign reference check)
    pub async fn exists(&self, table: &str, id: i64) -> Result<bool> {
        let sql = format!(
            "SELECT id FROM {} WHERE id = {}",
            table,
            self.driver().placeholder(1)
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.is_some())
    }
}
