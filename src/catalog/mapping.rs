/// Row <-> record mapping
///
/// Each entity names its table, the columns its payload writes, and how a
/// result row becomes a record. Product reads join their category and brand so
/// relations are always preloaded.

use super::types::{
    Brand, BrandInput, Category, CategoryInput, Product, ProductInput, SqlValue, BRANDS,
    CATEGORIES, PRODUCTS,
};
use crate::database::TableSchema;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::Row;

/// A persisted catalog record
pub trait Entity: Serialize + Send + Sync + Unpin + Sized + 'static {
    /// Write payload for POST/PUT
    type Input: DeserializeOwned + Send + Sync + 'static;

    /// Table definition used by schema auto-sync
    const TABLE: TableSchema;

    /// Columns written from the payload, in the order of `values`
    const WRITABLE: &'static [&'static str];

    /// Identifier column as referenced in `select_sql`
    const ID_COLUMN: &'static str = "id";

    /// Bind values for `WRITABLE`
    fn values(input: &Self::Input) -> Vec<SqlValue>;

    /// SELECT statement without WHERE/ORDER clauses
    fn select_sql() -> String;

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error>;
}

/// Timestamps are stored as RFC 3339 text for portability across engines
pub(crate) fn timestamp(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

impl Entity for Brand {
    type Input = BrandInput;
    const TABLE: TableSchema = BRANDS;
    const WRITABLE: &'static [&'static str] = &["name", "cover_image"];

    fn values(input: &BrandInput) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(input.name.clone()),
            SqlValue::Text(input.cover_image.clone()),
        ]
    }

    fn select_sql() -> String {
        "SELECT id, name, cover_image, created_at, updated_at FROM brands".to_string()
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Brand {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            cover_image: row.try_get("cover_image")?,
            created_at: timestamp(row, "created_at")?,
            updated_at: timestamp(row, "updated_at")?,
        })
    }
}

impl Entity for Category {
    type Input = CategoryInput;
    const TABLE: TableSchema = CATEGORIES;
    const WRITABLE: &'static [&'static str] = &["title", "cover_image"];

    fn values(input: &CategoryInput) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(input.title.clone()),
            SqlValue::Text(input.cover_image.clone()),
        ]
    }

    fn select_sql() -> String {
        "SELECT id, title, cover_image, created_at, updated_at FROM categories".to_string()
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Category {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            cover_image: row.try_get("cover_image")?,
            created_at: timestamp(row, "created_at")?,
            updated_at: timestamp(row, "updated_at")?,
        })
    }
}

impl Entity for Product {
    type Input = ProductInput;
    const TABLE: TableSchema = PRODUCTS;
    const WRITABLE: &'static [&'static str] = &[
        "name",
        "description",
        "price",
        "cover_image",
        "category_id",
        "brand_id",
    ];
    const ID_COLUMN: &'static str = "p.id";

    fn values(input: &ProductInput) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(input.name.clone()),
            SqlValue::Text(input.description.clone()),
            SqlValue::Float(input.price),
            SqlValue::Text(input.cover_image.clone()),
            SqlValue::Int(input.category_id),
            SqlValue::Int(input.brand_id),
        ]
    }

    fn select_sql() -> String {
        r#"SELECT
                p.id AS id, p.name AS name, p.description AS description,
                p.price AS price, p.cover_image AS cover_image,
                p.category_id AS category_id, p.brand_id AS brand_id,
                p.created_at AS created_at, p.updated_at AS updated_at,
                c.title AS category_title, c.cover_image AS category_cover_image,
                c.created_at AS category_created_at, c.updated_at AS category_updated_at,
                b.name AS brand_name, b.cover_image AS brand_cover_image,
                b.created_at AS brand_created_at, b.updated_at AS brand_updated_at
            FROM products p
            INNER JOIN categories c ON c.id = p.category_id
            INNER JOIN brands b ON b.id = p.brand_id"#
            .to_string()
    }

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        let category_id: i64 = row.try_get("category_id")?;
        let brand_id: i64 = row.try_get("brand_id")?;

        Ok(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            cover_image: row.try_get("cover_image")?,
            category_id,
            category: Category {
                id: category_id,
                title: row.try_get("category_title")?,
                cover_image: row.try_get("category_cover_image")?,
                created_at: timestamp(row, "category_created_at")?,
                updated_at: timestamp(row, "category_updated_at")?,
            },
            brand_id,
            brand: Brand {
                id: brand_id,
                name: row.try_get("brand_name")?,
                cover_image: row.try_get("brand_cover_image")?,
                created_at: timestamp(row, "brand_created_at")?,
                updated_at: timestamp(row, "brand_updated_at")?,
            },
            created_at: timestamp(row, "created_at")?,
            updated_at: timestamp(row, "updated_at")?,
        })
    }
}
