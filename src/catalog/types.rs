/// Catalog entity definitions
///
/// Records returned by the API, the write payloads accepted by it, and the
/// explicit table definitions used for schema auto-sync.

use crate::database::{Column, ColumnType, ForeignKey, TableSchema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A product brand or manufacturer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    /// Server-assigned identifier
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Apple")]
    pub name: String,
    #[schema(example = "https://example.com/apple.png")]
    pub cover_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A grouping for products in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Server-assigned identifier
    #[schema(example = 2)]
    pub id: i64,
    #[schema(example = "Smartphones")]
    pub title: String,
    #[schema(example = "https://example.com/smartphones.jpg")]
    pub cover_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog product with its category and brand preloaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Server-assigned identifier
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "iPhone 14")]
    pub name: String,
    #[schema(example = "Latest Apple smartphone")]
    pub description: String,
    #[schema(example = 999.99)]
    pub price: f64,
    #[schema(example = "https://example.com/iphone14.jpg")]
    pub cover_image: String,
    #[schema(example = 2)]
    pub category_id: i64,
    pub category: Category,
    #[schema(example = 1)]
    pub brand_id: i64,
    pub brand: Brand,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write payload for brands (POST/PUT body)
///
/// Missing fields default to empty so the validator reports them by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BrandInput {
    #[schema(example = "Apple")]
    pub name: String,
    #[schema(example = "https://example.com/apple.png")]
    pub cover_image: String,
}

/// Write payload for categories (POST/PUT body)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CategoryInput {
    #[schema(example = "Smartphones")]
    pub title: String,
    #[schema(example = "https://example.com/smartphones.jpg")]
    pub cover_image: String,
}

/// Write payload for products (POST/PUT body)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProductInput {
    #[schema(example = "iPhone 14")]
    pub name: String,
    #[schema(example = "Latest Apple smartphone")]
    pub description: String,
    #[schema(example = 999.99)]
    pub price: f64,
    #[schema(example = "https://example.com/iphone14.jpg")]
    pub cover_image: String,
    #[schema(example = 2)]
    pub category_id: i64,
    #[schema(example = 1)]
    pub brand_id: i64,
}

/// A value bound into an INSERT/UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Float(f64),
    Text(String),
}

pub const BRANDS: TableSchema = TableSchema {
    name: "brands",
    columns: &[
        Column { name: "id", kind: ColumnType::Identity },
        Column { name: "name", kind: ColumnType::ShortText },
        Column { name: "cover_image", kind: ColumnType::LongText },
        Column { name: "created_at", kind: ColumnType::Timestamp },
        Column { name: "updated_at", kind: ColumnType::Timestamp },
    ],
    foreign_keys: &[],
};

pub const CATEGORIES: TableSchema = TableSchema {
    name: "categories",
    columns: &[
        Column { name: "id", kind: ColumnType::Identity },
        Column { name: "title", kind: ColumnType::ShortText },
        Column { name: "cover_image", kind: ColumnType::LongText },
        Column { name: "created_at", kind: ColumnType::Timestamp },
        Column { name: "updated_at", kind: ColumnType::Timestamp },
    ],
    foreign_keys: &[],
};

// No ON DELETE rule: removing a referenced brand/category is refused by the engine
pub const PRODUCTS: TableSchema = TableSchema {
    name: "products",
    columns: &[
        Column { name: "id", kind: ColumnType::Identity },
        Column { name: "name", kind: ColumnType::ShortText },
        Column { name: "description", kind: ColumnType::LongText },
        Column { name: "price", kind: ColumnType::Decimal },
        Column { name: "cover_image", kind: ColumnType::LongText },
        Column { name: "category_id", kind: ColumnType::Reference },
        Column { name: "brand_id", kind: ColumnType::Reference },
        Column { name: "created_at", kind: ColumnType::Timestamp },
        Column { name: "updated_at", kind: ColumnType::Timestamp },
    ],
    foreign_keys: &[
        ForeignKey { column: "category_id", table: "categories" },
        ForeignKey { column: "brand_id", table: "brands" },
    ],
};
