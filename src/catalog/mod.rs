/// Catalog domain layer
///
/// This module handles the catalog entities and their persistence:
/// - Type definitions (Brand, Category, Product and their write payloads)
/// - Hand-written validators
/// - Generic storage over sqlx's `Any` driver
/// - The `Entity` mapping that ties each record to its table

// Core catalog type definitions
pub mod types;

// Pure validation rules for write payloads
pub mod validation;

// Generic CRUD persistence gateway
pub mod storage;

// Row <-> record mapping for each entity
mod mapping;

pub use mapping::Entity;
pub use storage::{CatalogStorage, Page};
pub use types::{Brand, BrandInput, Category, CategoryInput, Product, ProductInput, SqlValue};
pub use validation::{ValidationErrors, Violation};
