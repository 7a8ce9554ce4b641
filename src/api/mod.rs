/// HTTP API Layer
///
/// This module provides the REST surface of the catalog service. It handles:
/// - Product, category and brand CRUD under `/api/v1`
/// - The response envelope and the error taxonomy
/// - Health reporting, the OpenAPI document and its Scalar UI

// Uniform {status, status_code, data, message} wrapper
pub mod envelope;

// ApiError -> envelope mapping
pub mod error;

// Generic CRUD handlers and the per-entity Resource descriptors
pub mod resources;

// GET /health
pub mod health;

// OpenAPI document generation
pub mod docs;

use crate::catalog::{Brand, CatalogStorage, Category, Product};
use axum::{response::Json, routing::get, Router};
use std::time::Instant;
use utoipa_scalar::{Scalar, Servable};

pub use envelope::Envelope;
pub use error::{ApiError, ApiResult};
pub use resources::{resource_routes, PageQuery, Resource};

pub const API_PREFIX: &str = "/api/v1";

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Catalog persistence gateway
    pub storage: CatalogStorage,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(storage: CatalogStorage) -> Self {
        Self {
            storage,
            started_at: Instant::now(),
        }
    }
}

/// Create the catalog routes
///
/// Entity CRUD nested under `/api/v1`, plus `/health`, the OpenAPI document
/// and the interactive docs at `/swagger`. The 404 fallback is attached by
/// the server so middleware wraps it too.
pub fn create_catalog_routes() -> Router<AppState> {
    let entities = Router::new()
        .merge(resource_routes::<Product>())
        .merge(resource_routes::<Category>())
        .merge(resource_routes::<Brand>());

    let openapi = docs::openapi_document();
    let document = openapi.clone();

    Router::new()
        .nest(API_PREFIX, entities)
        .route("/health", get(health::health))
        .route(
            "/swagger/openapi.json",
            get(move || {
                let document = document.clone();
                async move { Json(document) }
            }),
        )
        .merge(Scalar::with_url("/swagger", openapi))
}
