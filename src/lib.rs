/// Catalog API: product, category and brand CRUD over HTTP
///
/// This library provides the service behind the binary: configuration,
/// a dialect-aware persistence gateway over SQLite, PostgreSQL or MySQL,
/// generic REST handlers and the middleware chain.

// Core configuration and setup
pub mod config;

// Tracing subscriber setup (stdout + optional log file)
pub mod logging;

// Database connection, driver dialects and schema auto-sync
pub mod database;

// Catalog domain layer - entities, validators and storage
pub mod catalog;

// HTTP API layer - envelope, error taxonomy, CRUD handlers, health and docs
pub mod api;

// Middleware chain - request log, recovery, CORS, security headers, rate limit
pub mod middleware;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use catalog::{Brand, Category, Product};
pub use config::Config;
pub use server::{create_app, start_server};
