/// Persistence plumbing
///
/// Engine selection, connection pooling and schema auto-sync. Entity-level
/// queries live in `catalog::storage`.

pub mod connection;
pub mod driver;
pub mod schema;

pub use connection::Database;
pub use driver::{ColumnType, Driver};
pub use schema::{Column, ForeignKey, TableSchema};
