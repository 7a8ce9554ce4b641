/// Explicit table definitions and their DDL rendering
///
/// Each entity declares its table as a `TableSchema` constant; schema
/// auto-sync renders it for the active dialect. Additive only: existing tables
/// are left untouched.

use super::driver::{ColumnType, Driver};

/// A single column definition
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
}

/// A foreign key from `column` to `table(id)`, without cascade rules
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub table: &'static str,
}

/// Table definition used for schema auto-sync
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    /// `CREATE TABLE IF NOT EXISTS` statement for this dialect
    pub fn create_table_sql(&self, driver: Driver) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!("{} {}", column.name, driver.column_type(column.kind)))
            .collect();

        parts.extend(self.foreign_keys.iter().map(|fk| {
            format!("FOREIGN KEY ({}) REFERENCES {}(id)", fk.column, fk.table)
        }));

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            parts.join(",\n    ")
        )
    }

    /// Lookup indexes for the foreign key columns
    ///
    /// MySQL indexes foreign keys implicitly and has no `CREATE INDEX IF NOT EXISTS`.
    pub fn create_index_sql(&self, driver: Driver) -> Vec<String> {
        if driver == Driver::Mysql {
            return Vec::new();
        }
        self.foreign_keys
            .iter()
            .map(|fk| {
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column})",
                    table = self.name,
                    column = fk.column
                )
            })
            .collect()
    }
}
