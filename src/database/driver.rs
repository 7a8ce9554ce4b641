/// Relational engine selection and SQL dialect rendering
///
/// The catalog talks to every engine through sqlx's `Any` driver, which passes
/// SQL through untouched. Everything that differs between engines (bind
/// placeholders, identity columns, column types) is rendered here.

use std::fmt;
use std::str::FromStr;

/// Supported relational engines, selected by the `DB_DRIVER` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Sqlite,
    Postgres,
    Mysql,
}

/// Returned when a driver name is not one of the supported engines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDriver(pub String);

impl FromStr for Driver {
    type Err = UnknownDriver;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            "postgres" | "postgresql" => Ok(Driver::Postgres),
            "mysql" => Ok(Driver::Mysql),
            other => Err(UnknownDriver(other.to_string())),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Driver::Sqlite => "sqlite",
            Driver::Postgres => "postgres",
            Driver::Mysql => "mysql",
        };
        f.write_str(name)
    }
}

impl Driver {
    /// Turn the configured DSN into a URL the `Any` driver can dispatch on
    ///
    /// SQLite accepts a bare file path (`catalog.db`), which becomes a
    /// create-if-missing URL. Postgres/MySQL DSNs must already be URLs.
    pub fn connection_url(&self, dsn: &str) -> String {
        match self {
            Driver::Sqlite if dsn.starts_with("sqlite:") => dsn.to_string(),
            Driver::Sqlite if dsn == ":memory:" => "sqlite::memory:".to_string(),
            Driver::Sqlite => format!("sqlite://{}?mode=rwc", dsn),
            Driver::Postgres | Driver::Mysql => dsn.to_string(),
        }
    }

    /// Whether the URL points at a private in-memory SQLite database
    pub fn is_in_memory(&self, url: &str) -> bool {
        matches!(self, Driver::Sqlite) && (url.contains(":memory:") || url.contains("mode=memory"))
    }

    /// Bind placeholder for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Driver::Postgres => format!("${}", index),
            Driver::Sqlite | Driver::Mysql => "?".to_string(),
        }
    }

    /// Comma-separated placeholders for parameters `start..start + count`
    pub fn placeholders(&self, start: usize, count: usize) -> String {
        (start..start + count)
            .map(|i| self.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether `INSERT ... RETURNING id` is available
    pub fn supports_returning(&self) -> bool {
        !matches!(self, Driver::Mysql)
    }

    /// Render an engine-neutral column type for this dialect
    pub fn column_type(&self, column: ColumnType) -> &'static str {
        match (self, column) {
            (Driver::Sqlite, ColumnType::Identity) => "INTEGER PRIMARY KEY AUTOINCREMENT",
            (Driver::Postgres, ColumnType::Identity) => "BIGSERIAL PRIMARY KEY",
            (Driver::Mysql, ColumnType::Identity) => "BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY",

            (Driver::Sqlite, ColumnType::Reference) => "INTEGER NOT NULL",
            (_, ColumnType::Reference) => "BIGINT NOT NULL",

            (Driver::Sqlite, ColumnType::ShortText) => "TEXT NOT NULL",
            (_, ColumnType::ShortText) => "VARCHAR(100) NOT NULL",

            (_, ColumnType::LongText) => "TEXT NOT NULL",

            (Driver::Sqlite, ColumnType::Decimal) => "REAL NOT NULL",
            (Driver::Postgres, ColumnType::Decimal) => "DOUBLE PRECISION NOT NULL",
            (Driver::Mysql, ColumnType::Decimal) => "DOUBLE NOT NULL",

            // RFC 3339 strings keep timestamps portable across the Any driver
            (Driver::Sqlite, ColumnType::Timestamp) => "TEXT NOT NULL",
            (_, ColumnType::Timestamp) => "VARCHAR(40) NOT NULL",
        }
    }
}

/// Engine-neutral column kinds used by the schema definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-assigned primary key
    Identity,
    /// Foreign key to another table's identity column
    Reference,
    /// Name/title up to 100 characters
    ShortText,
    /// Unbounded text (descriptions, URLs)
    LongText,
    /// Price
    Decimal,
    /// Creation/update instant
    Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_names_parse_case_insensitively() {
        assert_eq!("SQLite".parse::<Driver>(), Ok(Driver::Sqlite));
        assert_eq!("postgresql".parse::<Driver>(), Ok(Driver::Postgres));
        assert_eq!(" mysql ".parse::<Driver>(), Ok(Driver::Mysql));
        assert_eq!(
            "mssql".parse::<Driver>(),
            Err(UnknownDriver("mssql".to_string()))
        );
    }

    #[test]
    fn sqlite_paths_become_urls() {
        assert_eq!(
            Driver::Sqlite.connection_url("catalog.db"),
            "sqlite://catalog.db?mode=rwc"
        );
        assert_eq!(Driver::Sqlite.connection_url(":memory:"), "sqlite::memory:");
        assert_eq!(
            Driver::Sqlite.connection_url("sqlite::memory:"),
            "sqlite::memory:"
        );
        assert!(Driver::Sqlite.is_in_memory("sqlite::memory:"));
        assert!(!Driver::Sqlite.is_in_memory("sqlite://catalog.db?mode=rwc"));
    }

    #[test]
    fn placeholders_follow_the_dialect() {
        assert_eq!(Driver::Postgres.placeholders(2, 3), "$2, $3, $4");
        assert_eq!(Driver::Mysql.placeholders(1, 2), "?, ?");
        assert!(Driver::Sqlite.supports_returning());
        assert!(!Driver::Mysql.supports_returning());
    }
}
