/// Configuration management for the catalog API
///
/// Reads `.env` and the process environment into an immutable `Config`.
/// Every key has a default; malformed values abort startup.

use crate::database::Driver;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Startup configuration errors (always fatal)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A key was present but could not be parsed
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// DB_DRIVER names an engine we cannot talk to
    #[error("unsupported DB driver: {0}")]
    UnsupportedDriver(String),
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Database selection and connection string
    pub database: DatabaseConfig,
    /// CORS, security header and rate limiter settings
    pub security: SecurityConfig,
    /// Log output configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
    /// Deployment environment name ("production" switches on the hardened middleware set)
    pub environment: String,
}

impl ServerConfig {
    /// Whether the production middleware set applies
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Relational engine behind the persistence gateway
    pub driver: Driver,
    /// Driver-specific connection string (a bare file path works for SQLite)
    pub dsn: String,
}

/// Browser-facing hardening: CORS, security headers, rate limiting
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Allowed CORS origins in production (empty disables CORS there)
    pub frontend_origins: Vec<String>,
    /// Whether CORS responses allow credentials
    pub cors_allow_credentials: bool,
    /// Requests allowed per client per window
    pub rate_limit_max: u32,
    /// Fixed rate limit window
    pub rate_limit_window: Duration,
    /// Emit security headers in production
    pub enable_security_headers: bool,
    /// Enforce the rate limiter in production
    pub enable_rate_limiter: bool,
}

/// Log output configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Mirror log output into `file_path`
    pub log_to_file: bool,
    /// Target file for mirrored logs
    pub file_path: String,
}

/// Merge `.env` into the process environment (existing variables win)
///
/// Returns the file that was loaded. A missing `.env` is normal in
/// containers, so it is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Call `load_dotenv` first if `.env` values should be visible here.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// PURE: no process state is touched, so tests can feed a HashMap.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let driver_name = get("DB_DRIVER").unwrap_or_else(|| "sqlite".to_string());
        let driver = driver_name
            .parse::<Driver>()
            .map_err(|_| ConfigError::UnsupportedDriver(driver_name.clone()))?;

        let window_raw = get("RATE_LIMIT_WINDOW").unwrap_or_else(|| "1m".to_string());
        let rate_limit_window = humantime::parse_duration(&window_raw).map_err(|e| {
            ConfigError::InvalidValue {
                key: "RATE_LIMIT_WINDOW",
                value: window_raw.clone(),
                reason: e.to_string(),
            }
        })?;
        if rate_limit_window.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "RATE_LIMIT_WINDOW",
                value: window_raw,
                reason: "window must be longer than zero".to_string(),
            });
        }

        let frontend_origins = get("FRONTEND_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server: ServerConfig {
                host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_number("APP_PORT", get("APP_PORT"), 8080)?,
                environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            },
            database: DatabaseConfig {
                driver,
                dsn: get("DB_DSN").unwrap_or_else(|| "catalog.db".to_string()),
            },
            security: SecurityConfig {
                frontend_origins,
                cors_allow_credentials: parse_bool(
                    "CORS_ALLOW_CREDENTIALS",
                    get("CORS_ALLOW_CREDENTIALS"),
                    true,
                )?,
                rate_limit_max: parse_number("RATE_LIMIT_MAX", get("RATE_LIMIT_MAX"), 100)?,
                rate_limit_window,
                enable_security_headers: parse_bool("ENABLE_HELMET", get("ENABLE_HELMET"), true)?,
                enable_rate_limiter: parse_bool(
                    "ENABLE_RATE_LIMITER",
                    get("ENABLE_RATE_LIMITER"),
                    true,
                )?,
            },
            logging: LoggingConfig {
                log_to_file: parse_bool("LOG_TO_FILE", get("LOG_TO_FILE"), true)?,
                file_path: get("LOG_FILE").unwrap_or_else(|| "logs/server.log".to_string()),
            },
        })
    }

    /// Log the resolved configuration (DSN excluded, it may carry credentials)
    pub fn log_summary(&self) {
        tracing::info!("📋 Loaded configuration:");
        tracing::info!("   APP_PORT: {}", self.server.port);
        tracing::info!("   ENVIRONMENT: {}", self.server.environment);
        tracing::info!("   DB_DRIVER: {}", self.database.driver);
        tracing::info!("   LOG_TO_FILE: {}", self.logging.log_to_file);
        tracing::info!("   FRONTEND_ORIGINS: {:?}", self.security.frontend_origins);
        tracing::info!("   RATE_LIMIT_MAX: {}", self.security.rate_limit_max);
        tracing::info!(
            "   RATE_LIMIT_WINDOW: {}",
            humantime::format_duration(self.security.rate_limit_window)
        );
        tracing::info!("   ENABLE_HELMET: {}", self.security.enable_security_headers);
        tracing::info!("   ENABLE_RATE_LIMITER: {}", self.security.enable_rate_limiter);
    }
}

fn parse_bool(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn parse_number<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
