//! Configuration management.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Variables that are set but cannot be parsed are reported instead of
//! silently falling back.

use sqlx::postgres::PgConnectOptions;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tower_cookies::Key;

/// Minimum length of `SESSION_SECRET`, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

/// Default session lifetime after the last write, in minutes.
pub const DEFAULT_SESSION_MAX_AGE_MINUTES: i64 = 30;

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set to something that does not parse.
    #[error("Invalid value {value:?} for {name}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// A variable that must be positive is zero or negative.
    #[error("{name} must be positive, got {value}")]
    NotPositive {
        /// Variable name
        name: &'static str,
        /// Parsed value
        value: i64,
    },

    /// The session secret is too short to sign cookies.
    #[error("SESSION_SECRET must be at least 64 bytes, got {len}")]
    SessionSecretTooShort {
        /// Length of the configured secret
        len: usize,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Session cookie configuration
    pub session: SessionConfig,
}

/// `PostgreSQL` configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Database user
    pub user: String,
    /// Database name
    pub database: String,
    /// Password, left out of the connect options when `None`
    pub password: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout: u64,
    /// Apply embedded migrations at start-up
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Connect options for the pool.
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            database: "problem_statement".to_string(),
            password: None,
            max_connections: 5,
            acquire_timeout: 5,
            run_migrations: true,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Session cookie configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret used to sign cookies; a random one is generated when `None`
    pub secret: Option<String>,
    /// Mark the cookie `Secure`
    pub secure_cookie: bool,
    /// Minutes a session stays valid after its last write
    pub max_age_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            secure_cookie: false,
            max_age_minutes: DEFAULT_SESSION_MAX_AGE_MINUTES,
        }
    }
}

impl SessionConfig {
    /// Signing key for session cookies.
    ///
    /// A configured secret is validated when the configuration is loaded, so
    /// only a missing secret leads to a generated key.
    #[must_use]
    pub fn key(&self) -> Key {
        match self.secret.as_deref().map(|secret| Key::try_from(secret.as_bytes())) {
            Some(Ok(key)) => key,
            _ => Key::generate(),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("secure_cookie", &self.secure_cookie)
            .field("max_age_minutes", &self.max_age_minutes)
            .finish()
    }
}

/// Parse `name` if set, otherwise use `default`.
fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// A set, non-empty value for `name`.
fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.is_empty())
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = DatabaseConfig::default();
        let database = DatabaseConfig {
            host: non_empty(&lookup, "DB_HOST").unwrap_or(db.host),
            port: parse_or(&lookup, "DB_PORT", db.port)?,
            user: non_empty(&lookup, "DB_USER").unwrap_or(db.user),
            database: non_empty(&lookup, "DB_NAME").unwrap_or(db.database),
            password: non_empty(&lookup, "DB_PASSWORD"),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", db.max_connections)?,
            acquire_timeout: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT", db.acquire_timeout)?,
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", db.run_migrations)?,
        };

        let srv = ServerConfig::default();
        let server = ServerConfig {
            host: non_empty(&lookup, "HOST").unwrap_or(srv.host),
            port: parse_or(&lookup, "PORT", srv.port)?,
        };

        let secret = non_empty(&lookup, "SESSION_SECRET");
        if let Some(secret) = &secret {
            if secret.len() < MIN_SESSION_SECRET_LEN {
                return Err(ConfigError::SessionSecretTooShort { len: secret.len() });
            }
        }
        let max_age_minutes = parse_or(
            &lookup,
            "SESSION_MAX_AGE_MINUTES",
            DEFAULT_SESSION_MAX_AGE_MINUTES,
        )?;
        if max_age_minutes <= 0 {
            return Err(ConfigError::NotPositive {
                name: "SESSION_MAX_AGE_MINUTES",
                value: max_age_minutes,
            });
        }
        let session = SessionConfig {
            secret,
            secure_cookie: parse_or(&lookup, "SESSION_SECURE_COOKIE", false)?,
            max_age_minutes,
        };

        Ok(Self {
            database,
            server,
            session,
        })
    }
}
