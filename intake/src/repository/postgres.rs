//! `PostgreSQL` registration repository.
//!
//! Rows live in the `details` table created by the embedded migrations.
//! Connections come from a sqlx pool: each query checks one out and the pool
//! takes it back when the query's future completes or is dropped, on every
//! exit path.
//!
//! # Example
//!
//! ```no_run
//! use problem_intake::config::DatabaseConfig;
//! use problem_intake::repository::PostgresRegistrationRepository;
//!
//! # async fn example(config: DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let repository = PostgresRegistrationRepository::connect_lazy(&config);
//! repository.migrate().await?;
//! # Ok(())
//! # }
//! ```

use super::{RegistrationRepository, RepositoryError, RepositoryFuture, Result};
use crate::config::DatabaseConfig;
use crate::options::ProblemOption;
use crate::registration::Registration;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// `PostgreSQL` registration repository.
#[derive(Debug, Clone)]
pub struct PostgresRegistrationRepository {
    /// `PostgreSQL` connection pool.
    pool: PgPool,
}

impl PostgresRegistrationRepository {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool that opens connections on first use.
    ///
    /// Nothing is dialled here, so the server can start (and render fail-open
    /// counts) while the database is still down.
    #[must_use]
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout))
            .connect_lazy_with(config.connect_options());

        Self::new(pool)
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::migrate::MigrateError::Execute(inner) => RepositoryError::from(inner),
                other => RepositoryError::Query(format!("Migration failed: {other}")),
            })
    }
}

impl RegistrationRepository for PostgresRegistrationRepository {
    fn count_by_problem(&self) -> RepositoryFuture<'_, Vec<(String, i64)>> {
        Box::pin(async move {
            let labels: Vec<String> = ProblemOption::ALL
                .iter()
                .map(|option| option.label().to_string())
                .collect();

            let rows: Vec<(String, i64)> = sqlx::query_as(
                r"
                SELECT problem_selected, COUNT(*)
                FROM details
                WHERE problem_selected = ANY($1)
                GROUP BY problem_selected
                ",
            )
            .bind(labels)
            .fetch_all(&self.pool)
            .await?;

            Ok(rows)
        })
    }

    fn insert<'a>(&'a self, registration: &'a Registration) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO details (name, email, phone, problem_selected)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(registration.name())
            .bind(registration.email())
            .bind(registration.phone())
            .bind(registration.problem().label())
            .execute(&self.pool)
            .await?;

            Ok(())
        })
    }

    fn ping(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
    }
}

/// SQLSTATE classes meaning the server could not be used at all:
/// `08` connection exception, `28` invalid authorization, `3D` unknown database,
/// `57P0x` server shutting down.
fn is_connectivity_sqlstate(code: &str) -> bool {
    ["08", "28", "3D", "57P0"]
        .iter()
        .any(|class| code.starts_with(class))
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(error.to_string()),
            sqlx::Error::Database(db)
                if db.code().is_some_and(|code| is_connectivity_sqlstate(&code)) =>
            {
                Self::Unavailable(error.to_string())
            }
            _ => Self::Query(error.to_string()),
        }
    }
}
