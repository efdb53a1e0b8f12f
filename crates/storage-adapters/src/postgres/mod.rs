//! # Postgres storage
//!
//! Scoring, listings and search live in the stored functions created by
//! `migrations/`; this module calls them and maps rows into domain models.

mod accounts;
mod boards;
mod comments;
mod posts;
mod rows;
mod votes;

use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info};

use domains::DomainError;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        info!(max_connections, "postgres pool ready");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Maps driver errors onto the domain: unique violations become conflicts,
/// foreign-key violations mean the referenced row is gone, anything else is
/// logged and reported as internal.
pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        let constraint = db.constraint().unwrap_or_default().to_string();
        match db.code().as_deref() {
            Some("23505") => return DomainError::Conflict(constraint),
            Some("23503") => return DomainError::NotFound("referenced row", constraint),
            _ => {}
        }
    }
    error!(error = %err, "database error");
    DomainError::internal(err)
}
