//! PostgreSQL implementation of the record store contract.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::RecordStore;
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::{AdminEmail, Company};

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.url)
        .await?;

    tracing::info!("Successfully connected to PostgreSQL");

    Ok(pool)
}

/// Run database migrations for the two tables the core consumes.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

/// PostgreSQL record store.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_admin_email(&self, email: &str) -> Result<Option<AdminEmail>, StoreError> {
        sqlx::query_as::<_, AdminEmail>(
            "SELECT id, email, created_at FROM admin_emails WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn find_company_by_user(&self, user_id: &str) -> Result<Option<Company>, StoreError> {
        sqlx::query_as::<_, Company>(
            "SELECT id, user_id, name, verified, created_at FROM companies WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn insert_company(&self, company: &Company) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, user_id, name, verified, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(company.id)
        .bind(&company.user_id)
        .bind(&company.name)
        .bind(company.verified)
        .bind(company.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }
}

fn map_sqlx_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::UniqueViolation
        }
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => StoreError::Unavailable(e.to_string()),
        other => StoreError::Other(anyhow::Error::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL
    async fn test_create_pool() {
        let config = DatabaseConfig {
            url: "postgres://localhost/placehub_test".to_string(),
            max_connections: 5,
            min_connections: 1,
        };

        let result = create_pool(&config).await;
        assert!(result.is_ok());
    }
}
