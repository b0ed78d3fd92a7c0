use crate::database::models::DbEndpoint;
use crate::error::{AppError, Result};
use crate::models::{Endpoint, EndpointId, NewEndpoint};
use crate::registry::EndpointRegistry;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const ENDPOINT_COLUMNS: &str = "id, name, url, auth_token, created_at, updated_at";

/// SQLite-backed endpoint registry.
#[derive(Clone)]
pub struct EndpointRepository {
    pool: SqlitePool,
}

impl EndpointRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EndpointRegistry for EndpointRepository {
    async fn create(&self, input: NewEndpoint) -> Result<Endpoint> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        let row = sqlx::query_as::<_, DbEndpoint>(&format!(
            r#"
            INSERT INTO endpoints (id, name, url, auth_token, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            ENDPOINT_COLUMNS
        ))
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.url)
        .bind(&input.auth_token)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        row.into_endpoint()
    }

    async fn get_by_id(&self, id: EndpointId) -> Result<Option<Endpoint>> {
        let row = sqlx::query_as::<_, DbEndpoint>(&format!(
            "SELECT {} FROM endpoints WHERE id = ?",
            ENDPOINT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        row.map(DbEndpoint::into_endpoint).transpose()
    }

    async fn update(&self, id: EndpointId, input: NewEndpoint) -> Result<Endpoint> {
        let row = sqlx::query_as::<_, DbEndpoint>(&format!(
            r#"
            UPDATE endpoints
            SET name = ?, url = ?, auth_token = ?, updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            ENDPOINT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.url)
        .bind(&input.auth_token)
        .bind(Utc::now())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        match row {
            Some(row) => row.into_endpoint(),
            None => Err(AppError::NotFound(format!("Endpoint with id {} not found", id))),
        }
    }

    async fn delete(&self, id: EndpointId) -> Result<()> {
        let result = sqlx::query("DELETE FROM endpoints WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Endpoint with id {} not found", id)));
        }

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Endpoint>> {
        let rows = sqlx::query_as::<_, DbEndpoint>(&format!(
            "SELECT {} FROM endpoints ORDER BY created_at ASC, rowid ASC",
            ENDPOINT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list endpoints: {}", e);
            AppError::from(e)
        })?;

        rows.into_iter().map(DbEndpoint::into_endpoint).collect()
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM endpoints")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;

        row.try_get("count").map_err(AppError::from)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
