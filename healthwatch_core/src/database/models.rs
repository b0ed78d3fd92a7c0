use crate::error::{AppError, Result};
use crate::models::Endpoint;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DbEndpoint {
    pub id: String,
    pub name: String,
    pub url: String,
    pub auth_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbEndpoint {
    pub fn into_endpoint(self) -> Result<Endpoint> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| AppError::Database(format!("Corrupt endpoint id '{}': {}", self.id, e)))?;

        Ok(Endpoint {
            id,
            name: self.name,
            url: self.url,
            auth_token: self.auth_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
