//! In-memory endpoint registry

use crate::error::{AppError, Result};
use crate::models::{Endpoint, EndpointId, NewEndpoint};
use crate::registry::EndpointRegistry;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryStore {
    endpoints: Arc<RwLock<Vec<Endpoint>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: EndpointId) -> AppError {
    AppError::NotFound(format!("Endpoint with id {} not found", id))
}

#[async_trait]
impl EndpointRegistry for MemoryStore {
    async fn create(&self, input: NewEndpoint) -> Result<Endpoint> {
        let now = chrono::Utc::now();
        let endpoint = Endpoint {
            id: Uuid::new_v4(),
            name: input.name,
            url: input.url,
            auth_token: input.auth_token,
            created_at: now,
            updated_at: now,
        };

        self.endpoints.write().push(endpoint.clone());
        Ok(endpoint)
    }

    async fn get_by_id(&self, id: EndpointId) -> Result<Option<Endpoint>> {
        let endpoints = self.endpoints.read();
        Ok(endpoints.iter().find(|e| e.id == id).cloned())
    }

    async fn update(&self, id: EndpointId, input: NewEndpoint) -> Result<Endpoint> {
        let mut endpoints = self.endpoints.write();
        let endpoint = endpoints
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found(id))?;

        endpoint.name = input.name;
        endpoint.url = input.url;
        endpoint.auth_token = input.auth_token;
        endpoint.updated_at = chrono::Utc::now();

        Ok(endpoint.clone())
    }

    async fn delete(&self, id: EndpointId) -> Result<()> {
        let mut endpoints = self.endpoints.write();
        let position = endpoints
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| not_found(id))?;

        endpoints.remove(position);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Endpoint>> {
        Ok(self.endpoints.read().clone())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.endpoints.read().len() as i64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, url: &str) -> NewEndpoint {
        NewEndpoint {
            name: name.to_string(),
            url: url.to_string(),
            auth_token: None,
        }
    }

    #[tokio::test]
    async fn test_crud_round() {
        let store = MemoryStore::new();

        let created = store.create(input("Cat Facts", "https://catfact.ninja/fact")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let fetched = store.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let mut replacement = input("Dog CEO", "https://dog.ceo/api/breeds/image/random");
        replacement.auth_token = Some("token".to_string());
        let updated = store.update(created.id, replacement).await.unwrap();
        assert_eq!(updated.name, "Dog CEO");
        assert_eq!(updated.auth_token.as_deref(), Some("token"));
        assert_eq!(updated.created_at, created.created_at);

        store.delete(created.id).await.unwrap();
        assert!(store.get_by_id(created.id).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(store.delete(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            store.update(id, input("x", "http://x")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_keeps_insertion_order() {
        let store = MemoryStore::new();
        let first = store.create(input("a", "http://a.example")).await.unwrap();
        let second = store.create(input("b", "http://b.example")).await.unwrap();

        let snapshot = store.snapshot().await.unwrap();
        let ids: Vec<_> = snapshot.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
