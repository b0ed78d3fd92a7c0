//! Endpoint registry abstraction injected into the HTTP layer

use crate::error::Result;
use crate::models::{Endpoint, EndpointDescriptor, EndpointId, NewEndpoint};
use async_trait::async_trait;

#[async_trait]
pub trait EndpointRegistry: Send + Sync {
    async fn create(&self, input: NewEndpoint) -> Result<Endpoint>;
    async fn get_by_id(&self, id: EndpointId) -> Result<Option<Endpoint>>;
    async fn update(&self, id: EndpointId, input: NewEndpoint) -> Result<Endpoint>;
    async fn delete(&self, id: EndpointId) -> Result<()>;
    /// All endpoints, oldest first.
    async fn list(&self) -> Result<Vec<Endpoint>>;
    async fn count(&self) -> Result<i64>;

    /// Verifies the backing store is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Short label for logs and the liveness route.
    fn backend(&self) -> &'static str;

    /// Descriptors for one health check cycle.
    async fn snapshot(&self) -> Result<Vec<EndpointDescriptor>> {
        let endpoints = self.list().await?;
        Ok(endpoints.iter().map(Endpoint::descriptor).collect())
    }
}
