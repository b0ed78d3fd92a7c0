//! Endpoint records, probe descriptors and the request schema that guards them

use crate::validation::rules::validate_endpoint_url;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub type EndpointId = Uuid;

/// Read-only view of an endpoint handed to the health core for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    pub id: EndpointId,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl EndpointDescriptor {
    /// Bearer credential to attach, if any. Blank tokens count as absent.
    pub fn bearer_token(&self) -> Option<&str> {
        normalize_token(self.auth_token.as_deref())
    }
}

/// Endpoint as stored by a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub id: EndpointId,
    pub name: String,
    pub url: String,
    pub auth_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Endpoint {
    pub fn descriptor(&self) -> EndpointDescriptor {
        EndpointDescriptor {
            id: self.id,
            name: self.name.clone(),
            url: self.url.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}

/// Registry input for create and full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEndpoint {
    pub name: String,
    pub url: String,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Name must not exceed 255 characters"))]
    pub name: String,

    #[validate(custom(function = "validate_endpoint_url"))]
    pub url: String,

    #[validate(length(max = 4096, message = "Auth token must not exceed 4096 characters"))]
    pub auth_token: Option<String>,
}

impl EndpointRequest {
    /// Trims the payload and falls back to the URL when no display name is given.
    pub fn into_input(self) -> NewEndpoint {
        let url = self.url.trim().to_string();
        let name = match self.name.trim() {
            "" => url.clone(),
            name => name.to_string(),
        };
        let auth_token = normalize_token(self.auth_token.as_deref()).map(str::to_string);

        NewEndpoint {
            name,
            url,
            auth_token,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResponse {
    pub id: EndpointId,
    pub name: String,
    pub url: String,
    pub has_auth_token: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Endpoint> for EndpointResponse {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            id: endpoint.id,
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            has_auth_token: endpoint.auth_token.is_some(),
            created_at: endpoint.created_at,
            updated_at: endpoint.updated_at,
        }
    }
}

fn normalize_token(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}
