//! Single-endpoint HTTP probe

use crate::config::ProbeConfig;
use crate::error::{AppError, Result};
use crate::health::report::HealthOutcome;
use crate::models::EndpointDescriptor;
use crate::validation::rules::parse_endpoint_url;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Why a probe came back unhealthy. Never leaves the prober.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("endpoint unreachable: {0}")]
    UnreachableEndpoint(String),

    #[error("no response within {0:?}")]
    TimeoutExceeded(Duration),

    #[error("endpoint answered with HTTP {0}")]
    HttpErrorStatus(u16),

    #[error("more than {0} redirects")]
    RedirectLimitExceeded(usize),

    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),
}

impl ProbeFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeFailure::UnreachableEndpoint(_) => "unreachable",
            ProbeFailure::TimeoutExceeded(_) => "timeout",
            ProbeFailure::HttpErrorStatus(_) => "http_error_status",
            ProbeFailure::RedirectLimitExceeded(_) => "redirect_limit",
            ProbeFailure::MalformedDescriptor(_) => "malformed_descriptor",
        }
    }
}

#[async_trait]
pub trait Probe: Send + Sync {
    /// Checks one endpoint. Every failure mode is reported as an unhealthy outcome.
    async fn probe(&self, descriptor: &EndpointDescriptor, timeout: Duration) -> HealthOutcome;
}

#[derive(Clone)]
pub struct HttpProber {
    client: Client,
    max_redirects: usize,
}

impl HttpProber {
    pub fn new(max_redirects: usize) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::limited(max_redirects))
            .pool_max_idle_per_host(0)
            .user_agent(concat!("healthwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_redirects,
        })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Self::new(config.max_redirects)
    }

    /// Issues the GET and classifies the result without folding it.
    pub async fn check(
        &self,
        descriptor: &EndpointDescriptor,
        timeout: Duration,
    ) -> std::result::Result<StatusCode, ProbeFailure> {
        let url = parse_endpoint_url(&descriptor.url).map_err(|e| {
            ProbeFailure::MalformedDescriptor(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            )
        })?;

        let mut request = self.client.get(url).timeout(timeout);
        if let Some(token) = descriptor.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify(e, timeout))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ProbeFailure::HttpErrorStatus(status.as_u16()));
        }

        Ok(status)
    }

    fn classify(&self, err: reqwest::Error, timeout: Duration) -> ProbeFailure {
        if err.is_timeout() {
            ProbeFailure::TimeoutExceeded(timeout)
        } else if err.is_redirect() {
            ProbeFailure::RedirectLimitExceeded(self.max_redirects)
        } else if err.is_builder() {
            ProbeFailure::MalformedDescriptor(err.to_string())
        } else {
            ProbeFailure::UnreachableEndpoint(err.to_string())
        }
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, descriptor: &EndpointDescriptor, timeout: Duration) -> HealthOutcome {
        let start = Instant::now();
        let result = self.check(descriptor, timeout).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(status) => {
                debug!(
                    endpoint_id = %descriptor.id,
                    url = %descriptor.url,
                    status = status.as_u16(),
                    elapsed_ms,
                    "probe succeeded"
                );
                HealthOutcome::healthy(descriptor.id)
            }
            Err(failure) => {
                debug!(
                    endpoint_id = %descriptor.id,
                    url = %descriptor.url,
                    kind = failure.kind(),
                    error = %failure,
                    elapsed_ms,
                    "probe failed"
                );
                HealthOutcome::unhealthy(descriptor.id)
            }
        }
    }
}
