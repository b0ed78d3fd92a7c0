//! Concurrent fan-out of probes over a registry snapshot

use crate::config::ProbeConfig;
use crate::health::prober::Probe;
use crate::health::report::{HealthOutcome, HealthReport};
use crate::models::EndpointDescriptor;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

/// Slack on top of the probe timeout before unsettled tasks are abandoned.
const SETTLE_GRACE: Duration = Duration::from_millis(250);

/// Runs one stateless health check cycle per `check_all` call.
///
/// Each descriptor gets its own task bounded by the probe timeout. Panicking or
/// abandoned tasks are reported as unhealthy, so the report always holds
/// exactly one outcome per distinct endpoint id. Dropping the returned future
/// aborts every outstanding probe.
#[derive(Clone)]
pub struct HealthCheckOrchestrator {
    prober: Arc<dyn Probe>,
    timeout: Duration,
    max_concurrency: Option<usize>,
}

impl HealthCheckOrchestrator {
    pub fn new(prober: Arc<dyn Probe>, timeout: Duration) -> Self {
        Self {
            prober,
            timeout,
            max_concurrency: None,
        }
    }

    pub fn from_config(prober: Arc<dyn Probe>, config: &ProbeConfig) -> Self {
        Self::new(prober, config.timeout()).with_max_concurrency(config.concurrency_limit())
    }

    /// Caps probes in flight per cycle. `None` or `Some(0)` means unbounded.
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.filter(|n| *n > 0);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn check_one(&self, descriptor: EndpointDescriptor) -> HealthOutcome {
        let id = descriptor.id;
        let report = self.check_all(vec![descriptor]).await;
        report
            .get(&id)
            .cloned()
            .unwrap_or_else(|| HealthOutcome::unhealthy(id))
    }

    pub async fn check_all(&self, descriptors: Vec<EndpointDescriptor>) -> HealthReport {
        let started = Instant::now();

        let mut seen = HashSet::with_capacity(descriptors.len());
        let descriptors: Vec<EndpointDescriptor> = descriptors
            .into_iter()
            .filter(|d| seen.insert(d.id))
            .collect();

        let mut report = HealthReport::for_cycle(descriptors.iter().map(|d| d.id).collect());
        if descriptors.is_empty() {
            debug!("no endpoints registered, skipping cycle");
            return report;
        }

        let total = descriptors.len();
        let deadline = started + self.cycle_budget(total);
        let limiter = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));

        let mut probes = JoinSet::new();
        for descriptor in descriptors {
            let prober = Arc::clone(&self.prober);
            let limiter = limiter.clone();
            let probe_timeout = self.timeout;

            probes.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };

                let id = descriptor.id;
                match timeout(probe_timeout, prober.probe(&descriptor, probe_timeout)).await {
                    Ok(outcome) if outcome.endpoint_id == id => outcome,
                    Ok(outcome) => {
                        warn!(
                            endpoint_id = %id,
                            reported_id = %outcome.endpoint_id,
                            "probe reported a different endpoint"
                        );
                        HealthOutcome::unhealthy(id)
                    }
                    Err(_) => {
                        debug!(endpoint_id = %id, timeout_ms = probe_timeout.as_millis() as u64, "probe timed out");
                        HealthOutcome::unhealthy(id)
                    }
                }
            });
        }

        loop {
            match timeout_at(deadline, probes.join_next()).await {
                Ok(Some(Ok(outcome))) => {
                    report.record(outcome);
                }
                Ok(Some(Err(err))) => {
                    warn!(error = %err, "probe task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        pending = probes.len(),
                        "cycle deadline passed, abandoning unsettled probes"
                    );
                    probes.abort_all();
                    break;
                }
            }
        }

        let report = report.finalize();
        info!(
            endpoints = total,
            healthy = report.healthy_count(),
            unhealthy = report.unhealthy_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "health check cycle complete"
        );
        report
    }

    /// Longest a cycle over `total` endpoints may take: one timeout per wave of
    /// concurrent probes, plus grace.
    fn cycle_budget(&self, total: usize) -> Duration {
        let waves = match self.max_concurrency {
            Some(limit) => total.div_ceil(limit),
            None => 1,
        };
        let waves = u32::try_from(waves).unwrap_or(u32::MAX);
        self.timeout.saturating_mul(waves).saturating_add(SETTLE_GRACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Probe for Noop {
        async fn probe(&self, descriptor: &EndpointDescriptor, _timeout: Duration) -> HealthOutcome {
            HealthOutcome::healthy(descriptor.id)
        }
    }

    #[test]
    fn test_cycle_budget() {
        let orchestrator = HealthCheckOrchestrator::new(Arc::new(Noop), Duration::from_secs(5));
        assert_eq!(orchestrator.cycle_budget(100), Duration::from_secs(5) + SETTLE_GRACE);

        let capped = orchestrator.with_max_concurrency(Some(10));
        assert_eq!(capped.cycle_budget(10), Duration::from_secs(5) + SETTLE_GRACE);
        assert_eq!(capped.cycle_budget(11), Duration::from_secs(10) + SETTLE_GRACE);
    }

    #[test]
    fn test_zero_cap_means_unbounded() {
        let orchestrator = HealthCheckOrchestrator::new(Arc::new(Noop), Duration::from_secs(1))
            .with_max_concurrency(Some(0));
        assert_eq!(orchestrator.max_concurrency, None);
    }
}
