//! Per-cycle health outcomes and the report that collects them

use crate::models::EndpointId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOutcome {
    pub endpoint_id: EndpointId,
    pub status: HealthStatus,
}

impl HealthOutcome {
    pub fn healthy(endpoint_id: EndpointId) -> Self {
        Self {
            endpoint_id,
            status: HealthStatus::Healthy,
        }
    }

    pub fn unhealthy(endpoint_id: EndpointId) -> Self {
        Self {
            endpoint_id,
            status: HealthStatus::Unhealthy,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Outcomes of one cycle, one per endpoint in the snapshot.
///
/// Serializes as an array of outcomes in snapshot order.
#[derive(Debug, Clone, Default)]
pub struct HealthReport {
    checked_at: DateTime<Utc>,
    order: Vec<EndpointId>,
    expected: HashSet<EndpointId>,
    outcomes: HashMap<EndpointId, HealthOutcome>,
}

impl HealthReport {
    /// Starts a report expecting exactly the given endpoints.
    pub(crate) fn for_cycle(order: Vec<EndpointId>) -> Self {
        Self {
            checked_at: Utc::now(),
            expected: order.iter().copied().collect(),
            outcomes: HashMap::with_capacity(order.len()),
            order,
        }
    }

    /// Stores an outcome for an expected endpoint. Unknown ids and repeats are ignored.
    pub(crate) fn record(&mut self, outcome: HealthOutcome) -> bool {
        if self.outcomes.contains_key(&outcome.endpoint_id)
            || !self.expected.contains(&outcome.endpoint_id)
        {
            return false;
        }
        self.outcomes.insert(outcome.endpoint_id, outcome);
        true
    }

    /// Marks every endpoint without an outcome as unhealthy.
    pub(crate) fn finalize(mut self) -> Self {
        for id in &self.order {
            self.outcomes
                .entry(*id)
                .or_insert_with(|| HealthOutcome::unhealthy(*id));
        }
        self
    }

    /// When the cycle started.
    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    pub fn get(&self, id: &EndpointId) -> Option<&HealthOutcome> {
        self.outcomes.get(id)
    }

    pub fn status_of(&self, id: &EndpointId) -> Option<HealthStatus> {
        self.get(id).map(|outcome| outcome.status)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HealthOutcome> {
        self.order.iter().filter_map(|id| self.outcomes.get(id))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn healthy_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_healthy()).count()
    }

    pub fn unhealthy_count(&self) -> usize {
        self.len() - self.healthy_count()
    }
}

impl Serialize for HealthReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
