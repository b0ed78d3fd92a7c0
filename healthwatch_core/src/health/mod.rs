pub mod orchestrator;
pub mod prober;
pub mod report;


pub use orchestrator::HealthCheckOrchestrator;
pub use prober::{HttpProber, Probe, ProbeFailure};
pub use report::{HealthOutcome, HealthReport, HealthStatus};
