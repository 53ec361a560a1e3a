//! Conformance run orchestration.
//!
//! A run moves `NotStarted → Running(0) → … → Running(n-1) → Completed`.
//! Checks execute strictly one after another, each exactly once. Nothing a
//! check does can abort the run: transport errors and contract violations
//! both end up as a failed [`CheckResult`].

use crate::checks::{CheckDefinition, CheckRegistry};
use crate::error::{ConformanceError, ConformanceResult};
use crate::expectation::Interpretation;
use crate::probe::ProbeClient;
use crate::report::ConformanceReport;
use crate::types::{CheckResult, ConformanceConfig};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Progress sink notified at every state transition of a run.
pub trait RunObserver {
    /// The run is about to execute `total` checks against `target`.
    fn run_started(&mut self, _target: &str, _total: usize) {}

    /// Check number `position` (zero-based) is about to execute.
    fn check_started(&mut self, _position: usize, _total: usize, _check: &CheckDefinition) {}

    /// A check produced its result.
    fn check_finished(&mut self, _result: &CheckResult) {}

    /// Every check has a result.
    fn run_completed(&mut self, _report: &ConformanceReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

/// Runs the registered checks against one target.
pub struct ConformanceRunner {
    client: ProbeClient,
    registry: CheckRegistry,
}

impl ConformanceRunner {
    /// Runner over the standard registry, filtered and adjusted per `config`.
    pub fn new(config: &ConformanceConfig) -> ConformanceResult<Self> {
        Self::with_registry(config, CheckRegistry::standard())
    }

    /// Runner over a caller-supplied registry.
    pub fn with_registry(
        config: &ConformanceConfig,
        registry: CheckRegistry,
    ) -> ConformanceResult<Self> {
        let client = ProbeClient::new(&config.base_url)?;
        let mut registry = registry.select(&config.check_ids)?;
        if let Some(timeout) = config.timeout_override {
            if timeout.is_zero() {
                return Err(ConformanceError::InvalidConfiguration(
                    "timeout override must be greater than zero".into(),
                ));
            }
            registry = registry.with_timeout(timeout);
        }
        if registry.is_empty() {
            return Err(ConformanceError::InvalidConfiguration(
                "no checks registered".into(),
            ));
        }
        Ok(Self { client, registry })
    }

    /// Normalized target base URL.
    pub fn target(&self) -> &str {
        self.client.base_url()
    }

    /// Checks this runner will execute, in order.
    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Execute every check once, without progress output.
    pub async fn run(&self) -> ConformanceReport {
        self.run_with(&mut SilentObserver).await
    }

    /// Execute every check once, reporting progress to `observer`.
    pub async fn run_with(&self, observer: &mut dyn RunObserver) -> ConformanceReport {
        let started_at = Utc::now();
        let total = self.registry.len();
        info!(target_url = %self.target(), total, "conformance run started");
        observer.run_started(self.target(), total);

        let mut results = Vec::with_capacity(total);
        for (position, check) in self.registry.iter().enumerate() {
            observer.check_started(position, total, check);
            let result = self.execute(check).await;
            observer.check_finished(&result);
            results.push(result);
        }

        let report =
            ConformanceReport::from_results(self.target(), results, started_at, Utc::now());
        info!(
            passed = report.summary.passed,
            total = report.summary.total,
            "conformance run completed"
        );
        observer.run_completed(&report);
        report
    }

    /// Execute a single check: one exchange, one interpretation.
    pub async fn execute(&self, check: &CheckDefinition) -> CheckResult {
        let started = Instant::now();
        let exchange = self.client.send(&check.request).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let response = match exchange {
            Ok(response) => response,
            Err(err) => {
                warn!(check = %check.id, error = %err, "probe did not complete");
                return CheckResult::transport_error(check, err.to_string(), latency_ms);
            }
        };

        match check.expectation.evaluate(&response) {
            Ok(Interpretation::Satisfied(details)) => {
                debug!(check = %check.id, status = response.status, "contract held");
                CheckResult::pass(check, details, latency_ms)
            }
            Ok(Interpretation::Violated(details)) => {
                debug!(check = %check.id, status = response.status, "contract violated");
                CheckResult::violation(check, details, latency_ms)
            }
            Err(err) => {
                warn!(check = %check.id, error = %err, "response could not be decoded");
                CheckResult::transport_error(check, err.to_string(), latency_ms)
            }
        }
    }
}
