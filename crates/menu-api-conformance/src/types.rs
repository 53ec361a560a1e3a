//! Core types for conformance runs.

use crate::checks::CheckDefinition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Base URL the harness targets when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://cardapio-3d.preview.emergentagent.com/api";

/// Stable identifier of a registered check (e.g. `liveness`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckId(pub String);

impl CheckId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category grouping for checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckCategory {
    /// The service answers and its data dependency is reachable.
    Availability,
    /// Incomplete input is rejected before any side effect.
    InputValidation,
    /// Unknown identifiers resolve to a clean "not found".
    Resolution,
    /// Browser-origin clients are allowed in.
    CrossOrigin,
}

impl CheckCategory {
    /// All categories in canonical order.
    pub fn all() -> &'static [CheckCategory] {
        &[
            Self::Availability,
            Self::InputValidation,
            Self::Resolution,
            Self::CrossOrigin,
        ]
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Availability => "Availability",
            Self::InputValidation => "Input Validation",
            Self::Resolution => "Identifier Resolution",
            Self::CrossOrigin => "Cross-Origin Policy",
        }
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Why a check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The exchange completed but the response broke the contract.
    ContractViolation,
    /// The exchange never completed, or the body could not be decoded.
    TransportError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractViolation => write!(f, "contract violation"),
            Self::TransportError => write!(f, "transport error"),
        }
    }
}

/// Result of executing a single check once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Which check was executed.
    pub id: CheckId,
    /// Display name of the check.
    pub name: String,
    /// Category the check belongs to.
    pub category: CheckCategory,
    /// Whether the contract held.
    pub passed: bool,
    /// Set when `passed` is false.
    pub failure: Option<FailureKind>,
    /// Echoed response, status, or error text.
    pub details: String,
    /// Wall-clock time spent on the probe.
    pub latency_ms: u64,
    /// When the check completed.
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    /// Create a passing result.
    pub fn pass(check: &CheckDefinition, details: impl Into<String>, latency_ms: u64) -> Self {
        Self::build(check, None, details.into(), latency_ms)
    }

    /// Create a result for a response that broke the contract.
    pub fn violation(check: &CheckDefinition, details: impl Into<String>, latency_ms: u64) -> Self {
        Self::build(
            check,
            Some(FailureKind::ContractViolation),
            details.into(),
            latency_ms,
        )
    }

    /// Create a result for an exchange that could not be completed.
    pub fn transport_error(
        check: &CheckDefinition,
        details: impl Into<String>,
        latency_ms: u64,
    ) -> Self {
        let mut details = details.into();
        if details.trim().is_empty() {
            details = "transport error with no diagnostic text".to_string();
        }
        Self::build(
            check,
            Some(FailureKind::TransportError),
            details,
            latency_ms,
        )
    }

    fn build(
        check: &CheckDefinition,
        failure: Option<FailureKind>,
        details: String,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: check.id.clone(),
            name: check.name.to_string(),
            category: check.category,
            passed: failure.is_none(),
            failure,
            details,
            latency_ms,
            checked_at: Utc::now(),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "[{}] {} - {}", status, self.id, self.name)?;
        if let Some(kind) = self.failure {
            write!(f, " [{}]", kind)?;
        }
        if !self.details.is_empty() {
            write!(f, " ({})", self.details)?;
        }
        Ok(())
    }
}

/// Configuration for a conformance run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceConfig {
    /// Base URL of the API under test, including the `/api` prefix.
    pub base_url: String,
    /// Restrict the run to these checks (empty = all, in registry order).
    pub check_ids: Vec<CheckId>,
    /// Replace every check's own timeout.
    pub timeout_override: Option<Duration>,
}

impl ConformanceConfig {
    /// Config targeting `base_url` with every check enabled.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            check_ids: Vec::new(),
            timeout_override: None,
        }
    }

    /// Restrict the run to the given check ids.
    pub fn with_checks<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check_ids = ids.into_iter().map(|id| CheckId::new(id.as_ref())).collect();
        self
    }

    /// Override every check's timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// All-or-nothing reduction of a run's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Number of passing results.
    pub passed: usize,
    /// Number of results.
    pub total: usize,
}

impl Verdict {
    /// Reduce a result list.
    pub fn from_results(results: &[CheckResult]) -> Self {
        Self::from_outcomes(results.iter().map(|r| r.passed))
    }

    /// Reduce a sequence of pass/fail outcomes.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = bool>) -> Self {
        let (passed, total) = outcomes
            .into_iter()
            .fold((0, 0), |(p, t), ok| (p + usize::from(ok), t + 1));
        Self { passed, total }
    }

    /// True iff every result passed.
    pub fn is_pass(&self) -> bool {
        self.passed == self.total
    }

    /// Number of failing results.
    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    /// Process exit status: 0 when everything passed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_pass() {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.passed, self.total)
    }
}

/// Summary statistics from a conformance run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceSummary {
    /// Total checks executed.
    pub total: usize,
    /// Number that passed.
    pub passed: usize,
    /// Number that failed.
    pub failed: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run completed.
    pub completed_at: DateTime<Utc>,
}
