//! Conformance report generation.
//!
//! Collects the ordered results of one run with per-category tallies, summary
//! statistics, and the [`Verdict`]. Serialized as-is for `--output json`.

use crate::types::{CheckCategory, CheckId, CheckResult, ConformanceSummary, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-category tally. Full results live once, in [`ConformanceReport::results`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    /// Which category.
    pub category: CheckCategory,
    /// Ids of the checks in this category, in execution order.
    pub checks: Vec<CheckId>,
    /// Number that passed.
    pub passed: usize,
    /// Number that failed.
    pub failed: usize,
}

impl CategoryReport {
    /// Tally the results that belong to `category`.
    pub fn from_results<'a>(
        category: CheckCategory,
        results: impl IntoIterator<Item = &'a CheckResult>,
    ) -> Self {
        let mut checks = Vec::new();
        let mut passed = 0;
        for r in results.into_iter().filter(|r| r.category == category) {
            checks.push(r.id.clone());
            if r.passed {
                passed += 1;
            }
        }
        let failed = checks.len() - passed;
        Self {
            category,
            checks,
            passed,
            failed,
        }
    }
}

/// The complete outcome of one conformance run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Base URL the checks were sent to.
    pub target: String,
    /// One result per registered check, in execution order.
    pub results: Vec<CheckResult>,
    /// Per-category breakdowns.
    pub categories: Vec<CategoryReport>,
    /// Summary statistics.
    pub summary: ConformanceSummary,
}

impl ConformanceReport {
    /// Create a report from a list of check results.
    pub fn from_results(
        target: &str,
        results: Vec<CheckResult>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let verdict = Verdict::from_results(&results);

        let categories = CheckCategory::all()
            .iter()
            .map(|cat| CategoryReport::from_results(*cat, &results))
            .filter(|c| !c.checks.is_empty())
            .collect();

        let summary = ConformanceSummary {
            total: verdict.total,
            passed: verdict.passed,
            failed: verdict.failed(),
            started_at,
            completed_at,
        };

        Self {
            run_id: Uuid::new_v4(),
            target: target.to_string(),
            results,
            categories,
            summary,
        }
    }

    /// All-or-nothing reduction of the results.
    pub fn verdict(&self) -> Verdict {
        Verdict::from_results(&self.results)
    }

    /// Whether every check passed.
    pub fn all_passed(&self) -> bool {
        self.verdict().is_pass()
    }

    /// Process exit status for this run.
    pub fn exit_code(&self) -> u8 {
        self.verdict().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckRegistry;
    use chrono::Utc;

    fn make_results(pass_count: usize, fail_count: usize) -> Vec<CheckResult> {
        let registry = CheckRegistry::standard();
        let checks: Vec<_> = registry.iter().collect();
        let mut results = Vec::new();
        for check in checks.iter().take(pass_count) {
            results.push(CheckResult::pass(check, "ok", 1));
        }
        for check in checks.iter().skip(pass_count).take(fail_count) {
            results.push(CheckResult::violation(check, "failed", 1));
        }
        results
    }

    fn report(pass_count: usize, fail_count: usize) -> ConformanceReport {
        let now = Utc::now();
        ConformanceReport::from_results(
            "http://localhost:3000/api",
            make_results(pass_count, fail_count),
            now,
            now,
        )
    }

    #[test]
    fn test_report_all_passed() {
        let report = report(7, 0);
        assert!(report.all_passed());
        assert_eq!(report.summary.total, 7);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_report_with_failures() {
        let report = report(5, 2);
        assert!(!report.all_passed());
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_report_categories_populated() {
        // liveness + dependency-health only
        let partial = report(2, 0);
        assert_eq!(partial.categories.len(), 1);
        assert_eq!(partial.categories[0].category, CheckCategory::Availability);

        let full = report(7, 0);
        assert_eq!(full.categories.len(), 4);
    }

    #[test]
    fn test_category_report_tallies_only_its_category() {
        let results = make_results(6, 1);
        let cors = CategoryReport::from_results(CheckCategory::CrossOrigin, &results);
        assert_eq!(cors.checks, vec![CheckId::new("cors-preflight")]);
        assert_eq!((cors.passed, cors.failed), (0, 1));

        let validation = CategoryReport::from_results(CheckCategory::InputValidation, &results);
        assert_eq!(validation.checks.len(), 3);
        assert_eq!(validation.passed, 3);
    }

    #[test]
    fn test_report_json_serialization() {
        let report = report(4, 3);
        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains("\"total\": 7"));
        assert!(json.contains("\"contract_violation\""));
        let deserialized: ConformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.summary.passed, 4);
        assert_eq!(deserialized.run_id, report.run_id);
    }

    #[test]
    fn test_serialized_report_carries_each_result_once() {
        let report = report(7, 0);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 7);
        let json = value.to_string();
        assert_eq!(json.matches("\"details\"").count(), 7);
        assert_eq!(value["categories"][0]["checks"][0], "liveness");
    }
}
