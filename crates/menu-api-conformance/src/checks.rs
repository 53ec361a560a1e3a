//! The check registry.
//!
//! Checks are data: each [`CheckDefinition`] pairs one [`ProbeRequest`] with
//! one [`Expectation`]. The runner walks a [`CheckRegistry`] in order and
//! knows nothing about individual endpoints, so a new contract assertion is
//! a new entry in [`CheckRegistry::standard`].
//!
//! | Id | Request | Passes on |
//! |----|---------|-----------|
//! | `liveness` | `GET /` | 200, `message` == `Menu SaaS 3D API` |
//! | `dependency-health` | `GET /admin/stats` | 200, all four stats keys |
//! | `register-validation` | `POST /auth/register` | 400, error mentions `required` |
//! | `login-validation` | `POST /auth/login` | 400, error mentions `required` or `password` |
//! | `upload-validation` | `POST /menu/upload` | 400, error mentions `required` or `image` |
//! | `slug-not-found` | `GET /menu/nonexistent-test-org` | 404, error mentions `not found` |
//! | `cors-preflight` | `OPTIONS /` | 200, non-empty `Access-Control-Allow-Origin` |

use crate::error::{ConformanceError, ConformanceResult};
use crate::expectation::Expectation;
use crate::probe::ProbeRequest;
use crate::types::{CheckCategory, CheckId};
use serde_json::json;
use std::time::Duration;

/// Exact identity string the root endpoint must return.
pub const SERVICE_IDENTITY: &str = "Menu SaaS 3D API";

/// Keys the admin stats aggregation must return.
pub const STATS_KEYS: [&str; 4] = [
    "totalUsers",
    "totalOrganizations",
    "totalMenuImages",
    "recentRegistrations",
];

/// Slug that no organization will ever own.
pub const MISSING_SLUG: &str = "nonexistent-test-org";

/// Email used in deliberately incomplete auth payloads.
pub const PROBE_EMAIL: &str = "test@example.com";

const STATS_TIMEOUT: Duration = Duration::from_secs(15);

/// A named, self-contained probe of one endpoint contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDefinition {
    pub id: CheckId,
    pub name: String,
    pub category: CheckCategory,
    pub request: ProbeRequest,
    pub expectation: Expectation,
    /// What a pass proves about the target.
    pub rationale: String,
}

impl CheckDefinition {
    pub fn new(
        id: &str,
        name: &str,
        category: CheckCategory,
        request: ProbeRequest,
        expectation: Expectation,
        rationale: &str,
    ) -> Self {
        Self {
            id: CheckId::new(id),
            name: name.to_string(),
            category,
            request,
            expectation,
            rationale: rationale.to_string(),
        }
    }
}

/// Ordered collection of checks.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    checks: Vec<CheckDefinition>,
}

impl CheckRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven checks of the Menu API contract, in execution order.
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register(CheckDefinition::new(
            "liveness",
            "Basic API Connection",
            CheckCategory::Availability,
            ProbeRequest::get(""),
            Expectation::field_equals(200, "message", SERVICE_IDENTITY),
            "the service at the base URL identifies itself as the Menu API",
        ));

        registry.register(CheckDefinition::new(
            "dependency-health",
            "Database Connection",
            CheckCategory::Availability,
            ProbeRequest::get("/admin/stats").timeout(STATS_TIMEOUT),
            Expectation::keys_present(200, &STATS_KEYS),
            "the persistent store is reachable and the stats aggregation succeeds",
        ));

        registry.register(CheckDefinition::new(
            "register-validation",
            "Auth Register Endpoint",
            CheckCategory::InputValidation,
            ProbeRequest::post("/auth/register")
                .json(json!({ "email": PROBE_EMAIL }))
                .header("Content-Type", "application/json"),
            Expectation::error_mentions(400, &["required"]),
            "registration validates required fields before any side effect",
        ));

        registry.register(CheckDefinition::new(
            "login-validation",
            "Auth Login Endpoint",
            CheckCategory::InputValidation,
            ProbeRequest::post("/auth/login")
                .json(json!({ "email": PROBE_EMAIL }))
                .header("Content-Type", "application/json"),
            Expectation::error_mentions(400, &["required", "password"]),
            "login rejects a payload without a password",
        ));

        registry.register(CheckDefinition::new(
            "upload-validation",
            "Menu Upload Endpoint",
            CheckCategory::InputValidation,
            ProbeRequest::post("/menu/upload").form(Vec::new()),
            Expectation::error_mentions(400, &["required", "image"]),
            "the form upload path rejects a submission with no image",
        ));

        registry.register(CheckDefinition::new(
            "slug-not-found",
            "Menu Slug Endpoint",
            CheckCategory::Resolution,
            ProbeRequest::get(&format!("/menu/{}", MISSING_SLUG)),
            Expectation::error_mentions(404, &["not found"]),
            "slug resolution distinguishes an absent organization from other failures",
        ));

        registry.register(CheckDefinition::new(
            "cors-preflight",
            "CORS Headers",
            CheckCategory::CrossOrigin,
            ProbeRequest::options(""),
            Expectation::header_present(
                200,
                "Access-Control-Allow-Origin",
                &[
                    "Access-Control-Allow-Methods",
                    "Access-Control-Allow-Headers",
                ],
            ),
            "browser-origin clients may call the API",
        ));

        registry
    }

    /// Append a check. Ids are expected to be unique; a duplicate replaces
    /// the earlier definition in place.
    pub fn register(&mut self, check: CheckDefinition) {
        match self.checks.iter_mut().find(|c| c.id == check.id) {
            Some(existing) => *existing = check,
            None => self.checks.push(check),
        }
    }

    /// Look up a check by id.
    pub fn get(&self, id: &str) -> Option<&CheckDefinition> {
        self.checks.iter().find(|c| c.id.as_str() == id)
    }

    /// Sub-registry with the requested ids, kept in registry order.
    /// An empty request keeps everything.
    pub fn select(&self, ids: &[CheckId]) -> ConformanceResult<Self> {
        if ids.is_empty() {
            return Ok(self.clone());
        }
        if let Some(unknown) = ids.iter().find(|id| self.get(id.as_str()).is_none()) {
            return Err(ConformanceError::UnknownCheck(unknown.to_string()));
        }
        let checks = self
            .checks
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect();
        Ok(Self { checks })
    }

    /// Replace every check's timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        for check in &mut self.checks {
            check.request.timeout = timeout;
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckDefinition> {
        self.checks.iter()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
