//! End-to-end runs against a mock Menu API.

use menu_api_conformance::{
    CheckDefinition, CheckResult, ConformanceConfig, ConformanceReport, ConformanceRunner,
    FailureKind, RunObserver,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn base_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

async fn mount_liveness(server: &MockServer, message: &str) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": message })))
        .mount(server)
        .await;
}

async fn mount_stats(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/admin/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_slug(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/menu/nonexistent-test-org"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_validation_and_cors(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({ "email": "test@example.com" })))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "Email and password are required" })),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "Email and password required" })),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/menu/upload"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "Image and organization ID required" })),
        )
        .mount(server)
        .await;

    Mock::given(method("OPTIONS"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Access-Control-Allow-Origin", "*")
                .insert_header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
                .insert_header("Access-Control-Allow-Headers", "Content-Type, Authorization"),
        )
        .mount(server)
        .await;
}

/// Mount a backend that honors every contract.
async fn conforming_backend() -> MockServer {
    let server = MockServer::start().await;
    mount_liveness(&server, "Menu SaaS 3D API").await;
    mount_stats(
        &server,
        json!({
            "totalUsers": 12,
            "totalOrganizations": 4,
            "totalMenuImages": 31,
            "recentRegistrations": []
        }),
    )
    .await;
    mount_slug(&server, 404, json!({ "error": "Organization not found" })).await;
    mount_validation_and_cors(&server).await;
    server
}

fn runner_for(server: &MockServer) -> ConformanceRunner {
    ConformanceRunner::new(&ConformanceConfig::new(base_url(server))).unwrap()
}

fn result<'a>(report: &'a ConformanceReport, id: &str) -> &'a CheckResult {
    report
        .results
        .iter()
        .find(|r| r.id.as_str() == id)
        .unwrap_or_else(|| panic!("no result for {id}"))
}

#[tokio::test]
async fn test_conforming_backend_passes_every_check() {
    let server = conforming_backend().await;
    let report = runner_for(&server).run().await;

    assert_eq!(report.results.len(), 7);
    assert!(report.all_passed(), "results: {:#?}", report.results);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.verdict().to_string(), "7/7");
}

#[tokio::test]
async fn test_each_check_sends_exactly_one_request() {
    let server = conforming_backend().await;
    runner_for(&server).run().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 7);
}

#[tokio::test]
async fn test_wrong_identity_message_fails_liveness() {
    let server = MockServer::start().await;
    mount_liveness(&server, "Hello World").await;

    let runner = ConformanceRunner::new(
        &ConformanceConfig::new(base_url(&server)).with_checks(["liveness"]),
    )
    .unwrap();
    let report = runner.run().await;

    let liveness = result(&report, "liveness");
    assert!(!liveness.passed);
    assert_eq!(liveness.failure, Some(FailureKind::ContractViolation));
    assert!(liveness.details.contains("Hello World"));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_missing_stats_key_is_listed() {
    let server = MockServer::start().await;
    mount_stats(
        &server,
        json!({ "totalUsers": 1, "totalOrganizations": 1, "totalMenuImages": 1 }),
    )
    .await;

    let runner = ConformanceRunner::new(
        &ConformanceConfig::new(base_url(&server)).with_checks(["dependency-health"]),
    )
    .unwrap();
    let report = runner.run().await;

    let stats = result(&report, "dependency-health");
    assert!(!stats.passed);
    assert!(stats.details.contains("recentRegistrations"));
}

#[tokio::test]
async fn test_slug_success_status_is_contract_violation() {
    let server = MockServer::start().await;
    mount_slug(&server, 200, json!({ "organization": { "slug": "x" } })).await;

    let runner = ConformanceRunner::new(
        &ConformanceConfig::new(base_url(&server)).with_checks(["slug-not-found"]),
    )
    .unwrap();
    let report = runner.run().await;

    let slug = result(&report, "slug-not-found");
    assert!(!slug.passed);
    assert_eq!(slug.failure, Some(FailureKind::ContractViolation));
    assert!(slug.details.contains("unexpected status 200 (expected 404)"));
}

async fn mount_rejection(server: &MockServer, route: &str, error: &str) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": error })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_alternative_rejection_wording_is_accepted() {
    let server = MockServer::start().await;
    mount_rejection(&server, "/api/auth/login", "Invalid password").await;
    mount_rejection(&server, "/api/menu/upload", "No image provided").await;

    let runner = ConformanceRunner::new(
        &ConformanceConfig::new(base_url(&server))
            .with_checks(["login-validation", "upload-validation"]),
    )
    .unwrap();
    let report = runner.run().await;

    assert!(result(&report, "login-validation").passed);
    assert!(result(&report, "upload-validation").passed);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_rejection_without_expected_wording_is_violation() {
    let server = MockServer::start().await;
    mount_rejection(&server, "/api/auth/register", "Invalid password").await;
    mount_rejection(&server, "/api/auth/login", "Bad request").await;

    let runner = ConformanceRunner::new(
        &ConformanceConfig::new(base_url(&server))
            .with_checks(["register-validation", "login-validation"]),
    )
    .unwrap();
    let report = runner.run().await;

    // Registration only accepts "required".
    let register = result(&report, "register-validation");
    assert_eq!(register.failure, Some(FailureKind::ContractViolation));
    let login = result(&report, "login-validation");
    assert_eq!(login.failure, Some(FailureKind::ContractViolation));
    assert!(login.details.contains("Bad request"));
}

#[tokio::test]
async fn test_unrouted_endpoints_fail_without_aborting() {
    // Only liveness is mounted; every other request gets wiremock's empty 404.
    let server = MockServer::start().await;
    mount_liveness(&server, "Menu SaaS 3D API").await;

    let report = runner_for(&server).run().await;

    assert_eq!(report.results.len(), 7);
    assert!(result(&report, "liveness").passed);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_non_json_body_is_transport_class_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let runner = ConformanceRunner::new(
        &ConformanceConfig::new(base_url(&server)).with_checks(["liveness"]),
    )
    .unwrap();
    let report = runner.run().await;

    let liveness = result(&report, "liveness");
    assert_eq!(liveness.failure, Some(FailureKind::TransportError));
    assert!(liveness.details.contains("malformed JSON"));
}

#[tokio::test]
async fn test_timeout_is_captured_and_run_continues() {
    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Menu SaaS 3D API" }))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&slow)
        .await;

    let config = ConformanceConfig::new(base_url(&slow))
        .with_checks(["liveness", "cors-preflight"])
        .with_timeout(Duration::from_millis(100));
    let report = ConformanceRunner::new(&config).unwrap().run().await;

    assert_eq!(report.results.len(), 2);
    let liveness = result(&report, "liveness");
    assert!(!liveness.passed);
    assert_eq!(liveness.failure, Some(FailureKind::TransportError));
    assert!(liveness.details.contains("timed out"));
    // OPTIONS is unrouted, so the second check still completes with a 404.
    let cors = result(&report, "cors-preflight");
    assert_eq!(cors.failure, Some(FailureKind::ContractViolation));
}

#[tokio::test]
async fn test_connection_refused_fails_every_check() {
    let config = ConformanceConfig::new("http://127.0.0.1:1/api")
        .with_timeout(Duration::from_secs(2));
    let report = ConformanceRunner::new(&config).unwrap().run().await;

    assert_eq!(report.results.len(), 7);
    for r in &report.results {
        assert!(!r.passed);
        assert_eq!(r.failure, Some(FailureKind::TransportError));
        assert!(!r.details.trim().is_empty());
    }
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let server = conforming_backend().await;
    let runner = runner_for(&server);

    let first = runner.run().await;
    let second = runner.run().await;

    let outcome = |r: &ConformanceReport| -> Vec<(String, bool, String)> {
        r.results
            .iter()
            .map(|c| (c.id.to_string(), c.passed, c.details.clone()))
            .collect()
    };
    assert_eq!(outcome(&first), outcome(&second));
}

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl RunObserver for Recorder {
    fn run_started(&mut self, _target: &str, total: usize) {
        self.events.push(format!("start:{total}"));
    }

    fn check_started(&mut self, position: usize, _total: usize, check: &CheckDefinition) {
        self.events.push(format!("running:{position}:{}", check.id));
    }

    fn check_finished(&mut self, result: &CheckResult) {
        self.events.push(format!("done:{}:{}", result.id, result.passed));
    }

    fn run_completed(&mut self, report: &ConformanceReport) {
        self.events.push(format!("completed:{}", report.verdict()));
    }
}

#[tokio::test]
async fn test_observer_sees_sequential_transitions() {
    let server = conforming_backend().await;
    let config = ConformanceConfig::new(base_url(&server))
        .with_checks(["liveness", "register-validation"]);
    let runner = ConformanceRunner::new(&config).unwrap();

    let mut recorder = Recorder::default();
    runner.run_with(&mut recorder).await;

    assert_eq!(
        recorder.events,
        [
            "start:2",
            "running:0:liveness",
            "done:liveness:true",
            "running:1:register-validation",
            "done:register-validation:true",
            "completed:2/2",
        ]
    );
}
