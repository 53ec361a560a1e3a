//! Menu API Conformance Harness
//!
//! Black-box verification that a deployed Menu SaaS 3D backend exposes its
//! public HTTP contract. Each check probes one endpoint exactly once and
//! interprets the response, including negative paths where a 400 or 404 is
//! the proof of correct behavior. Results reduce to an all-or-nothing
//! [`Verdict`] and a process exit code.
//!
//! # Check Groups
//!
//! | Group | Count | Ids |
//! |-------|-------|-----|
//! | Availability | 2 | `liveness`, `dependency-health` |
//! | Input Validation | 3 | `register-validation`, `login-validation`, `upload-validation` |
//! | Identifier Resolution | 1 | `slug-not-found` |
//! | Cross-Origin Policy | 1 | `cors-preflight` |
//!
//! # Quick Start
//!
//! ```no_run
//! use menu_api_conformance::{ConformanceConfig, ConformanceRunner};
//!
//! # async fn demo() -> menu_api_conformance::ConformanceResult<()> {
//! let config = ConformanceConfig::new("http://localhost:3000/api");
//! let runner = ConformanceRunner::new(&config)?;
//! let report = runner.run().await;
//! std::process::exit(i32::from(report.exit_code()));
//! # }
//! ```

pub mod checks;
pub mod error;
pub mod expectation;
pub mod probe;
pub mod report;
pub mod runner;
pub mod types;

// Re-export key types at crate root.
pub use checks::{CheckDefinition, CheckRegistry};
pub use error::{ConformanceError, ConformanceResult, ProbeError};
pub use expectation::{Expectation, Interpretation};
pub use probe::{ProbeBody, ProbeClient, ProbeMethod, ProbeRequest, ProbeResponse};
pub use report::{CategoryReport, ConformanceReport};
pub use runner::{ConformanceRunner, RunObserver, SilentObserver};
pub use types::{
    CheckCategory, CheckId, CheckResult, ConformanceConfig, ConformanceSummary, FailureKind,
    Verdict, DEFAULT_BASE_URL,
};
