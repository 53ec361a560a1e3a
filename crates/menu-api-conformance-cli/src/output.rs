//! Output formatting utilities

use chrono::Local;
use colored::*;
use menu_api_conformance::{
    CheckDefinition, CheckRegistry, CheckResult, ConformanceReport, RunObserver,
};

const WIDE_RULE: usize = 80;
const NARROW_RULE: usize = 60;

/// Output format for the run
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Live progress lines plus a summary table
    #[default]
    Table,
    /// The full report as JSON, nothing else on stdout
    Json,
}

/// Prints live progress and the closing summary to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl RunObserver for ConsoleReporter {
    fn run_started(&mut self, target: &str, total: usize) {
        print!("{}", format_run_header(target, total));
    }

    fn check_started(&mut self, position: usize, total: usize, check: &CheckDefinition) {
        print!("{}", format_check_banner(position, total, check));
    }

    fn check_finished(&mut self, result: &CheckResult) {
        print!("{}", format_progress_line(result));
    }

    fn run_completed(&mut self, report: &ConformanceReport) {
        print!("{}", format_summary(report));
        let verdict = report.verdict();
        if verdict.is_pass() {
            print_success("All checks passed! The API honors its contract.");
        } else {
            print_warning(&format!(
                "{} check(s) failed. See the details above.",
                verdict.failed()
            ));
        }
    }
}

fn rule(width: usize) -> String {
    "=".repeat(width)
}

fn glyph(passed: bool) -> ColoredString {
    if passed {
        "✓ PASS".green()
    } else {
        "✗ FAIL".red()
    }
}

pub fn format_run_header(target: &str, total: usize) -> String {
    format!(
        "Starting Menu SaaS 3D API conformance checks ({} checks)\nTesting against: {}\n{}\n",
        total,
        target,
        rule(WIDE_RULE),
    )
}

pub fn format_check_banner(position: usize, total: usize, check: &CheckDefinition) -> String {
    format!(
        "{}\nCHECK {}/{}: {}\n{}\n",
        rule(NARROW_RULE),
        position + 1,
        total,
        check.name.as_str().bold(),
        rule(NARROW_RULE),
    )
}

/// `[timestamp] ✓ PASS - name`, then the details and failure kind if any.
pub fn format_progress_line(result: &CheckResult) -> String {
    let timestamp = result
        .checked_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    let mut line = format!("[{}] {} - {}\n", timestamp, glyph(result.passed), result.name);
    if let Some(kind) = result.failure {
        line.push_str(&format!("    Failure: {}\n", kind.to_string().as_str().yellow()));
    }
    if !result.details.is_empty() {
        line.push_str(&format!("    Details: {}\n", result.details.as_str().dimmed()));
    }
    line.push('\n');
    line
}

pub fn format_summary(report: &ConformanceReport) -> String {
    let mut out = format!("{}\nSUMMARY\n{}\n", rule(WIDE_RULE), rule(WIDE_RULE));
    for result in &report.results {
        out.push_str(&format!("{} - {}\n", glyph(result.passed), result.name));
    }
    out.push_str(&format!(
        "\nResults: {} checks passed\n",
        report.verdict().to_string().as_str().bold()
    ));
    out
}

/// Print the report as pretty JSON
pub fn print_json(report: &ConformanceReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Print the registered checks without running them
pub fn print_checks(registry: &CheckRegistry) {
    for check in registry.iter() {
        let path = if check.request.path.is_empty() {
            "/"
        } else {
            check.request.path.as_str()
        };
        println!(
            "{:<22} {:<24} {} {}",
            check.id.as_str().bold(),
            check.name,
            check.request.method,
            path
        );
        println!("    expects {}", check.expectation);
        println!("    proves  {}", check.rationale.as_str().dimmed());
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}
