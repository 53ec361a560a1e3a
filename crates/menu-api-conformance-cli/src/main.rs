//! Menu API conformance CLI
//!
//! Probes a deployed Menu SaaS 3D API, prints a live line per check and a
//! summary, and exits 0 only when every check passed (1 otherwise). CI
//! pipelines rely on that exit status.

use anyhow::Context;
use clap::Parser;
use menu_api_conformance::{CheckRegistry, ConformanceConfig, ConformanceRunner, DEFAULT_BASE_URL};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

use output::{ConsoleReporter, OutputFormat};

/// Menu API conformance runner
#[derive(Parser)]
#[command(name = "menu-conformance")]
#[command(about = "Verify a deployed Menu SaaS 3D API against its public contract", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the API under test, including the /api prefix
    #[arg(short, long, env = "MENU_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Run only these checks (repeatable; see --list)
    #[arg(short = 'c', long = "check", value_name = "ID")]
    checks: Vec<String>,

    /// Replace every check's timeout
    #[arg(long, value_name = "SECONDS")]
    timeout_secs: Option<u64>,

    /// Output format: table (live progress and summary) or json (the report only, no progress lines)
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,

    /// List registered checks and exit
    #[arg(long)]
    list: bool,

    /// Enable verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries progress and the report.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    if cli.list {
        output::print_checks(&CheckRegistry::standard());
        return Ok(0);
    }

    let mut config = ConformanceConfig::new(cli.base_url).with_checks(&cli.checks);
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    info!(base_url = %config.base_url, checks = ?config.check_ids, "resolved configuration");

    let runner = ConformanceRunner::new(&config).context("cannot start conformance run")?;

    let report = match cli.output {
        OutputFormat::Table => {
            let mut console = ConsoleReporter::new();
            runner.run_with(&mut console).await
        }
        OutputFormat::Json => {
            let report = runner.run().await;
            output::print_json(&report)?;
            report
        }
    };

    Ok(report.exit_code())
}
