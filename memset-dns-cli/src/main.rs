//! Command line entry point for Memset DNS reconciliation
//!
//! Reads `MEMSET_API_KEY` (and optionally `MEMSET_API_URL`) from the
//! environment, runs one operation and prints its result as JSON on stdout.
//! Logs go to stderr.
//!
//! Exit codes: 0 on success, 1 when the operation failed, 2 when the tool
//! could not start (bad configuration, unreadable manifest).

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Operation};
use memset_dns_core::{ReconcileResult, Reconciler, ServiceContext};
use memset_dns_provider::{ClientConfig, MemsetClient};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout 只输出结果 JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    let options = cli.options();
    if options.check_mode {
        tracing::info!("Check mode: no changes will be made");
    }

    let (reconciler, operation) = match setup(cli).await {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let (output, failed) = run(&reconciler, operation).await;
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            tracing::error!("Failed to serialize result: {e}");
            return ExitCode::FAILURE;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// `RUST_LOG` directives when set and valid, `info` otherwise.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

async fn setup(cli: Cli) -> anyhow::Result<(Reconciler, Operation)> {
    let options = cli.options();
    let operation = cli.command.into_operation().await?;

    let config = ClientConfig::from_env().context("Invalid Memset client configuration")?;
    tracing::info!("Using Memset API at {}", config.base_url);
    let client = MemsetClient::new(config).context("Failed to create Memset client")?;

    let ctx = Arc::new(ServiceContext::new(Arc::new(client), options));
    Ok((Reconciler::new(ctx), operation))
}

async fn run(reconciler: &Reconciler, operation: Operation) -> (serde_json::Value, bool) {
    match operation {
        Operation::Apply(manifest) => {
            let report = reconciler.apply_manifest(&manifest).await;
            (to_json(&report), report.failed)
        }
        Operation::Zone(spec) => finish(reconciler.reconcile_zone(&spec).await),
        Operation::Domain(spec) => finish(reconciler.reconcile_zone_domain(&spec).await),
        Operation::Record(spec) => finish(reconciler.reconcile_zone_record(&spec).await),
        Operation::Reload { poll } => finish(reconciler.request_reload(poll).await),
    }
}

fn finish(result: ReconcileResult) -> (serde_json::Value, bool) {
    (to_json(&result), result.failed)
}

fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value)
        .unwrap_or_else(|e| serde_json::json!({ "failed": true, "message": e.to_string() }))
}
