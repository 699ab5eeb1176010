// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Sismo Connect Verifier Node
//!
//! Entry point for the `sismo-connect-node` binary. Parses CLI arguments,
//! loads the TOML configuration, initializes logging and metrics, and
//! either serves the HTTP API or verifies a single response from files.
//!
//! - `run`: serve `/health` and `/verify`, plus `/metrics` on its own port
//! - `verify`: one-shot verification, result JSON on stdout
//! - `version`: print build version information

mod api;
mod cli;
mod config;
mod logging;
mod metrics;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;

use sismo_connect_protocol::{SismoConnectRequestInput, SismoConnectResponse, SISMO_CONNECT_VERSION};

use cli::{Commands, SismoNodeCli};
use config::NodeConfig;
use metrics::VerifierMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = SismoNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Verify(args) => verify_once(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Serve the API and metrics listeners until a shutdown signal.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    let mut config = NodeConfig::load(&args.config)?;
    if let Some(addr) = args.listen_addr {
        config.server.listen_addr = addr;
    }
    if let Some(addr) = args.metrics_addr {
        config.server.metrics_addr = addr;
    }
    let format = args.log_format.unwrap_or(config.server.log_format);
    logging::init_logging(logging::DEFAULT_FILTER, format);

    tracing::info!(
        config = %args.config.display(),
        app_id = %config.verifier.app_id,
        listen_addr = %config.server.listen_addr,
        metrics_addr = %config.server.metrics_addr,
        "starting sismo-connect-node"
    );

    let verifier = Arc::new(config.build_verifier()?);
    let metrics = Arc::new(VerifierMetrics::new().context("failed to register metrics")?);

    let app_state = api::AppState {
        version: format!("{} ({})", env!("CARGO_PKG_VERSION"), SISMO_CONNECT_VERSION),
        started_at: chrono::Utc::now(),
        verifier,
        metrics: Arc::clone(&metrics),
    };

    let api_router = api::create_router(app_state);
    let api_listener = tokio::net::TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", config.server.listen_addr))?;
    tracing::info!(addr = %config.server.listen_addr, "API server listening");

    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(metrics);
    let metrics_listener = tokio::net::TcpListener::bind(config.server.metrics_addr)
        .await
        .with_context(|| {
            format!("failed to bind metrics listener on {}", config.server.metrics_addr)
        })?;
    tracing::info!(addr = %config.server.metrics_addr, "metrics server listening");

    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!(error = %e, "API server error");
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!(error = %e, "metrics server error");
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("sismo-connect-node stopped");
    Ok(())
}

/// Verify one response read from disk and print the result.
async fn verify_once(args: cli::VerifyArgs) -> Result<()> {
    logging::init_logging("sismo_connect_node=warn,sismo_connect_protocol=warn", logging::LogFormat::Pretty);

    let config = NodeConfig::load(&args.config)?;
    let verifier = config.build_verifier()?;

    let input: SismoConnectRequestInput = read_json(&args.request)?;
    let request = input.build().context("invalid request")?;
    let response: SismoConnectResponse = read_json(&args.response)?;

    let result = verifier
        .verify(&request, &response)
        .await
        .with_context(|| format!("verification failed for {}", args.response.display()))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_version() {
    println!("sismo-connect-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol           {}", SISMO_CONNECT_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
