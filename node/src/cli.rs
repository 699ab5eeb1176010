//! # CLI Interface
//!
//! `clap` derive definitions for `sismo-connect-node`: `run`, `verify`
//! and `version`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LogFormat;

/// Sismo Connect verifier service.
///
/// Verifies Sismo Connect responses against application requests, over
/// HTTP or one-shot from files, and exposes Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "sismo-connect-node",
    about = "Sismo Connect verifier service",
    version,
    propagate_version = true
)]
pub struct SismoNodeCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API and the metrics endpoint.
    Run(RunArgs),
    /// Verify one response from files and print the result JSON.
    Verify(VerifyArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the node configuration file (TOML).
    #[arg(long, short = 'c', env = "SISMO_CONFIG")]
    pub config: PathBuf,

    /// Address for the HTTP API. Overrides the config file.
    #[arg(long)]
    pub listen_addr: Option<SocketAddr>,

    /// Address for the Prometheus endpoint. Overrides the config file.
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,

    /// Log format. Overrides the config file.
    #[arg(long, value_enum, env = "SISMO_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Path to the node configuration file (TOML).
    #[arg(long, short = 'c', env = "SISMO_CONFIG")]
    pub config: PathBuf,

    /// JSON file holding the request input.
    #[arg(long)]
    pub request: PathBuf,

    /// JSON file holding the wallet's response.
    #[arg(long)]
    pub response: PathBuf,
}
