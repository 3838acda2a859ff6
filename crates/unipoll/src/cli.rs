//! Clap derive structures for the `unipoll` binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unipoll -- Prometheus exporter for UniFi wireless controllers
#[derive(Debug, Parser)]
#[command(
    name = "unipoll",
    version,
    about = "Export UniFi wireless client, access point and WLAN metrics to Prometheus",
    long_about = "Polls a UniFi controller through its legacy API and serves the result \
        as Prometheus metrics.\n\n\
        All scrapes share one cached controller snapshot, refreshed at most once \
        per cache TTL.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (default: platform config dir)
    #[arg(long, short = 'c', env = "UNIPOLL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNIPOLL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNIPOLL_INSECURE", global = true)]
    pub insecure: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, env = "UNIPOLL_LOG_FORMAT", default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP exporter (default)
    Serve(ServeArgs),

    /// Fetch one snapshot and print it as JSON
    #[command(alias = "snap")]
    Snapshot(SnapshotArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Listen address (overrides `exporter.listen`)
    #[arg(long, short = 'l')]
    pub listen: Option<SocketAddr>,

    /// Snapshot cache TTL, e.g. "30s" or "2m"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub cache_ttl: Option<Duration>,

    /// Upper bound on one controller refresh, e.g. "20s"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub refresh_timeout: Option<Duration>,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,

    /// Upper bound on the controller fetch, e.g. "20s"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub refresh_timeout: Option<Duration>,
}
