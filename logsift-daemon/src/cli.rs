//! CLI argument definitions for logsift-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// logsift syslog classification daemon.
///
/// Listens for syslog messages over TCP or UDP, classifies each one
/// against the configured rule set and writes the result to the
/// configured sinks.
#[derive(Parser, Debug)]
#[command(name = "logsift-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logsift.toml configuration file.
    #[arg(short, long, default_value = "/etc/logsift/logsift.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and rule files, then exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}
