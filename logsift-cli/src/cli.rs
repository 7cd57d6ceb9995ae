//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// logsift -- syslog classification tooling.
///
/// Use `logsift <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logsift", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logsift.toml configuration file.
    #[arg(short, long, default_value = "logsift.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and test the rule set.
    Rules(RulesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- rules ----

/// Inspect and test the rule set.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List the flattened rule set in evaluation order.
    List {
        /// Root rule file (default: server.rules_dir/server.rules_file from config).
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Load the rule tree and report include or parse errors.
    Validate {
        /// Root rule file (default: server.rules_dir/server.rules_file from config).
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Classify a single message and show which rule matched.
    Test {
        /// Raw message text, as it would arrive on the wire.
        message: String,

        /// Root rule file (default: server.rules_dir/server.rules_file from config).
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

impl RulesAction {
    /// Explicit rule file override, if any.
    pub fn rules_override(&self) -> Option<&PathBuf> {
        match self {
            Self::List { rules } | Self::Validate { rules } | Self::Test { rules, .. } => {
                rules.as_ref()
            }
        }
    }
}

// ---- config ----

/// Manage logsift configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, server, sinks, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}
