use anyhow::Result;
use clap::Parser;

use logsift_core::config::LogsiftConfig;
use logsift_daemon::cli::DaemonCli;
use logsift_daemon::logging::init_tracing;
use logsift_daemon::orchestrator::{Orchestrator, load_rules};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let mut config = LogsiftConfig::from_file(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {e}", cli.config.display()))?;
    config.apply_env_overrides();

    // CLI flags win over file and environment
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {e}"))?;

    init_tracing(&config.general)?;

    if cli.validate {
        let classifier = load_rules(&config).await?;
        println!(
            "configuration OK: {} ({} rules from {})",
            cli.config.display(),
            classifier.len(),
            config.server.rules_path().display()
        );
        return Ok(());
    }

    tracing::info!(config = %cli.config.display(), "logsift-daemon starting");

    let orchestrator = Orchestrator::build_from_config(config).await?;
    orchestrator.run().await
}
