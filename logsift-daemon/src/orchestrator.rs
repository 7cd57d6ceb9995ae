//! Process wiring -- configuration to running listener.
//!
//! The [`Orchestrator`] loads the rule set, connects the relational store
//! when enabled, assembles the dispatcher and binds the ingest socket.
//! [`Orchestrator::run`] then serves until SIGTERM/SIGINT or until the
//! cancellation token is cancelled.
//!
//! # Startup Order
//!
//! 1. Metrics recorder (if enabled)
//! 2. Rule set (`server.rules_dir` / `server.rules_file`)
//! 3. Relational store connection (if `sinks.database.enabled`)
//! 4. Dispatcher (local sink, relational sink, optional forwarder)
//! 5. Ingest socket bind
//!
//! Any failure before the listener runs is fatal. In-flight message tasks
//! are not awaited on shutdown.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use logsift_core::config::LogsiftConfig;
use logsift_pipeline::{
    Classifier, DispatcherBuilder, IngestConfig, IngestServer, MySqlStore, RelationalSink,
    RemoteForwarder,
};

use crate::metrics_server;

/// The daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: LogsiftConfig,
    /// Bound ingest server, consumed by `run`.
    server: IngestServer,
    /// Stops the ingest loop.
    cancel: CancellationToken,
    /// Number of rules in the flattened rule set.
    rule_count: usize,
}

impl Orchestrator {
    /// Load `logsift.toml` (with environment overrides) and build.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = LogsiftConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {e}"))?;
        Self::build_from_config(config).await
    }

    /// Build from an already-loaded configuration.
    pub async fn build_from_config(config: LogsiftConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {e}"))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        let classifier = load_rules(&config).await?;
        let rule_count = classifier.len();

        let mut dispatcher = DispatcherBuilder::new(Arc::new(classifier))
            .local_path(&config.sinks.local.path);

        let database = &config.sinks.database;
        if database.enabled {
            let store = MySqlStore::connect(database)
                .await
                .map_err(|e| anyhow::anyhow!("failed to connect relational store: {e}"))?;
            dispatcher = dispatcher.relational(RelationalSink::new(Box::new(store)));
        }

        let forward = &config.sinks.forward;
        if forward.dispatch {
            let forwarder = RemoteForwarder::from_config(forward);
            match forwarder.target() {
                Some(target) => tracing::info!(target, "remote forwarding enabled"),
                None => tracing::warn!("sinks.forward.dispatch is set but sinks.forward.addr is empty"),
            }
            dispatcher = dispatcher.forwarder(forwarder);
        }

        let ingest = IngestConfig::from_core(&config.server)?;
        let cancel = CancellationToken::new();
        let server = IngestServer::bind(ingest, Arc::new(dispatcher.build()), cancel.clone())
            .await
            .map_err(|e| anyhow::anyhow!("failed to start ingest server: {e}"))?;

        tracing::info!(
            mode = %server.mode(),
            listen_addr = %server.local_addr()?,
            rules = rule_count,
            local_log = %config.sinks.local.path,
            database = database.enabled,
            "logsift initialized"
        );

        Ok(Self {
            config,
            server,
            cancel,
            rule_count,
        })
    }

    /// Address the ingest socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.local_addr()?)
    }

    /// Token that stops `run` when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Number of rules in the flattened rule set.
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &LogsiftConfig {
        &self.config
    }

    /// Serve until a shutdown signal arrives or the token is cancelled.
    ///
    /// # Shutdown Triggers
    ///
    /// - `SIGTERM` (from systemd, Docker, or `kill`)
    /// - `SIGINT` (Ctrl+C)
    /// - [`cancel_token`](Self::cancel_token) cancelled
    pub async fn run(self) -> Result<()> {
        let Self { server, cancel, .. } = self;
        let mut server_task = tokio::spawn(server.run());

        tokio::select! {
            result = &mut server_task => {
                // listener exited on its own
                return result
                    .map_err(|e| anyhow::anyhow!("ingest task failed: {e}"))?
                    .map_err(Into::into);
            }
            signal = wait_for_shutdown_signal() => {
                tracing::info!(signal = signal?, "shutdown signal received");
            }
            _ = cancel.cancelled() => {
                tracing::info!("shutdown requested");
            }
        }

        cancel.cancel();
        server_task
            .await
            .map_err(|e| anyhow::anyhow!("ingest task failed: {e}"))??;

        tracing::info!("logsift-daemon shut down");
        Ok(())
    }
}

/// Load the flattened rule set named by `[server]`.
pub async fn load_rules(config: &LogsiftConfig) -> Result<Classifier> {
    let path = config.server.rules_path();
    Classifier::load(&path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load rules from {}: {e}", path.display()))
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {e}"))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {e}"))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}
