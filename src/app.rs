//! Wires the monitor source, the snapshot loop and the metrics server into
//! one running process.

use std::time::Duration;

use anyhow::{Context, Result};
use ddwatch_adapters::datadog::DatadogAdapter;
use ddwatch_adapters::MonitorSource;
use ddwatch_sdk::prometheus::{PrometheusConfig, PrometheusExporter};
use ddwatch_sdk::{PublishMode, ServerError, SnapshotError, Snapshotter};

use crate::cli::Args;
use crate::config::Config;
use crate::duration::format_duration;

/// Everything needed to run the exporter, merged from the environment and
/// the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: Config,
    pub listen: String,
    pub metrics_path: String,
    pub mode: PublishMode,
    pub request_timeout: Option<Duration>,
}

impl Settings {
    pub fn new(config: Config, args: &Args) -> Self {
        Self {
            config,
            listen: args.listen.clone(),
            metrics_path: args.metrics_path.clone(),
            mode: args.publish.into(),
            request_timeout: args.request_timeout,
        }
    }
}

/// Build the Datadog client from `settings` and run until shutdown or the
/// first failure.
pub async fn run(settings: Settings) -> Result<()> {
    let mut builder = DatadogAdapter::builder()
        .credentials(&settings.config.api_key, &settings.config.app_key)
        .site(&settings.config.site);
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    let adapter = builder.build().context("failed to build Datadog client")?;

    run_with_source(adapter, &settings).await
}

enum Exit {
    Server(Result<(), ServerError>),
    Snapshots(Result<(), SnapshotError>),
    Signal,
}

/// Run the snapshot loop over `source` next to the metrics server.
///
/// Returns `Ok` after a shutdown signal. A failed snapshot cycle or a server
/// failure ends the process with an error.
pub async fn run_with_source<S: MonitorSource + 'static>(source: S, settings: &Settings) -> Result<()> {
    let snapshotter = Snapshotter::builder(source)
        .interval(settings.config.interval)
        .mode(settings.mode)
        .build();

    let exporter = PrometheusExporter::new(
        PrometheusConfig::builder()
            .listen_addr(&settings.listen)
            .metrics_path(&settings.metrics_path)
            .build(),
        snapshotter.registry(),
    );
    let server = exporter
        .bind()
        .await
        .with_context(|| format!("failed to bind metrics server on {}", settings.listen))?;

    tracing::info!(
        interval = %format_duration(settings.config.interval),
        request_timeout = %settings
            .request_timeout
            .map(format_duration)
            .unwrap_or_else(|| "none".to_string()),
        site = %settings.config.site,
        mode = ?settings.mode,
        "ddwatch started"
    );

    let mut snapshots = snapshotter.start();

    let exit = tokio::select! {
        result = server.serve() => Exit::Server(result),
        result = snapshots.join() => Exit::Snapshots(result),
        _ = shutdown_signal() => Exit::Signal,
    };

    match exit {
        Exit::Signal => {
            tracing::info!("shutdown signal received");
            snapshots.stop();
            snapshots.join().await.context("snapshot loop failed during shutdown")
        }
        Exit::Snapshots(result) => result.context("snapshot loop failed"),
        Exit::Server(result) => {
            snapshots.stop();
            result.context("metrics server failed")?;
            anyhow::bail!("metrics server exited unexpectedly")
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigint, mut sigterm) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "failed to install signal handlers, falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ddwatch_adapters::AdapterError;
    use ddwatch_types::MonitorRecord;

    struct FailingSource;

    #[async_trait]
    impl MonitorSource for FailingSource {
        async fn list_monitors(&self) -> Result<Vec<MonitorRecord>, AdapterError> {
            Err(AdapterError::Auth("403 Forbidden".to_string()))
        }

        fn description(&self) -> String {
            "failing".to_string()
        }
    }

    fn settings(listen: &str) -> Settings {
        let config = Config::from_vars([
            ("DD_API_KEY", "api"),
            ("DD_APP_KEY", "app"),
            ("API_INTERVAL", "1"),
        ])
        .unwrap();
        Settings {
            config,
            listen: listen.to_string(),
            metrics_path: "/metrics".to_string(),
            mode: PublishMode::ResetThenFill,
            request_timeout: None,
        }
    }

    #[test]
    fn settings_merge_args() {
        use clap::Parser;

        let args = Args::try_parse_from([
            "ddwatch",
            "--listen",
            "127.0.0.1:9000",
            "--publish",
            "swap-in",
        ])
        .unwrap();
        let settings = Settings::new(settings("unused").config, &args);

        assert_eq!(settings.listen, "127.0.0.1:9000");
        assert_eq!(settings.metrics_path, "/metrics");
        assert_eq!(settings.mode, PublishMode::SwapIn);
        assert_eq!(settings.config.interval, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn invalid_listen_address_is_fatal() {
        let err = run_with_source(FailingSource, &settings("not an address"))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("failed to bind metrics server"));
    }

    #[tokio::test]
    async fn failed_fetch_ends_the_process() {
        let err = tokio::time::timeout(
            Duration::from_secs(10),
            run_with_source(FailingSource, &settings("127.0.0.1:0")),
        )
        .await
        .expect("exporter should exit after the first failed cycle")
        .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("snapshot loop failed"), "{}", message);
        assert!(message.contains("403 Forbidden"), "{}", message);
    }
}
