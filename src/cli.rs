use std::time::Duration;

use clap::{Parser, ValueEnum};
use ddwatch_sdk::PublishMode;

use crate::duration::parse_duration;
use crate::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "ddwatch")]
#[command(about = "Export Datadog monitors as Prometheus gauges")]
#[command(
    long_about = "Export Datadog monitors as Prometheus gauges.\n\n\
    Credentials and the polling interval are read from the environment:\n\
    DD_API_KEY, DD_APP_KEY (required), API_INTERVAL (seconds, default 300)\n\
    and DD_SITE (default datadoghq.com)."
)]
#[command(version)]
pub struct Args {
    /// Address the metrics server listens on (host:port)
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// HTTP path serving the exposition text
    #[arg(long, default_value = "/metrics")]
    pub metrics_path: String,

    /// How each snapshot cycle publishes into the registry
    #[arg(long, value_enum, default_value_t = PublishArg::ResetThenFill)]
    pub publish: PublishArg,

    /// Timeout for each Datadog API request (e.g., "30s", "500ms", "2m")
    #[arg(long, value_parser = parse_duration)]
    pub request_timeout: Option<Duration>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Command-line spelling of [`PublishMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PublishArg {
    /// Clear the registry before every fetch
    ResetThenFill,
    /// Swap in the complete sample set after every fetch
    SwapIn,
}

impl From<PublishArg> for PublishMode {
    fn from(arg: PublishArg) -> Self {
        match arg {
            PublishArg::ResetThenFill => PublishMode::ResetThenFill,
            PublishArg::SwapIn => PublishMode::SwapIn,
        }
    }
}
