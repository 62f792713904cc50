//! Environment configuration.
//!
//! | Variable       | Required | Default         |
//! |----------------|----------|-----------------|
//! | `DD_API_KEY`   | yes      |                 |
//! | `DD_APP_KEY`   | yes      |                 |
//! | `API_INTERVAL` | no       | `300` (seconds) |
//! | `DD_SITE`      | no       | `datadoghq.com` |
//!
//! Only these variables are read; the rest of the process environment is
//! ignored.

use std::fmt;
use std::time::Duration;

use config::Environment;
use thiserror::Error;

pub const API_KEY_VAR: &str = "DD_API_KEY";
pub const APP_KEY_VAR: &str = "DD_APP_KEY";
pub const INTERVAL_VAR: &str = "API_INTERVAL";
pub const SITE_VAR: &str = "DD_SITE";

pub const DEFAULT_INTERVAL_SECS: u64 = 300;
/// Longest accepted interval: one year.
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;
pub const DEFAULT_SITE: &str = ddwatch_adapters::datadog::DEFAULT_SITE;

/// Errors raised while loading configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingCredential(&'static str),

    #[error("failed to read API_INTERVAL: {value:?} is not a whole number of seconds between 1 and 31536000")]
    InvalidInterval { value: String },

    #[error("environment variable {0} contains non-Unicode data")]
    NotUnicode(&'static str),

    #[error("failed to read environment: {0}")]
    Environment(#[from] config::ConfigError),
}

/// Settings read from the process environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub app_key: String,
    pub interval: Duration,
    pub site: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .field("interval", &self.interval)
            .field("site", &self.site)
            .finish()
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let mut vars = Vec::new();
    for var in [API_KEY_VAR, APP_KEY_VAR, INTERVAL_VAR, SITE_VAR] {
        if let Some(value) = std::env::var_os(var) {
            let value = value
                .into_string()
                .map_err(|_| ConfigError::NotUnicode(var))?;
            vars.push((var, value));
        }
    }
    Config::from_vars(vars)
}

impl Config {
    /// Load configuration from an explicit set of variables instead of the
    /// process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_environment(Environment::default().source(Some(map)))
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        let settings = config::Config::builder().add_source(env).build()?;

        let api_key = credential(&settings, API_KEY_VAR)?;
        let app_key = credential(&settings, APP_KEY_VAR)?;
        let interval = interval(&settings)?;
        let site = lookup(&settings, SITE_VAR)?
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SITE.to_string());

        Ok(Config {
            api_key,
            app_key,
            interval,
            site,
        })
    }
}

fn lookup(settings: &config::Config, var: &str) -> Result<Option<String>, ConfigError> {
    // The environment source stores keys lowercased.
    match settings.get_string(&var.to_lowercase()) {
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn credential(settings: &config::Config, var: &'static str) -> Result<String, ConfigError> {
    match lookup(settings, var)? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingCredential(var)),
    }
}

fn interval(settings: &config::Config) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(settings, INTERVAL_VAR)? else {
        return Ok(Duration::from_secs(DEFAULT_INTERVAL_SECS));
    };

    match raw.parse::<u64>() {
        Ok(secs) if (1..=MAX_INTERVAL_SECS).contains(&secs) => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidInterval { value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn with_credentials(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars = vec![
            (API_KEY_VAR.to_string(), "api".to_string()),
            (APP_KEY_VAR.to_string(), "app".to_string()),
        ];
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        vars
    }

    #[test]
    fn defaults_when_only_credentials_set() {
        let config = assert_ok!(Config::from_vars(with_credentials(&[])));
        assert_eq!(config.api_key, "api");
        assert_eq!(config.app_key, "app");
        assert_eq!(config.interval, Duration::from_secs(300));
        assert_eq!(config.site, "datadoghq.com");
    }

    #[test]
    fn interval_is_read_exactly() {
        for secs in [1u64, 60, 300, 86_400, MAX_INTERVAL_SECS] {
            let value = secs.to_string();
            let config = assert_ok!(Config::from_vars(with_credentials(&[(
                INTERVAL_VAR,
                value.as_str()
            )])));
            assert_eq!(config.interval, Duration::from_secs(secs));
        }
    }

    #[test]
    fn invalid_intervals_are_rejected() {
        for value in [
            "",
            "abc",
            "5m",
            "1.5",
            "-10",
            "0",
            " 30",
            "31536001",
            "18446744073709551615",
            "18446744073709551616",
        ] {
            let err = assert_err!(Config::from_vars(with_credentials(&[(INTERVAL_VAR, value)])));
            match err {
                ConfigError::InvalidInterval { value: got } => assert_eq!(got, value),
                other => panic!("expected InvalidInterval for {:?}, got {:?}", value, other),
            }
        }
    }

    #[test]
    fn missing_api_key() {
        let err = assert_err!(Config::from_vars([(APP_KEY_VAR, "app")]));
        assert!(matches!(err, ConfigError::MissingCredential("DD_API_KEY")));
        assert_eq!(err.to_string(), "missing environment variable: DD_API_KEY");
    }

    #[test]
    fn missing_app_key() {
        let err = assert_err!(Config::from_vars([(API_KEY_VAR, "api")]));
        assert!(matches!(err, ConfigError::MissingCredential("DD_APP_KEY")));
    }

    #[test]
    fn empty_credentials_count_as_missing() {
        let err = assert_err!(Config::from_vars([(API_KEY_VAR, ""), (APP_KEY_VAR, "app")]));
        assert!(matches!(err, ConfigError::MissingCredential("DD_API_KEY")));

        let err = assert_err!(Config::from_vars([(API_KEY_VAR, "api"), (APP_KEY_VAR, "")]));
        assert!(matches!(err, ConfigError::MissingCredential("DD_APP_KEY")));
    }

    #[test]
    fn credentials_checked_before_interval() {
        let err = assert_err!(Config::from_vars([(INTERVAL_VAR, "abc")]));
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }

    #[test]
    fn site_override_and_empty_site() {
        let config = assert_ok!(Config::from_vars(with_credentials(&[(SITE_VAR, "datadoghq.eu")])));
        assert_eq!(config.site, "datadoghq.eu");

        let config = assert_ok!(Config::from_vars(with_credentials(&[(SITE_VAR, "")])));
        assert_eq!(config.site, "datadoghq.com");
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = assert_ok!(Config::from_vars([
            (API_KEY_VAR, "very-secret-api"),
            (APP_KEY_VAR, "very-secret-app"),
        ]));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[cfg(unix)]
    #[test]
    fn load_config_reads_only_named_variables() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        // The only test touching the process environment.
        std::env::set_var(API_KEY_VAR, "api");
        std::env::set_var(APP_KEY_VAR, "app");
        std::env::remove_var(INTERVAL_VAR);
        std::env::remove_var(SITE_VAR);
        std::env::set_var("DDWATCH_TEST_UNRELATED", OsStr::from_bytes(b"\xff\xfe"));

        let config = assert_ok!(load_config());
        assert_eq!(config.api_key, "api");
        assert_eq!(config.app_key, "app");
        assert_eq!(config.interval, Duration::from_secs(DEFAULT_INTERVAL_SECS));

        std::env::set_var(SITE_VAR, OsStr::from_bytes(b"\xff\xfe"));
        let err = assert_err!(load_config());
        assert!(matches!(err, ConfigError::NotUnicode("DD_SITE")));

        std::env::remove_var(SITE_VAR);
        std::env::remove_var("DDWATCH_TEST_UNRELATED");
    }
}
