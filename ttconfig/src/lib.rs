//! Configuration for TuneTrail
//!
//! Configuration is resolved in three layers, each overriding the previous:
//!
//! 1. Built-in defaults
//! 2. An optional YAML file (`TUNETRAIL_CONFIG` env var, or `tunetrail.yaml`
//!    in the working directory)
//! 3. Environment variables
//!
//! The Last.fm API key and the tracked username have no defaults: loading
//! fails when they are missing, so misconfiguration is caught at startup
//! rather than on the first upstream call.
//!
//! # Example
//!
//! ```no_run
//! use ttconfig::Config;
//!
//! let config = Config::load()?;
//! println!("Syncing scrobbles for {}", config.username);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use tracing::info;

/// Environment variable pointing at an explicit config file.
pub const ENV_CONFIG_FILE: &str = "TUNETRAIL_CONFIG";

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tunetrail.yaml";

/// Application configuration.
///
/// All durations are stored in their raw unit (seconds or milliseconds) so
/// the struct round-trips cleanly through YAML; use the accessor methods to
/// get [`Duration`] values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Last.fm API key. Required.
    pub api_key: String,
    /// Last.fm username whose scrobbles are ingested. Required.
    pub username: String,
    /// Path of the SQLite scrobble database.
    pub database_path: PathBuf,
    /// Interval between scheduled sync runs, in seconds.
    pub sync_interval_secs: u64,
    /// Hard ceiling on pages fetched per sync run.
    pub page_limit: u32,
    /// Delay between page fetches within one sync run, in milliseconds.
    pub page_delay_ms: u64,
    /// Maximum number of retries after the first failed upstream attempt.
    pub retry_max_retries: u32,
    /// Initial retry backoff delay, in milliseconds. Doubles per attempt.
    pub retry_base_delay_ms: u64,
    /// Per-request HTTP timeout, in seconds.
    pub request_timeout_secs: u64,
    /// Track duration used when no provider knows the real one, in seconds.
    pub fallback_duration_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            username: String::new(),
            database_path: PathBuf::from("tunetrail.db"),
            sync_interval_secs: 600,
            page_limit: 5,
            page_delay_ms: 1200,
            retry_max_retries: 6,
            retry_base_delay_ms: 1000,
            request_timeout_secs: 10,
            fallback_duration_secs: 180,
        }
    }
}

impl Config {
    /// Load the configuration from the default file location and the process
    /// environment.
    ///
    /// Fails when the API key or username is missing, or when a config file
    /// exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let vars: HashMap<String, String> = env::vars().collect();
        let file = Self::find_config_file(&vars);
        let yaml = match &file {
            Some(path) => {
                info!(config_file = %path.display(), "Loading config file");
                Some(
                    fs::read_to_string(path)
                        .with_context(|| format!("reading config file {}", path.display()))?,
                )
            }
            None => {
                info!("No config file found, using defaults and environment");
                None
            }
        };
        Self::from_sources(yaml.as_deref(), &vars)
    }

    /// Build a configuration from an optional YAML document and a set of
    /// environment-style variables. Split out of [`Config::load`] so tests
    /// do not have to mutate the process environment.
    pub fn from_sources(yaml: Option<&str>, vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = match yaml {
            Some(text) => serde_yaml::from_str(text).context("parsing config file")?,
            None => Self::default(),
        };
        config.apply_env(vars)?;
        config.validate()?;
        Ok(config)
    }

    /// Interval between scheduled sync runs.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Delay between page fetches within one sync run.
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Initial retry backoff delay.
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn find_config_file(vars: &HashMap<String, String>) -> Option<PathBuf> {
        if let Some(path) = vars.get(ENV_CONFIG_FILE) {
            return Some(PathBuf::from(path));
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        default.exists().then(|| default.to_path_buf())
    }

    fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        if let Some(key) = vars.get("LASTFM_API_KEY") {
            self.api_key = key.clone();
        }
        if let Some(user) = vars.get("LASTFM_USERNAME") {
            self.username = user.clone();
        }
        if let Some(path) = vars.get("TUNETRAIL_DB") {
            self.database_path = PathBuf::from(path);
        }
        Self::parse_var(vars, "TUNETRAIL_SYNC_INTERVAL", &mut self.sync_interval_secs)?;
        Self::parse_var(vars, "TUNETRAIL_PAGE_LIMIT", &mut self.page_limit)?;
        Self::parse_var(vars, "TUNETRAIL_PAGE_DELAY_MS", &mut self.page_delay_ms)?;
        Self::parse_var(vars, "TUNETRAIL_RETRY_MAX", &mut self.retry_max_retries)?;
        Self::parse_var(vars, "TUNETRAIL_RETRY_BASE_MS", &mut self.retry_base_delay_ms)?;
        Self::parse_var(vars, "TUNETRAIL_HTTP_TIMEOUT", &mut self.request_timeout_secs)?;
        Self::parse_var(
            vars,
            "TUNETRAIL_FALLBACK_DURATION",
            &mut self.fallback_duration_secs,
        )?;
        Ok(())
    }

    fn parse_var<T: std::str::FromStr>(
        vars: &HashMap<String, String>,
        name: &str,
        target: &mut T,
    ) -> Result<()> {
        if let Some(raw) = vars.get(name) {
            *target = raw
                .parse()
                .ok()
                .with_context(|| format!("invalid value for {name}: {raw:?}"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("missing Last.fm API key (set LASTFM_API_KEY or api_key in the config file)");
        }
        if self.username.trim().is_empty() {
            bail!("missing Last.fm username (set LASTFM_USERNAME or username in the config file)");
        }
        if self.page_limit == 0 {
            bail!("page_limit must be at least 1");
        }
        Ok(())
    }
}
