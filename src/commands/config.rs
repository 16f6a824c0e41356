use crate::Result;
use crate::hosting::IssueState;
use camino::Utf8Path;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

const LOG_TARGET: &str = "    config";

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up when none is given
pub const DEFAULT_CONFIG_FILE: &str = "harvest.toml";

/// GitHub caps `per_page` at this value
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the GitHub REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Elements requested per listing page (1..=100)
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Time to wait before retrying after a rate limit or a failed element
    #[serde(default = "default_retry_interval", with = "humantime_serde")]
    pub retry_interval: Duration,

    /// Give up after this many attempts; unbounded when absent
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Value written for missing positions when exploding list columns
    #[serde(default)]
    pub fill_value: String,

    #[serde(default)]
    pub commits: CommitsConfig,

    #[serde(default)]
    pub issues: IssuesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommitsConfig {
    /// Write one row per changed file
    #[serde(default = "default_true")]
    pub explode_files: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IssuesConfig {
    /// Write one row per label
    #[serde(default = "default_true")]
    pub explode_tags: bool,

    /// Write one row per assignee
    #[serde(default = "default_true")]
    pub explode_assignee: bool,

    /// Write one row per lifecycle event (opened, changed, closed)
    #[serde(default = "default_true")]
    pub explode_time: bool,

    /// Issue states to harvest, each into its own file
    #[serde(default = "default_states")]
    pub states: Vec<IssueState>,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

const fn default_page_size() -> u64 {
    MAX_PAGE_SIZE
}

const fn default_retry_interval() -> Duration {
    Duration::from_hours(1)
}

const fn default_true() -> bool {
    true
}

fn default_states() -> Vec<IssueState> {
    vec![IssueState::Closed, IssueState::Open]
}

impl Default for CommitsConfig {
    fn default() -> Self {
        Self { explode_files: true }
    }
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            explode_tags: true,
            explode_assignee: true,
            explode_time: true,
            states: default_states(),
        }
    }
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `harvest.toml` in `base_dir` is used if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!(target: LOG_TARGET, "No configuration file at '{path}', using defaults");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range
    fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(app_err!("page_size must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size));
        }

        if self.retry_interval.is_zero() {
            return Err(app_err!("retry_interval must be greater than zero"));
        }

        if self.max_attempts == Some(0) {
            return Err(app_err!("max_attempts must be at least 1 when set"));
        }

        if self.api_url.trim().is_empty() {
            return Err(app_err!("api_url must not be empty"));
        }

        if self.issues.states.is_empty() {
            return Err(app_err!("issues.states must name at least one state"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
