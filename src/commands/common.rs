//! Setup shared by the commits and issues commands.

use super::config::Config;
use super::{Host, ProgressReporter};
use crate::Result;
use crate::harvest::{HarvestSummary, RetryScheduler};
use crate::hosting::{Client, RepoSpec};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use core::time::Duration;
use std::io::Write;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared between the commits and issues commands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN")]
    pub github_token: Option<String>,

    /// Path to configuration file (default is `harvest.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Base URL of the GitHub REST API, overriding the configuration file
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// CSV file to append to
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,
}

#[derive(Debug)]
pub struct Common {
    pub config: Config,
    pub client: Client,
    pub repo: RepoSpec,
    log_level: LogLevel,
    use_colors: bool,
}

impl Common {
    /// Initialize logging, load the configuration and build the API client
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be parsed, the configuration cannot be
    /// loaded, or the client cannot be built
    pub fn new(args: &CommonArgs, repo: &str) -> Result<Self> {
        init_logging(args.log_level);

        let repo = RepoSpec::parse(repo)?;
        let mut config = Config::load(Utf8Path::new("."), args.config.as_deref())?;

        if let Some(api_url) = &args.api_url {
            config.api_url.clone_from(api_url);
        }

        let client = Client::new(args.github_token.as_deref(), config.api_url.as_str())?;

        let use_colors = match args.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                use std::io::{IsTerminal, stderr};
                stderr().is_terminal()
            }
        };

        Ok(Self {
            config,
            client,
            repo,
            log_level: args.log_level,
            use_colors,
        })
    }

    /// A fresh progress bar for one harvest
    #[must_use]
    pub fn progress_reporter(&self) -> ProgressReporter {
        let delay = if self.log_level == LogLevel::None {
            Duration::from_millis(300)
        } else {
            Duration::from_hours(365 * 24)
        };

        ProgressReporter::new(delay, self.use_colors)
    }

    /// A scheduler configured from the retry settings
    #[must_use]
    pub fn scheduler(&self) -> RetryScheduler {
        RetryScheduler::new(self.config.retry_interval).with_max_attempts(self.config.max_attempts)
    }
}

/// Print what a harvest did
pub fn report_summary<H: Host>(host: &mut H, what: &str, summary: &HarvestSummary) {
    let _ = writeln!(
        host.output(),
        "Harvested {what} into '{}': {} row(s) appended in {} attempt(s)",
        summary.path.display(),
        summary.rows_appended,
        summary.attempts
    );
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // A logger may already be installed when commands run more than once in a process
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use std::path::PathBuf;

    #[test]
    fn test_report_summary() {
        let mut host = TestHost::new();
        let summary = HarvestSummary {
            attempts: 2,
            rows_appended: 15,
            path: PathBuf::from("tokio_commits.csv"),
        };

        report_summary(&mut host, "commits", &summary);

        let output = String::from_utf8(host.output_buf).unwrap();
        assert_eq!(output, "Harvested commits into 'tokio_commits.csv': 15 row(s) appended in 2 attempt(s)\n");
    }
}
