//! Command dispatch logic for repo-harvest

use super::{CommitsArgs, InitArgs, IssuesArgs, harvest_commits, harvest_issues, init_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};
use std::io::Write;

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "repo-harvest", author, version, long_about = None)]
#[command(about = "Incrementally download a GitHub repository's commits and issues into CSV files")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: HarvestSubcommand,
}

#[derive(Subcommand, Debug)]
enum HarvestSubcommand {
    /// Harvest the commits of a repository, one row per changed file
    Commits(Box<CommitsArgs>),
    /// Harvest the issues of a repository, one row per lifecycle event
    Issues(Box<IssuesArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails. The error is
/// also written to the host's error stream and the host is asked to exit with status 1.
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);

    let result = match &cli.command {
        HarvestSubcommand::Commits(commits_args) => harvest_commits(host, commits_args).await,
        HarvestSubcommand::Issues(issues_args) => harvest_issues(host, issues_args).await,
        HarvestSubcommand::Init(init_args) => init_config(host, init_args),
    };

    if let Err(e) = &result {
        let _ = writeln!(host.error(), "error: {e:#}");
        host.exit(1);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_issues_flags() {
        let cli = Cli::parse_from([
            "repo-harvest",
            "issues",
            "octo/widgets",
            "--state",
            "open",
            "--state",
            "closed",
            "--no-explode-tags",
            "--output",
            "out.csv",
        ]);

        let HarvestSubcommand::Issues(args) = cli.command else {
            panic!("expected issues subcommand");
        };
        assert_eq!(args.repo, "octo/widgets");
        assert_eq!(args.state.len(), 2);
        assert!(args.no_explode_tags);
        assert!(!args.no_explode_assignee);
        assert_eq!(args.common.output.as_deref().map(camino::Utf8Path::as_str), Some("out.csv"));
    }

    #[test]
    fn test_parse_commits_flags() {
        let cli = Cli::parse_from(["repo-harvest", "commits", "https://github.com/octo/widgets", "--no-explode-files"]);

        let HarvestSubcommand::Commits(args) = cli.command else {
            panic!("expected commits subcommand");
        };
        assert!(args.no_explode_files);
    }

    #[tokio::test]
    async fn test_run_init() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("harvest.toml");
        let mut host = TestHost::new();

        run(&mut host, ["repo-harvest", "init", output.to_str().unwrap()]).await.unwrap();

        assert!(output.exists());
        assert!(host.exit_code.is_none());
    }

    #[tokio::test]
    async fn test_run_reports_errors_to_host() {
        let mut host = TestHost::new();

        let result = run(&mut host, ["repo-harvest", "commits", "not-a-repo"]).await;

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(String::from_utf8(host.error_buf).unwrap().starts_with("error: "));
    }
}
