use super::Host;
use super::common::{Common, CommonArgs, report_summary};
use crate::Result;
use crate::harvest::{Harvester, Layout, Progress};
use crate::hosting::{CommitCollection, RepoSpec};
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct CommitsArgs {
    /// Repository to harvest, as `owner/name` or a GitHub URL
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Write one row per commit, keeping changed files as JSON lists
    #[arg(long)]
    pub no_explode_files: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Default output file for a repository's commits
#[must_use]
pub fn default_commits_path(repo: &RepoSpec) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}_commits.csv", repo.repo()))
}

pub async fn harvest_commits<H: Host>(host: &mut H, args: &CommitsArgs) -> Result<()> {
    let common = Common::new(&args.common, &args.repo)?;

    let explode_files = common.config.commits.explode_files && !args.no_explode_files;
    let layout = Layout::commits(explode_files, common.config.fill_value.as_str());
    let path = args.common.output.clone().unwrap_or_else(|| default_commits_path(&common.repo));

    let collection = CommitCollection::new(common.client.clone(), common.repo.clone(), common.config.page_size);
    let progress = common.progress_reporter();
    progress.set_phase("Commits");

    let summary = Harvester::new(&collection, layout, path, &progress)
        .run(&mut common.scheduler())
        .await?;

    report_summary(host, "commits", &summary);
    Ok(())
}
