use super::Host;
use super::common::{Common, CommonArgs, report_summary};
use crate::Result;
use crate::harvest::{Harvester, Layout, Progress};
use crate::hosting::{IssueCollection, IssueState, RepoSpec};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

const LOG_TARGET: &str = "    issues";

#[derive(Parser, Debug)]
pub struct IssuesArgs {
    /// Repository to harvest, as `owner/name` or a GitHub URL
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Issue state to harvest; repeat to harvest several states into separate files
    #[arg(long, value_name = "STATE")]
    pub state: Vec<IssueState>,

    /// Keep labels as a JSON list instead of one row per label
    #[arg(long)]
    pub no_explode_tags: bool,

    /// Keep assignees as a JSON list instead of one row per assignee
    #[arg(long)]
    pub no_explode_assignee: bool,

    /// Keep created/updated/closed timestamps as columns instead of one row per event
    #[arg(long)]
    pub no_explode_time: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Output file for each requested state, in harvest order.
///
/// A single state goes to `output` or `<repo>_issues.csv`. With several states the state name is
/// worked into the file name, as `<repo>_<state>_issues.csv` or `<stem>_<state>.<ext>`.
#[must_use]
pub fn issue_output_paths(repo: &RepoSpec, states: &[IssueState], output: Option<&Utf8Path>) -> Vec<(IssueState, Utf8PathBuf)> {
    let mut unique = Vec::with_capacity(states.len());
    for state in states {
        if !unique.contains(state) {
            unique.push(*state);
        }
    }

    if let [state] = unique.as_slice() {
        let path = output.map_or_else(|| Utf8PathBuf::from(format!("{}_issues.csv", repo.repo())), Utf8Path::to_path_buf);
        return vec![(*state, path)];
    }

    unique
        .into_iter()
        .map(|state| {
            let path = match output {
                Some(output) => with_state_suffix(output, state),
                None => Utf8PathBuf::from(format!("{}_{state}_issues.csv", repo.repo())),
            };
            (state, path)
        })
        .collect()
}

fn with_state_suffix(path: &Utf8Path, state: IssueState) -> Utf8PathBuf {
    let stem = path.file_stem().unwrap_or("issues");
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{state}.{ext}"),
        None => format!("{stem}_{state}"),
    };
    path.with_file_name(file_name)
}

pub async fn harvest_issues<H: Host>(host: &mut H, args: &IssuesArgs) -> Result<()> {
    let common = Common::new(&args.common, &args.repo)?;
    let issues_config = &common.config.issues;

    let layout = Layout::issues(
        issues_config.explode_tags && !args.no_explode_tags,
        issues_config.explode_assignee && !args.no_explode_assignee,
        issues_config.explode_time && !args.no_explode_time,
        common.config.fill_value.as_str(),
    );

    let states = if args.state.is_empty() { issues_config.states.as_slice() } else { args.state.as_slice() };

    for (state, path) in issue_output_paths(&common.repo, states, args.common.output.as_deref()) {
        log::info!(target: LOG_TARGET, "Harvesting {state} issues of '{}' into '{path}'", common.repo);

        let collection = IssueCollection::new(common.client.clone(), common.repo.clone(), state, common.config.page_size);
        let progress = common.progress_reporter();
        progress.set_phase(&format!("{state} issues"));

        let summary = Harvester::new(&collection, layout.clone(), path, &progress)
            .run(&mut common.scheduler())
            .await?;

        report_summary(host, &format!("{state} issues"), &summary);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoSpec {
        RepoSpec::parse("octo/widgets").unwrap()
    }

    #[test]
    fn test_single_state_default_path() {
        let paths = issue_output_paths(&repo(), &[IssueState::Open], None);
        assert_eq!(paths, vec![(IssueState::Open, Utf8PathBuf::from("widgets_issues.csv"))]);
    }

    #[test]
    fn test_single_state_explicit_path() {
        let paths = issue_output_paths(&repo(), &[IssueState::All], Some(Utf8Path::new("out/all.csv")));
        assert_eq!(paths, vec![(IssueState::All, Utf8PathBuf::from("out/all.csv"))]);
    }

    #[test]
    fn test_several_states_default_paths() {
        let paths = issue_output_paths(&repo(), &[IssueState::Closed, IssueState::Open], None);
        assert_eq!(
            paths,
            vec![
                (IssueState::Closed, Utf8PathBuf::from("widgets_closed_issues.csv")),
                (IssueState::Open, Utf8PathBuf::from("widgets_open_issues.csv")),
            ]
        );
    }

    #[test]
    fn test_several_states_explicit_path() {
        let paths = issue_output_paths(&repo(), &[IssueState::Closed, IssueState::Open], Some(Utf8Path::new("data/issues.csv")));
        assert_eq!(paths[0].1, "data/issues_closed.csv");
        assert_eq!(paths[1].1, "data/issues_open.csv");
    }

    #[test]
    fn test_duplicate_states_collapse() {
        let paths = issue_output_paths(&repo(), &[IssueState::Open, IssueState::Open], None);
        assert_eq!(paths, vec![(IssueState::Open, Utf8PathBuf::from("widgets_issues.csv"))]);
    }
}
