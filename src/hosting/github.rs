//! Commit and issue listings of a GitHub repository, exposed as remote collections.

use super::client::{Client, HostingApiResult};
use super::models::{CommitDetail, CommitSummary, Issue, format_timestamp};
use super::repo_spec::RepoSpec;
use crate::harvest::{Cell, FetchError, RemoteCollection};
use core::fmt::{Display, Formatter};
use ohno::{EnrichableExt, app_err};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "    github";

/// Which issues an issue listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Closed,
    Open,
    All,
}

impl IssueState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::All => "all",
        }
    }
}

impl Display for IssueState {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a listing-level result. Anything but success or a rate limit aborts the run.
fn listing_result<T>(result: HostingApiResult<T>, what: &str) -> Result<T, FetchError> {
    match result {
        HostingApiResult::Success(value, _) => Ok(value),
        HostingApiResult::RateLimited(info) => Err(FetchError::RateLimited {
            reset_at: Some(info.reset_at),
        }),
        HostingApiResult::NotFound(_) => Err(FetchError::Fatal(app_err!("{what} not found"))),
        HostingApiResult::Failed(e, _) => Err(FetchError::Fatal(e.enrich_with(|| format!("fetching {what}")))),
    }
}

/// Map an element-level result. Failures only affect the element being resolved.
fn element_result<T>(result: HostingApiResult<T>, what: &str) -> Result<T, FetchError> {
    match result {
        HostingApiResult::Success(value, _) => Ok(value),
        HostingApiResult::RateLimited(info) => Err(FetchError::RateLimited {
            reset_at: Some(info.reset_at),
        }),
        HostingApiResult::NotFound(_) => Err(FetchError::Element(app_err!("{what} not found"))),
        HostingApiResult::Failed(e, _) => Err(FetchError::Element(e.enrich_with(|| format!("fetching {what}")))),
    }
}

/// The commits reachable from the default branch, newest first.
///
/// Each element is resolved with one extra request to get its changed files.
#[derive(Debug, Clone)]
pub struct CommitCollection {
    client: Client,
    repo: RepoSpec,
    page_size: u64,
}

impl CommitCollection {
    #[must_use]
    pub const fn new(client: Client, repo: RepoSpec, page_size: u64) -> Self {
        Self { client, repo, page_size }
    }

    fn listing_url(&self, per_page: u64, page: u64) -> String {
        format!(
            "{}/repos/{}/{}/commits?per_page={per_page}&page={page}",
            self.client.base_url(),
            self.repo.owner(),
            self.repo.repo()
        )
    }
}

impl RemoteCollection for CommitCollection {
    type Element = CommitSummary;

    fn page_size(&self) -> u64 {
        self.page_size
    }

    async fn total_count(&self) -> Result<u64, FetchError> {
        let url = self.listing_url(1, 1);
        listing_result(self.client.get_count(&url).await, &format!("commit count for '{}'", self.repo))
    }

    async fn page(&self, index: u64) -> Result<Vec<CommitSummary>, FetchError> {
        let url = self.listing_url(self.page_size, index + 1);
        log::debug!(target: LOG_TARGET, "Fetching commit page {} of '{}'", index + 1, self.repo);
        listing_result(self.client.get_json(&url).await, &format!("commits of '{}'", self.repo))
    }

    async fn expand(&self, element: CommitSummary) -> Result<Vec<Cell>, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.client.base_url(),
            self.repo.owner(),
            self.repo.repo(),
            element.sha
        );

        let detail: CommitDetail = element_result(self.client.get_json(&url).await, &format!("commit {}", element.sha))?;
        Ok(commit_cells(detail))
    }
}

/// Cells for `sha, author_id, author_name, date, files, files_sha`.
fn commit_cells(detail: CommitDetail) -> Vec<Cell> {
    let (author_id, author_name) = detail
        .author
        .map(|account| (account.id.to_string(), account.login))
        .unwrap_or_default();

    let date = detail
        .commit
        .author
        .and_then(|signature| signature.date)
        .map(|date| format_timestamp(&date))
        .unwrap_or_default();

    let (files, files_sha): (Vec<String>, Vec<String>) = detail
        .files
        .into_iter()
        .map(|file| (file.filename, file.sha.unwrap_or_default()))
        .unzip();

    vec![
        Cell::Scalar(detail.sha),
        Cell::Scalar(author_id),
        Cell::Scalar(author_name),
        Cell::Scalar(date),
        Cell::List(files),
        Cell::List(files_sha),
    ]
}

/// The issues of a repository in one state, oldest first.
///
/// GitHub's issue listing includes pull requests; they are kept.
#[derive(Debug, Clone)]
pub struct IssueCollection {
    client: Client,
    repo: RepoSpec,
    state: IssueState,
    page_size: u64,
}

impl IssueCollection {
    #[must_use]
    pub const fn new(client: Client, repo: RepoSpec, state: IssueState, page_size: u64) -> Self {
        Self {
            client,
            repo,
            state,
            page_size,
        }
    }

    #[must_use]
    pub const fn state(&self) -> IssueState {
        self.state
    }

    fn listing_url(&self, per_page: u64, page: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues?state={}&sort=created&direction=asc&per_page={per_page}&page={page}",
            self.client.base_url(),
            self.repo.owner(),
            self.repo.repo(),
            self.state
        )
    }
}

impl RemoteCollection for IssueCollection {
    type Element = Issue;

    fn page_size(&self) -> u64 {
        self.page_size
    }

    async fn total_count(&self) -> Result<u64, FetchError> {
        let url = self.listing_url(1, 1);
        listing_result(self.client.get_count(&url).await, &format!("{} issue count for '{}'", self.state, self.repo))
    }

    async fn page(&self, index: u64) -> Result<Vec<Issue>, FetchError> {
        let url = self.listing_url(self.page_size, index + 1);
        log::debug!(target: LOG_TARGET, "Fetching {} issue page {} of '{}'", self.state, index + 1, self.repo);
        listing_result(self.client.get_json(&url).await, &format!("{} issues of '{}'", self.state, self.repo))
    }

    async fn expand(&self, element: Issue) -> Result<Vec<Cell>, FetchError> {
        Ok(issue_cells(element))
    }
}

/// Cells for `id, state, assignee, user, tags, created_at, updated_at, closed_at`.
fn issue_cells(issue: Issue) -> Vec<Cell> {
    vec![
        Cell::Scalar(issue.number.to_string()),
        Cell::Scalar(issue.state),
        Cell::List(issue.assignees.iter().map(|a| a.id.to_string()).collect()),
        Cell::Scalar(issue.user.map(|u| u.id.to_string()).unwrap_or_default()),
        Cell::List(issue.labels.into_iter().map(|l| l.name).collect()),
        Cell::Scalar(format_timestamp(&issue.created_at)),
        Cell::Scalar(format_timestamp(&issue.updated_at)),
        Cell::Scalar(issue.closed_at.as_ref().map(format_timestamp).unwrap_or_default()),
    ]
}
