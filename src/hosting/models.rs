//! GitHub REST payloads, trimmed to the fields that end up in the output.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Timestamp format used in every output column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// A GitHub user account.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: u64,
    pub login: String,
}

/// An entry of the commit listing. The listing omits changed files, so only the SHA is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
}

/// A single commit as returned by `/repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub sha: String,

    /// The GitHub account linked to the commit author, absent for unlinked emails.
    pub author: Option<Account>,

    pub commit: GitCommit,

    #[serde(default)]
    pub files: Vec<CommitFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitCommit {
    pub author: Option<GitSignature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitSignature {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitFile {
    pub filename: String,

    /// Blob SHA; GitHub sends `null` for some deletions and submodule changes.
    #[serde(default)]
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

/// An issue (or pull request) from the issue listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub state: String,
    #[serde(default)]
    pub assignees: Vec<Account>,
    pub user: Option<Account>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_detail_deserialize() {
        let json = r#"{
            "sha": "abc123",
            "author": { "id": 583231, "login": "octocat", "type": "User" },
            "commit": {
                "author": { "name": "The Octocat", "email": "octocat@github.com", "date": "2024-03-05T10:20:30Z" },
                "message": "Fix all the bugs"
            },
            "files": [
                { "filename": "src/lib.rs", "sha": "f1", "status": "modified" },
                { "filename": "old.txt", "sha": null, "status": "removed" }
            ]
        }"#;

        let commit: CommitDetail = serde_json::from_str(json).unwrap();
        assert_eq!(commit.sha, "abc123");
        assert_eq!(commit.author.as_ref().unwrap().id, 583_231);
        assert_eq!(commit.author.as_ref().unwrap().login, "octocat");
        assert_eq!(commit.files.len(), 2);
        assert!(commit.files[1].sha.is_none());

        let date = commit.commit.author.unwrap().date.unwrap();
        assert_eq!(format_timestamp(&date), "2024-03-05 10:20:30");
    }

    #[test]
    fn test_commit_detail_without_linked_account() {
        let json = r#"{
            "sha": "abc123",
            "author": null,
            "commit": { "author": { "name": "someone", "date": "2024-03-05T10:20:30Z" } }
        }"#;

        let commit: CommitDetail = serde_json::from_str(json).unwrap();
        assert!(commit.author.is_none());
        assert!(commit.files.is_empty());
    }

    #[test]
    fn test_issue_deserialize() {
        let json = r#"{
            "id": 1,
            "number": 1347,
            "state": "closed",
            "assignees": [{ "id": 1, "login": "a" }, { "id": 2, "login": "b" }],
            "user": { "id": 583231, "login": "octocat" },
            "labels": [{ "id": 208045946, "name": "bug" }],
            "created_at": "2011-04-22T13:33:48Z",
            "updated_at": "2011-04-23T13:33:48Z",
            "closed_at": "2011-04-24T13:33:48Z"
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 1347);
        assert_eq!(issue.state, "closed");
        assert_eq!(issue.assignees.len(), 2);
        assert_eq!(issue.labels[0].name, "bug");
        assert_eq!(format_timestamp(&issue.closed_at.unwrap()), "2011-04-24 13:33:48");
    }

    #[test]
    fn test_open_issue_has_no_closed_at() {
        let json = r#"{
            "number": 7,
            "state": "open",
            "user": null,
            "created_at": "2011-04-22T13:33:48Z",
            "updated_at": "2011-04-22T13:33:48Z",
            "closed_at": null
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert!(issue.closed_at.is_none());
        assert!(issue.assignees.is_empty());
        assert!(issue.labels.is_empty());
    }
}
