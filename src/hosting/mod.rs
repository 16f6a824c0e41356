//! GitHub as a source of remote collections
//!
//! [`CommitCollection`] and [`IssueCollection`] adapt GitHub's paginated REST listings to
//! [`RemoteCollection`](crate::harvest::RemoteCollection). HTTP responses are classified once
//! by the [`Client`], and the collections translate that classification into harvest fetch
//! errors: quota exhaustion anywhere becomes a rate limit, a failure resolving a single commit
//! affects only that element, and a failed listing request aborts the run.

mod client;
mod github;
mod models;
mod repo_spec;

pub use client::{Client, HostingApiResult, RateLimitInfo};
pub use github::{CommitCollection, IssueCollection, IssueState};
pub use models::{TIMESTAMP_FORMAT, format_timestamp};
pub use repo_spec::RepoSpec;
