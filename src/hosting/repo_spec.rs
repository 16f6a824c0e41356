use crate::Result;
use core::fmt::{Display, Formatter};
use core::str::FromStr;
use ohno::{IntoAppError, bail};
use url::Url;

/// A GitHub repository, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSpec {
    owner: String,
    repo: String,
}

impl RepoSpec {
    /// Parse `owner/name` or a repository URL such as `https://github.com/owner/name.git`.
    ///
    /// # Errors
    ///
    /// Fails when the owner or name cannot be determined.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        if text.contains("://") {
            let url = Url::parse(text).into_app_err_with(|| format!("invalid repository URL '{text}'"))?;
            let segments: Vec<_> = url.path_segments().map(Iterator::collect).unwrap_or_default();

            if segments.len() < 2 {
                bail!("invalid repository URL format: {url}");
            }

            return Self::from_parts(segments[0], segments[1]);
        }

        match text.split('/').collect::<Vec<_>>().as_slice() {
            [owner, repo] => Self::from_parts(owner, repo),
            _ => bail!("expected a repository in the form 'owner/name', got '{text}'"),
        }
    }

    fn from_parts(owner: &str, repo: &str) -> Result<Self> {
        let repo = repo.trim_end_matches(".git");

        if owner.is_empty() || repo.is_empty() {
            bail!("empty owner or repository name in '{owner}/{repo}'");
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for RepoSpec {
    type Err = ohno::AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for RepoSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_and_name() {
        let spec = RepoSpec::parse("tokio-rs/tokio").unwrap();
        assert_eq!(spec.owner(), "tokio-rs");
        assert_eq!(spec.repo(), "tokio");
        assert_eq!(spec.to_string(), "tokio-rs/tokio");
    }

    #[test]
    fn test_parse_github_url() {
        let spec = RepoSpec::parse("https://github.com/serde-rs/serde").unwrap();
        assert_eq!(spec.owner(), "serde-rs");
        assert_eq!(spec.repo(), "serde");
    }

    #[test]
    fn test_parse_url_with_git_extension_and_extra_segments() {
        assert_eq!(RepoSpec::parse("https://github.com/serde-rs/serde.git").unwrap().repo(), "serde");
        assert_eq!(RepoSpec::parse("https://github.com/tokio-rs/tokio/tree/master").unwrap().repo(), "tokio");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(RepoSpec::parse("tokio").is_err());
        assert!(RepoSpec::parse("a/b/c").is_err());
        assert!(RepoSpec::parse("/tokio").is_err());
        assert!(RepoSpec::parse("https://github.com/tokio-rs").is_err());
        assert!(RepoSpec::parse("https://github.com//tokio").is_err());
    }

    #[test]
    fn test_from_str() {
        let spec: RepoSpec = "rust-lang/rust".parse().unwrap();
        assert_eq!(spec.owner(), "rust-lang");
    }
}
