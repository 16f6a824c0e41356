//! GitHub API client
//!
//! Thin wrapper over `reqwest` that authenticates requests and sorts every response into
//! success, rate limited, not found, or failed.

use chrono::{DateTime, Utc};
use ohno::{EnrichableExt, IntoAppError};
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

const LOG_TARGET: &str = "    client";

/// Pattern to extract the last page number from a GitHub `Link` header
static LAST_PAGE_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[?&]page=(\d+)[^>]*>; rel=.last.").expect("invalid regex"));

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Result of a hosting API call
#[derive(Debug)]
pub enum HostingApiResult<T> {
    /// Request succeeded - contains data and optional rate limit info
    Success(T, Option<RateLimitInfo>),

    /// Rate limited - should retry after reset time
    RateLimited(RateLimitInfo),

    /// The requested resource was not found (404)
    NotFound(Option<RateLimitInfo>),

    /// Request failed permanently - should NOT retry
    Failed(ohno::AppError, Option<RateLimitInfo>),
}

/// Unwrap a `HostingApiResult::Success` or return the other variants unchanged
macro_rules! unwrap_or_return {
    ($expr:expr) => {
        match $expr {
            HostingApiResult::Success(data, rate_limit) => (data, rate_limit),
            HostingApiResult::RateLimited(rate_limit) => return HostingApiResult::RateLimited(rate_limit),
            HostingApiResult::NotFound(rate_limit) => return HostingApiResult::NotFound(rate_limit),
            HostingApiResult::Failed(e, rate_limit) => return HostingApiResult::Failed(e, rate_limit),
        }
    };
}

/// GitHub API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a new API client with optional authentication token and base URL
    pub fn new(token: Option<&str>, base_url: impl Into<String>) -> crate::Result<Self> {
        use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};

        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        let client = reqwest::Client::builder()
            .user_agent("repo-harvest")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make an API call and classify the result
    pub async fn api_call(&self, url: &str) -> HostingApiResult<reqwest::Response> {
        log::trace!(target: LOG_TARGET, "GET '{url}'");

        let resp = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return HostingApiResult::Failed(e.into(), None),
        };

        // Extract rate limit info from response headers before checking status
        let rate_limit = extract_rate_limit_from_headers(resp.headers());

        let status = resp.status();
        if status.is_success() {
            return HostingApiResult::Success(resp, rate_limit);
        }

        let status_code = status.as_u16();
        if is_rate_limited(status_code, resp.headers(), rate_limit.as_ref()) {
            // Use rate limit info from headers or default to 1 hour retry
            let rate_limit = rate_limit.unwrap_or_else(|| RateLimitInfo {
                remaining: 0,
                reset_at: Utc::now() + chrono::Duration::hours(1),
            });
            log::debug!(target: LOG_TARGET, "Rate limited on '{url}' until {}", rate_limit.reset_at);
            return HostingApiResult::RateLimited(rate_limit);
        }

        if status_code == 404 {
            return HostingApiResult::NotFound(rate_limit);
        }

        let error = match resp.error_for_status() {
            Ok(_) => ohno::app_err!("unexpected HTTP status {status} from '{url}'"),
            Err(e) => e.into(),
        };
        HostingApiResult::Failed(error, rate_limit)
    }

    /// Fetch `url` and deserialize its JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> HostingApiResult<T> {
        let (resp, rate_limit) = unwrap_or_return!(self.api_call(url).await);

        match resp.json().await {
            Ok(value) => HostingApiResult::Success(value, rate_limit),
            Err(e) => HostingApiResult::Failed(ohno::AppError::from(e).enrich_with(|| format!("decoding response from '{url}'")), rate_limit),
        }
    }

    /// Count the elements of the list at `url`, which must request one element per page
    ///
    /// The count is read from the `Link` header's last page number. Lists that fit on a single
    /// page carry no `Link` header, so the returned array is counted instead.
    pub async fn get_count(&self, url: &str) -> HostingApiResult<u64> {
        let (resp, rate_limit) = unwrap_or_return!(self.api_call(url).await);

        if let Some(count) = resp
            .headers()
            .get(LINK)
            .and_then(|h| h.to_str().ok())
            .and_then(last_page_from_link)
        {
            log::debug!(target: LOG_TARGET, "Fetched count {count} via Link header from '{url}'");
            return HostingApiResult::Success(count, rate_limit);
        }

        let bytes = match resp.bytes().await {
            Ok(b) => b,
            Err(e) => return HostingApiResult::Failed(e.into(), rate_limit),
        };

        match count_json_array_elements(&bytes) {
            Ok(count) => HostingApiResult::Success(count, rate_limit),
            Err(e) => HostingApiResult::Failed(e, rate_limit),
        }
    }
}

/// Whether a failed response means the quota ran out.
///
/// A 403 with quota left and no `retry-after` is a plain permission error.
fn is_rate_limited(status_code: u16, headers: &HeaderMap, rate_limit: Option<&RateLimitInfo>) -> bool {
    match status_code {
        429 => true,
        403 => headers.contains_key(RETRY_AFTER) || rate_limit.is_none_or(|info| info.remaining == 0),
        _ => false,
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}

fn last_page_from_link(link: &str) -> Option<u64> {
    LAST_PAGE_REGEX.captures(link)?.get(1)?.as_str().parse().ok()
}

/// Count elements in a JSON array without keeping their contents.
fn count_json_array_elements(json: &[u8]) -> crate::Result<u64> {
    use serde::de::IgnoredAny;

    let array: Vec<IgnoredAny> = serde_json::from_slice(json).into_app_err("malformed JSON while counting array elements")?;

    Ok(array.len() as u64)
}
