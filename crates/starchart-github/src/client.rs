//! Authenticated GitHub API access.

use std::time::Duration;

use chrono::{
    DateTime,
    Utc,
};
use octocrab::Octocrab;
use reqwest::StatusCode;
use secrecy::{
    ExposeSecret,
    SecretString,
};
use starchart_core::{
    CatalogRepo,
    CrawlError,
    CrawlResult,
};
use tracing::{
    debug,
    warn,
};

use crate::pagination::STARGAZERS_PER_PAGE;

const API_BASE: &str = "https://api.github.com";

/// Accept value that makes the stargazers endpoint include `starred_at`.
const STAR_ACCEPT: &str = "application/vnd.github.v3.star+json";

/// Octocrab covers the structured endpoints; the raw client exists for the
/// stargazer calls, which need a media-type override and the `Link` response
/// header octocrab does not expose.
pub struct GitHubClient {
    octocrab: Octocrab,
    http: reqwest::Client,
    token: SecretString,
}

impl GitHubClient {
    const HTTP_TIMEOUT_SECS: u64 = 30;

    pub fn new(token: SecretString) -> CrawlResult<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.expose_secret().to_string())
            .build()
            .map_err(|e| {
                CrawlError::InvalidConfig(format!("Failed to build GitHub client: {e}"))
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(Self::HTTP_TIMEOUT_SECS))
            .user_agent("starchart")
            .build()
            .map_err(|e| CrawlError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            octocrab,
            http,
            token,
        })
    }

    /// Shared HTTP client, also used for unauthenticated downloads.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Login of the token's user; rejects bad credentials before the crawl
    /// spends any of its rate budget.
    pub async fn viewer_login(&self) -> CrawlResult<String> {
        let user = self
            .octocrab
            .current()
            .user()
            .await
            .map_err(|e| classify_credential_failure(&e.to_string()))?;

        Ok(user.login)
    }

    /// Current total star count of a repository.
    pub async fn star_count(&self, repo: &CatalogRepo) -> CrawlResult<usize> {
        let route = format!("/repos/{}/{}", repo.owner, repo.name);
        let data: serde_json::Value = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| CrawlError::Api(format!("Failed to fetch {repo}: {e}")))?;

        data.get("stargazers_count")
            .and_then(serde_json::Value::as_u64)
            .map(|count| count as usize)
            .ok_or_else(|| CrawlError::Api(format!("No stargazers_count for {repo}")))
    }

    /// Fetches one stargazer page in the `star+json` representation.
    ///
    /// `page` is `None` for the initial request that reads the `Link` header.
    pub async fn stargazer_page(
        &self, repo: &CatalogRepo, page: Option<usize>,
    ) -> CrawlResult<reqwest::Response> {
        let mut url = format!(
            "{API_BASE}/repos/{}/{}/stargazers?per_page={STARGAZERS_PER_PAGE}",
            repo.owner, repo.name
        );
        if let Some(page) = page {
            url.push_str(&format!("&page={page}"));
        }

        self.execute_rate_limited(&url).await
    }

    async fn execute_rate_limited(&self, url: &str) -> CrawlResult<reqwest::Response> {
        let request = self.build_request(url)?;

        loop {
            let attempt = try_clone(&request)?;
            debug!(url, "Calling GitHub API");

            let response = self
                .http
                .execute(attempt)
                .await
                .map_err(|e| CrawlError::Network(format!("Request failed: {e}")))?;

            let remaining = header_str(&response, "x-ratelimit-remaining");
            if !is_rate_limited(response.status(), remaining) {
                return Ok(response);
            }

            let reset = rate_limit_reset(header_str(&response, "x-ratelimit-reset"))?;
            let wait = (reset - Utc::now()).to_std().unwrap_or_default();
            warn!(
                url,
                reset = %reset,
                wait_secs = wait.as_secs(),
                "Rate limit exhausted, sleeping until reset"
            );
            tokio::time::sleep(wait).await;
        }
    }

    fn build_request(&self, url: &str) -> CrawlResult<reqwest::Request> {
        self.http
            .get(url)
            .header("Accept", STAR_ACCEPT)
            .header(
                "Authorization",
                format!("token {}", self.token.expose_secret()),
            )
            .build()
            .map_err(|e| CrawlError::Network(format!("Failed to build request: {e}")))
    }
}

fn try_clone(request: &reqwest::Request) -> CrawlResult<reqwest::Request> {
    request
        .try_clone()
        .ok_or_else(|| CrawlError::Network("Request cannot be cloned for replay".to_string()))
}

/// Only an explicit 401 means the token itself was rejected; transport
/// and server failures on the identity check stay ordinary API errors.
fn classify_credential_failure(error_text: &str) -> CrawlError {
    if error_text.contains("401") {
        CrawlError::AuthenticationFailed("Invalid GitHub token".to_string())
    } else {
        CrawlError::Api(format!("Failed to validate credentials: {error_text}"))
    }
}

/// GitHub reports quota exhaustion as 429, or as 403 with a zeroed
/// `x-ratelimit-remaining`; a plain 403 stays an ordinary API error.
fn is_rate_limited(status: StatusCode, remaining: Option<&str>) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }

    status == StatusCode::FORBIDDEN && remaining == Some("0")
}

fn rate_limit_reset(reset_header: Option<&str>) -> CrawlResult<DateTime<Utc>> {
    let reset = reset_header
        .ok_or_else(|| CrawlError::RateLimited("Missing x-ratelimit-reset header".to_string()))?
        .parse::<i64>()
        .map_err(|e| CrawlError::RateLimited(format!("Bad x-ratelimit-reset header: {e}")))?;

    DateTime::from_timestamp(reset, 0)
        .ok_or_else(|| CrawlError::RateLimited(format!("x-ratelimit-reset out of range: {reset}")))
}

fn header_str<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
