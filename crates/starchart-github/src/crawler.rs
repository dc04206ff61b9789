//! Star-history reconstruction from sampled stargazer pages.

use std::sync::Arc;

use chrono::{
    DateTime,
    Duration,
    NaiveDate,
    Utc,
};
use futures::future::join_all;
use serde::Deserialize;
use starchart_core::{
    CatalogRepo,
    CrawlError,
    CrawlResult,
    RetryPolicy,
    StarRecord,
};
use tokio::sync::Semaphore;
use tracing::{
    debug,
    warn,
};

use crate::client::GitHubClient;
use crate::pagination::{
    self,
    STARGAZERS_PER_PAGE,
};

/// Histories whose newest record is older than this get the current total
/// appended, so every series ends near the present.
const FRESHNESS_WINDOW_DAYS: i64 = 90;

/// Concurrent stargazer page requests per repository.
const MAX_CONCURRENT_PAGES: usize = 5;

/// Wire shape of one stargazer in the `star+json` representation.
#[derive(Debug, Deserialize)]
struct Stargazer {
    starred_at: DateTime<Utc>,
}

/// Rebuilds approximate star histories one repository at a time, spending at
/// most `max_requests` stargazer pages per repository.
pub struct StarCrawler {
    client: GitHubClient,
    retry_policy: RetryPolicy,
    max_requests: usize,
}

impl StarCrawler {
    pub fn new(client: GitHubClient, max_requests: usize) -> Self {
        Self {
            client,
            retry_policy: RetryPolicy::default(),
            max_requests,
        }
    }

    /// Reconstructs the star history of one repository.
    ///
    /// Small repositories walk every stargazer page and condense them into
    /// evenly spaced records; large ones sample the budgeted pages and date
    /// each record by the first stargazer on its page.
    pub async fn history(&self, repo: &CatalogRepo) -> CrawlResult<Vec<StarRecord>> {
        self.retry_policy.retry(|| self.history_once(repo)).await
    }

    async fn history_once(&self, repo: &CatalogRepo) -> CrawlResult<Vec<StarRecord>> {
        let first = self.client.stargazer_page(repo, None).await?;
        let page_count = pagination::page_count(link_header(&first));
        let stargazers = decode_page(first).await?;

        if page_count == 1 && stargazers.is_empty() {
            debug!(repo = %repo, "Repository has no stargazers yet");
            return Ok(Vec::new());
        }

        let request_pages = pagination::plan_request_pages(page_count, self.max_requests);
        debug!(repo = %repo, page_count, pages = request_pages.len(), "Fetching stargazer pages");
        let pages = self.fetch_pages(repo, &request_pages).await;

        let mut records = if request_pages.len() < self.max_requests {
            condense_all(pages, self.max_requests)?
        } else {
            sample_first_of_page(&request_pages, pages)
        };
        records.sort();

        let today = Utc::now().date_naive();
        if needs_current_total(&records, today) {
            let count = self.client.star_count(repo).await?;
            records.push(StarRecord { date: today, count });
        }

        Ok(records)
    }

    async fn fetch_pages(
        &self, repo: &CatalogRepo, request_pages: &[usize],
    ) -> Vec<CrawlResult<Vec<Stargazer>>> {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_PAGES));

        let page_futures = request_pages.iter().map(|&page| {
            let semaphore = semaphore.clone();

            async move {
                let _permit = semaphore.acquire().await.unwrap();
                let response = self.client.stargazer_page(repo, Some(page)).await?;
                decode_page(response).await
            }
        });

        join_all(page_futures).await
    }
}

async fn decode_page(response: reqwest::Response) -> CrawlResult<Vec<Stargazer>> {
    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Api(format!("Response status: {status}")));
    }

    response.json::<Vec<Stargazer>>().await.map_err(|e| {
        if e.is_decode() {
            CrawlError::Serialization(format!("Bad stargazer payload: {e}"))
        } else {
            CrawlError::Network(format!("Failed to read stargazer page: {e}"))
        }
    })
}

fn link_header(response: &reqwest::Response) -> Option<&str> {
    response.headers().get("link").and_then(|v| v.to_str().ok())
}

/// Flattens fully walked pages into records spaced one request-budget step
/// apart. Any failed page fails the repository, since a gap here would skew
/// every count after it.
fn condense_all(
    pages: Vec<CrawlResult<Vec<Stargazer>>>, max_requests: usize,
) -> CrawlResult<Vec<StarRecord>> {
    let mut stars: Vec<Stargazer> = Vec::new();
    for page in pages {
        stars.extend(page?);
    }

    let step = (stars.len() / max_requests).max(1);
    let mut records = Vec::new();
    let mut index = 0;
    while index < stars.len() {
        records.push(StarRecord {
            date: stars[index].starred_at.date_naive(),
            count: STARGAZERS_PER_PAGE * index,
        });
        index += step;
    }

    Ok(records)
}

/// Dates each sampled page by its first stargazer; the page id puts a count
/// on the record. Failed pages only cost their sample point.
fn sample_first_of_page(
    request_pages: &[usize], pages: Vec<CrawlResult<Vec<Stargazer>>>,
) -> Vec<StarRecord> {
    let mut records = Vec::new();

    for (&page_id, page) in request_pages.iter().zip(pages) {
        match page {
            Ok(stargazers) => {
                if let Some(first) = stargazers.first() {
                    records.push(StarRecord {
                        date: first.starred_at.date_naive(),
                        count: STARGAZERS_PER_PAGE * page_id,
                    });
                }
            }
            Err(e) => {
                warn!(page = page_id, error = %e, "Skipping failed stargazer page");
            }
        }
    }

    records
}

fn needs_current_total(records: &[StarRecord], today: NaiveDate) -> bool {
    match records.last() {
        None => true,
        Some(last) => (today - last.date) > Duration::days(FRESHNESS_WINDOW_DAYS),
    }
}
