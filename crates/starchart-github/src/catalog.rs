//! Tools-catalog acquisition.
//!
//! The catalog is a JSON object keyed by tool name, where each entry carries
//! the tool's `source` repository URL. Only entries hosted on github.com can
//! be crawled; the rest are skipped at parse time.

use serde_json::Value;
use starchart_core::{
    CatalogRepo,
    CrawlError,
    CrawlResult,
};
use tracing::debug;

/// Downloads and parses the catalog.
///
/// An empty result is an error so a broken upstream list can never shrink
/// the committed snapshot to nothing.
pub async fn fetch_catalog(http: &reqwest::Client, url: &str) -> CrawlResult<Vec<CatalogRepo>> {
    let json: Value = http
        .get(url)
        .send()
        .await
        .map_err(|e| CrawlError::Network(format!("Failed to fetch catalog: {e}")))?
        .json()
        .await
        .map_err(|e| CrawlError::Serialization(format!("Catalog is not valid JSON: {e}")))?;

    let repos = parse_catalog(&json)?;
    if repos.is_empty() {
        return Err(CrawlError::InvalidConfig(format!(
            "Catalog at {url} contains no GitHub repositories"
        )));
    }

    Ok(repos)
}

/// Extracts crawl targets from the catalog object.
///
/// The repository name is the catalog key itself; the owner is taken from
/// the entry's `source` URL.
pub fn parse_catalog(json: &Value) -> CrawlResult<Vec<CatalogRepo>> {
    let entries = json
        .as_object()
        .ok_or_else(|| CrawlError::Serialization("Catalog is not a JSON object".to_string()))?;

    let mut repos = Vec::new();
    for (name, entry) in entries {
        match github_owner(entry) {
            Some(owner) => repos.push(CatalogRepo {
                owner,
                name: name.clone(),
            }),
            None => debug!(tool = %name, "Skipping entry without a GitHub source"),
        }
    }

    Ok(repos)
}

fn github_owner(entry: &Value) -> Option<String> {
    let source = entry.get("source")?.as_str()?;
    let mut segments = source.split('/');

    let host = segments.nth(2)?;
    if !host.eq_ignore_ascii_case("github.com") {
        return None;
    }

    let owner = segments.next()?;
    if owner.is_empty() {
        return None;
    }

    Some(owner.to_string())
}
