//! Environment-driven configuration.

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use starchart_core::{
    CrawlError,
    CrawlResult,
};

/// Default tools catalog, the static-analysis list.
pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/analysis-tools-dev/static-analysis/master/data/api/tools.json";

const DEFAULT_OUTPUT: &str = "stars.json";
const DEFAULT_MAX_REQUESTS: usize = 10;

pub struct Config {
    pub token: SecretString,
    pub catalog_url: String,
    pub output: PathBuf,
    pub max_requests: usize,
}

impl Config {
    pub fn from_env() -> CrawlResult<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    fn from_vars(vars: &HashMap<String, String>) -> CrawlResult<Self> {
        let token = vars
            .get("GITHUB_TOKEN")
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CrawlError::InvalidConfig(
                    "GITHUB_TOKEN must be set; the crawl needs an authenticated rate limit"
                        .to_string(),
                )
            })?;

        let catalog_url = vars
            .get("STARCHART_CATALOG_URL")
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());

        let output = vars
            .get("STARCHART_OUTPUT")
            .map(|path| path.trim())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let max_requests = vars
            .get("STARCHART_MAX_REQUESTS")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_REQUESTS);

        Ok(Self {
            token: SecretString::from(token.to_string()),
            catalog_url,
            output,
            max_requests,
        })
    }
}
