//! Stargazer page math.

use std::sync::LazyLock;

use regex::Regex;

/// Stargazers returned per page, the GitHub API default.
pub const STARGAZERS_PER_PAGE: usize = 30;

static LAST_PAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"next.*&page=(\d+).*last").expect("Invalid regex pattern"));

/// Extracts the total page count from a `Link` response header.
///
/// GitHub only sends the header while more pages exist, e.g.
/// `<...&page=2>; rel="next", <...&page=34>; rel="last"`. A missing or
/// unstructured header means everything fit on one page.
pub fn page_count(link_header: Option<&str>) -> usize {
    let Some(link) = link_header else {
        return 1;
    };

    LAST_PAGE_PATTERN
        .captures(link)
        .and_then(|caps| caps.get(1))
        .and_then(|page| page.as_str().parse().ok())
        .unwrap_or(1)
}

/// Picks which stargazer pages to request for a repository.
///
/// Repositories below the request budget fetch every page below the count;
/// larger ones sample `max_requests` evenly spaced pages, with page 1 kept
/// so the series still starts at the oldest stargazers.
pub fn plan_request_pages(page_count: usize, max_requests: usize) -> Vec<usize> {
    if page_count < max_requests {
        return (1..page_count).collect();
    }

    let mut pages: Vec<usize> = (1..=max_requests)
        .map(|i| (i * page_count) / max_requests - 1)
        .collect();
    if !pages.contains(&1) {
        pages.insert(0, 1);
    }
    pages
}
