//! GitHub access for the star-history crawler.
//!
//! `GitHubClient` wraps the authenticated API surface, `StarCrawler` turns
//! stargazer pages into dated records, and the catalog module resolves
//! which repositories to crawl in the first place.

mod catalog;
mod client;
mod crawler;
mod pagination;

pub use catalog::{
    fetch_catalog,
    parse_catalog,
};
pub use client::GitHubClient;
pub use crawler::StarCrawler;
