mod config;

use anyhow::Context;
use starchart_core::{
    logging,
    StarSnapshot,
};
use starchart_github::{
    fetch_catalog,
    GitHubClient,
    StarCrawler,
};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    logging::init();

    let Config {
        token,
        catalog_url,
        output,
        max_requests,
    } = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting star-history crawl");
    tracing::info!("Catalog: {catalog_url}");
    tracing::info!("Output: {}", output.display());

    let client = GitHubClient::new(token)?;
    let viewer = client
        .viewer_login()
        .await
        .context("GitHub rejected the configured token")?;
    tracing::info!(viewer = %viewer, "Authenticated with GitHub");

    let repos = fetch_catalog(client.http(), &catalog_url)
        .await
        .context("Failed to load the tools catalog")?;
    tracing::info!(repos = repos.len(), "Catalog loaded");

    let crawler = StarCrawler::new(client, max_requests);

    let mut snapshot = StarSnapshot::new();
    let mut failed = 0usize;
    for repo in &repos {
        tracing::info!(repo = %repo, "Fetching star history");
        match crawler.history(repo).await {
            Ok(history) => snapshot.insert(repo.name.clone(), history),
            Err(e) => {
                failed += 1;
                tracing::warn!(repo = %repo, error = %e, "Skipping repository");
            }
        }
    }

    if snapshot.is_empty() {
        anyhow::bail!(
            "All {failed} repositories failed; leaving {} untouched",
            output.display()
        );
    }

    snapshot
        .write(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        written = snapshot.len(),
        failed,
        "Snapshot written to {}",
        output.display()
    );

    Ok(())
}
