//! Loading the datacenter directory.
//!
//! The directory is read from a local cache file when one exists. Otherwise it
//! is downloaded once from the locations endpoint and the raw document is
//! written back to the cache for the next run.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use edgescan_common::config::USER_AGENT;
use edgescan_common::edge::directory::{Directory, DirectoryEntry};
use tracing::{debug, info, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn load(path: &Path, url: &str) -> Result<Directory> {
    if path.exists() {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading datacenter directory {}", path.display()))?;
        let directory =
            parse(&raw).with_context(|| format!("parsing datacenter directory {}", path.display()))?;
        info!("Loaded {} datacenters from {}", directory.len(), path.display());
        return Ok(directory);
    }

    info!("{} not found, downloading datacenter directory", path.display());
    let raw = fetch(url).await?;
    let directory = parse(&raw).with_context(|| format!("parsing datacenter directory from {url}"))?;

    match tokio::fs::write(path, raw.as_bytes()).await {
        Ok(()) => debug!("Cached datacenter directory at {}", path.display()),
        Err(e) => warn!("Could not cache datacenter directory at {}: {e}", path.display()),
    }

    info!("Loaded {} datacenters from {url}", directory.len());
    Ok(directory)
}

pub fn parse(raw: &str) -> Result<Directory> {
    let entries: Vec<DirectoryEntry> = serde_json::from_str(raw)?;
    Ok(entries.into_iter().collect())
}

async fn fetch(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("building HTTP client")?;

    let raw = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .with_context(|| format!("requesting {url}"))?
        .text()
        .await
        .with_context(|| format!("reading response from {url}"))?;

    Ok(raw)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
