use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use super::types::{FetchParams, GraphData};

/// Fetch one graph snapshot from the archive data API.
///
/// Blocking; called from the background loader thread, never from the UI
/// thread. Global and ego-network requests use different endpoints.
pub fn fetch_graph(base_url: &str, params: &FetchParams) -> Result<GraphData> {
    let url = match &params.ego {
        Some(ego) => format!(
            "{}/api/graph/ego/{}?depth={}",
            base_url.trim_end_matches('/'),
            ego,
            params.ego_depth,
        ),
        None => format!(
            "{}/api/graph?min_weight={}&limit={}",
            base_url.trim_end_matches('/'),
            params.min_weight,
            params.max_nodes,
        ),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(&url)
        .send()
        .with_context(|| format!("request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("archive API returned {status} for {url}"));
    }

    response
        .json::<GraphData>()
        .with_context(|| format!("invalid graph JSON from {url}"))
}
