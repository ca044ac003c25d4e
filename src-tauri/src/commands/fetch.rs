use crate::error::{PulseError, PulseResult};
use crate::models::snapshot::RawSnapshot;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where `history.json` comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum SnapshotSource {
    Url(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: format!("techpulse/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Fetch and parse the snapshot. HTTP responses are always requested fresh;
/// any non-2xx status is a fetch failure.
pub async fn fetch_snapshot(source: &SnapshotSource, options: &FetchOptions) -> PulseResult<RawSnapshot> {
    let body = match source {
        SnapshotSource::Url(url) => fetch_url(url, options).await?,
        SnapshotSource::File(path) => tokio::fs::read(path)
            .await
            .map_err(|e| PulseError::fetch(format!("Could not read {}: {e}", path.display())))?,
    };

    RawSnapshot::from_json_slice(&body)
}

async fn fetch_url(url: &str, options: &FetchOptions) -> PulseResult<Vec<u8>> {
    log::info!("REQ {url}");

    let client = reqwest::Client::builder()
        .timeout(options.timeout)
        .build()?;
    let res = client
        .get(url)
        .header(reqwest::header::USER_AGENT, options.user_agent.as_str())
        .header(reqwest::header::CACHE_CONTROL, "no-cache, no-store")
        .header(reqwest::header::PRAGMA, "no-cache")
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        return Err(PulseError::fetch(format!("Can't fetch history.json: HTTP {status}")));
    }

    Ok(res.bytes().await?.to_vec())
}
