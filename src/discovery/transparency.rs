//! Passive certificate transparency lookup (crt.sh-compatible JSON API).

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tokio::time::Instant;

use crate::domain::Domain;

#[derive(Debug, Deserialize)]
struct CertificateEntry {
    name_value: String,
}

/// Queries `{base_url}/?q=%.{domain}&output=json` for names on issued certificates.
///
/// Each entry's `name_value` may hold several newline-separated names; only
/// names under `domain` are returned, normalized and in response order.
pub async fn lookup(
    client: &reqwest::Client,
    base_url: &str,
    domain: &Domain,
    deadline: Instant,
) -> Result<Vec<String>> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        bail!("no time left in the run budget");
    }

    let url = format!("{}/", base_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .query(&[("q", format!("%.{domain}")), ("output", "json".to_string())])
        .timeout(remaining)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("{url} answered {status}");
    }

    let body = response.text().await.context("failed to read response body")?;
    let entries: Vec<CertificateEntry> =
        serde_json::from_str(&body).context("response is not the expected JSON array")?;

    let hosts = entries
        .iter()
        .flat_map(|entry| entry.name_value.split('\n'))
        .filter_map(|name| domain.match_host(name))
        .collect();
    Ok(hosts)
}
