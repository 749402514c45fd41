//! Artifact download.

use super::error::{ExtractError, RepoError};
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Maximum artifact size (200 MB).
pub const MAX_ARTIFACT_SIZE: u64 = 200 * 1024 * 1024;

/// Download timeout in seconds.
const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Download an artifact into memory.
///
/// The URL fragment (hash hint) is not sent.
///
/// # Errors
/// `NotFound` when the server answers 404 or 410; `Failed` for any other
/// status, transport error, or an artifact larger than `max_bytes`.
pub async fn download_artifact(
    client: &Client,
    url: &Url,
    max_bytes: u64,
) -> Result<Bytes, ExtractError> {
    let mut url = url.clone();
    url.set_fragment(None);

    let response = client
        .get(url.as_str())
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| RepoError::download_failed(format!("Failed to download '{url}': {e}")))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return Err(ExtractError::not_found(format!(
            "Artifact not found (status {status}): {url}"
        )));
    }

    if !status.is_success() {
        return Err(RepoError::download_failed(format!(
            "Download failed with status {status} for '{url}'"
        ))
        .into());
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(RepoError::download_failed(format!(
                "Artifact too large: {len} bytes (max: {max_bytes})"
            ))
            .into());
        }
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| RepoError::download_failed(format!("Failed to read response body: {e}")))?;

    if bytes.len() as u64 > max_bytes {
        return Err(RepoError::download_failed(format!(
            "Artifact too large: {} bytes (max: {max_bytes})",
            bytes.len()
        ))
        .into());
    }

    Ok(bytes)
}
