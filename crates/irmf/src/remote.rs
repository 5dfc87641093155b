use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::{redirect, StatusCode, Url};
use tracing::debug;

use crate::ImportError;

/// The single trusted host IRMF documents are retrieved from. `resolve_raw_url`
/// guarantees every document URL lands here before a request is made.
pub const RAW_HOST: &str = "raw.githubusercontent.com";

/// Blocking HTTP client pinned to the raw-content host. One request per call,
/// no redirects, no retries; callers decide whether to try again.
#[derive(Debug, Clone)]
pub struct RawHostClient {
    http: Client,
}

impl RawHostClient {
    pub fn new() -> Result<Self, ImportError> {
        let http = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .map_err(ImportError::Client)?;
        Ok(Self { http })
    }

    /// Fetches the document body for a raw-content URL. Transport failures
    /// map to [`ImportError::Fetch`]; any non-200 status to
    /// [`ImportError::NotFound`] carrying the status code.
    pub fn fetch_document(&self, url: &str) -> Result<Vec<u8>, ImportError> {
        let parsed =
            Url::parse(url).map_err(|_| ImportError::UnsupportedSource(url.to_string()))?;
        if parsed.host_str() != Some(RAW_HOST) {
            return Err(ImportError::UnsupportedSource(url.to_string()));
        }
        debug!(%url, "fetching IRMF document");
        let response = self
            .http
            .get(parsed)
            .send()
            .map_err(|source| ImportError::Fetch {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ImportError::NotFound {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().map_err(|source| ImportError::Fetch {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    /// Downloads one referenced texture asset to `destination`, creating
    /// intermediate directories. Failures here are reported to the caller,
    /// which treats texture export as best-effort.
    pub fn fetch_asset(&self, src: &str, destination: &Path) -> Result<()> {
        let url = resolve_asset_url(src).with_context(|| format!("resolving asset url '{src}'"))?;
        debug!(%url, path = %destination.display(), "downloading texture asset");
        let response = self
            .http
            .get(url.clone())
            .send()
            .with_context(|| format!("requesting asset {url}"))?
            .error_for_status()
            .context("texture asset request failed")?;
        let bytes = response.bytes()?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(destination, &bytes)?;
        Ok(())
    }
}

fn resolve_asset_url(src: &str) -> Result<Url> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return Ok(Url::parse(src)?);
    }
    if src.starts_with("//") {
        return Ok(Url::parse(&format!("https:{src}"))?);
    }
    let base = Url::parse(&format!("https://{RAW_HOST}/"))?;
    base.join(src.trim_start_matches('/'))
        .context("joining asset url")
}
