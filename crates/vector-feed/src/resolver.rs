// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Update asset lookup and metadata line parsing
//!
//! An update asset is one JSON object on the first line followed by the
//! firmware payload. Only the first line is read.

use crate::error::{FeedError, Result};
use crate::github::{GithubClient, Release, ReleaseAsset};
use crate::products::Product;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ResolvedAsset<'a> {
    pub asset: &'a ReleaseAsset,
    pub metadata: Value,
}

/// First line of a payload without its `\n` or `\r\n` terminator
pub fn first_line(payload: &[u8]) -> &[u8] {
    let line = payload
        .iter()
        .position(|b| *b == b'\n')
        .map_or(payload, |pos| &payload[..pos]);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parse a metadata line. Anything but a JSON object is rejected.
pub fn parse_metadata(line: &[u8]) -> Result<Value> {
    let value: Value = serde_json::from_slice(line)
        .map_err(|e| FeedError::Metadata(format!("first line is not JSON: {e}")))?;
    if !value.is_object() {
        return Err(FeedError::Metadata(
            "first line is not a JSON object".to_string(),
        ));
    }
    Ok(value)
}

/// Fetch and parse an update asset, returning `None` on any failure
pub async fn fetch_metadata(client: &GithubClient, url: &str) -> Option<Value> {
    match client.fetch_first_line(url).await {
        Ok(line) => match parse_metadata(&line) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("skip {url}: {e}");
                None
            }
        },
        Err(e) => {
            tracing::warn!("skip {url}: {e}");
            None
        }
    }
}

/// Locate and read a product's update asset within a release.
///
/// Absent assets, failed downloads and malformed metadata all yield `None`.
pub async fn resolve<'a>(
    client: &GithubClient,
    release: &'a Release,
    product: &Product,
) -> Option<ResolvedAsset<'a>> {
    let Some(asset) = release.asset(product.asset_name) else {
        tracing::info!(
            "skip {} [{}]: no {} asset",
            release.tag_name,
            product.id,
            product.asset_name
        );
        return None;
    };

    let metadata = fetch_metadata(client, &asset.browser_download_url).await?;
    Some(ResolvedAsset { asset, metadata })
}
