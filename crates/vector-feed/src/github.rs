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

//! GitHub Releases API client

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::resolver::first_line;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = concat!("vector-feed/", env!("CARGO_PKG_VERSION"));
const PAGE_SIZE: usize = 100;
const MAX_PAGES: usize = 100;

/// GitHub release asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Asset file name (e.g., "update_wpc.json")
    pub name: String,
    /// Download URL
    pub browser_download_url: String,
    /// Asset size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_count: u64,
    /// "sha256:<hex>" when GitHub has computed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// GitHub release information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Tag name (e.g., "sys11-1.4.0")
    pub tag_name: String,
    /// Release notes
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    /// Absent on drafts
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Asset with exactly this file name
    pub fn asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.name == name)
    }

    /// Publication time, falling back to creation time
    pub fn published(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    page_size: usize,
}

impl GithubClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            page_size: PAGE_SIZE,
        })
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        Self::new(config.api_base_url(), config.token.clone())
    }

    /// Override the page size used when listing releases
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// List every release of a repository, following pagination until a short page
    pub async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        let mut releases = Vec::new();

        for page in 1..=MAX_PAGES {
            let batch = self.list_page(owner, repo, page).await?;
            let count = batch.len();
            releases.extend(batch);
            tracing::debug!("Fetched page {page} with {count} releases");

            if count < self.page_size {
                return Ok(releases);
            }
        }

        tracing::warn!("Stopped listing releases after {MAX_PAGES} pages");
        Ok(releases)
    }

    async fn list_page(&self, owner: &str, repo: &str, page: usize) -> Result<Vec<Release>> {
        let url = format!(
            "{}/repos/{owner}/{repo}/releases?per_page={}&page={page}",
            self.base_url, self.page_size
        );

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| FeedError::ReleaseList(format!("Request failed: {e}")))?;

        if let Some(remaining) = response.headers().get("x-ratelimit-remaining")
            && let Ok(remaining_str) = remaining.to_str()
            && let Ok(remaining_int) = remaining_str.parse::<u32>()
            && remaining_int < 10
        {
            tracing::warn!("GitHub rate limit low: {remaining_int} remaining");
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(FeedError::ReleaseList(format!(
                "GitHub API error {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::ReleaseList(format!("Failed to parse response: {e}")))
    }

    /// Download an asset only up to the end of its first line.
    ///
    /// The trailing line terminator (`\n` or `\r\n`) is not included.
    pub async fn fetch_first_line(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| FeedError::Fetch(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FeedError::Fetch(format!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        let mut buf = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FeedError::Fetch(format!("Failed to read response: {e}")))?
        {
            buf.extend_from_slice(&chunk);
            if chunk.contains(&b'\n') {
                break;
            }
        }

        Ok(first_line(&buf).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn release_json(tag: &str) -> serde_json::Value {
        json!({
            "tag_name": tag,
            "body": "notes",
            "draft": false,
            "prerelease": false,
            "created_at": "2025-01-01T00:00:00Z",
            "published_at": "2025-01-01T01:00:00Z",
            "assets": [{
                "name": "update.json",
                "browser_download_url": "https://example.com/update.json",
                "size": 10,
                "download_count": 3
            }]
        })
    }

    fn page_query(page: &str, per_page: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), page.into()),
            Matcher::UrlEncoded("per_page".into(), per_page.into()),
        ])
    }

    #[test]
    fn test_release_accessors() {
        let mut release: Release = serde_json::from_value(release_json("sys11-1.0.0")).unwrap();
        assert!(release.asset("update.json").is_some());
        assert!(release.asset("update").is_none());
        assert_eq!(release.body(), "notes");
        assert_eq!(release.published().to_rfc3339(), "2025-01-01T01:00:00+00:00");

        release.published_at = None;
        assert_eq!(release.published(), release.created_at);
    }

    #[test]
    fn test_release_tolerates_missing_optional_fields() {
        let release: Release = serde_json::from_value(json!({
            "tag_name": "wpc-1.0.0",
            "body": null,
            "created_at": "2025-01-01T00:00:00Z",
            "published_at": null,
        }))
        .unwrap();
        assert_eq!(release.body(), "");
        assert!(release.assets.is_empty());
        assert!(!release.draft);
    }

    #[tokio::test]
    async fn test_list_releases_single_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/warped-pinball/vector/releases")
            .match_query(page_query("1", "100"))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([release_json("sys11-1.0.0")]).to_string())
            .create_async()
            .await;

        let client = GithubClient::new(server.url(), "test-token").unwrap();
        let releases = client.list_releases("warped-pinball", "vector").await.unwrap();

        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].tag_name, "sys11-1.0.0");
        assert_eq!(releases[0].assets[0].download_count, 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_releases_follows_pages() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/repos/o/r/releases")
            .match_query(page_query("1", "2"))
            .with_status(200)
            .with_body(json!([release_json("a"), release_json("b")]).to_string())
            .create_async()
            .await;
        let second = server
            .mock("GET", "/repos/o/r/releases")
            .match_query(page_query("2", "2"))
            .with_status(200)
            .with_body(json!([release_json("c")]).to_string())
            .create_async()
            .await;

        let client = GithubClient::new(server.url(), "t").unwrap().with_page_size(2);
        let releases = client.list_releases("o", "r").await.unwrap();

        let tags: Vec<_> = releases.iter().map(|r| r.tag_name.as_str()).collect();
        assert_eq!(tags, ["a", "b", "c"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_releases_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/o/r/releases")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .with_body(json!({"message": "API rate limit exceeded"}).to_string())
            .create_async()
            .await;

        let client = GithubClient::new(server.url(), "t").unwrap();
        let result = client.list_releases("o", "r").await;

        assert!(matches!(result, Err(FeedError::ReleaseList(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_first_line_stops_at_newline() {
        let mut server = Server::new_async().await;
        let mut body = b"{\"version\":\"1.0\"}\r\n".to_vec();
        body.extend_from_slice(&[0xff, 0x00, 0xfe, b'\n', 0x01]);
        let mock = server
            .mock("GET", "/update.json")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let client = GithubClient::new(server.url(), "t").unwrap();
        let line = client
            .fetch_first_line(&format!("{}/update.json", server.url()))
            .await
            .unwrap();

        assert_eq!(line, b"{\"version\":\"1.0\"}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_first_line_non_success() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.json")
            .with_status(404)
            .create_async()
            .await;

        let client = GithubClient::new(server.url(), "t").unwrap();
        let result = client
            .fetch_first_line(&format!("{}/missing.json", server.url()))
            .await;

        assert!(matches!(result, Err(FeedError::Fetch(_))));
    }
}
