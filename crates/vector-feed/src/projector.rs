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

//! Output views and the on-disk snapshot
//!
//! Layout under the output directory:
//!
//! ```text
//! vector/<product>/{all,prod,beta,dev,latest}.json
//! builds.json
//! download_counts.json
//! ```
//!
//! The complete set is rendered in memory first. Writing stages the product
//! tree next to the live one and swaps it in with renames, so a static host
//! never serves a half-deleted tree.

use crate::classify::Channel;
use crate::error::Result;
use crate::history::{FeedHistory, ProductHistory, ReleaseEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const NAMESPACE: &str = "vector";
pub const BUILDS_FILE: &str = "builds.json";
pub const DOWNLOADS_FILE: &str = "download_counts.json";

const STAGING_DIR: &str = ".vector.staging";
const RETIRED_DIR: &str = ".vector.old";

/// Content of `latest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestPointer {
    pub version: String,
    pub url: String,
    pub release_page: String,
    pub notes: String,
    pub published_at: DateTime<Utc>,
}

pub fn release_page(owner: &str, repo: &str, tag: &str) -> String {
    format!("https://github.com/{owner}/{repo}/releases/tag/{tag}")
}

pub fn channel_file(channel: Channel) -> &'static str {
    match channel {
        Channel::Production => "prod.json",
        Channel::Beta => "beta.json",
        Channel::Dev => "dev.json",
    }
}

/// Newest production entry, or the newest entry of any channel when the
/// product has no production build yet
pub fn latest_entry(history: &ProductHistory) -> Option<&ReleaseEntry> {
    newest(&history.production).or_else(|| newest(&history.all))
}

fn newest(entries: &[ReleaseEntry]) -> Option<&ReleaseEntry> {
    entries.iter().max_by_key(|e| e.published_at)
}

pub fn latest_pointer(entry: &ReleaseEntry, owner: &str, repo: &str) -> LatestPointer {
    LatestPointer {
        version: entry.version.clone(),
        url: entry.url.clone(),
        release_page: release_page(owner, repo, &entry.tag),
        notes: entry.notes.clone(),
        published_at: entry.published_at,
    }
}

/// Every output file of a run, rendered and ready to write
#[derive(Debug, Clone, Default)]
pub struct OutputSnapshot {
    /// Paths relative to `<out>/vector`
    tree: BTreeMap<PathBuf, Vec<u8>>,
    /// Files directly under `<out>`
    flat: BTreeMap<&'static str, Vec<u8>>,
    products: Vec<String>,
}

impl OutputSnapshot {
    pub fn build(history: &FeedHistory, owner: &str, repo: &str) -> Result<Self> {
        let mut snapshot = Self::default();

        for (product, entries) in &history.products {
            let Some(latest) = latest_entry(entries) else {
                continue;
            };
            let dir = PathBuf::from(product);

            snapshot.tree.insert(dir.join("all.json"), to_json(&entries.all)?);
            for channel in [Channel::Production, Channel::Beta, Channel::Dev] {
                snapshot
                    .tree
                    .insert(dir.join(channel_file(channel)), to_json(entries.channel(channel))?);
            }
            snapshot.tree.insert(
                dir.join("latest.json"),
                to_json(&latest_pointer(latest, owner, repo))?,
            );
            snapshot.products.push(product.clone());
        }

        snapshot.flat.insert(BUILDS_FILE, to_json(&history.builds)?);
        snapshot.flat.insert(DOWNLOADS_FILE, to_json(&history.downloads)?);

        Ok(snapshot)
    }

    /// Products that received a subtree
    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn file(&self, relative: &Path) -> Option<&[u8]> {
        if let Ok(rest) = relative.strip_prefix(NAMESPACE) {
            return self.tree.get(rest).map(Vec::as_slice);
        }
        relative
            .to_str()
            .and_then(|name| self.flat.get(name))
            .map(Vec::as_slice)
    }

    /// Replace the previous output under `out_dir` with this snapshot
    pub fn write(&self, out_dir: &Path) -> Result<()> {
        fs::create_dir_all(out_dir)?;

        let staging = out_dir.join(STAGING_DIR);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        for (relative, content) in &self.tree {
            let path = staging.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
        }

        let live = out_dir.join(NAMESPACE);
        let retired = out_dir.join(RETIRED_DIR);
        if retired.exists() {
            fs::remove_dir_all(&retired)?;
        }
        if live.exists() {
            fs::rename(&live, &retired)?;
        }
        fs::rename(&staging, &live)?;
        if retired.exists() {
            fs::remove_dir_all(&retired)?;
        }

        for (name, content) in &self.flat {
            write_atomic(&out_dir.join(name), content)?;
        }

        tracing::debug!(
            "Wrote {} product files and {} index files to {}",
            self.tree.len(),
            self.flat.len(),
            out_dir.display()
        );
        Ok(())
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut content = serde_json::to_vec_pretty(value)?;
    content.push(b'\n');
    Ok(content)
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
