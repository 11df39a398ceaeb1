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

//! Per-product release history
//!
//! Builds are recorded oldest first. Every build lands in the flat build and
//! download indices; only builds accepted by the [`Deduplicator`] land in the
//! per-product channel history.

use crate::classify::Channel;
use crate::dedup::{Decision, Deduplicator};
use crate::github::Release;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a product's history as served to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    pub version: String,
    pub tag: String,
    pub url: String,
    /// Sanitized HTML
    pub notes: String,
    pub published_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub channel: Channel,
}

/// Row of `builds.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub product: String,
    pub version: String,
    #[serde(rename = "type")]
    pub channel: Channel,
    pub url: String,
    pub hash: String,
}

/// Row of `download_counts.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub product: String,
    pub version: String,
    #[serde(rename = "type")]
    pub channel: Channel,
    pub url: String,
    pub download_count: u64,
}

/// A resolved build of one product from one release
#[derive(Debug, Clone)]
pub struct Build {
    pub product: String,
    pub entry: ReleaseEntry,
    pub hash: String,
    pub download_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductHistory {
    pub all: Vec<ReleaseEntry>,
    pub production: Vec<ReleaseEntry>,
    pub beta: Vec<ReleaseEntry>,
    pub dev: Vec<ReleaseEntry>,
}

impl ProductHistory {
    fn push(&mut self, entry: ReleaseEntry) {
        match entry.channel {
            Channel::Production => self.production.push(entry.clone()),
            Channel::Beta => self.beta.push(entry.clone()),
            Channel::Dev => self.dev.push(entry.clone()),
        }
        self.all.push(entry);
    }

    pub fn channel(&self, channel: Channel) -> &[ReleaseEntry] {
        match channel {
            Channel::Production => &self.production,
            Channel::Beta => &self.beta,
            Channel::Dev => &self.dev,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Everything derived from one pass over the releases
#[derive(Debug, Clone, Default)]
pub struct FeedHistory {
    pub products: BTreeMap<String, ProductHistory>,
    pub builds: Vec<FileRecord>,
    pub downloads: Vec<DownloadRecord>,
}

#[derive(Debug, Default)]
pub struct HistoryAssembler {
    dedup: Deduplicator,
    history: FeedHistory,
}

impl HistoryAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a build. Callers must feed builds in chronological order.
    pub fn record(&mut self, build: Build) -> Decision {
        let Build {
            product,
            entry,
            hash,
            download_count,
        } = build;

        self.history.builds.push(FileRecord {
            product: product.clone(),
            version: entry.version.clone(),
            channel: entry.channel,
            url: entry.url.clone(),
            hash: hash.clone(),
        });
        self.history.downloads.push(DownloadRecord {
            product: product.clone(),
            version: entry.version.clone(),
            channel: entry.channel,
            url: entry.url.clone(),
            download_count,
        });

        let decision = self.dedup.check(&product, entry.channel, &hash);
        if decision == Decision::Accept {
            self.history.products.entry(product).or_default().push(entry);
        }
        decision
    }

    pub fn finish(self) -> FeedHistory {
        self.history
    }
}

/// Published releases, oldest first by creation time. Drafts are dropped.
pub fn chronological(releases: Vec<Release>) -> Vec<Release> {
    let mut releases: Vec<Release> = releases.into_iter().filter(|r| !r.draft).collect();
    releases.sort_by_key(|r| r.created_at);
    releases
}
