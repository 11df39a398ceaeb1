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

//! Version and release channel classification
//!
//! A release tag carries one product prefix (e.g. `wpc-1.4.0`), but a single
//! release can ship builds for several products. The release body may list the
//! exact version per product in a "Versions" section:
//!
//! ```text
//! ## Versions
//! - **Sys11**: `1.4.0`
//! - **Data East**: `1.4.0-beta2`
//! <!-- END VERSIONS SECTION -->
//! ```
//!
//! Entries from that section win over the tag-derived version. The channel is
//! then read from the version suffix alone; GitHub's prerelease flag is ignored.

use crate::products::Product;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

static DEV_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-dev\d+$").expect("valid dev suffix regex"));

static BETA_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-beta-?\d+$").expect("valid beta suffix regex"));

static VERSIONS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ims)^[ \t]*#{1,6}[^\n]*?\bversions\b(.*?)END VERSIONS SECTION")
        .expect("valid versions block regex")
});

static VERSION_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*\s*([^*`:\n]+?)\s*(?::\s*\*\*|\*\*\s*:)\s*`([^`\n]+)`")
        .expect("valid version pair regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Production,
    Beta,
    Dev,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Beta => "beta",
            Self::Dev => "dev",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a version string. Dev is checked before beta.
pub fn classify_channel(version: &str) -> Channel {
    if DEV_SUFFIX.is_match(version) {
        Channel::Dev
    } else if BETA_SUFFIX.is_match(version) {
        Channel::Beta
    } else {
        Channel::Production
    }
}

/// Strip the first matching product prefix from a tag (case-insensitive).
/// A tag matching no prefix is its own base version.
pub fn base_version<'a>(tag: &'a str, products: &[Product]) -> &'a str {
    for product in products {
        let prefix = product.tag_prefix();
        if let Some(head) = tag.get(..prefix.len())
            && head.eq_ignore_ascii_case(&prefix)
        {
            return tag.get(prefix.len()..).unwrap_or(tag);
        }
    }
    tag
}

/// Parse the "Versions" section of a release body into `lower(name) -> version`.
///
/// A body without the heading or without the end marker yields an empty map.
pub fn extract_versions(body: &str) -> HashMap<String, String> {
    let Some(block) = VERSIONS_BLOCK.captures(body).and_then(|c| c.get(1)) else {
        return HashMap::new();
    };

    VERSION_PAIR
        .captures_iter(block.as_str())
        .map(|c| (c[1].trim().to_lowercase(), c[2].trim().to_string()))
        .collect()
}

/// Version information for one release, ready to be queried per product
#[derive(Debug, Clone)]
pub struct ReleaseVersions {
    base: String,
    overrides: HashMap<String, String>,
}

impl ReleaseVersions {
    pub fn parse(tag: &str, body: &str, products: &[Product]) -> Self {
        Self {
            base: base_version(tag, products).to_string(),
            overrides: extract_versions(body),
        }
    }

    /// Version string and channel for a product
    pub fn for_product(&self, product: &Product) -> (String, Channel) {
        let version = product
            .version_keys()
            .iter()
            .find_map(|key| self.overrides.get(key))
            .cloned()
            .unwrap_or_else(|| self.base.clone());
        let channel = classify_channel(&version);
        (version, channel)
    }
}
