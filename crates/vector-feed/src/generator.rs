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

//! One full generation run: list, resolve, assemble, write

use crate::classify::ReleaseVersions;
use crate::config::FeedConfig;
use crate::dedup::Decision;
use crate::error::Result;
use crate::github::{GithubClient, Release};
use crate::hash::content_hash;
use crate::history::{Build, FeedHistory, HistoryAssembler, ReleaseEntry, chronological};
use crate::notes::render_notes;
use crate::products::PRODUCTS;
use crate::projector::OutputSnapshot;
use crate::resolver;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Releases considered after dropping drafts
    pub releases: usize,
    /// Builds recorded in the build index
    pub builds: usize,
    /// Products that received output
    pub products: Vec<String>,
}

/// Resolve every product of every release into history, oldest release first.
///
/// Per-asset failures are logged and skipped.
pub async fn collect(client: &GithubClient, releases: Vec<Release>) -> (usize, FeedHistory) {
    let releases = chronological(releases);
    let mut assembler = HistoryAssembler::new();

    for release in &releases {
        let versions = ReleaseVersions::parse(&release.tag_name, release.body(), PRODUCTS);
        let mut rendered_notes: Option<String> = None;

        for product in PRODUCTS {
            let Some(resolved) = resolver::resolve(client, release, product).await else {
                continue;
            };

            let (version, channel) = versions.for_product(product);
            let hash = content_hash(&resolved.metadata);
            let notes = rendered_notes
                .get_or_insert_with(|| render_notes(release.body()))
                .clone();

            let build = Build {
                product: product.id.to_string(),
                entry: ReleaseEntry {
                    version: version.clone(),
                    tag: release.tag_name.clone(),
                    url: resolved.asset.browser_download_url.clone(),
                    notes,
                    published_at: release.published(),
                    channel,
                },
                hash,
                download_count: resolved.asset.download_count,
            };

            match assembler.record(build) {
                Decision::Accept => {
                    info!("ok {} [{}]: {version} ({channel})", release.tag_name, product.id);
                }
                Decision::Duplicate => {
                    info!(
                        "duplicate {} [{}]: {version} matches previous production build",
                        release.tag_name, product.id
                    );
                }
            }
        }
    }

    (releases.len(), assembler.finish())
}

/// Run the generator end to end.
///
/// A failed release listing aborts before the output directory is touched.
pub async fn run(config: &FeedConfig) -> Result<RunSummary> {
    let client = GithubClient::from_config(config)?;

    info!("Listing releases of {}/{}", config.owner, config.repo);
    let releases = client.list_releases(&config.owner, &config.repo).await?;
    info!("Found {} releases", releases.len());

    let (release_count, history) = collect(&client, releases).await;
    let snapshot = OutputSnapshot::build(&history, &config.owner, &config.repo)?;
    snapshot.write(&config.out_dir)?;

    Ok(RunSummary {
        releases: release_count,
        builds: history.builds.len(),
        products: snapshot.products().to_vec(),
    })
}
