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

//! Vector update feed generator - command line entry point

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vector_feed::{Cli, FeedConfig, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vector_feed=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = FeedConfig::from_cli(cli)?;

    let summary = run(&config).await?;
    info!(
        "Processed {} releases, {} builds indexed",
        summary.releases, summary.builds
    );

    if summary.products.is_empty() {
        info!("No product updates generated");
    } else {
        info!("Generated updates for: {}", summary.products.join(", "));
    }

    Ok(())
}
