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

//! Run configuration: command line plus environment

use crate::error::{FeedError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const API_URL_ENV: &str = "GITHUB_API_URL";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OUT_DIR: &str = "content";

#[derive(Debug, Parser)]
#[command(name = "vector-feed")]
#[command(
    about = "Fetch releases from a GitHub repository and generate per-product update JSON",
    long_about = None
)]
pub struct Cli {
    /// GitHub org or user (e.g. warped-pinball)
    #[arg(long)]
    pub owner: String,

    /// Repository to scan (e.g. vector)
    #[arg(long)]
    pub repo: String,

    /// Where to write the JSON files
    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub owner: String,

    pub repo: String,

    pub out_dir: PathBuf,

    /// Bearer credential for the GitHub API and asset downloads
    #[serde(skip_serializing)]
    pub token: String,

    /// Custom API base URL (GitHub Enterprise or tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl FeedConfig {
    /// Combine parsed arguments with the process environment.
    ///
    /// Fails when the token is missing, before anything touches the network.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV).ok();
        let api_base_url = std::env::var(API_URL_ENV).ok();
        Self::build(cli, token, api_base_url)
    }

    fn build(cli: Cli, token: Option<String>, api_base_url: Option<String>) -> Result<Self> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| FeedError::Config(format!("{TOKEN_ENV} not set")))?;

        if cli.owner.trim().is_empty() || cli.repo.trim().is_empty() {
            return Err(FeedError::Config(
                "owner and repo must not be empty".to_string(),
            ));
        }

        Ok(Self {
            owner: cli.owner,
            repo: cli.repo,
            out_dir: cli.out_dir,
            token,
            api_base_url: api_base_url.filter(|u| !u.trim().is_empty()),
        })
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }
}
