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

//! Vector update feed generator
//!
//! Reads every GitHub release of the Vector firmware repository, works out
//! which product builds each release carries and on which channel, drops
//! repeated production builds, and writes the static JSON feed polled by
//! update clients.

pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod generator;
pub mod github;
pub mod hash;
pub mod history;
pub mod notes;
pub mod products;
pub mod projector;
pub mod resolver;

pub use classify::{Channel, ReleaseVersions, classify_channel};
pub use config::{Cli, FeedConfig};
pub use error::FeedError;
pub use generator::{RunSummary, run};
pub use github::GithubClient;
pub use history::{HistoryAssembler, ReleaseEntry};
pub use projector::OutputSnapshot;
