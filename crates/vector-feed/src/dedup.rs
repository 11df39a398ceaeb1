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

//! Suppression of repeated production builds

use crate::classify::Channel;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    /// Same content as the previous production build of this product
    Duplicate,
}

/// Last accepted production hash per product, for a single run
#[derive(Debug, Default)]
pub struct Deduplicator {
    last_production: HashMap<String, String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a build enters the channel history.
    ///
    /// Only production builds are compared, and only against the previous
    /// accepted production build of the same product.
    pub fn check(&mut self, product: &str, channel: Channel, hash: &str) -> Decision {
        if channel != Channel::Production {
            return Decision::Accept;
        }

        if self.last_production.get(product).map(String::as_str) == Some(hash) {
            return Decision::Duplicate;
        }

        self.last_production
            .insert(product.to_string(), hash.to_string());
        Decision::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_production_duplicate() {
        let mut dedup = Deduplicator::new();
        assert_eq!(dedup.check("sys11", Channel::Production, "a"), Decision::Accept);
        assert_eq!(
            dedup.check("sys11", Channel::Production, "a"),
            Decision::Duplicate
        );
        assert_eq!(dedup.check("sys11", Channel::Production, "b"), Decision::Accept);
    }

    #[test]
    fn test_non_adjacent_repeat_accepted() {
        let mut dedup = Deduplicator::new();
        assert_eq!(dedup.check("wpc", Channel::Production, "a"), Decision::Accept);
        assert_eq!(dedup.check("wpc", Channel::Production, "b"), Decision::Accept);
        assert_eq!(dedup.check("wpc", Channel::Production, "a"), Decision::Accept);
    }

    #[test]
    fn test_beta_and_dev_never_deduplicated() {
        let mut dedup = Deduplicator::new();
        assert_eq!(dedup.check("em", Channel::Production, "a"), Decision::Accept);
        assert_eq!(dedup.check("em", Channel::Beta, "a"), Decision::Accept);
        assert_eq!(dedup.check("em", Channel::Beta, "a"), Decision::Accept);
        assert_eq!(dedup.check("em", Channel::Dev, "a"), Decision::Accept);
        // beta/dev do not reset the production slot
        assert_eq!(dedup.check("em", Channel::Production, "a"), Decision::Duplicate);
    }

    #[test]
    fn test_products_tracked_separately() {
        let mut dedup = Deduplicator::new();
        assert_eq!(dedup.check("sys11", Channel::Production, "a"), Decision::Accept);
        assert_eq!(dedup.check("wpc", Channel::Production, "a"), Decision::Accept);
    }
}
