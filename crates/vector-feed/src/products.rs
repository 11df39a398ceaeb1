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

//! Registry of Vector hardware targets and the update asset each one ships

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Identifier used for output paths and tag prefixes (e.g. "data_east")
    pub id: &'static str,
    /// Name as written in release notes (e.g. "Data East")
    pub display_name: &'static str,
    /// Release asset carrying the metadata line and firmware payload
    pub asset_name: &'static str,
}

pub const PRODUCTS: &[Product] = &[
    Product {
        id: "sys11",
        display_name: "Sys11",
        asset_name: "update.json",
    },
    Product {
        id: "wpc",
        display_name: "WPC",
        asset_name: "update_wpc.json",
    },
    Product {
        id: "em",
        display_name: "EM",
        asset_name: "update_em.json",
    },
    Product {
        id: "data_east",
        display_name: "Data East",
        asset_name: "update_data_east.json",
    },
];

impl Product {
    /// Tag prefix for this product, e.g. "data-east-"
    pub fn tag_prefix(&self) -> String {
        format!("{}-", self.id.replace('_', "-"))
    }

    /// Keys this product may appear under in a release body's versions block
    pub fn version_keys(&self) -> [String; 2] {
        [self.id.to_lowercase(), self.display_name.to_lowercase()]
    }
}

pub fn find(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}
