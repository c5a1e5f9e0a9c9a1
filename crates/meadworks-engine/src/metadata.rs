//! Token metadata configuration.
//!
//! A write-only configuration surface carried over from the original
//! system: a base URI plus a suffix per (style, tier) pair. The engine
//! only stores and composes the strings; serving them is someone else's
//! job. Nothing here is accrual-relevant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use meadworks_types::BreweryStyle;

/// Base URI plus per-(style, tier) suffixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTable {
    base_uri: String,
    suffixes: BTreeMap<BreweryStyle, BTreeMap<u32, String>>,
}

impl MetadataTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            base_uri: String::new(),
            suffixes: BTreeMap::new(),
        }
    }

    /// Set the base URI all token URIs are composed from.
    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) {
        self.base_uri = base_uri.into();
    }

    /// The configured base URI.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Set the suffix for a (style, tier) pair, replacing any previous one.
    pub fn set_token_uri(&mut self, style: BreweryStyle, tier: u32, suffix: impl Into<String>) {
        self.suffixes
            .entry(style)
            .or_default()
            .insert(tier, suffix.into());
    }

    /// Compose the full URI for a (style, tier) pair.
    ///
    /// Returns `None` when the pair has no configured suffix.
    pub fn token_uri(&self, style: BreweryStyle, tier: u32) -> Option<String> {
        let suffix = self.suffixes.get(&style)?.get(&tier)?;
        Some(format!("{}{suffix}", self.base_uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_base_and_suffix() {
        let mut table = MetadataTable::new();
        table.set_base_uri("https://meta.example/ipfs/QmHash");
        table.set_token_uri(BreweryStyle::Classic, 0, "/style/0/tier/0.json");
        assert_eq!(
            table.token_uri(BreweryStyle::Classic, 0),
            Some(String::from(
                "https://meta.example/ipfs/QmHash/style/0/tier/0.json"
            ))
        );
    }

    #[test]
    fn unconfigured_pair_is_none() {
        let mut table = MetadataTable::new();
        table.set_base_uri("https://meta.example");
        table.set_token_uri(BreweryStyle::Classic, 0, "/0.json");
        assert_eq!(table.token_uri(BreweryStyle::Classic, 1), None);
        assert_eq!(table.token_uri(BreweryStyle::Magical, 0), None);
    }

    #[test]
    fn suffix_replacement_overwrites() {
        let mut table = MetadataTable::new();
        table.set_token_uri(BreweryStyle::Alpine, 2, "/old.json");
        table.set_token_uri(BreweryStyle::Alpine, 2, "/new.json");
        assert_eq!(
            table.token_uri(BreweryStyle::Alpine, 2),
            Some(String::from("/new.json"))
        );
    }
}
