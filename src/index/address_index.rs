//! Address table mapping canonical keys to the sources that reported them

use super::normalizer::normalize;
use std::collections::{BTreeSet, HashMap};

/// Synthetic source credited for addresses restored from the snapshot file
pub const CACHE_SOURCE: &str = "cache";

/// One `(address, source)` pair produced by a parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sighting {
    pub address: String,
    pub source: String,
}

impl Sighting {
    pub fn new(address: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            source: source.into(),
        }
    }
}

/// Mapping from canonical address to the set of reporting sources
///
/// Entries are only ever created together with a source, so no address has an
/// empty source set. Built fresh on every refresh cycle and never mutated once
/// published through [`super::LiveIndex`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressIndex {
    entries: HashMap<String, BTreeSet<String>>,
}

impl AddressIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `source` with reporting `address`
    ///
    /// Returns true if the pair was not present before. Blank addresses are
    /// ignored.
    pub fn insert(&mut self, address: &str, source: &str) -> bool {
        let Some(key) = normalize(address) else {
            return false;
        };
        self.entries
            .entry(key)
            .or_default()
            .insert(source.to_string())
    }

    /// Merge a batch of parser output
    ///
    /// Returns the number of new `(address, source)` pairs.
    pub fn extend<I>(&mut self, sightings: I) -> usize
    where
        I: IntoIterator<Item = Sighting>,
    {
        sightings
            .into_iter()
            .filter(|s| self.insert(&s.address, &s.source))
            .count()
    }

    /// Sources that reported `address`, sorted; empty when unknown
    ///
    /// Exact, case-sensitive match on the normalized key.
    pub fn lookup(&self, address: &str) -> Vec<String> {
        normalize(address)
            .and_then(|key| self.entries.get(&key))
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, address: &str) -> bool {
        normalize(address).is_some_and(|key| self.entries.contains_key(&key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All address keys, sorted
    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.entries.keys().cloned().collect();
        addresses.sort();
        addresses
    }
}
