//! Live index shared with request handlers
//!
//! The published index and its refresh metadata travel together inside one
//! `Arc<IndexSnapshot>`. A refresh builds a complete new snapshot and swaps
//! the pointer under a short write lock, so readers holding the previous
//! `Arc` keep a consistent view and never see a half-built index.

use super::address_index::AddressIndex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Metadata describing the refresh cycle that produced the live index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshMetadata {
    /// `None` until the first cycle completes
    pub last_update: Option<DateTime<Utc>>,
    pub sources_used: Vec<String>,
    pub address_count: usize,
}

/// Index plus the metadata of the cycle that built it
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    pub index: AddressIndex,
    pub metadata: RefreshMetadata,
}

/// Holder of the currently published [`IndexSnapshot`]
#[derive(Debug, Default)]
pub struct LiveIndex {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl LiveIndex {
    /// Empty index, no refresh yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Grab the current snapshot
    ///
    /// Handlers that need several values (lookup + count + last_update)
    /// should read them all from one snapshot.
    pub async fn current(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Publish a new index and its metadata as a single unit
    pub async fn replace(&self, index: AddressIndex, metadata: RefreshMetadata) {
        let next = Arc::new(IndexSnapshot { index, metadata });
        let mut current = self.current.write().await;
        *current = next;
    }

    pub async fn lookup(&self, address: &str) -> Vec<String> {
        self.current().await.index.lookup(address)
    }

    pub async fn size(&self) -> usize {
        self.current().await.index.len()
    }

    pub async fn metadata(&self) -> RefreshMetadata {
        self.current().await.metadata.clone()
    }
}
