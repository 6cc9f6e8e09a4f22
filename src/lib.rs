//! # darkscan
//!
//! In-memory index of blockchain addresses found on sanctions and watch
//! lists, rebuilt from remote JSON/CSV feeds and served over HTTP.
//!
//! ## Module Organization
//!
//! - `index` - normalizer, address table, live index/metadata pair
//! - `sources` - source parsers and the fetcher
//! - `persistence` - snapshot file used when every source is down
//! - `refresh` - refresh cycle orchestration and periodic scheduler
//! - `chain` - chain-family heuristics for lookup responses
//! - `api` - axum router and handlers
//! - `config` - environment configuration
//! - `error` - error types

pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod index;
pub mod persistence;
pub mod refresh;
pub mod sources;

pub use config::Config;
pub use index::{AddressIndex, LiveIndex, RefreshMetadata};
pub use refresh::{RefreshOrchestrator, RefreshOutcome, RefreshReport};
