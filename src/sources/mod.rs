//! Remote sanctions sources
//!
//! - `parsers` - pure extraction of addresses from JSON / delimited payloads
//! - `fetcher` - HTTP retrieval, format detection, per-source failure isolation

pub mod fetcher;
pub mod parsers;

pub use fetcher::{
    classify, fetch_source, parse_payload, FetchSummary, FetchedPayload, Fetcher, HttpSourceClient,
    PayloadFormat, SourceClient,
};
pub use parsers::{parse_delimited, parse_json, JsonStrategy, JSON_STRATEGIES};
