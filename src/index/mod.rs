//! Sanctioned-address index
//!
//! - `normalizer` - raw token to canonical key
//! - `address_index` - address to reporting sources table
//! - `live` - the published index/metadata pair read by the API

pub mod address_index;
pub mod live;
pub mod normalizer;

pub use address_index::{AddressIndex, Sighting, CACHE_SOURCE};
pub use live::{IndexSnapshot, LiveIndex, RefreshMetadata};
pub use normalizer::normalize;
