//! Address extraction from fetched source payloads
//!
//! Sanctions feeds come in many shapes and none of them are under our
//! control, so parsing is permissive: each parser pulls out what it
//! recognizes and ignores the rest. Nothing here returns an error.
//!
//! JSON payloads run through [`JSON_STRATEGIES`] in order and the results are
//! concatenated. A single payload may match more than one strategy.

use crate::index::Sighting;
use serde_json::{Map, Value};

/// Object fields probed for an address, in priority order
pub const OBJECT_ADDRESS_FIELDS: &[&str] = &["address", "addr", "wallet", "wallet_address"];

/// CSV header names probed for the address column, in priority order
pub const CSV_ADDRESS_COLUMNS: &[&str] = &["address", "wallet", "wallet_address", "addr"];

/// Shapes of JSON payload we know how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStrategy {
    /// `["A", "B"]`
    ArrayOfStrings,
    /// `[{"address": "A"}, {"wallet": "B"}]`
    ArrayOfObjects,
    /// `{"A": {...}, "B": 1}` - every key with an alphanumeric character
    AddressKeyedObject,
    /// `{"eth": ["A"], "btc": [{"addr": "B"}]}`
    ObjectOfLists,
}

pub const JSON_STRATEGIES: [JsonStrategy; 4] = [
    JsonStrategy::ArrayOfStrings,
    JsonStrategy::ArrayOfObjects,
    JsonStrategy::AddressKeyedObject,
    JsonStrategy::ObjectOfLists,
];

impl JsonStrategy {
    /// Candidate addresses this strategy finds in `value`
    pub fn extract(self, value: &Value) -> Vec<String> {
        match (self, value) {
            (JsonStrategy::ArrayOfStrings, Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            (JsonStrategy::ArrayOfObjects, Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .filter_map(object_address)
                .collect(),
            // Deliberately loose: metadata keys like "updated" also match.
            (JsonStrategy::AddressKeyedObject, Value::Object(map)) => map
                .keys()
                .filter(|k| k.chars().any(char::is_alphanumeric))
                .cloned()
                .collect(),
            (JsonStrategy::ObjectOfLists, Value::Object(map)) => map
                .values()
                .filter(|v| v.is_array())
                .flat_map(|list| {
                    let strings = JsonStrategy::ArrayOfStrings.extract(list);
                    let objects = JsonStrategy::ArrayOfObjects.extract(list);
                    strings.into_iter().chain(objects)
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// First string-valued address field of an object
fn object_address(object: &Map<String, Value>) -> Option<String> {
    OBJECT_ADDRESS_FIELDS
        .iter()
        .find_map(|field| object.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

/// Extract sightings from a decoded JSON payload
pub fn parse_json(value: &Value, source: &str) -> Vec<Sighting> {
    JSON_STRATEGIES
        .iter()
        .flat_map(|strategy| strategy.extract(value))
        .map(|address| Sighting::new(address, source))
        .collect()
}

/// Extract sightings from delimited text with a header row
///
/// The address column is picked by header name (case-insensitive), falling
/// back to the first column. Rows that fail to parse or lack the column are
/// skipped.
pub fn parse_delimited(text: &str, source: &str) -> Vec<Sighting> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(str::to_lowercase).collect(),
        Err(e) => {
            log::debug!("No readable header row in {}: {}", source, e);
            return Vec::new();
        }
    };

    let Some(column) = address_column(&headers) else {
        return Vec::new();
    };

    reader
        .records()
        .filter_map(Result::ok)
        .filter_map(|record| record.get(column).map(|v| Sighting::new(v, source)))
        .collect()
}

/// Index of the address column, `None` when there are no columns at all
fn address_column(headers: &[String]) -> Option<usize> {
    if headers.is_empty() {
        return None;
    }
    CSV_ADDRESS_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
        .or(Some(0))
}
