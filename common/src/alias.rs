//! Spreadsheet header matching
//!
//! Headers are resolved with a literal two-stage lookup: an exact canonical
//! key first, then the schema's synonym table. Nothing approximate is tried,
//! so every accepted header is listed somewhere and can be audited.

use crate::error::Result;
use crate::schema::NormalizationSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// How a header was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch<'s> {
    /// The header is itself a canonical key
    Exact(&'s str),
    /// The header is listed in the synonym table
    Synonym(&'s str),
}

impl<'s> HeaderMatch<'s> {
    pub fn key(&self) -> &'s str {
        match self {
            HeaderMatch::Exact(key) | HeaderMatch::Synonym(key) => key,
        }
    }
}

/// Resolve one header to a canonical key, or `None` if it is not recognized.
pub fn match_header<'s>(header: &str, schema: &'s NormalizationSchema) -> Option<HeaderMatch<'s>> {
    if let Some(key) = schema.keys.iter().find(|k| k.as_str() == header) {
        return Some(HeaderMatch::Exact(key.as_str()));
    }
    schema
        .key_map
        .get(header)
        .map(|key| HeaderMatch::Synonym(key.as_str()))
}

/// Headers that match neither a canonical key nor a synonym, sorted.
pub fn unrecognized_headers<'h>(
    headers: impl IntoIterator<Item = &'h str>,
    schema: &NormalizationSchema,
) -> BTreeSet<String> {
    headers
        .into_iter()
        .filter(|h| match_header(h, schema).is_none())
        .map(|h| h.to_string())
        .collect()
}

/// Extra header synonyms supplied by an administrator (header → canonical key)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasConfig {
    pub headers: HashMap<String, String>,
}

impl AliasConfig {
    /// Load from a JSON object of `{"Header": "canonical_key"}` pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Copy of `schema` whose synonym table is extended with these headers.
    ///
    /// Entries that target an undeclared key are skipped.
    pub fn apply(&self, schema: &NormalizationSchema) -> NormalizationSchema {
        let mut extended = schema.clone();
        for (header, key) in &self.headers {
            if schema.has_key(key) {
                extended.key_map.insert(header.clone(), key.clone());
            } else {
                tracing::warn!(
                    "Ignoring header alias '{}' → '{}': not a {} field",
                    header,
                    key,
                    schema.base_name
                );
            }
        }
        extended
    }
}
