//! The base -> full username mapping kept in the client's cookie.
//!
//! Wire format: a JSON object, percent-encoded as a cookie value.
//!
//! ```text
//! {"alice":"alice#7421","bob":"Bob#0003"}
//! %7B%22alice%22%3A%22alice%237421%22%2C%22bob%22%3A%22Bob%230003%22%7D
//! ```
//!
//! The blob comes from client-controlled storage, so decoding is strict:
//! anything other than a flat object of string values is rejected as a whole.

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::MappingError;

/// Characters left unescaped when encoding, matching `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Lowercase base username -> full username as registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsernameMapping {
    entries: BTreeMap<String, String>,
}

impl UsernameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a percent-encoded cookie value.
    pub fn decode(blob: &str) -> Result<Self, MappingError> {
        let json = percent_decode_strict(blob)?;
        Self::from_json(&json)
    }

    /// Parse an already-decoded JSON object.
    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let entries: BTreeMap<String, String> = serde_json::from_str(json)?;
        debug!(count = entries.len(), "decoded username mapping");
        Ok(Self { entries })
    }

    /// Decode `existing` (if any) and record `base -> full` in it.
    ///
    /// A corrupted existing value is discarded rather than reported, so a
    /// tampered cookie is replaced on the next successful login.
    pub fn merge_into(existing: Option<&str>, base: &str, full: &str) -> Self {
        let mut mapping = match existing {
            Some(blob) => Self::decode(blob).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable username mapping");
                Self::new()
            }),
            None => Self::new(),
        };
        mapping.insert(base, full);
        mapping
    }

    /// Full username stored for `base`, compared case-insensitively.
    pub fn get(&self, base: &str) -> Option<&str> {
        self.entries.get(&base.to_lowercase()).map(String::as_str)
    }

    /// Store `full` under the lowercased `base`, replacing any previous entry.
    pub fn insert(&mut self, base: &str, full: &str) {
        self.entries.insert(base.to_lowercase(), full.to_string());
    }

    pub fn remove(&mut self, base: &str) -> Option<String> {
        self.entries.remove(&base.to_lowercase())
    }

    /// First entry in key order, used to prefill the login page.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.entries
            .iter()
            .next()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to JSON without percent-encoding.
    pub fn to_json(&self) -> Result<String, MappingError> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Serialize to a percent-encoded cookie value.
    pub fn encode(&self) -> Result<String, MappingError> {
        let json = self.to_json()?;
        Ok(utf8_percent_encode(&json, COMPONENT).to_string())
    }
}

/// Percent-decode `blob`, rejecting truncated or non-hex escapes the way
/// `decodeURIComponent` does.
fn percent_decode_strict(blob: &str) -> Result<String, MappingError> {
    let bytes = blob.as_bytes();
    for (offset, _) in bytes.iter().enumerate().filter(|(_, b)| **b == b'%') {
        let valid = matches!(
            (bytes.get(offset + 1), bytes.get(offset + 2)),
            (Some(h), Some(l)) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit()
        );
        if !valid {
            return Err(MappingError::BadEscape { offset });
        }
    }

    let decoded = percent_decode_str(blob).decode_utf8()?;
    Ok(decoded.into_owned())
}
