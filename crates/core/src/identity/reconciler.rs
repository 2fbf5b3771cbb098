//! Username reconciliation.
//!
//! Decides whether a cached full username should be applied to the login
//! form for the base username the user just typed. The cached mapping is a
//! hint from client storage, never an authority: every failure path ends in
//! "no match" and the server falls back to its own disambiguation.

use tracing::{debug, warn};

use super::full_username::base_segment;
use super::mapping::UsernameMapping;
use crate::config::CookieConfig;
use crate::cookie::find_cookie;

/// Full username cached for `base_username` in the percent-encoded mapping
/// blob, or `None`.
///
/// An unreadable blob is logged and treated as an empty mapping.
pub fn lookup(mapping_blob: &str, base_username: &str) -> Option<String> {
    match UsernameMapping::decode(mapping_blob) {
        Ok(mapping) => mapping
            .get(base_username)
            .filter(|full| !full.is_empty())
            .map(str::to_string),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable username mapping");
            None
        }
    }
}

/// Whether `full_username` belongs to `base_username`.
///
/// Splits at the first `#` and compares the base segment case-insensitively.
/// A candidate without a separator never matches.
pub fn matches(base_username: &str, full_username: &str) -> bool {
    match base_segment(full_username) {
        Some(stored) => stored.to_lowercase() == base_username.to_lowercase(),
        None => false,
    }
}

/// Full username to submit with the login form for `base_username`, if the
/// cache holds one that actually belongs to it.
///
/// Surrounding whitespace is ignored; an empty username never consults the
/// cache.
pub fn reconcile(mapping_blob: &str, base_username: &str) -> Option<String> {
    let base = base_username.trim();
    if base.is_empty() {
        return None;
    }

    let candidate = lookup(mapping_blob, base)?;
    if matches(base, &candidate) {
        debug!(base, full = %candidate, "reconciled cached full username");
        Some(candidate)
    } else {
        warn!(base, candidate = %candidate, "cached full username does not belong to base");
        None
    }
}

/// Reconciler bound to the configured cache cookie.
#[derive(Debug, Clone)]
pub struct UsernameReconciler {
    cookie_name: String,
}

impl UsernameReconciler {
    pub fn new(config: &CookieConfig) -> Self {
        Self {
            cookie_name: config.name.clone(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// The raw mapping blob from a `Cookie:` request header.
    pub fn mapping_blob<'a>(&self, cookie_header: Option<&'a str>) -> Option<&'a str> {
        cookie_header.and_then(|h| find_cookie(h, &self.cookie_name))
    }

    /// [`lookup`] against the mapping cookie in a `Cookie:` header.
    pub fn lookup_cookie_header(&self, cookie_header: Option<&str>, base_username: &str) -> Option<String> {
        let blob = self.mapping_blob(cookie_header)?;
        lookup(blob, base_username)
    }

    /// [`reconcile`] against the mapping cookie in a `Cookie:` header.
    pub fn reconcile_cookie_header(
        &self,
        cookie_header: Option<&str>,
        base_username: &str,
    ) -> Option<String> {
        let Some(blob) = self.mapping_blob(cookie_header) else {
            debug!(cookie = %self.cookie_name, "no username mapping cookie present");
            return None;
        };
        reconcile(blob, base_username)
    }
}

impl Default for UsernameReconciler {
    fn default() -> Self {
        Self::new(&CookieConfig::default())
    }
}
