//! Reading and writing the username cache cookie.

use tracing::debug;

use crate::config::CookieConfig;
use crate::errors::MappingError;
use crate::identity::UsernameMapping;

/// Value of cookie `name` in a `Cookie:` header (`a=1; b=2`).
///
/// Pairs are split at their first `=`; names must match exactly.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v)
}

/// Builder for the `Set-Cookie` header carrying the username mapping.
#[derive(Debug, Clone)]
pub struct SetCookie<'a> {
    config: &'a CookieConfig,
    value: String,
}

impl<'a> SetCookie<'a> {
    /// Encode `mapping` as the cookie value.
    pub fn for_mapping(config: &'a CookieConfig, mapping: &UsernameMapping) -> Result<Self, MappingError> {
        let value = mapping.encode()?;
        debug!(cookie = %config.name, entries = mapping.len(), bytes = value.len(), "encoded username mapping cookie");
        Ok(Self { config, value })
    }

    /// Record `base -> full` on top of the mapping found in the request's
    /// `Cookie:` header, as done after registration and successful login.
    pub fn remember(
        config: &'a CookieConfig,
        request_cookie_header: Option<&str>,
        base: &str,
        full: &str,
    ) -> Result<Self, MappingError> {
        let existing = request_cookie_header.and_then(|h| find_cookie(h, &config.name));
        let mapping = UsernameMapping::merge_into(existing, base, full);
        Self::for_mapping(config, &mapping)
    }

    /// The encoded cookie value alone.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Full `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut out = format!(
            "{}={}; Max-Age={}; Path={}",
            self.config.name,
            self.value,
            self.config.max_age_secs(),
            self.config.path
        );
        if self.config.secure {
            out.push_str("; Secure");
        }
        if self.config.http_only {
            out.push_str("; HttpOnly");
        }
        out.push_str("; SameSite=");
        out.push_str(self.config.same_site.as_str());
        out
    }
}
