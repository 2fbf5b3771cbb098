//! The `base#discriminator` full username.
//!
//! Base usernames are not unique; the discriminator assigned at registration
//! makes the pair unique. Comparison of base segments is case-insensitive
//! everywhere, and mapping keys are the lowercased base.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SEPARATOR;
use crate::errors::UsernameError;

/// A validated full username: exactly one `#`, with non-empty text on both
/// sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullUsername {
    base: String,
    discriminator: String,
}

impl FullUsername {
    /// Parse and validate a full username.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let (base, discriminator) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| UsernameError::MissingSeparator(s.to_string()))?;

        if discriminator.contains(SEPARATOR) {
            return Err(UsernameError::MultipleSeparators(s.to_string()));
        }
        if base.is_empty() {
            return Err(UsernameError::EmptyBase(s.to_string()));
        }
        if discriminator.is_empty() {
            return Err(UsernameError::EmptyDiscriminator(s.to_string()));
        }

        Ok(Self {
            base: base.to_string(),
            discriminator: discriminator.to_string(),
        })
    }

    /// Base username as registered (original case).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Opaque discriminator token.
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    /// Mapping key for this username: the lowercased base.
    pub fn key(&self) -> String {
        self.base.to_lowercase()
    }

    /// Case-insensitive comparison of the base segment with `base_username`.
    pub fn has_base(&self, base_username: &str) -> bool {
        self.base.to_lowercase() == base_username.to_lowercase()
    }
}

impl fmt::Display for FullUsername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.base, SEPARATOR, self.discriminator)
    }
}

impl FromStr for FullUsername {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FullUsername {
    type Error = UsernameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<FullUsername> for String {
    fn from(u: FullUsername) -> Self {
        u.to_string()
    }
}

/// Render the login name for `base` with a numeric discriminator.
///
/// Discriminator `0` is reserved for the admin account and yields the bare
/// base name. Anything else is zero-padded to `width` digits.
pub fn format_full_username(base: &str, discriminator: u16, width: usize) -> String {
    if discriminator == 0 {
        base.to_string()
    } else {
        format!("{}{}{:0width$}", base, SEPARATOR, discriminator, width = width)
    }
}

/// Base segment of a candidate full username: everything before the first
/// separator, or `None` if there is no separator.
pub fn base_segment(candidate: &str) -> Option<&str> {
    candidate.split_once(SEPARATOR).map(|(base, _)| base)
}
