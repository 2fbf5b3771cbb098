//! Error types for the usertag core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.
//!
//! Note that the reconciliation entry points never surface these errors:
//! they log and fall back to "no match". The typed errors are for the
//! stricter building blocks (decoding, parsing, allocation, config).

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Username(#[from] UsernameError),

    #[error(transparent)]
    Discriminator(#[from] DiscriminatorError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Mapping errors
// ---------------------------------------------------------------------------

/// Errors from decoding the cached username mapping blob.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A `%` escape was truncated or not followed by two hex digits.
    #[error("malformed percent-encoding at byte {offset}")]
    BadEscape { offset: usize },

    /// The percent-decoded bytes are not valid UTF-8.
    #[error("mapping blob is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The blob is not a flat JSON object of string values.
    #[error("mapping blob is not a string-to-string object: {0}")]
    Shape(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Username errors
// ---------------------------------------------------------------------------

/// Violations of the full username invariant (`base#discriminator`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsernameError {
    /// No `#` separator present.
    #[error("full username '{0}' has no discriminator separator")]
    MissingSeparator(String),

    /// More than one `#` separator present.
    #[error("full username '{0}' has more than one discriminator separator")]
    MultipleSeparators(String),

    /// Nothing precedes the separator.
    #[error("full username '{0}' has an empty base segment")]
    EmptyBase(String),

    /// Nothing follows the separator.
    #[error("full username '{0}' has an empty discriminator")]
    EmptyDiscriminator(String),
}

// ---------------------------------------------------------------------------
// Discriminator errors
// ---------------------------------------------------------------------------

/// Errors from discriminator allocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscriminatorError {
    /// Every discriminator in the configured range is taken.
    #[error("no free discriminator left for '{username}' (1..={max} all taken)")]
    Exhausted { username: String, max: u16 },

    /// The name belongs to the administrator account.
    #[error("username '{username}' is reserved")]
    Reserved { username: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
